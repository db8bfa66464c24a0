// Services Layer
// ドメインロジックを実行するサービス層

pub mod admin_stores;
pub mod config_loader;
pub mod csv_export;
pub mod endpoints;
pub mod entity_store;
pub mod sql_statement_validator;
