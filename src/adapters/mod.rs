// Adapters
// バックエンドAPIとファイルシステムへのアクセスを抽象化

pub mod api_client;
pub mod attachment;
pub mod credentials;
pub mod http_client;
pub mod query_string;
