// Core Domain
// SQLステートメント検証結果、エンティティ定義、コレクション状態の純粋なドメインモデル

pub mod collection;
pub mod config;
pub mod entity;
pub mod error;
pub mod naming;
pub mod sql_validation;
