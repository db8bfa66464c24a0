// コマンドハンドラー層
// 各CLIコマンドの実装

pub mod export;
pub mod init;
pub mod list;
pub mod mutate;
pub mod validate_sql;

use crate::cli::OutputFormat;
use crate::core::entity::Entity;
use anyhow::{Context, Result};

/// エンティティ種別に対応するストアを取り出して本体を評価する
///
/// 各アームでストアの型が異なるため、ジェネリック関数に渡すためのマクロ。
macro_rules! with_store {
    ($stores:expr, $kind:expr, |$store:ident| $body:expr) => {
        match $kind {
            $crate::core::entity::EntityKind::Company => {
                let $store = &$stores.companies;
                $body
            }
            $crate::core::entity::EntityKind::Domain => {
                let $store = &$stores.domains;
                $body
            }
            $crate::core::entity::EntityKind::Question => {
                let $store = &$stores.questions;
                $body
            }
            $crate::core::entity::EntityKind::Topic => {
                let $store = &$stores.topics;
                $body
            }
            $crate::core::entity::EntityKind::DynamicTable => {
                let $store = &$stores.tables;
                $body
            }
            $crate::core::entity::EntityKind::Database => {
                let $store = &$stores.databases;
                $body
            }
            $crate::core::entity::EntityKind::Submission => {
                let $store = &$stores.submissions;
                $body
            }
            $crate::core::entity::EntityKind::User => {
                let $store = &$stores.users;
                $body
            }
        }
    };
}

pub(crate) use with_store;

/// レコード一覧を出力用にフォーマット
pub(crate) fn format_records<E: Entity>(items: &[E], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(items).with_context(|| "Failed to serialize records")
        }
        OutputFormat::Text => {
            let mut output = format!("=== {} ({}) ===\n", E::KIND, items.len());
            if items.is_empty() {
                output.push_str("No records found.\n");
            }
            for item in items {
                output.push_str(&format!("{:>6}  {}\n", item.id().to_string(), item.summary()));
            }
            Ok(output)
        }
    }
}

/// 単一レコードを出力用にフォーマット
pub(crate) fn format_record<E: Entity>(
    verb: &str,
    record: &E,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(record).with_context(|| "Failed to serialize record")
        }
        OutputFormat::Text => Ok(format!(
            "✓ {} {} {}: {}",
            verb,
            E::KIND.display_name(),
            record.id(),
            record.summary()
        )),
    }
}
