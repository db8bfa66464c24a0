// listコマンドハンドラー
//
// エンティティ一覧の取得を実装します。
// - name=value 形式のフィルターをストアのフィルターにマージ
// - 現在のフィルターで一覧を取得
// - 必要に応じてクライアント側で並べ替え

use super::{format_records, with_store};
use crate::cli::OutputFormat;
use crate::core::collection::Filters;
use crate::core::entity::{Entity, EntityKind};
use crate::services::admin_stores::AdminStores;
use crate::services::entity_store::EntityStore;
use anyhow::{anyhow, Result};

/// listコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ListCommand {
    /// エンティティ種別
    pub kind: EntityKind,
    /// name=value 形式のフィルター
    pub filters: Vec<String>,
    /// 並べ替えフィールド
    pub sort: Option<String>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// listコマンドハンドラー
#[derive(Debug, Clone)]
pub struct ListCommandHandler {}

impl ListCommandHandler {
    /// 新しいListCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// listコマンドを実行
    pub async fn execute(&self, stores: &AdminStores, command: &ListCommand) -> Result<String> {
        let filters = Filters::parse_pairs(&command.filters)?;
        with_store!(stores, command.kind, |store| {
            self.list(store, filters, command).await
        })
    }

    async fn list<E: Entity>(
        &self,
        store: &EntityStore<E>,
        filters: Filters,
        command: &ListCommand,
    ) -> Result<String> {
        store.set_filters(filters);
        store.refresh().await.map_err(|e| {
            anyhow!(
                "Failed to list {}: {}",
                E::KIND,
                e.user_message()
            )
        })?;

        if let Some(field) = &command.sort {
            store.sort_by(field);
        }

        format_records(&store.items(), command.format)
    }
}

impl Default for ListCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
