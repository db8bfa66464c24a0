// create / update / delete コマンドハンドラー
//
// JSONファイルの属性と添付ファイルからペイロードを組み立てて送信します。
// 動的テーブルは送信前にCREATE/INSERT文の整合性を検証し、不整合があれば送信しません。

use super::{format_record, with_store};
use crate::adapters::api_client::Payload;
use crate::adapters::attachment::{load_attachment, parse_attachment_spec};
use crate::cli::OutputFormat;
use crate::core::entity::{Entity, EntityId, EntityKind};
use crate::services::admin_stores::AdminStores;
use crate::services::entity_store::EntityStore;
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// 変更操作の種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// 作成（属性ファイル、添付ファイル）
    Create {
        data: PathBuf,
        attachments: Vec<String>,
    },
    /// 更新（ID、属性ファイル、添付ファイル）
    Update {
        id: EntityId,
        data: PathBuf,
        attachments: Vec<String>,
    },
    /// 削除
    Delete { id: EntityId },
}

/// 変更コマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct MutateCommand {
    /// エンティティ種別
    pub kind: EntityKind,
    /// 変更操作
    pub mutation: Mutation,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// 変更コマンドハンドラー
#[derive(Debug, Clone)]
pub struct MutateCommandHandler {}

impl MutateCommandHandler {
    /// 新しいMutateCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 変更コマンドを実行
    pub async fn execute(&self, stores: &AdminStores, command: &MutateCommand) -> Result<String> {
        with_store!(stores, command.kind, |store| {
            self.mutate(store, command).await
        })
    }

    async fn mutate<E: Entity>(
        &self,
        store: &EntityStore<E>,
        command: &MutateCommand,
    ) -> Result<String> {
        match &command.mutation {
            Mutation::Create { data, attachments } => {
                let payload = build_payload(data, attachments).await?;
                let record = store.create(payload).await.map_err(|e| {
                    anyhow!(
                        "Failed to create {}: {}",
                        E::KIND.display_name(),
                        e.user_message()
                    )
                })?;
                format_record("Created", &record, command.format)
            }
            Mutation::Update {
                id,
                data,
                attachments,
            } => {
                let payload = build_payload(data, attachments).await?;
                let record = store.update(id, payload).await.map_err(|e| {
                    anyhow!(
                        "Failed to update {} {}: {}",
                        E::KIND.display_name(),
                        id,
                        e.user_message()
                    )
                })?;
                format_record("Updated", &record, command.format)
            }
            Mutation::Delete { id } => {
                store.delete(id).await.map_err(|e| {
                    anyhow!(
                        "Failed to delete {} {}: {}",
                        E::KIND.display_name(),
                        id,
                        e.user_message()
                    )
                })?;
                Ok(match command.format {
                    OutputFormat::Json => {
                        serde_json::json!({ "deleted": id, "kind": E::KIND }).to_string()
                    }
                    OutputFormat::Text => {
                        format!("✓ Deleted {} {}", E::KIND.display_name(), id)
                    }
                })
            }
        }
    }
}

impl Default for MutateCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// 属性ファイルと添付ファイルからペイロードを作成
pub async fn build_payload(data: &Path, attachments: &[String]) -> Result<Payload> {
    let content = tokio::fs::read_to_string(data)
        .await
        .with_context(|| format!("Failed to read data file: {:?}", data))?;
    let attributes: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse data file as JSON: {:?}", data))?;

    let mut fields = Vec::with_capacity(attachments.len());
    for spec in attachments {
        let (field, path) = parse_attachment_spec(spec)?;
        fields.push(load_attachment(&field, Path::new(&path)).await?);
    }

    Payload::from_parts(attributes, fields).map_err(|e| anyhow!(e))
}
