// exportコマンドハンドラー
//
// CSVエクスポート機能を実装します。
// - 期間（7 / 30 / all）と出力フィールドの指定
// - バックエンドが生成したCSVのダウンロード
// - ローカルファイルへの書き出し

use crate::adapters::api_client::ApiClient;
use crate::adapters::credentials::CredentialProvider;
use crate::core::config::Config;
use crate::core::entity::EntityKind;
use crate::services::csv_export::{CsvExportRequest, CsvExportService, ExportRange};
use crate::services::endpoints::Endpoints;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// exportコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ExportCommand {
    /// エンティティ種別
    pub kind: EntityKind,
    /// 期間
    pub range: ExportRange,
    /// 出力フィールド
    pub fields: Vec<String>,
    /// 出力先ファイル（Noneの場合は既定のファイル名）
    pub output: Option<PathBuf>,
    /// スピナーを表示するかどうか
    pub show_progress: bool,
}

/// exportコマンドハンドラー
#[derive(Debug, Clone)]
pub struct ExportCommandHandler {}

impl ExportCommandHandler {
    /// 新しいExportCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// exportコマンドを実行
    ///
    /// # Returns
    ///
    /// 成功時は書き出したファイルのサマリー、失敗時はエラーメッセージ
    pub async fn execute(
        &self,
        config: &Config,
        client: Arc<dyn ApiClient>,
        credentials: Arc<dyn CredentialProvider>,
        command: &ExportCommand,
    ) -> Result<String> {
        let endpoints = Endpoints::new(config.collection_path(command.kind));
        let request = CsvExportRequest {
            path: endpoints.export_path(),
            range: command.range,
            fields: command.fields.clone(),
        };

        let spinner = if command.show_progress {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message(format!("Exporting {}...", command.kind));
            spinner.enable_steady_tick(Duration::from_millis(100));
            Some(spinner)
        } else {
            None
        };

        let service = CsvExportService::new(client, credentials);
        let result = service.download(&request).await;

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        let bytes = result.map_err(|e| {
            anyhow!("Failed to export {}: {}", command.kind, e.user_message())
        })?;

        let output = command.output.clone().unwrap_or_else(|| {
            PathBuf::from(CsvExportService::default_file_name(
                command.kind,
                command.range,
                Utc::now(),
            ))
        });

        tokio::fs::write(&output, &bytes)
            .await
            .with_context(|| format!("Failed to write export file: {:?}", output))?;

        Ok(format!(
            "✓ Exported {} ({} bytes) to {}",
            command.kind,
            bytes.len(),
            output.display()
        ))
    }
}

impl Default for ExportCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
