// initコマンドハンドラー
//
// 設定ファイル（.sqldrill.yaml）の生成を実装します。
// - 既存の設定ファイルの検出と警告
// - APIのベースURLの検証

use crate::core::config::Config;
use crate::core::naming::DEFAULT_BASE_URL;
use crate::services::config_loader::ConfigSerializer;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// initコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct InitCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// 出力先の設定ファイル（Noneの場合は既定のパス）
    pub config_path: Option<PathBuf>,
    /// APIのベースURL
    pub base_url: Option<String>,
    /// 強制的に初期化（既存の設定を上書き）
    pub force: bool,
}

/// initコマンドハンドラー
#[derive(Debug, Clone)]
pub struct InitCommandHandler {}

impl InitCommandHandler {
    /// 新しいInitCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// initコマンドを実行
    ///
    /// # Returns
    ///
    /// 成功時は書き出した設定ファイルのパス
    pub fn execute(&self, command: &InitCommand) -> Result<PathBuf> {
        let config_path = command
            .config_path
            .clone()
            .unwrap_or_else(|| command.project_path.join(Config::DEFAULT_CONFIG_PATH));

        // 初期化済みチェック
        if self.is_already_initialized(&config_path) && !command.force {
            return Err(anyhow!(
                "Config file already exists: {:?}. Use --force option to overwrite it.",
                config_path
            ));
        }

        let base_url = command.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let config = Config::with_base_url(base_url);
        config.validate()?;

        let yaml = ConfigSerializer::to_yaml(&config)?;
        fs::write(&config_path, yaml)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(config_path)
    }

    /// 設定ファイルが既に存在するかチェック
    fn is_already_initialized(&self, config_path: &Path) -> bool {
        config_path.exists()
    }
}

impl Default for InitCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
