// コマンド共通コンテキスト
//
// 設定ファイル読み込みやパス解決の重複をCLI層で集約する。

use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::services::admin_stores::AdminStores;
use crate::services::config_loader::ConfigLoader;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_path: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
    pub format: OutputFormat,
}

impl CommandContext {
    /// 設定を読み込んでコンテキストを作成
    ///
    /// `config_path` が指定されなければプロジェクトルートの既定ファイルを使います。
    pub fn load(
        project_path: PathBuf,
        config_path: Option<PathBuf>,
        format: OutputFormat,
    ) -> Result<Self> {
        let config_path =
            config_path.unwrap_or_else(|| project_path.join(Config::DEFAULT_CONFIG_PATH));
        if !config_path.exists() {
            return Err(anyhow!(
                "Config file not found: {:?}. Please create one first with the `init` command.",
                config_path
            ));
        }

        let config =
            ConfigLoader::from_file(&config_path).with_context(|| "Failed to read config file")?;

        Ok(Self {
            project_path,
            config_path,
            config,
            format,
        })
    }

    /// 設定に従ってストアを構築
    pub fn stores(&self) -> Result<AdminStores> {
        AdminStores::from_config(&self.config)
    }

    /// プロジェクトルートからの相対パスを解決
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_path.join(path)
        }
    }
}
