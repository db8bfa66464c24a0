// 設定ファイル読み込みサービス
//
// core::config の純粋性を保つため、ファイルI/Oはこのサービスに集約する。

use crate::core::config::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// 設定ファイル読み込みサービス
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// YAMLファイルから設定を読み込む
    ///
    /// 環境変数による上書きを適用した後に検証します。
    pub fn from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let mut config: Config =
            serde_saphyr::from_str(&content).with_context(|| "Failed to parse config file")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

/// 設定ファイル書き出しサービス
#[derive(Debug, Clone, Default)]
pub struct ConfigSerializer;

impl ConfigSerializer {
    /// ConfigをYAML文字列に変換
    pub fn to_yaml(config: &Config) -> Result<String> {
        serde_saphyr::to_string(config).with_context(|| "Failed to serialize config file")
    }
}
