// 設定ファイル管理
//
// プロジェクトの設定ファイル（YAML形式）の定義と検証を行います。
// APIの接続先、認証情報の取得元、ライフサイクルの挙動、
// エンティティ種別ごとのエンドポイント上書きを保持します。

use crate::core::entity::EntityKind;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// プロジェクト設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// 設定ファイルのバージョン
    pub version: String,

    /// API接続設定
    pub api: ApiConfig,

    /// 認証設定
    #[serde(default)]
    pub auth: AuthConfig,

    /// ライフサイクル設定
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// エンティティ種別ごとのコレクションパス上書き
    #[serde(default)]
    pub endpoints: BTreeMap<EntityKind, String>,
}

impl Config {
    /// デフォルトの設定ファイルパス
    pub const DEFAULT_CONFIG_PATH: &'static str = crate::core::naming::CONFIG_FILE;

    /// 指定したAPIのベースURLでデフォルト設定を作成
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            version: "1.0".to_string(),
            api: ApiConfig {
                base_url: base_url.into(),
                timeout: default_timeout(),
            },
            auth: AuthConfig::default(),
            lifecycle: LifecycleConfig::default(),
            endpoints: BTreeMap::new(),
        }
    }

    /// 環境変数による上書きを適用
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(crate::core::naming::API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
    }

    /// エンティティ種別のコレクションパスを取得
    pub fn collection_path(&self, kind: EntityKind) -> String {
        self.endpoints
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| format!("/{}", kind.collection_name()))
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> Result<()> {
        // バージョンチェック
        if self.version.is_empty() {
            return Err(anyhow!("Config file version is not specified"));
        }

        self.api
            .validate()
            .with_context(|| "Invalid api configuration")?;

        for (kind, path) in &self.endpoints {
            if !path.starts_with('/') {
                return Err(anyhow!(
                    "Endpoint override for '{}' must start with '/': {}",
                    kind,
                    path
                ));
            }
        }

        Ok(())
    }
}

/// std::str::FromStrトレイトの実装
impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        serde_saphyr::from_str(yaml).with_context(|| "Failed to parse config file")
    }
}

/// API接続設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// APIのベースURL
    pub base_url: String,

    /// リクエストタイムアウト（秒）
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_timeout() -> u64 {
    30
}

impl ApiConfig {
    /// Validate api configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(anyhow!("API base URL is not specified"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow!(
                "API base URL must start with http:// or https://: {}",
                url
            ));
        }
        if self.timeout == 0 {
            return Err(anyhow!("API timeout must be greater than 0 seconds"));
        }
        Ok(())
    }
}

/// 認証設定
///
/// トークンの取得自体は外部の責務で、ここでは取得元のみを指定します。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// トークンを直接指定（開発用）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// トークンを読み込む環境変数名
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_token_env() -> String {
    crate::core::naming::TOKEN_ENV.to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_env: default_token_env(),
        }
    }
}

/// ライフサイクル設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// 古い一覧レスポンスを破棄する（デフォルトは後着優先）
    #[serde(default)]
    pub discard_stale_responses: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
version: "1.0"
api:
  base_url: "http://localhost:8000/api"
"#;
        let config: Config = yaml.parse().unwrap();

        assert_eq!(config.api.timeout, 30);
        assert_eq!(config.auth.token_env, "SQLDRILL_ADMIN_TOKEN");
        assert!(!config.lifecycle.discard_stale_responses);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_endpoint_override() {
        let yaml = r#"
version: "1.0"
api:
  base_url: "https://admin.example.com"
endpoints:
  question: /v2/questions
"#;
        let config: Config = yaml.parse().unwrap();

        assert_eq!(config.collection_path(EntityKind::Question), "/v2/questions");
        assert_eq!(config.collection_path(EntityKind::Company), "/companies");
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let config = Config::with_base_url("localhost:8000");
        assert!(config.validate().is_err());

        let empty = Config::with_base_url("");
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_relative_endpoint() {
        let mut config = Config::with_base_url("http://localhost:8000");
        config
            .endpoints
            .insert(EntityKind::Topic, "topics".to_string());
        assert!(config.validate().is_err());
    }
}
