// 認証情報プロバイダー
//
// リクエストごとにBearerトークンを供給する。トークンの取得・更新は外部の責務で、
// ここでは設定に従って既存のトークンを読み出すだけにする。

use crate::core::config::AuthConfig;
use std::sync::Arc;

/// Bearerトークンの供給元
pub trait CredentialProvider: Send + Sync {
    /// 現在のトークン（未ログインの場合はNone）
    fn bearer_token(&self) -> Option<String>;
}

/// 固定トークン
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        let token = self.0.trim();
        (!token.is_empty()).then(|| token.to_string())
    }
}

/// 環境変数からトークンを読む
///
/// 呼び出しのたびに読み直すため、プロセス内でトークンが差し替わっても追従します。
#[derive(Debug, Clone)]
pub struct EnvToken {
    var_name: String,
}

impl EnvToken {
    pub fn new(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
        }
    }

    /// 参照する環境変数名
    pub fn var_name(&self) -> &str {
        &self.var_name
    }
}

impl CredentialProvider for EnvToken {
    fn bearer_token(&self) -> Option<String> {
        std::env::var(&self.var_name)
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }
}

/// 認証情報なし
#[derive(Debug, Clone, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// 設定から認証情報プロバイダーを作成
///
/// `token` が指定されていればそれを優先し、なければ `token_env` を参照します。
pub fn provider_from_config(auth: &AuthConfig) -> Arc<dyn CredentialProvider> {
    match auth.token.as_deref() {
        Some(token) if !token.trim().is_empty() => Arc::new(StaticToken::new(token)),
        _ => Arc::new(EnvToken::new(auth.token_env.clone())),
    }
}
