// テスト共通ヘルパー
//
// テスト全体で共有されるモックAPIクライアントとユーティリティ関数を集約する。
// テストファイルから `mod common;` で利用可能。

use async_trait::async_trait;
use serde_json::Value;
use sqldrill_admin::adapters::api_client::{ApiClient, ApiRequest, ApiResponse};
use sqldrill_admin::adapters::credentials::{CredentialProvider, StaticToken};
use sqldrill_admin::core::config::Config;
use sqldrill_admin::core::error::ApiError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 送信されたリクエストの記録
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request: ApiRequest,
    pub token: Option<String>,
}

/// 事前に登録したレスポンスを順に返すモッククライアント
///
/// レスポンスはリクエストの発行順に割り当てられ、指定した遅延の後に返されます。
#[derive(Default)]
pub struct MockApiClient {
    responses: Mutex<VecDeque<(Duration, Result<ApiResponse, ApiError>)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

#[allow(dead_code)]
impl MockApiClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// JSONレスポンスを登録
    pub fn respond_json(&self, body: Value) -> &Self {
        self.respond_after(Duration::ZERO, Ok(ApiResponse::Json(body)))
    }

    /// バイナリレスポンスを登録
    pub fn respond_blob(&self, bytes: &[u8]) -> &Self {
        self.respond_after(Duration::ZERO, Ok(ApiResponse::Blob(bytes.to_vec())))
    }

    /// エラーレスポンスを登録
    pub fn respond_error(&self, error: ApiError) -> &Self {
        self.respond_after(Duration::ZERO, Err(error))
    }

    /// 遅延付きでレスポンスを登録
    pub fn respond_after(
        &self,
        delay: Duration,
        response: Result<ApiResponse, ApiError>,
    ) -> &Self {
        self.responses.lock().unwrap().push_back((delay, response));
        self
    }

    /// 送信されたリクエスト
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// 送信されたリクエスト数
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ApiClient for MockApiClient {
    async fn request(
        &self,
        request: ApiRequest,
        credentials: &dyn CredentialProvider,
    ) -> Result<ApiResponse, ApiError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            request,
            token: credentials.bearer_token(),
        });

        let scripted = self.responses.lock().unwrap().pop_front();
        match scripted {
            Some((delay, response)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                response
            }
            None => Err(ApiError::Transport {
                message: "no scripted response".to_string(),
            }),
        }
    }
}

/// テスト用の認証情報
#[allow(dead_code)]
pub fn test_credentials() -> Arc<dyn CredentialProvider> {
    Arc::new(StaticToken::new("test-token"))
}

/// テスト用のConfig作成ヘルパー
#[allow(dead_code)]
pub fn create_test_config() -> Config {
    Config::with_base_url("http://localhost:8000/api")
}
