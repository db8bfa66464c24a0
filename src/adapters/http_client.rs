// HTTPクライアントアダプター
//
// reqwestを使用したApiClientの実装です。
// 非2xxレスポンスはボディの `message` を取り出して ApiError::Status に変換します。

use crate::adapters::api_client::{
    resolve_token, ApiClient, ApiRequest, ApiResponse, FormValue, Method, Payload, RequestBody,
    ResponseType,
};
use crate::adapters::credentials::CredentialProvider;
use crate::core::config::ApiConfig;
use crate::core::error::ApiError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::debug;

/// reqwestベースのAPIクライアント
#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestApiClient {
    /// 設定からクライアントを作成
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| ApiError::InvalidRequest {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// リクエストURLを構築
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn build_form(fields: Vec<crate::adapters::api_client::FormField>) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for field in fields {
            form = match field.value {
                FormValue::Text(text) => form.text(field.name, text),
                FormValue::File {
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let part = Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&content_type)
                        .map_err(|e| ApiError::InvalidRequest {
                            message: format!("Invalid content type '{}': {}", content_type, e),
                        })?;
                    form.part(field.name, part)
                }
            };
        }
        Ok(form)
    }
}

#[async_trait]
impl ApiClient for ReqwestApiClient {
    async fn request(
        &self,
        request: ApiRequest,
        credentials: &dyn CredentialProvider,
    ) -> Result<ApiResponse, ApiError> {
        let token = resolve_token(&request, credentials)?;
        let url = self.url_for(&request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Payload(Payload::Json(value)) => builder.json(&value),
            RequestBody::Payload(Payload::Multipart(fields)) => {
                builder.multipart(Self::build_form(fields)?)
            }
        };

        debug!(method = %request.method, %url, "sending request");

        let response = builder.send().await.map_err(|e| ApiError::Transport {
            message: e.to_string(),
        })?;

        let status = response.status();
        debug!(method = %request.method, %url, status = status.as_u16(), "received response");

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: extract_server_message(&body),
            });
        }

        let bytes = response.bytes().await.map_err(|e| ApiError::Transport {
            message: e.to_string(),
        })?;

        match request.response_type {
            ResponseType::Blob => Ok(ApiResponse::Blob(bytes.to_vec())),
            ResponseType::Json if bytes.is_empty() => Ok(ApiResponse::Json(serde_json::Value::Null)),
            ResponseType::Json => serde_json::from_slice(&bytes)
                .map(ApiResponse::Json)
                .map_err(|e| ApiError::MalformedBody {
                    message: e.to_string(),
                }),
        }
    }
}

/// エラーボディから `message`（または `error`）フィールドを取り出す
pub fn extract_server_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "error", "detail"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
