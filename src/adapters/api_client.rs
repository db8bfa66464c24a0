// APIクライアント抽象
//
// バックエンドREST APIへのリクエストを抽象化します。
// エンティティストアはこのトレイトにのみ依存し、テストではモックに差し替えます。
// 認証情報はグローバルな状態から読まず、呼び出しごとに渡します。

use crate::adapters::credentials::CredentialProvider;
use crate::core::error::ApiError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;

/// HTTPメソッド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// 状態を変更するメソッドかどうか
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// 期待するレスポンス形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    #[default]
    Json,
    /// バイナリ（CSVエクスポートなど）
    Blob,
}

/// マルチパートのフィールド値
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

/// マルチパートのフィールド
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }
}

/// 作成・更新時のペイロード
///
/// 添付ファイルがある場合はマルチパート、属性のみの場合はJSONで送信します。
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Multipart(Vec<FormField>),
}

impl Payload {
    /// 属性オブジェクトと添付ファイルからペイロードを作成
    ///
    /// 添付ファイルがなければJSON、あればマルチパートになります。
    /// マルチパートでは文字列はそのまま、その他の値はJSON文字列として送り、nullは送りません。
    pub fn from_parts(attributes: Value, attachments: Vec<FormField>) -> Result<Self, ApiError> {
        if attachments.is_empty() {
            return Ok(Payload::Json(attributes));
        }

        let object = match attributes {
            Value::Object(object) => object,
            Value::Null => Map::new(),
            other => {
                return Err(ApiError::InvalidRequest {
                    message: format!(
                        "Multipart payload attributes must be a JSON object, got {}",
                        other
                    ),
                })
            }
        };

        let mut fields: Vec<FormField> = object
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| match value {
                Value::String(s) => FormField::text(name, s),
                other => FormField::text(name, other.to_string()),
            })
            .collect();
        fields.extend(attachments);

        Ok(Payload::Multipart(fields))
    }

    /// 属性部分をJSONとして参照（マルチパートのファイル以外のフィールドを含む）
    pub fn attributes(&self) -> Value {
        match self {
            Payload::Json(value) => value.clone(),
            Payload::Multipart(fields) => Value::Object(
                fields
                    .iter()
                    .filter_map(|field| match &field.value {
                        FormValue::Text(text) => {
                            Some((field.name.clone(), Value::String(text.clone())))
                        }
                        FormValue::File { .. } => None,
                    })
                    .collect(),
            ),
        }
    }
}

/// リクエストボディ
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Payload(Payload),
}

/// APIリクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub response_type: ResponseType,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            response_type: ResponseType::Json,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, payload: Payload) -> Self {
        Self::new(Method::Post, path).with_payload(payload)
    }

    pub fn put(path: impl Into<String>, payload: Payload) -> Self {
        Self::new(Method::Put, path).with_payload(payload)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.body = RequestBody::Payload(payload);
        self
    }

    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }
}

/// APIレスポンス
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    Blob(Vec<u8>),
}

impl ApiResponse {
    /// JSONボディを取得
    pub fn into_json(self) -> Result<Value, ApiError> {
        match self {
            ApiResponse::Json(value) => Ok(value),
            ApiResponse::Blob(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| ApiError::MalformedBody {
                    message: e.to_string(),
                })
            }
        }
    }

    /// バイナリボディを取得
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ApiResponse::Json(value) => value.to_string().into_bytes(),
            ApiResponse::Blob(bytes) => bytes,
        }
    }
}

/// APIクライアントのトレイト
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// リクエストを送信
    ///
    /// # Arguments
    ///
    /// * `request` - 送信するリクエスト
    /// * `credentials` - Authorizationヘッダーに付与するトークンの供給元
    ///
    /// # Returns
    ///
    /// 2xxの場合はレスポンス、それ以外は正規化されたエラー
    async fn request(
        &self,
        request: ApiRequest,
        credentials: &dyn CredentialProvider,
    ) -> Result<ApiResponse, ApiError>;
}

/// 状態を変更するリクエストのトークンを取得
///
/// GETではトークンがなくても送信し、それ以外のメソッドでは必須にします。
pub fn resolve_token(
    request: &ApiRequest,
    credentials: &dyn CredentialProvider,
) -> Result<Option<String>, ApiError> {
    match credentials.bearer_token() {
        Some(token) => Ok(Some(token)),
        None if request.method.is_mutating() => Err(ApiError::MissingCredentials {
            method: request.method.to_string(),
            path: request.path.clone(),
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::credentials::{NoCredentials, StaticToken};
    use serde_json::json;

    #[test]
    fn test_from_parts_without_attachments_is_json() {
        let payload = Payload::from_parts(json!({"name": "Acme"}), vec![]).unwrap();
        assert_eq!(payload, Payload::Json(json!({"name": "Acme"})));
    }

    #[test]
    fn test_from_parts_with_attachments_is_multipart() {
        let logo = FormField {
            name: "logo".to_string(),
            value: FormValue::File {
                file_name: "logo.png".to_string(),
                content_type: "image/png".to_string(),
                bytes: vec![0x89, 0x50],
            },
        };
        let payload = Payload::from_parts(
            json!({"name": "Acme", "employees": 40, "website": null}),
            vec![logo],
        )
        .unwrap();

        match &payload {
            Payload::Multipart(fields) => {
                assert_eq!(fields.len(), 3);
                assert!(fields.contains(&FormField::text("name", "Acme")));
                assert!(fields.contains(&FormField::text("employees", "40")));
            }
            other => panic!("expected multipart, got {:?}", other),
        }
        assert_eq!(
            payload.attributes(),
            json!({"name": "Acme", "employees": "40"})
        );
    }

    #[test]
    fn test_from_parts_rejects_non_object_attributes() {
        let attachment = FormField::text("note", "x");
        assert!(Payload::from_parts(json!([1, 2]), vec![attachment]).is_err());
    }

    #[test]
    fn test_resolve_token() {
        let get = ApiRequest::get("/companies");
        assert_eq!(resolve_token(&get, &NoCredentials).unwrap(), None);

        let delete = ApiRequest::delete("/companies/1");
        let err = resolve_token(&delete, &NoCredentials).unwrap_err();
        assert!(err.is_missing_credentials());

        let token = resolve_token(&delete, &StaticToken::new("t0k")).unwrap();
        assert_eq!(token.as_deref(), Some("t0k"));
    }

    #[test]
    fn test_blob_response_into_json() {
        let response = ApiResponse::Blob(br#"{"id": 1}"#.to_vec());
        assert_eq!(response.into_json().unwrap(), json!({"id": 1}));

        let bad = ApiResponse::Blob(b"id,name".to_vec());
        assert!(bad.into_json().unwrap_err().is_malformed_body());
    }
}
