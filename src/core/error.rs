// エラー型定義
//
// ライブラリ全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、ApiError と SqlStatementError を定義します。

use thiserror::Error;

/// API呼び出しエラー
///
/// バックエンドREST APIとの通信時に発生するエラーを表現します。
/// どのバリアントも最終的には `user_message()` で単一の文字列に正規化されます。
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Transport error (connection refused, timeout, DNS ...)
    #[error("Network error: {message}")]
    Transport {
        /// エラーメッセージ
        message: String,
    },

    /// Non-2xx response
    #[error("Request failed with status {status}{}", format_server_message(.message))]
    Status {
        /// HTTPステータスコード
        status: u16,
        /// サーバーが返した `message` フィールド
        message: Option<String>,
    },

    /// Response body could not be decoded
    #[error("Malformed response body: {message}")]
    MalformedBody {
        /// エラーメッセージ
        message: String,
    },

    /// Mutating call without a bearer credential
    #[error("No credentials available for {method} {path}")]
    MissingCredentials {
        /// HTTPメソッド
        method: String,
        /// リクエストパス
        path: String,
    },

    /// Request could not be built locally
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// エラーメッセージ
        message: String,
    },
}

/// 汎用フォールバックメッセージ
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

impl ApiError {
    /// 通信エラーかどうか
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }

    /// ステータスエラーかどうか
    pub fn is_status(&self) -> bool {
        matches!(self, ApiError::Status { .. })
    }

    /// レスポンス解析エラーかどうか
    pub fn is_malformed_body(&self) -> bool {
        matches!(self, ApiError::MalformedBody { .. })
    }

    /// 認証情報不足エラーかどうか
    pub fn is_missing_credentials(&self) -> bool {
        matches!(self, ApiError::MissingCredentials { .. })
    }

    /// HTTPステータスコードを取得
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 画面に表示する単一のエラーメッセージ
    ///
    /// サーバーのメッセージがあればそれを優先し、なければ汎用メッセージを返します。
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ApiError::Status { .. } | ApiError::MalformedBody { .. } => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

fn format_server_message(message: &Option<String>) -> String {
    message
        .as_ref()
        .map_or(String::new(), |m| format!(": {}", m))
}

/// エンティティストアの操作エラー
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// API呼び出しの失敗（コレクション状態にも反映済み）
    #[error(transparent)]
    Api(#[from] ApiError),

    /// 送信前の検証で拒否された（リクエストは送信されず、状態も変更されない）
    #[error("Submission blocked: {message}")]
    Rejected {
        /// エラーメッセージ
        message: String,
    },
}

impl StoreError {
    /// API呼び出しの失敗かどうか
    pub fn is_api(&self) -> bool {
        matches!(self, StoreError::Api(_))
    }

    /// 送信前に拒否されたかどうか
    pub fn is_rejected(&self) -> bool {
        matches!(self, StoreError::Rejected { .. })
    }

    /// 画面に表示する単一のエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Api(error) => error.user_message(),
            StoreError::Rejected { message } => message.clone(),
        }
    }
}

/// SQLステートメント検証エラー
///
/// テーブル作成文・データ投入文の整合性チェックで検出された問題を表現します。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SqlStatementError {
    #[error("Create statement must start with CREATE TABLE")]
    MissingCreateKeyword,

    #[error("Could not find a table name after CREATE TABLE")]
    TableNameNotFound,

    #[error("Insert statement must start with INSERT INTO")]
    MissingInsertKeyword,

    #[error("Could not find a column list in INSERT INTO <table> (<columns>)")]
    InsertColumnsNotFound,

    #[error("Table name mismatch: CREATE TABLE uses '{create_name}' but INSERT INTO uses '{insert_name}'")]
    TableNameMismatch {
        /// CREATE TABLE側のテーブル名（元の大文字小文字）
        create_name: String,
        /// INSERT INTO側のテーブル名（元の大文字小文字）
        insert_name: String,
    },

    #[error("Column mismatch{}{}", format_columns(" - missing in INSERT: ", .missing), format_columns(" - not defined in CREATE TABLE: ", .extra))]
    ColumnMismatch {
        /// INSERTに存在しないカラム
        missing: Vec<String>,
        /// CREATE TABLEに存在しないカラム
        extra: Vec<String>,
    },
}

fn format_columns(label: &str, columns: &[String]) -> String {
    if columns.is_empty() {
        String::new()
    } else {
        format!("{}{}", label, columns.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_message() {
        let error = ApiError::Status {
            status: 422,
            message: Some("Company name already exists".to_string()),
        };

        assert!(error.is_status());
        assert_eq!(error.status(), Some(422));
        assert_eq!(error.user_message(), "Company name already exists");
    }

    #[test]
    fn test_user_message_falls_back_to_generic() {
        let error = ApiError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(error.user_message(), GENERIC_FAILURE_MESSAGE);

        let blank = ApiError::Status {
            status: 500,
            message: Some("  ".to_string()),
        };
        assert_eq!(blank.user_message(), GENERIC_FAILURE_MESSAGE);

        let malformed = ApiError::MalformedBody {
            message: "expected value at line 1".to_string(),
        };
        assert!(malformed.is_malformed_body());
        assert_eq!(malformed.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_transport_message_is_not_empty() {
        let error = ApiError::Transport {
            message: "connection refused".to_string(),
        };

        assert!(error.is_transport());
        assert!(error.user_message().contains("connection refused"));
    }

    #[test]
    fn test_missing_credentials_display() {
        let error = ApiError::MissingCredentials {
            method: "POST".to_string(),
            path: "/companies".to_string(),
        };

        assert!(error.is_missing_credentials());
        assert_eq!(
            error.to_string(),
            "No credentials available for POST /companies"
        );
    }

    #[test]
    fn test_column_mismatch_display() {
        let error = SqlStatementError::ColumnMismatch {
            missing: vec!["total".to_string()],
            extra: vec![],
        };
        assert_eq!(
            error.to_string(),
            "Column mismatch - missing in INSERT: total"
        );

        let both = SqlStatementError::ColumnMismatch {
            missing: vec!["a".to_string(), "b".to_string()],
            extra: vec!["c".to_string()],
        };
        let message = both.to_string();
        assert!(message.contains("missing in INSERT: a, b"));
        assert!(message.contains("not defined in CREATE TABLE: c"));
    }

    #[test]
    fn test_table_name_mismatch_keeps_original_case() {
        let error = SqlStatementError::TableNameMismatch {
            create_name: "Orders".to_string(),
            insert_name: "Order_Items".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("'Orders'"));
        assert!(message.contains("'Order_Items'"));
    }
}
