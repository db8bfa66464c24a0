// SQLステートメント検証結果モデル
//
// テーブル作成文とデータ投入文の整合性チェックの結果を表現します。
// 検証のたびに新しく生成され、生成後は変更されません。

use crate::core::error::SqlStatementError;
use serde::Serialize;

/// 検証エラーの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    None,
    MissingCreateKeyword,
    TableNameNotFound,
    MissingInsertKeyword,
    InsertColumnsNotFound,
    TableNameMismatch,
    ColumnMismatch,
}

/// 検証対象のテーブル名
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableNames {
    /// CREATE TABLE側のテーブル名（未検出の場合は空文字列）
    pub create_name: String,
    /// INSERT INTO側のテーブル名
    pub insert_name: Option<String>,
}

/// SQLステートメント検証結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlValidationResult {
    /// 検証が成功したかどうか
    pub valid: bool,
    /// エラーの種類
    pub error_kind: ValidationErrorKind,
    /// CREATE TABLEにあってINSERTにないカラム（CREATE側の順序）
    pub missing_columns: Vec<String>,
    /// INSERTにあってCREATE TABLEにないカラム（INSERT側の順序）
    pub extra_columns: Vec<String>,
    /// テーブル名
    pub table_names: TableNames,
    /// CREATE TABLEから抽出したカラム（小文字、重複あり）
    pub create_columns: Vec<String>,
    /// INSERT INTOから抽出したカラム（小文字）
    pub insert_columns: Vec<String>,
}

impl SqlValidationResult {
    /// 成功結果を作成
    pub fn success(table_names: TableNames, create_columns: Vec<String>) -> Self {
        Self {
            valid: true,
            error_kind: ValidationErrorKind::None,
            missing_columns: Vec::new(),
            extra_columns: Vec::new(),
            table_names,
            create_columns,
            insert_columns: Vec::new(),
        }
    }

    /// 失敗結果を作成
    pub fn failure(error_kind: ValidationErrorKind, table_names: TableNames) -> Self {
        Self {
            valid: false,
            error_kind,
            missing_columns: Vec::new(),
            extra_columns: Vec::new(),
            table_names,
            create_columns: Vec::new(),
            insert_columns: Vec::new(),
        }
    }

    /// 抽出したCREATE側カラムを設定
    pub fn with_create_columns(mut self, columns: Vec<String>) -> Self {
        self.create_columns = columns;
        self
    }

    /// 抽出したINSERT側カラムを設定
    pub fn with_insert_columns(mut self, columns: Vec<String>) -> Self {
        self.insert_columns = columns;
        self
    }

    /// 検証が成功したかどうか
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// 型付きエラーを取得（成功時はNone）
    pub fn error(&self) -> Option<SqlStatementError> {
        match self.error_kind {
            ValidationErrorKind::None => None,
            ValidationErrorKind::MissingCreateKeyword => {
                Some(SqlStatementError::MissingCreateKeyword)
            }
            ValidationErrorKind::TableNameNotFound => Some(SqlStatementError::TableNameNotFound),
            ValidationErrorKind::MissingInsertKeyword => {
                Some(SqlStatementError::MissingInsertKeyword)
            }
            ValidationErrorKind::InsertColumnsNotFound => {
                Some(SqlStatementError::InsertColumnsNotFound)
            }
            ValidationErrorKind::TableNameMismatch => Some(SqlStatementError::TableNameMismatch {
                create_name: self.table_names.create_name.clone(),
                insert_name: self.table_names.insert_name.clone().unwrap_or_default(),
            }),
            ValidationErrorKind::ColumnMismatch => Some(SqlStatementError::ColumnMismatch {
                missing: self.missing_columns.clone(),
                extra: self.extra_columns.clone(),
            }),
        }
    }

    /// 画面表示用のメッセージ（成功時はNone）
    pub fn message(&self) -> Option<String> {
        self.error().map(|e| e.to_string())
    }
}
