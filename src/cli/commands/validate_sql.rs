// validate-sqlコマンドハンドラー
//
// テーブル作成文とデータ投入文の整合性チェックを実装します。
// - SQLファイルの読み込み
// - 字句レベルの検証（APIには接続しない）
// - 検証結果のフォーマットされた表示

use crate::cli::OutputFormat;
use crate::core::sql_validation::SqlValidationResult;
use crate::services::sql_statement_validator::SqlStatementValidatorService;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

/// validate-sqlコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ValidateSqlCommand {
    /// CREATE TABLE文のファイル
    pub create_path: PathBuf,
    /// INSERT INTO文のファイル
    pub insert_path: Option<PathBuf>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// validate-sqlコマンドハンドラー
#[derive(Debug, Clone)]
pub struct ValidateSqlCommandHandler {}

impl ValidateSqlCommandHandler {
    /// 新しいValidateSqlCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// validate-sqlコマンドを実行
    ///
    /// # Arguments
    ///
    /// * `command` - validate-sqlコマンドのパラメータ
    ///
    /// # Returns
    ///
    /// 成功時は検証結果のサマリー、ファイルを読めない場合はエラーメッセージ
    pub fn execute(&self, command: &ValidateSqlCommand) -> Result<String> {
        let create = fs::read_to_string(&command.create_path).with_context(|| {
            format!("Failed to read CREATE TABLE file: {:?}", command.create_path)
        })?;

        let insert = match &command.insert_path {
            Some(path) => Some(
                fs::read_to_string(path)
                    .with_context(|| format!("Failed to read INSERT INTO file: {:?}", path))?,
            ),
            None => None,
        };

        let validator = SqlStatementValidatorService::new();
        let result = validator.validate(&create, insert.as_deref());

        match command.format {
            OutputFormat::Json => serde_json::to_string_pretty(&result)
                .with_context(|| "Failed to serialize validation result"),
            OutputFormat::Text => Ok(self.format_validation_result(&result)),
        }
    }

    /// 検証結果をフォーマット
    fn format_validation_result(&self, result: &SqlValidationResult) -> String {
        let mut output = String::new();

        output.push_str("=== SQL Validation Results ===\n\n");

        if !result.table_names.create_name.is_empty() {
            output.push_str(&format!("Table: {}\n", result.table_names.create_name));
        }
        if !result.create_columns.is_empty() {
            output.push_str(&format!(
                "CREATE TABLE columns: {}\n",
                result.create_columns.join(", ")
            ));
        }
        if !result.insert_columns.is_empty() {
            output.push_str(&format!(
                "INSERT INTO columns: {}\n",
                result.insert_columns.join(", ")
            ));
        }

        if !result.missing_columns.is_empty() {
            output.push_str(&format!(
                "   Missing in INSERT: {}\n",
                result.missing_columns.join(", ")
            ));
        }
        if !result.extra_columns.is_empty() {
            output.push_str(&format!(
                "   Not defined in CREATE TABLE: {}\n",
                result.extra_columns.join(", ")
            ));
        }

        output.push_str("\n=== Result ===\n");
        match result.message() {
            None => output.push_str(&format!(
                "{}\n",
                "✓ Statements are consistent.".green()
            )),
            Some(message) => output.push_str(&format!("{}\n", format!("✗ {}", message).red())),
        }

        output
    }
}

impl Default for ValidateSqlCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_execute_reports_column_mismatch() {
        colored::control::set_override(false);
        let dir = TempDir::new().unwrap();
        let command = ValidateSqlCommand {
            create_path: write(&dir, "create.sql", "CREATE TABLE orders (id INT, total DECIMAL)"),
            insert_path: Some(write(&dir, "insert.sql", "INSERT INTO orders (id) VALUES (1)")),
            format: OutputFormat::Text,
        };

        let output = ValidateSqlCommandHandler::new().execute(&command).unwrap();

        assert!(output.contains("Table: orders"));
        assert!(output.contains("Missing in INSERT: total"));
        assert!(output.contains("✗ Column mismatch"));
    }

    #[test]
    fn test_execute_json_output() {
        let dir = TempDir::new().unwrap();
        let command = ValidateSqlCommand {
            create_path: write(&dir, "create.sql", "create table X(a int)"),
            insert_path: None,
            format: OutputFormat::Json,
        };

        let output = ValidateSqlCommandHandler::new().execute(&command).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["valid"], true);
        assert_eq!(parsed["error_kind"], "none");
        assert_eq!(parsed["table_names"]["create_name"], "X");
    }

    #[test]
    fn test_execute_missing_file() {
        let command = ValidateSqlCommand {
            create_path: PathBuf::from("/nonexistent/create.sql"),
            insert_path: None,
            format: OutputFormat::Text,
        };
        assert!(ValidateSqlCommandHandler::new().execute(&command).is_err());
    }
}
