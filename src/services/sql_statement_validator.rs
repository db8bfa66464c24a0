// SQLステートメント検証サービス
//
// 管理者が入力したテーブル作成文（CREATE TABLE）とデータ投入文（INSERT INTO）の
// 整合性を、送信前に字句レベルで確認します。
// SQLパーサーではないため、型・制約・外部キーなどの意味的な検証は行いません。

use crate::core::entity::DynamicTable;
use crate::core::sql_validation::{SqlValidationResult, TableNames, ValidationErrorKind};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::OnceLock;

const CREATE_KEYWORD: &str = "CREATE TABLE";
const INSERT_KEYWORD: &str = "INSERT INTO";

fn create_table_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^CREATE\s+TABLE\s+(\w+)").expect("CREATE TABLE pattern is valid")
    })
}

fn insert_columns_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)^INSERT\s+INTO\s+(\w+)\s*\(([^)]*)\)")
            .expect("INSERT INTO pattern is valid")
    })
}

/// SQLステートメント検証サービス
#[derive(Debug, Clone)]
pub struct SqlStatementValidatorService {}

impl SqlStatementValidatorService {
    /// 新しいSqlStatementValidatorServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// テーブル作成文とデータ投入文の整合性を検証
    ///
    /// # Arguments
    ///
    /// * `create_statement` - CREATE TABLE文
    /// * `insert_statement` - INSERT INTO文（省略可）
    ///
    /// # Returns
    ///
    /// 検証結果。同じ入力に対しては常に同じ結果を返します。
    pub fn validate(
        &self,
        create_statement: &str,
        insert_statement: Option<&str>,
    ) -> SqlValidationResult {
        validate(create_statement, insert_statement)
    }

    /// 動的テーブルのペイロードに含まれるSQL文を検証
    ///
    /// CREATE文のフィールドを含まないペイロード（部分更新など）はNoneを返します。
    pub fn validate_table_payload(&self, payload: &Value) -> Option<SqlValidationResult> {
        let create = payload.get(DynamicTable::CREATE_FIELD)?.as_str()?;
        let insert = payload
            .get(DynamicTable::INSERT_FIELD)
            .and_then(Value::as_str);
        Some(self.validate(create, insert))
    }
}

impl Default for SqlStatementValidatorService {
    fn default() -> Self {
        Self::new()
    }
}

/// テーブル作成文とデータ投入文の整合性を検証
pub fn validate(create_statement: &str, insert_statement: Option<&str>) -> SqlValidationResult {
    let create = create_statement.trim();

    if !create.to_uppercase().starts_with(CREATE_KEYWORD) {
        return SqlValidationResult::failure(
            ValidationErrorKind::MissingCreateKeyword,
            TableNames::default(),
        );
    }

    let create_name = match create_table_name_pattern()
        .captures(create)
        .and_then(|caps| caps.get(1))
    {
        Some(m) => m.as_str().to_string(),
        None => {
            return SqlValidationResult::failure(
                ValidationErrorKind::TableNameNotFound,
                TableNames::default(),
            )
        }
    };

    let create_columns = extract_create_columns(create);

    let insert = match insert_statement.map(str::trim) {
        Some(insert) if !insert.is_empty() => insert,
        _ => {
            return SqlValidationResult::success(
                TableNames {
                    create_name,
                    insert_name: None,
                },
                create_columns,
            )
        }
    };

    if !insert.to_uppercase().starts_with(INSERT_KEYWORD) {
        return SqlValidationResult::failure(
            ValidationErrorKind::MissingInsertKeyword,
            TableNames {
                create_name,
                insert_name: None,
            },
        )
        .with_create_columns(create_columns);
    }

    let caps = match insert_columns_pattern().captures(insert) {
        Some(caps) => caps,
        None => {
            return SqlValidationResult::failure(
                ValidationErrorKind::InsertColumnsNotFound,
                TableNames {
                    create_name,
                    insert_name: None,
                },
            )
            .with_create_columns(create_columns)
        }
    };

    let insert_name = caps[1].to_string();
    let insert_columns: Vec<String> = caps[2]
        .split(',')
        .map(|column| column.trim().to_lowercase())
        .filter(|column| !column.is_empty())
        .collect();

    let table_names = TableNames {
        create_name: create_name.clone(),
        insert_name: Some(insert_name.clone()),
    };

    if create_name.to_lowercase() != insert_name.to_lowercase() {
        return SqlValidationResult::failure(ValidationErrorKind::TableNameMismatch, table_names)
            .with_create_columns(create_columns)
            .with_insert_columns(insert_columns);
    }

    let missing_columns = difference(&create_columns, &insert_columns);
    let extra_columns = difference(&insert_columns, &create_columns);

    if !missing_columns.is_empty() || !extra_columns.is_empty() {
        let mut result =
            SqlValidationResult::failure(ValidationErrorKind::ColumnMismatch, table_names)
                .with_create_columns(create_columns)
                .with_insert_columns(insert_columns);
        result.missing_columns = missing_columns;
        result.extra_columns = extra_columns;
        return result;
    }

    SqlValidationResult::success(table_names, create_columns).with_insert_columns(insert_columns)
}

/// CREATE TABLE文からカラム名を抽出
///
/// 最初の `(` と対応する `)` の間をカンマで分割し、各断片の先頭トークンを
/// 小文字化して返します。`DECIMAL(10,2)` のような型引数内のカンマでは分割しません。
fn extract_create_columns(create: &str) -> Vec<String> {
    let open = match create.find('(') {
        Some(pos) => pos,
        None => return Vec::new(),
    };

    let body = &create[open + 1..];
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in body.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' if depth == 0 => break,
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => fragments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fragments.push(current);

    fragments
        .iter()
        .filter_map(|fragment| fragment.split_whitespace().next())
        .map(str::to_lowercase)
        .collect()
}

/// `left` にあって `right` にない要素（`left` の順序、重複なし）
fn difference(left: &[String], right: &[String]) -> Vec<String> {
    let right: HashSet<&str> = right.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    left.iter()
        .filter(|column| !right.contains(column.as_str()))
        .filter(|column| seen.insert(column.as_str()))
        .cloned()
        .collect()
}
