// SQLステートメント検証サービスのテスト
//
// CREATE TABLE文とINSERT INTO文の整合性チェックの各分岐を検証します。

#[cfg(test)]
mod sql_statement_validator_tests {
    use sqldrill_admin::core::error::SqlStatementError;
    use sqldrill_admin::core::sql_validation::ValidationErrorKind;
    use sqldrill_admin::services::sql_statement_validator::{validate, SqlStatementValidatorService};
    use serde_json::json;

    /// 一致するCREATE/INSERTは有効
    #[test]
    fn test_matching_statements_are_valid() {
        let result = validate(
            "CREATE TABLE t (a INT, b INT)",
            Some("INSERT INTO t (a, b) VALUES (1, 2)"),
        );

        assert!(result.is_valid());
        assert_eq!(result.error_kind, ValidationErrorKind::None);
        assert!(result.missing_columns.is_empty());
        assert!(result.extra_columns.is_empty());
        assert_eq!(result.table_names.create_name, "t");
        assert_eq!(result.table_names.insert_name.as_deref(), Some("t"));
        assert!(result.message().is_none());
    }

    /// INSERT文なしではCREATE文のみで有効と判定
    #[test]
    fn test_create_only_is_valid() {
        let result = validate("create table X(a int)", None);

        assert!(result.is_valid());
        assert_eq!(result.table_names.create_name, "X");
        assert_eq!(result.create_columns, vec!["a"]);

        let blank_insert = validate("create table X(a int)", Some("   \n"));
        assert!(blank_insert.is_valid());
    }

    /// 欠けているカラムはCREATE文の順序で報告される
    #[test]
    fn test_missing_column_reported() {
        let result = validate(
            "CREATE TABLE orders (id INT, total DECIMAL)",
            Some("INSERT INTO orders (id) VALUES (1)"),
        );

        assert!(!result.is_valid());
        assert_eq!(result.error_kind, ValidationErrorKind::ColumnMismatch);
        assert_eq!(result.missing_columns, vec!["total"]);
        assert!(result.extra_columns.is_empty());
        assert_eq!(
            result.error(),
            Some(SqlStatementError::ColumnMismatch {
                missing: vec!["total".to_string()],
                extra: vec![],
            })
        );
    }

    /// 欠落と余分の両方をそれぞれの文の順序で分割する
    #[test]
    fn test_column_mismatch_partitions_both_sides() {
        let result = validate(
            "CREATE TABLE users (id INT, email TEXT, name TEXT, age INT)",
            Some("INSERT INTO users (nickname, id, Email, country) VALUES (...)"),
        );

        assert_eq!(result.error_kind, ValidationErrorKind::ColumnMismatch);
        assert_eq!(result.missing_columns, vec!["name", "age"]);
        assert_eq!(result.extra_columns, vec!["nickname", "country"]);
    }

    /// CREATE TABLEで始まらない入力は拒否される
    #[test]
    fn test_missing_create_keyword() {
        for input in [
            "SELECT * FROM users",
            "CREATE INDEX idx ON users (id)",
            "",
            "-- comment\nCREATE TABLE t (a INT)",
        ] {
            let result = validate(input, None);
            assert_eq!(
                result.error_kind,
                ValidationErrorKind::MissingCreateKeyword,
                "input: {:?}",
                input
            );
            assert!(!result.is_valid());
        }
    }

    /// 先頭の空白と大文字小文字は無視される
    #[test]
    fn test_create_keyword_case_and_whitespace() {
        let result = validate("  \n\tcReAtE tAbLe items (sku TEXT)", None);
        assert!(result.is_valid());
        assert_eq!(result.table_names.create_name, "items");
    }

    /// テーブル名がない場合
    #[test]
    fn test_table_name_not_found() {
        let result = validate("CREATE TABLE (id INT)", None);
        assert_eq!(result.error_kind, ValidationErrorKind::TableNameNotFound);
        assert_eq!(result.error(), Some(SqlStatementError::TableNameNotFound));
    }

    /// INSERT INTOで始まらないINSERT文
    #[test]
    fn test_missing_insert_keyword() {
        let result = validate(
            "CREATE TABLE t (a INT)",
            Some("UPDATE t SET a = 1"),
        );
        assert_eq!(result.error_kind, ValidationErrorKind::MissingInsertKeyword);
    }

    /// カラムリストのないINSERT文
    #[test]
    fn test_insert_columns_not_found() {
        let result = validate(
            "CREATE TABLE t (a INT)",
            Some("INSERT INTO t VALUES (1)"),
        );
        assert_eq!(result.error_kind, ValidationErrorKind::InsertColumnsNotFound);
    }

    /// テーブル名の比較は大文字小文字を区別しない
    #[test]
    fn test_table_name_case_insensitive() {
        let result = validate(
            "CREATE TABLE Users (id INT, email TEXT)",
            Some("INSERT INTO users (id, email) VALUES (1, 'a@example.com')"),
        );
        assert!(result.is_valid());
    }

    /// テーブル名の不一致は元の表記で報告される
    #[test]
    fn test_table_name_mismatch_reports_original_names() {
        let result = validate(
            "CREATE TABLE Orders (id INT)",
            Some("INSERT INTO Order_Items (id) VALUES (1)"),
        );

        assert_eq!(result.error_kind, ValidationErrorKind::TableNameMismatch);
        assert_eq!(
            result.error(),
            Some(SqlStatementError::TableNameMismatch {
                create_name: "Orders".to_string(),
                insert_name: "Order_Items".to_string(),
            })
        );
        let message = result.message().unwrap();
        assert!(message.contains("Orders"));
        assert!(message.contains("Order_Items"));
    }

    /// 複数行・型引数・制約を含むCREATE文
    #[test]
    fn test_multiline_create_with_type_arguments() {
        let create = "CREATE TABLE payments (\n  id SERIAL PRIMARY KEY,\n  amount DECIMAL(10, 2) NOT NULL,\n  paid_at TIMESTAMP DEFAULT now()\n);";
        let insert = "INSERT INTO payments (\n  id,\n  amount,\n  paid_at\n) VALUES (1, 10.50, '2024-01-01');";

        let result = validate(create, Some(insert));

        assert!(result.is_valid(), "unexpected result: {:?}", result);
        assert_eq!(result.create_columns, vec!["id", "amount", "paid_at"]);
        assert_eq!(result.insert_columns, vec!["id", "amount", "paid_at"]);
    }

    /// 同じ入力に対しては同じ結果を返す
    #[test]
    fn test_validate_is_idempotent() {
        let create = "CREATE TABLE t (a INT, b INT, c INT)";
        let insert = Some("INSERT INTO t (c, d) VALUES (1, 2)");

        let first = validate(create, insert);
        let second = validate(create, insert);

        assert_eq!(first, second);
    }

    /// サービス経由でもフリー関数と同じ結果になる
    #[test]
    fn test_service_delegates_to_validate() {
        let service = SqlStatementValidatorService::default();
        let create = "CREATE TABLE t (a INT)";
        let insert = Some("INSERT INTO t (b) VALUES (1)");

        assert_eq!(service.validate(create, insert), validate(create, insert));
    }

    /// 動的テーブルのペイロードからSQL文を取り出して検証する
    #[test]
    fn test_validate_table_payload() {
        let service = SqlStatementValidatorService::new();

        let invalid = service
            .validate_table_payload(&json!({
                "table_name": "orders",
                "create_statement": "CREATE TABLE orders (id INT, total DECIMAL)",
                "insert_statement": "INSERT INTO orders (id) VALUES (1)"
            }))
            .unwrap();
        assert_eq!(invalid.missing_columns, vec!["total"]);

        assert!(service
            .validate_table_payload(&json!({"table_name": "orders"}))
            .is_none());
    }

    /// 検証結果はsnake_caseのerror_kindでJSON化される
    #[test]
    fn test_result_serializes_error_kind() {
        let result = validate("DROP TABLE t", None);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["error_kind"], "missing_create_keyword");
        assert_eq!(value["valid"], false);
    }
}
