// 命名ポリシー
//
// アプリケーション名と関連する設定名の単一ソースを提供します。

/// 現行アプリケーション名
pub const APP_NAME: &str = "sqldrill-admin";

/// 既定の設定ファイル名
pub const CONFIG_FILE: &str = ".sqldrill.yaml";

/// 既定のトークン環境変数
pub const TOKEN_ENV: &str = "SQLDRILL_ADMIN_TOKEN";

/// APIベースURLを上書きする環境変数
pub const API_URL_ENV: &str = "SQLDRILL_API_URL";

/// 既定のAPIベースURL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
