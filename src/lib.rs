// SQLDrill Adminライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメインモデル（SQL検証結果、エンティティ、コレクション状態、設定）
// - adapters: バックエンドAPIとファイルシステムへのアクセスを抽象化
// - services: SQLステートメント検証、エンティティのライフサイクル、CSVエクスポート

pub mod adapters;
pub mod cli;
pub mod core;
pub mod services;
