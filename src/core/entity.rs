// エンティティ定義
//
// 管理画面で扱うリソース（会社、ドメイン、問題、トピック、動的テーブル、
// データベース、提出、ユーザー）の型付きレコードを定義します。
// バックエンドとのフィールド契約はここに集約します。

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// エンティティID
///
/// バックエンドは数値IDと文字列IDのどちらも返すため、両方を受け付けます。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{}", n),
            EntityId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<i64>() {
            Ok(n) => EntityId::Number(n),
            Err(_) => EntityId::Text(trimmed.to_string()),
        })
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId::Number(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Text(value.to_string())
    }
}

/// エンティティの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Company,
    Domain,
    Question,
    Topic,
    DynamicTable,
    Database,
    Submission,
    User,
}

impl EntityKind {
    /// すべてのエンティティ種別
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Company,
        EntityKind::Domain,
        EntityKind::Question,
        EntityKind::Topic,
        EntityKind::DynamicTable,
        EntityKind::Database,
        EntityKind::Submission,
        EntityKind::User,
    ];

    /// コレクション名（URLパスとCLI引数に使用）
    pub fn collection_name(&self) -> &'static str {
        match self {
            EntityKind::Company => "companies",
            EntityKind::Domain => "domains",
            EntityKind::Question => "questions",
            EntityKind::Topic => "topics",
            EntityKind::DynamicTable => "tables",
            EntityKind::Database => "databases",
            EntityKind::Submission => "submissions",
            EntityKind::User => "users",
        }
    }

    /// 単数形の表示名
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::Company => "company",
            EntityKind::Domain => "domain",
            EntityKind::Question => "question",
            EntityKind::Topic => "topic",
            EntityKind::DynamicTable => "table",
            EntityKind::Database => "database",
            EntityKind::Submission => "submission",
            EntityKind::User => "user",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.collection_name())
    }
}

impl FromStr for EntityKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        EntityKind::ALL
            .iter()
            .copied()
            .find(|kind| {
                kind.collection_name() == needle
                    || kind.display_name() == needle
                    || (needle == "dynamic_table" && *kind == EntityKind::DynamicTable)
            })
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown entity kind: {}. Please specify one of: {}.",
                    s,
                    EntityKind::ALL
                        .iter()
                        .map(|k| k.collection_name())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// 型付きエンティティレコードの共通インターフェース
pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    /// エンティティの種類
    const KIND: EntityKind;

    /// 安定したID
    fn id(&self) -> &EntityId;

    /// テキスト出力用の1行サマリー
    fn summary(&self) -> String;
}

/// 会社
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Company {
    const KIND: EntityKind = EntityKind::Company;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn summary(&self) -> String {
        match &self.website {
            Some(website) => format!("{} ({})", self.name, website),
            None => self.name.clone(),
        }
    }
}

/// ドメイン（問題の業界カテゴリ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Entity for Domain {
    const KIND: EntityKind = EntityKind::Domain;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn summary(&self) -> String {
        self.name.clone()
    }
}

/// 問題の難易度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
            Difficulty::Unknown => write!(f, "unknown"),
        }
    }
}

/// SQL練習問題
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub company_id: Option<EntityId>,
    #[serde(default)]
    pub topic_id: Option<EntityId>,
    #[serde(default)]
    pub domain_id: Option<EntityId>,
    #[serde(default)]
    pub database_id: Option<EntityId>,
    #[serde(default)]
    pub solution_query: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

impl Entity for Question {
    const KIND: EntityKind = EntityKind::Question;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn summary(&self) -> String {
        let difficulty = self
            .difficulty
            .map_or(String::new(), |d| format!(" [{}]", d));
        let status = self
            .status
            .as_ref()
            .map_or(String::new(), |s| format!(" ({})", s));
        format!("{}{}{}", self.title, difficulty, status)
    }
}

/// トピック
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub domain_id: Option<EntityId>,
}

impl Entity for Topic {
    const KIND: EntityKind = EntityKind::Topic;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn summary(&self) -> String {
        self.name.clone()
    }
}

/// 動的テーブル（練習用データベースのテーブル定義）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicTable {
    pub id: EntityId,
    pub table_name: String,
    #[serde(default)]
    pub database_id: Option<EntityId>,
    pub create_statement: String,
    #[serde(default)]
    pub insert_statement: Option<String>,
}

impl DynamicTable {
    /// ペイロード中のCREATE文フィールド名
    pub const CREATE_FIELD: &'static str = "create_statement";
    /// ペイロード中のINSERT文フィールド名
    pub const INSERT_FIELD: &'static str = "insert_statement";
}

impl Entity for DynamicTable {
    const KIND: EntityKind = EntityKind::DynamicTable;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn summary(&self) -> String {
        match &self.database_id {
            Some(db) => format!("{} (database {})", self.table_name, db),
            None => self.table_name.clone(),
        }
    }
}

/// 練習用データベース
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schema_image_url: Option<String>,
}

impl Entity for Database {
    const KIND: EntityKind = EntityKind::Database;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn summary(&self) -> String {
        self.name.clone()
    }
}

/// 解答の提出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: EntityId,
    pub user_id: EntityId,
    pub question_id: EntityId,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Entity for Submission {
    const KIND: EntityKind = EntityKind::Submission;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn summary(&self) -> String {
        format!(
            "user {} -> question {} ({})",
            self.user_id,
            self.question_id,
            self.status.as_deref().unwrap_or("pending")
        )
    }
}

/// ユーザーアカウント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn summary(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_accepts_number_and_string() {
        let numeric: EntityId = serde_json::from_str("42").unwrap();
        assert_eq!(numeric, EntityId::Number(42));

        let text: EntityId = serde_json::from_str("\"c0ffee\"").unwrap();
        assert_eq!(text, EntityId::Text("c0ffee".to_string()));
    }

    #[test]
    fn test_entity_id_from_str() {
        assert_eq!("7".parse::<EntityId>().unwrap(), EntityId::Number(7));
        assert_eq!(
            "abc-1".parse::<EntityId>().unwrap(),
            EntityId::Text("abc-1".to_string())
        );
    }

    #[test]
    fn test_entity_kind_from_str() {
        assert_eq!("companies".parse::<EntityKind>().unwrap(), EntityKind::Company);
        assert_eq!("Company".parse::<EntityKind>().unwrap(), EntityKind::Company);
        assert_eq!("tables".parse::<EntityKind>().unwrap(), EntityKind::DynamicTable);
        assert_eq!(
            "dynamic_table".parse::<EntityKind>().unwrap(),
            EntityKind::DynamicTable
        );
        assert!("widgets".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_question_tolerates_unknown_difficulty() {
        let question: Question = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Top customers",
            "difficulty": "expert"
        }))
        .unwrap();

        assert_eq!(question.difficulty, Some(Difficulty::Unknown));
        assert_eq!(question.summary(), "Top customers [unknown]");
    }

    #[test]
    fn test_user_summary() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "u-1",
            "email": "ada@example.com",
            "name": "Ada"
        }))
        .unwrap();

        assert_eq!(user.summary(), "Ada <ada@example.com>");
        assert_eq!(user.id(), &EntityId::Text("u-1".to_string()));
    }
}
