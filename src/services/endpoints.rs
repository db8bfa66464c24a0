// エンドポイント定義とレスポンス形状
//
// エンティティ種別ごとのURLパスと、レスポンスボディからレコードを取り出す規則。
// バックエンドはコレクションを素の配列で返す場合と `{ "data": [...] }` のように
// 包んで返す場合があるため、候補キーを順に探します。

use crate::core::entity::EntityKind;
use crate::core::error::ApiError;
use serde_json::Value;

/// エンティティ種別のエンドポイント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    collection: String,
}

impl Endpoints {
    /// コレクションパスを指定して作成
    pub fn new(collection: impl Into<String>) -> Self {
        let collection = collection.into();
        Self {
            collection: collection.trim_end_matches('/').to_string(),
        }
    }

    /// 既定のエンドポイント（`/companies` など）
    pub fn for_kind(kind: EntityKind) -> Self {
        Self::new(format!("/{}", kind.collection_name()))
    }

    /// 一覧・作成用のパス
    pub fn collection_path(&self) -> &str {
        &self.collection
    }

    /// 個別レコード（更新・削除）用のパス
    pub fn item_path(&self, id: &impl std::fmt::Display) -> String {
        format!("{}/{}", self.collection, id)
    }

    /// CSVエクスポート用のパス
    pub fn export_path(&self) -> String {
        format!("{}/export", self.collection)
    }
}

/// レスポンスボディの形状
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseShape {
    list_keys: Vec<String>,
    item_keys: Vec<String>,
}

impl ResponseShape {
    /// 候補キーを指定して作成
    pub fn new(list_keys: Vec<String>, item_keys: Vec<String>) -> Self {
        Self {
            list_keys,
            item_keys,
        }
    }

    /// 既定の形状（`data`、コレクション名、単数形名を順に探す）
    pub fn for_kind(kind: EntityKind) -> Self {
        Self::new(
            vec![
                "data".to_string(),
                kind.collection_name().to_string(),
                "items".to_string(),
                "results".to_string(),
            ],
            vec!["data".to_string(), kind.display_name().to_string()],
        )
    }

    /// 一覧レスポンスから配列を取り出す
    pub fn extract_list(&self, body: Value) -> Result<Value, ApiError> {
        match body {
            Value::Array(_) => Ok(body),
            Value::Object(mut object) => {
                for key in &self.list_keys {
                    if matches!(object.get(key), Some(Value::Array(_))) {
                        if let Some(list) = object.remove(key) {
                            return Ok(list);
                        }
                    }
                }
                Err(ApiError::MalformedBody {
                    message: format!(
                        "expected an array or one of the keys [{}]",
                        self.list_keys.join(", ")
                    ),
                })
            }
            other => Err(ApiError::MalformedBody {
                message: format!("expected an array, got {}", type_name(&other)),
            }),
        }
    }

    /// 単一レコードのレスポンスからオブジェクトを取り出す
    pub fn extract_item(&self, body: Value) -> Result<Value, ApiError> {
        match body {
            Value::Object(mut object) => {
                for key in &self.item_keys {
                    if matches!(object.get(key), Some(Value::Object(_))) {
                        if let Some(item) = object.remove(key) {
                            return Ok(item);
                        }
                    }
                }
                Ok(Value::Object(object))
            }
            other => Err(ApiError::MalformedBody {
                message: format!("expected an object, got {}", type_name(&other)),
            }),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
