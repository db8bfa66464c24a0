// コレクション状態
//
// エンティティ種別ごとのクライアント側キャッシュ（レコード、読み込み状態、
// エラー、フィルター）と、その状態遷移（pending → fulfilled | rejected）を
// 純粋なリデューサーとして定義します。

use crate::core::entity::{Entity, EntityId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// コレクションの読み込み状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    /// まだ一度も取得していない
    #[default]
    Idle,
    /// リクエスト送信中
    Loading,
    /// 直前の操作が成功
    Loaded,
    /// 直前の操作が失敗
    Failed,
}

/// 一覧取得用のフィルター
///
/// フィルター名から値へのマッピング。値が空（null、空文字列、空配列）の
/// エントリはクエリ文字列に含めません。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters(BTreeMap<String, Value>);

impl Filters {
    /// 空のフィルターを作成
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// 値を設定したフィルターを返す
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// 値を設定
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// 値を取得
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// 別のフィルターをマージ（同名キーは上書き）
    pub fn merge(&mut self, partial: Filters) {
        self.0.extend(partial.0);
    }

    /// エントリ数
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// エントリを列挙
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// `name=value` 形式の文字列からフィルターを構築
    pub fn parse_pairs<S: AsRef<str>>(pairs: &[S]) -> anyhow::Result<Self> {
        let mut filters = Filters::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair.split_once('=').ok_or_else(|| {
                anyhow::anyhow!("Invalid filter '{}'. Expected the form name=value.", pair)
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(anyhow::anyhow!("Filter name is empty in '{}'", pair));
            }
            filters.set(name, Value::String(value.trim().to_string()));
        }
        Ok(filters)
    }
}

impl FromIterator<(String, Value)> for Filters {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// リデューサーに渡すライフサイクルイベント
#[derive(Debug, Clone)]
pub enum LifecycleEvent<E> {
    /// リクエスト発行（pending）
    Pending,
    /// 一覧取得成功
    Listed(Vec<E>),
    /// 作成成功
    Created(E),
    /// 更新成功（対象ID、サーバーが返したレコード）
    Updated(EntityId, E),
    /// 削除成功
    Deleted(EntityId),
    /// 失敗（正規化済みメッセージ）
    Rejected(String),
}

/// イベント適用結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// 状態に反映された
    Applied,
    /// 更新対象が見つからず、表示中のコレクションには反映されなかった
    UpdateTargetMissing,
}

/// エンティティ種別ごとのコレクション状態
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionState<E> {
    /// サーバーのレスポンス順のレコード
    pub items: Vec<E>,
    /// 読み込み状態
    pub status: CollectionStatus,
    /// 直前の失敗メッセージ
    pub error: Option<String>,
    /// 現在のフィルター
    pub filters: Filters,
}

impl<E> Default for CollectionState<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: CollectionStatus::Idle,
            error: None,
            filters: Filters::new(),
        }
    }
}

impl<E: Entity> CollectionState<E> {
    /// 初期フィルター付きで作成
    pub fn with_filters(filters: Filters) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// IDでレコードを検索
    pub fn find(&self, id: &EntityId) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// 読み込み中かどうか
    pub fn is_loading(&self) -> bool {
        self.status == CollectionStatus::Loading
    }

    /// イベントを適用
    pub fn apply(&mut self, event: LifecycleEvent<E>) -> ApplyOutcome {
        match event {
            LifecycleEvent::Pending => {
                self.status = CollectionStatus::Loading;
                self.error = None;
            }
            LifecycleEvent::Listed(items) => {
                self.items = items;
                self.status = CollectionStatus::Loaded;
            }
            LifecycleEvent::Created(record) => {
                // 同じIDが既にあれば置き換え、IDが一度だけ現れるようにする
                match self.items.iter().position(|item| item.id() == record.id()) {
                    Some(index) => self.items[index] = record,
                    None => self.items.push(record),
                }
                self.status = CollectionStatus::Loaded;
            }
            LifecycleEvent::Updated(id, record) => {
                self.status = CollectionStatus::Loaded;
                match self.items.iter().position(|item| item.id() == &id) {
                    Some(index) => self.items[index] = record,
                    None => return ApplyOutcome::UpdateTargetMissing,
                }
            }
            LifecycleEvent::Deleted(id) => {
                self.items.retain(|item| item.id() != &id);
                self.status = CollectionStatus::Loaded;
            }
            LifecycleEvent::Rejected(message) => {
                self.status = CollectionStatus::Failed;
                self.error = Some(message);
            }
        }
        ApplyOutcome::Applied
    }

    /// フィールド値でレコードを並べ替え（呼び出し側が明示的に要求した場合のみ）
    ///
    /// 値を持たないレコードは末尾に並びます。並べ替えは安定です。
    pub fn sort_by_field(&mut self, field: &str) {
        let mut keyed: Vec<(Option<SortKey>, E)> = self
            .items
            .drain(..)
            .map(|item| {
                let key = serde_json::to_value(&item)
                    .ok()
                    .and_then(|v| v.get(field).cloned())
                    .and_then(SortKey::from_value);
                (key, item)
            })
            .collect();

        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => a.compare(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        self.items = keyed.into_iter().map(|(_, item)| item).collect();
    }
}

/// 並べ替えキー（数値は文字列より前）
#[derive(Debug, Clone, PartialEq, PartialOrd)]
enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(SortKey::Number),
            Value::String(s) => Some(SortKey::Text(s.to_lowercase())),
            Value::Bool(b) => Some(SortKey::Number(if b { 1.0 } else { 0.0 })),
            _ => None,
        }
    }

    fn compare(&self, other: &Self) -> std::cmp::Ordering {
        self.partial_cmp(other)
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}
