// クエリパラメータビルダー
//
// Filters からクエリ文字列のパラメータ列を生成する。
// 値が空（null、空文字列、空配列）のフィルターは送信しない。

use crate::core::collection::Filters;
use serde_json::Value;

/// フィルターをクエリパラメータに変換
///
/// 配列値は同じキーを繰り返して送信します（`fields=a&fields=b`）。
pub fn build_query_pairs(filters: &Filters) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (name, value) in filters.iter() {
        match value {
            Value::Array(values) => {
                for item in values {
                    if let Some(text) = scalar_to_string(item) {
                        pairs.push((name.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar_to_string(other) {
                    pairs.push((name.clone(), text));
                }
            }
        }
    }
    pairs
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        // 入れ子のオブジェクト・配列はJSON文字列として送る
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
