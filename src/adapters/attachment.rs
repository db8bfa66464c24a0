// 添付ファイルローダー
//
// ロゴ画像・スキーマ図・解説動画などの添付ファイルをメモリに読み込み、
// マルチパートのフィールドに変換する。ストリーミングや分割送信は行わない。

use crate::adapters::api_client::{FormField, FormValue};
use anyhow::{anyhow, Context, Result};
use std::path::Path;

/// `field=path` 形式の指定を分解
pub fn parse_attachment_spec(spec: &str) -> Result<(String, String)> {
    let (field, path) = spec.split_once('=').ok_or_else(|| {
        anyhow!(
            "Invalid attachment '{}'. Expected the form field=path.",
            spec
        )
    })?;
    let field = field.trim();
    let path = path.trim();
    if field.is_empty() || path.is_empty() {
        return Err(anyhow!(
            "Invalid attachment '{}'. Both field and path are required.",
            spec
        ));
    }
    Ok((field.to_string(), path.to_string()))
}

/// ファイルを読み込んでマルチパートのフィールドを作成
pub async fn load_attachment(field: &str, path: &Path) -> Result<FormField> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read attachment: {:?}", path))?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Attachment path has no file name: {:?}", path))?
        .to_string();

    Ok(FormField {
        name: field.to_string(),
        value: FormValue::File {
            content_type: content_type_for(path).to_string(),
            file_name,
            bytes,
        },
    })
}

/// 拡張子からContent-Typeを推定
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "csv" => "text/csv",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}
