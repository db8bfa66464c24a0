// CSVエクスポートサービス
//
// 期間（直近7日、直近30日、全期間）と出力フィールドを指定して、
// バックエンドが生成したCSVをバイナリとして取得します。

use crate::adapters::api_client::{ApiClient, ApiRequest, ResponseType};
use crate::adapters::credentials::CredentialProvider;
use crate::core::entity::EntityKind;
use crate::core::error::ApiError;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// エクスポート期間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportRange {
    Last7Days,
    Last30Days,
    #[default]
    All,
}

impl ExportRange {
    /// クエリパラメータの値
    pub fn as_param(&self) -> &'static str {
        match self {
            ExportRange::Last7Days => "7",
            ExportRange::Last30Days => "30",
            ExportRange::All => "all",
        }
    }
}

impl fmt::Display for ExportRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_param())
    }
}

impl FromStr for ExportRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "7" => Ok(ExportRange::Last7Days),
            "30" => Ok(ExportRange::Last30Days),
            "all" => Ok(ExportRange::All),
            other => Err(anyhow::anyhow!(
                "Unsupported export range: {}. Please specify one of: 7, 30, all.",
                other
            )),
        }
    }
}

/// エクスポート要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExportRequest {
    pub path: String,
    pub range: ExportRange,
    pub fields: Vec<String>,
}

impl CsvExportRequest {
    /// APIリクエストに変換
    ///
    /// `fields` は同じキーを繰り返して送ります。
    pub fn to_api_request(&self) -> ApiRequest {
        let mut query = vec![("range".to_string(), self.range.as_param().to_string())];
        query.extend(
            self.fields
                .iter()
                .map(|f| f.trim())
                .filter(|f| !f.is_empty())
                .map(|f| ("fields".to_string(), f.to_string())),
        );

        ApiRequest::get(self.path.clone())
            .with_query(query)
            .with_response_type(ResponseType::Blob)
    }
}

/// CSVエクスポートサービス
pub struct CsvExportService {
    client: Arc<dyn ApiClient>,
    credentials: Arc<dyn CredentialProvider>,
}

impl CsvExportService {
    pub fn new(client: Arc<dyn ApiClient>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// CSVをダウンロード
    pub async fn download(&self, request: &CsvExportRequest) -> Result<Vec<u8>, ApiError> {
        debug!(path = %request.path, range = %request.range, "csv export requested");
        let response = self
            .client
            .request(request.to_api_request(), self.credentials.as_ref())
            .await?;
        Ok(response.into_bytes())
    }

    /// 既定の出力ファイル名（`users_30_20260115T093000.csv` など）
    pub fn default_file_name(kind: EntityKind, range: ExportRange, now: DateTime<Utc>) -> String {
        format!(
            "{}_{}_{}.csv",
            kind.collection_name(),
            range.as_param(),
            now.format("%Y%m%dT%H%M%S")
        )
    }
}
