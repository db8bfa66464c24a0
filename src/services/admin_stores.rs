// 管理ストアレジストリ
//
// エンティティ種別ごとに EntityStore を1つずつ生成して保持します。
// 動的テーブルのストアには、送信前のSQLステートメント検証を組み込みます。

use crate::adapters::api_client::{ApiClient, Payload};
use crate::adapters::credentials::{provider_from_config, CredentialProvider};
use crate::adapters::http_client::ReqwestApiClient;
use crate::core::config::Config;
use crate::core::entity::{
    Company, Database, Domain, DynamicTable, Entity, Question, Submission, Topic, User,
};
use crate::services::endpoints::Endpoints;
use crate::services::entity_store::{EntityStore, PayloadGuard};
use crate::services::sql_statement_validator::SqlStatementValidatorService;
use anyhow::{Context, Result};
use std::sync::Arc;

/// エンティティ種別ごとのストア
#[derive(Debug, Clone)]
pub struct AdminStores {
    pub companies: EntityStore<Company>,
    pub domains: EntityStore<Domain>,
    pub questions: EntityStore<Question>,
    pub topics: EntityStore<Topic>,
    pub tables: EntityStore<DynamicTable>,
    pub databases: EntityStore<Database>,
    pub submissions: EntityStore<Submission>,
    pub users: EntityStore<User>,
}

impl AdminStores {
    /// クライアントと認証情報を指定して作成
    pub fn new(
        config: &Config,
        client: Arc<dyn ApiClient>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            companies: build_store(config, &client, &credentials),
            domains: build_store(config, &client, &credentials),
            questions: build_store(config, &client, &credentials),
            topics: build_store(config, &client, &credentials),
            tables: build_store(config, &client, &credentials)
                .with_payload_guard(sql_statement_guard()),
            databases: build_store(config, &client, &credentials),
            submissions: build_store(config, &client, &credentials),
            users: build_store(config, &client, &credentials),
        }
    }

    /// 設定からHTTPクライアントと認証情報を作成してストアを構築
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ReqwestApiClient::from_config(&config.api)
            .with_context(|| "Failed to initialize API client")?;
        let credentials = provider_from_config(&config.auth);
        Ok(Self::new(config, Arc::new(client), credentials))
    }
}

fn build_store<E: Entity>(
    config: &Config,
    client: &Arc<dyn ApiClient>,
    credentials: &Arc<dyn CredentialProvider>,
) -> EntityStore<E> {
    EntityStore::new(Arc::clone(client), Arc::clone(credentials))
        .with_endpoints(Endpoints::new(config.collection_path(E::KIND)))
        .discard_stale_responses(config.lifecycle.discard_stale_responses)
}

/// 動的テーブルのCREATE/INSERT文を送信前に検証するガード
pub fn sql_statement_guard() -> PayloadGuard {
    let validator = SqlStatementValidatorService::new();
    Arc::new(move |payload: &Payload| {
        match validator.validate_table_payload(&payload.attributes()) {
            Some(result) => match result.message() {
                Some(message) => Err(message),
                None => Ok(()),
            },
            None => Ok(()),
        }
    })
}
