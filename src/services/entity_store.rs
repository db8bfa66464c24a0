// エンティティストアサービス
//
// エンティティ種別ごとに1つ作成する汎用のCRUDライフサイクル。
// すべての操作は pending → fulfilled | rejected の順で CollectionState に反映されます。
//
// 状態は短時間だけロックするMutexの内側にあり、`.await` をまたいで保持しません。
// そのため複数のリクエストを同時に発行でき、キャンセル機構はありません。
// 一覧取得は既定では後着優先で、`discard_stale_responses` を有効にすると
// 最後に発行した一覧リクエスト以外のレスポンスを破棄します。

use crate::adapters::api_client::{ApiClient, ApiRequest, Payload, ResponseType};
use crate::adapters::credentials::CredentialProvider;
use crate::adapters::query_string::build_query_pairs;
use crate::core::collection::{
    ApplyOutcome, CollectionState, CollectionStatus, Filters, LifecycleEvent,
};
use crate::core::entity::{Entity, EntityId};
use crate::core::error::{ApiError, StoreError};
use crate::services::endpoints::{Endpoints, ResponseShape};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// 送信前のペイロード検証（拒否時はメッセージを返す）
pub type PayloadGuard = Arc<dyn Fn(&Payload) -> Result<(), String> + Send + Sync>;

/// 汎用エンティティストア
pub struct EntityStore<E: Entity> {
    client: Arc<dyn ApiClient>,
    credentials: Arc<dyn CredentialProvider>,
    endpoints: Endpoints,
    shape: ResponseShape,
    default_filters: Filters,
    discard_stale: bool,
    guard: Option<PayloadGuard>,
    state: Arc<Mutex<CollectionState<E>>>,
    list_generation: Arc<AtomicU64>,
}

impl<E: Entity> Clone for EntityStore<E> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            credentials: Arc::clone(&self.credentials),
            endpoints: self.endpoints.clone(),
            shape: self.shape.clone(),
            default_filters: self.default_filters.clone(),
            discard_stale: self.discard_stale,
            guard: self.guard.clone(),
            state: Arc::clone(&self.state),
            list_generation: Arc::clone(&self.list_generation),
        }
    }
}

impl<E: Entity> std::fmt::Debug for EntityStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("kind", &E::KIND)
            .field("endpoints", &self.endpoints)
            .field("discard_stale", &self.discard_stale)
            .finish()
    }
}

impl<E: Entity> EntityStore<E> {
    /// 既定のエンドポイントとレスポンス形状で作成
    pub fn new(client: Arc<dyn ApiClient>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client,
            credentials,
            endpoints: Endpoints::for_kind(E::KIND),
            shape: ResponseShape::for_kind(E::KIND),
            default_filters: Filters::new(),
            discard_stale: false,
            guard: None,
            state: Arc::new(Mutex::new(CollectionState::default())),
            list_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// エンドポイントを差し替える
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// レスポンス形状を差し替える
    pub fn with_response_shape(mut self, shape: ResponseShape) -> Self {
        self.shape = shape;
        self
    }

    /// 既定のフィルターを設定（現在のフィルターもリセットされる）
    pub fn with_default_filters(mut self, filters: Filters) -> Self {
        self.default_filters = filters.clone();
        self.with_state(|state| state.filters = filters);
        self
    }

    /// 古い一覧レスポンスを破棄するかどうか
    pub fn discard_stale_responses(mut self, enabled: bool) -> Self {
        self.discard_stale = enabled;
        self
    }

    /// 送信前のペイロード検証を設定
    pub fn with_payload_guard(mut self, guard: PayloadGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// エンドポイント
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// 現在の状態のスナップショット
    pub fn snapshot(&self) -> CollectionState<E> {
        self.with_state(|state| state.clone())
    }

    /// 現在のレコード
    pub fn items(&self) -> Vec<E> {
        self.with_state(|state| state.items.clone())
    }

    /// 現在の読み込み状態
    pub fn status(&self) -> CollectionStatus {
        self.with_state(|state| state.status)
    }

    /// 直前の失敗メッセージ
    pub fn error(&self) -> Option<String> {
        self.with_state(|state| state.error.clone())
    }

    /// 現在のフィルター
    pub fn filters(&self) -> Filters {
        self.with_state(|state| state.filters.clone())
    }

    /// IDでレコードを検索
    pub fn find(&self, id: &EntityId) -> Option<E> {
        self.with_state(|state| state.find(id).cloned())
    }

    /// フィルターを部分的に更新（再取得は行わない）
    pub fn set_filters(&self, partial: Filters) {
        self.with_state(|state| state.filters.merge(partial));
    }

    /// フィルターを既定値に戻す（再取得は行わない）
    pub fn clear_filters(&self) {
        let defaults = self.default_filters.clone();
        self.with_state(|state| state.filters = defaults);
    }

    /// 指定フィールドで並べ替え
    pub fn sort_by(&self, field: &str) {
        self.with_state(|state| state.sort_by_field(field));
    }

    /// 現在のフィルターで一覧を再取得
    pub async fn refresh(&self) -> Result<Vec<E>, StoreError> {
        let filters = self.filters();
        self.list(&filters).await
    }

    /// 一覧を取得
    ///
    /// 成功時は `items` をサーバーの順序のまま置き換え、失敗時は `items` を変更しません。
    pub async fn list(&self, filters: &Filters) -> Result<Vec<E>, StoreError> {
        let generation = self.list_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.dispatch(LifecycleEvent::Pending);

        let request =
            ApiRequest::get(self.endpoints.collection_path()).with_query(build_query_pairs(filters));
        debug!(kind = %E::KIND, generation, "list requested");

        let result = self.send_for_list(request).await;

        if self.discard_stale && self.list_generation.load(Ordering::SeqCst) != generation {
            warn!(
                kind = %E::KIND,
                generation,
                "discarding stale list response"
            );
            return result.map_err(StoreError::from);
        }

        match result {
            Ok(items) => {
                debug!(kind = %E::KIND, generation, count = items.len(), "list fulfilled");
                self.dispatch(LifecycleEvent::Listed(items.clone()));
                Ok(items)
            }
            Err(error) => Err(self.reject(error)),
        }
    }

    /// レコードを作成
    ///
    /// サーバーが返した正規のレコード（IDを含む）を `items` の末尾に追加します。
    pub async fn create(&self, payload: Payload) -> Result<E, StoreError> {
        self.check_payload(&payload)?;
        self.dispatch(LifecycleEvent::Pending);

        let request = ApiRequest::post(self.endpoints.collection_path(), payload);
        debug!(kind = %E::KIND, "create requested");

        match self.send_for_item(request).await {
            Ok(record) => {
                debug!(kind = %E::KIND, id = %record.id(), "create fulfilled");
                self.dispatch(LifecycleEvent::Created(record.clone()));
                Ok(record)
            }
            Err(error) => Err(self.reject(error)),
        }
    }

    /// レコードを更新
    ///
    /// 一致するIDのレコードを同じ位置で置き換えます。
    /// 一致するレコードがなければ表示中のコレクションには反映せず、警告を記録します。
    pub async fn update(&self, id: &EntityId, payload: Payload) -> Result<E, StoreError> {
        self.check_payload(&payload)?;
        self.dispatch(LifecycleEvent::Pending);

        let request = ApiRequest::put(self.endpoints.item_path(id), payload);
        debug!(kind = %E::KIND, %id, "update requested");

        match self.send_for_item(request).await {
            Ok(record) => {
                let outcome = self.dispatch(LifecycleEvent::Updated(id.clone(), record.clone()));
                if outcome == ApplyOutcome::UpdateTargetMissing {
                    warn!(
                        kind = %E::KIND,
                        %id,
                        "updated record is not in the loaded collection; dropping it from view"
                    );
                }
                Ok(record)
            }
            Err(error) => Err(self.reject(error)),
        }
    }

    /// レコードを削除
    pub async fn delete(&self, id: &EntityId) -> Result<(), StoreError> {
        self.dispatch(LifecycleEvent::Pending);

        // 削除のレスポンスボディは使わない
        let request =
            ApiRequest::delete(self.endpoints.item_path(id)).with_response_type(ResponseType::Blob);
        debug!(kind = %E::KIND, %id, "delete requested");

        match self.client.request(request, self.credentials.as_ref()).await {
            Ok(_) => {
                self.dispatch(LifecycleEvent::Deleted(id.clone()));
                Ok(())
            }
            Err(error) => Err(self.reject(error)),
        }
    }

    fn check_payload(&self, payload: &Payload) -> Result<(), StoreError> {
        if let Some(guard) = &self.guard {
            guard(payload).map_err(|message| {
                debug!(kind = %E::KIND, %message, "payload rejected before submission");
                StoreError::Rejected { message }
            })?;
        }
        Ok(())
    }

    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.client
            .request(request, self.credentials.as_ref())
            .await?
            .into_json()
    }

    async fn send_for_list(&self, request: ApiRequest) -> Result<Vec<E>, ApiError> {
        let body = self.send(request).await?;
        let list = self.shape.extract_list(body)?;
        decode::<Vec<E>>(list)
    }

    async fn send_for_item(&self, request: ApiRequest) -> Result<E, ApiError> {
        let body = self.send(request).await?;
        let item = self.shape.extract_item(body)?;
        decode::<E>(item)
    }

    fn reject(&self, error: ApiError) -> StoreError {
        debug!(kind = %E::KIND, %error, "request rejected");
        self.dispatch(LifecycleEvent::Rejected(error.user_message()));
        StoreError::Api(error)
    }

    fn dispatch(&self, event: LifecycleEvent<E>) -> ApplyOutcome {
        self.with_state(|state| state.apply(event))
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut CollectionState<E>) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::MalformedBody {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::api_client::ApiResponse;
    use crate::adapters::credentials::StaticToken;
    use crate::core::entity::Topic;
    use async_trait::async_trait;
    use serde_json::json;

    /// 常に同じレスポンスを返すクライアント
    struct FixedClient(Result<ApiResponse, ApiError>);

    #[async_trait]
    impl ApiClient for FixedClient {
        async fn request(
            &self,
            _request: ApiRequest,
            _credentials: &dyn CredentialProvider,
        ) -> Result<ApiResponse, ApiError> {
            self.0.clone()
        }
    }

    fn store(response: Result<ApiResponse, ApiError>) -> EntityStore<Topic> {
        EntityStore::new(
            Arc::new(FixedClient(response)),
            Arc::new(StaticToken::new("token")),
        )
    }

    #[test]
    fn test_new_store_is_idle() {
        let store = store(Ok(ApiResponse::Json(json!([]))));
        assert_eq!(store.status(), CollectionStatus::Idle);
        assert_eq!(store.endpoints().collection_path(), "/topics");
        assert!(format!("{:?}", store).contains("Topic"));
    }

    #[test]
    fn test_list_decodes_wrapped_response() {
        let store = store(Ok(ApiResponse::Json(
            json!({"data": [{"id": 1, "name": "Joins"}, {"id": 2, "name": "Window functions"}]}),
        )));

        let items = tokio_test::block_on(store.list(&Filters::new())).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(store.status(), CollectionStatus::Loaded);
        assert_eq!(store.items()[1].name, "Window functions");
    }

    #[test]
    fn test_malformed_record_is_rejected() {
        let store = store(Ok(ApiResponse::Json(json!([{"id": 1}]))));

        let error = tokio_test::block_on(store.list(&Filters::new())).unwrap_err();

        assert!(error.is_api());
        assert_eq!(store.status(), CollectionStatus::Failed);
        assert!(store.error().is_some());
        assert!(store.items().is_empty());
    }

    #[test]
    fn test_guard_blocks_without_touching_state() {
        let guard: PayloadGuard = Arc::new(|_| Err("not allowed".to_string()));
        let store = store(Ok(ApiResponse::Json(json!({"id": 1, "name": "x"}))))
            .with_payload_guard(guard);

        let error =
            tokio_test::block_on(store.create(Payload::Json(json!({"name": "x"})))).unwrap_err();

        assert!(error.is_rejected());
        assert_eq!(error.user_message(), "not allowed");
        assert_eq!(store.status(), CollectionStatus::Idle);
        assert!(store.items().is_empty());
    }

    #[test]
    fn test_filters_set_and_clear() {
        let store = store(Ok(ApiResponse::Json(json!([]))))
            .with_default_filters(Filters::new().with("status", "active"));

        store.set_filters(Filters::new().with("search", "join"));
        assert_eq!(store.filters().len(), 2);

        store.set_filters(Filters::new().with("status", "archived"));
        assert_eq!(store.filters().get("status"), Some(&json!("archived")));

        store.clear_filters();
        assert_eq!(store.filters(), Filters::new().with("status", "active"));
        assert_eq!(store.status(), CollectionStatus::Idle);
    }
}
