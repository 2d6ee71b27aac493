use crate::catalog::{Catalog, Dimension, Measure};
use crate::client::{ClientError, CubeApi};
use crate::config::SelectionConfig;
use crate::query::{Query, ResultSet};
use crate::selection::{MemberGroup, SelectionState};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};

pub const NO_SQL_GENERATED: &str = "No SQL generated";
pub const SQL_FETCH_FAILED: &str = "Error fetching SQL";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControllerError {
    #[error("Failed to load cube metadata: {0}")]
    CatalogLoad(#[source] ClientError),

    #[error("Query failed: {0}")]
    QueryExecution(#[source] ClientError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogStatus {
    NotLoaded,
    Loading,
    Loaded,
    Failed(ClientError),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SqlPreview {
    /// Nothing selected, no SQL was requested.
    #[default]
    Empty,
    Generated(String),
    NotGenerated,
    Failed,
}

impl SqlPreview {
    pub fn text(&self) -> &str {
        match self {
            SqlPreview::Empty => "",
            SqlPreview::Generated(sql) => sql,
            SqlPreview::NotGenerated => NO_SQL_GENERATED,
            SqlPreview::Failed => SQL_FETCH_FAILED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultView {
    #[default]
    Idle,
    Loading,
    Ready(ResultSet),
    Failed(String),
}

/// Value produced by the most recently issued request of one kind.
///
/// Every request takes a new generation when it is issued; a response whose
/// generation is no longer current is dropped.
#[derive(Debug, Default)]
struct Latest<T> {
    generation: u64,
    loading: bool,
    value: T,
}

impl<T: Clone> Latest<T> {
    fn issue(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.generation
    }

    fn settle(&mut self, value: T) {
        self.generation += 1;
        self.loading = false;
        self.value = value;
    }

    /// Stores `value` if `generation` is still current, returning what is stored afterwards.
    fn complete(&mut self, generation: u64, value: T) -> Option<T> {
        if generation != self.generation {
            return None;
        }
        self.loading = false;
        self.value = value;
        Some(self.value.clone())
    }
}

/// Consistent read of the controller for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSnapshot {
    pub catalog_status: CatalogStatus,
    pub cubes: Vec<String>,
    pub dimensions: Vec<String>,
    pub measures: Vec<String>,
    pub query: Query,
    pub relevant_dimensions: Vec<MemberGroup>,
    pub relevant_measures: Vec<MemberGroup>,
    pub sql_preview: SqlPreview,
    pub sql_loading: bool,
    pub result: ResultView,
}

/// Keeps cube, dimension and measure selections consistent with the catalog
/// and drives SQL preview and query execution through a [`CubeApi`].
///
/// Selection mutations are applied atomically under the state lock, which is
/// never held across a request. SQL previews and query results follow
/// last-request-wins: a response only lands if no newer request of the same
/// kind was issued after it.
pub struct SelectionController<C> {
    client: C,
    catalog: OnceCell<Arc<Catalog>>,
    catalog_status: Mutex<CatalogStatus>,
    /// Held for the whole metadata request, so only one is ever in flight.
    load_guard: Mutex<()>,
    load_attempts: AtomicU64,
    state: Mutex<SelectionState>,
    preview: Mutex<Latest<SqlPreview>>,
    results: Mutex<Latest<ResultView>>,
}

impl<C> SelectionController<C>
where
    C: CubeApi,
{
    pub fn new(client: C, config: SelectionConfig) -> Self {
        SelectionController {
            client,
            catalog: OnceCell::new(),
            catalog_status: Mutex::new(CatalogStatus::NotLoaded),
            load_guard: Mutex::new(()),
            load_attempts: AtomicU64::new(0),
            state: Mutex::new(SelectionState::new(config)),
            preview: Mutex::new(Latest::default()),
            results: Mutex::new(Latest::default()),
        }
    }

    /// The loaded catalog, or an empty one before a successful load.
    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.get().cloned().unwrap_or_default()
    }

    pub async fn catalog_status(&self) -> CatalogStatus {
        self.catalog_status.lock().await.clone()
    }

    /// Fetches the catalog once.
    ///
    /// Callers that arrive while a request is in flight wait for it and share
    /// its outcome. A failed load is not retried here; a later call starts a
    /// new attempt.
    pub async fn load_catalog(&self) -> Result<Arc<Catalog>, ControllerError> {
        if let Some(catalog) = self.catalog.get() {
            return Ok(catalog.clone());
        }

        let observed = self.load_attempts.load(Ordering::Acquire);
        let _guard = self.load_guard.lock().await;

        if let Some(catalog) = self.catalog.get() {
            return Ok(catalog.clone());
        }
        if self.load_attempts.load(Ordering::Acquire) != observed {
            if let CatalogStatus::Failed(e) = self.catalog_status().await {
                debug!("Sharing failure of concurrent metadata request");
                return Err(ControllerError::CatalogLoad(e));
            }
        }

        *self.catalog_status.lock().await = CatalogStatus::Loading;
        info!("Fetching cube metadata");

        let outcome = self.client.meta().await;
        self.load_attempts.fetch_add(1, Ordering::AcqRel);

        match outcome {
            Ok(meta) => {
                let catalog = Arc::new(Catalog::from_meta(meta));
                info!(
                    "Loaded {} dimensions and {} measures from {} cubes",
                    catalog.dimensions().count(),
                    catalog.measures().count(),
                    catalog.cubes().len()
                );
                let catalog = self.catalog.get_or_init(|| async { catalog }).await.clone();
                *self.catalog_status.lock().await = CatalogStatus::Loaded;
                Ok(catalog)
            }
            Err(e) => {
                error!("Failed to fetch cube metadata: {}", e);
                *self.catalog_status.lock().await = CatalogStatus::Failed(e.clone());
                Err(ControllerError::CatalogLoad(e))
            }
        }
    }

    pub async fn toggle_cube(&self, name: &str, included: bool) -> SqlPreview {
        let catalog = self.catalog();
        if catalog.get_cube(name).is_none() {
            warn!("Cube {} is not in the catalog", name);
        }
        {
            let mut state = self.state.lock().await;
            state.toggle_cube(&catalog, name, included);
            self.clear_results().await;
        }
        debug!("Cube {} {}", name, if included { "selected" } else { "deselected" });
        self.refresh_sql_preview().await
    }

    pub async fn toggle_dimension(&self, name: &str, included: bool) -> SqlPreview {
        {
            let mut state = self.state.lock().await;
            state.toggle_dimension(name, included);
            self.clear_results().await;
        }
        debug!("Dimension {} {}", name, if included { "selected" } else { "deselected" });
        self.refresh_sql_preview().await
    }

    pub async fn toggle_measure(&self, name: &str, included: bool) -> SqlPreview {
        {
            let mut state = self.state.lock().await;
            state.toggle_measure(name, included);
            self.clear_results().await;
        }
        debug!("Measure {} {}", name, if included { "selected" } else { "deselected" });
        self.refresh_sql_preview().await
    }

    /// Clears every selection. The SQL preview and result view return to empty.
    pub async fn reset(&self) -> SqlPreview {
        {
            let mut state = self.state.lock().await;
            state.reset();
            self.clear_results().await;
        }
        debug!("Selection reset");
        self.refresh_sql_preview().await
    }

    /// Drops the result view of a superseded query, including one still in
    /// flight. Called with the state lock held.
    async fn clear_results(&self) {
        self.results.lock().await.settle(ResultView::Idle);
    }

    pub async fn derived_query(&self) -> Query {
        self.state.lock().await.query()
    }

    pub async fn relevant_dimensions(&self) -> Vec<Dimension> {
        let catalog = self.catalog();
        let state = self.state.lock().await;
        state
            .relevant_dimensions(&catalog)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn relevant_measures(&self) -> Vec<Measure> {
        let catalog = self.catalog();
        let state = self.state.lock().await;
        state.relevant_measures(&catalog).into_iter().cloned().collect()
    }

    pub async fn grouped_dimensions(&self) -> Vec<MemberGroup> {
        let catalog = self.catalog();
        self.state.lock().await.grouped_dimensions(&catalog)
    }

    pub async fn grouped_measures(&self) -> Vec<MemberGroup> {
        let catalog = self.catalog();
        self.state.lock().await.grouped_measures(&catalog)
    }

    pub async fn sql_preview(&self) -> SqlPreview {
        self.preview.lock().await.value.clone()
    }

    pub async fn result_view(&self) -> ResultView {
        self.results.lock().await.value.clone()
    }

    /// Requests SQL for `query` without touching controller state.
    pub async fn fetch_sql_preview(&self, query: &Query) -> SqlPreview {
        if query.is_empty() {
            return SqlPreview::Empty;
        }
        match self.client.sql(query).await {
            Ok(Some(sql)) => SqlPreview::Generated(sql),
            Ok(None) => SqlPreview::NotGenerated,
            Err(e) => {
                error!("Failed to fetch SQL: {}", e);
                SqlPreview::Failed
            }
        }
    }

    /// Regenerates the SQL preview for the current selection.
    ///
    /// Returns the preview held once this request settles, which is a newer
    /// request's preview if this one was superseded.
    pub async fn refresh_sql_preview(&self) -> SqlPreview {
        let (generation, query) = {
            let state = self.state.lock().await;
            let query = state.query();
            let mut preview = self.preview.lock().await;
            if query.is_empty() {
                preview.settle(SqlPreview::Empty);
                return SqlPreview::Empty;
            }
            (preview.issue(), query)
        };

        let outcome = self.fetch_sql_preview(&query).await;

        let mut preview = self.preview.lock().await;
        match preview.complete(generation, outcome) {
            Some(applied) => applied,
            None => {
                debug!("Discarding SQL preview of superseded request {}", generation);
                preview.value.clone()
            }
        }
    }

    /// Runs the current query. An empty selection leaves the view idle
    /// without a request.
    pub async fn execute_query(&self) -> Result<ResultView, ControllerError> {
        let (generation, query) = {
            let state = self.state.lock().await;
            let query = state.query();
            let mut results = self.results.lock().await;
            if query.is_empty() {
                results.settle(ResultView::Idle);
                return Ok(ResultView::Idle);
            }
            let generation = results.issue();
            results.value = ResultView::Loading;
            (generation, query)
        };

        info!(
            "Executing query with {} measures and {} dimensions",
            query.measures.len(),
            query.dimensions.len()
        );
        let outcome = self.client.load(&query).await;

        let mut results = self.results.lock().await;
        match outcome {
            Ok(response) => {
                let view = ResultView::Ready(ResultSet::new(query, response));
                match results.complete(generation, view) {
                    Some(applied) => Ok(applied),
                    None => {
                        debug!("Discarding result of superseded query {}", generation);
                        Ok(results.value.clone())
                    }
                }
            }
            Err(e) => {
                error!("Query failed: {}", e);
                match results.complete(generation, ResultView::Failed(e.to_string())) {
                    Some(_) => Err(ControllerError::QueryExecution(e)),
                    None => Ok(results.value.clone()),
                }
            }
        }
    }

    /// Regenerates the SQL preview and runs the query concurrently.
    pub async fn refresh(&self) -> (SqlPreview, Result<ResultView, ControllerError>) {
        futures::join!(self.refresh_sql_preview(), self.execute_query())
    }

    pub async fn snapshot(&self) -> SelectionSnapshot {
        let catalog = self.catalog();
        let catalog_status = self.catalog_status().await;
        let state = self.state.lock().await;
        let preview = self.preview.lock().await;
        let results = self.results.lock().await;

        SelectionSnapshot {
            catalog_status,
            cubes: state.cubes().to_vec(),
            dimensions: state.dimensions().to_vec(),
            measures: state.measures().to_vec(),
            query: state.query(),
            relevant_dimensions: state.grouped_dimensions(&catalog),
            relevant_measures: state.grouped_measures(&catalog),
            sql_preview: preview.value.clone(),
            sql_loading: preview.loading,
            result: results.value.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catalog::MetaResponse;
    use crate::client::LocalCubeApi;
    use crate::query::LoadResponse;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::oneshot;

    /// Requests that wait until the test answers them.
    struct Gate<T> {
        calls: AtomicUsize,
        pending: std::sync::Mutex<Vec<(Option<Query>, oneshot::Sender<T>)>>,
    }

    impl<T> Default for Gate<T> {
        fn default() -> Self {
            Gate {
                calls: AtomicUsize::new(0),
                pending: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    impl<T> Gate<T> {
        async fn wait(&self, query: Option<&Query>) -> T {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (tx, rx) = oneshot::channel();
            self.pending.lock().unwrap().push((query.cloned(), tx));
            rx.await.unwrap()
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn wait_for_pending(&self, count: usize) {
            while self.pending.lock().unwrap().len() < count {
                tokio::task::yield_now().await;
            }
        }

        /// Answers the `idx`-th still pending request, returning its query.
        fn answer(&self, idx: usize, value: T) -> Option<Query> {
            let (query, tx) = self.pending.lock().unwrap().remove(idx);
            let _ = tx.send(value);
            query
        }
    }

    #[derive(Default)]
    struct GatedCubeApi {
        meta: Gate<Result<MetaResponse, ClientError>>,
        sql: Gate<Result<Option<String>, ClientError>>,
        load: Gate<Result<LoadResponse, ClientError>>,
    }

    #[async_trait]
    impl CubeApi for GatedCubeApi {
        async fn meta(&self) -> Result<MetaResponse, ClientError> {
            self.meta.wait(None).await
        }

        async fn sql(&self, query: &Query) -> Result<Option<String>, ClientError> {
            self.sql.wait(Some(query)).await
        }

        async fn load(&self, query: &Query) -> Result<LoadResponse, ClientError> {
            self.load.wait(Some(query)).await
        }
    }

    fn manual() -> SelectionConfig {
        SelectionConfig {
            auto_include_dimensions_on_cube_select: false,
        }
    }

    async fn mock_meta() -> MetaResponse {
        LocalCubeApi::mock().meta().await.unwrap()
    }

    async fn loaded(api: Arc<GatedCubeApi>) -> SelectionController<Arc<GatedCubeApi>> {
        let controller = SelectionController::new(api.clone(), manual());
        let meta = mock_meta().await;
        let (catalog, _) = tokio::join!(controller.load_catalog(), async {
            api.meta.wait_for_pending(1).await;
            api.meta.answer(0, Ok(meta));
        });
        catalog.unwrap();
        controller
    }

    #[test_log::test(tokio::test)]
    async fn concurrent_loads_share_one_request() {
        let api = Arc::new(GatedCubeApi::default());
        let controller = SelectionController::new(api.clone(), manual());
        let meta = mock_meta().await;

        let (first, second, _) = tokio::join!(controller.load_catalog(), controller.load_catalog(), async {
            api.meta.wait_for_pending(1).await;
            // give the second caller a chance to issue a duplicate
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            api.meta.answer(0, Ok(meta));
        });

        let (first, second) = (first.unwrap(), second.unwrap());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(api.meta.calls(), 1);
        assert_eq!(controller.catalog_status().await, CatalogStatus::Loaded);

        // later loads are served from the cache
        controller.load_catalog().await.unwrap();
        assert_eq!(api.meta.calls(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn failed_load_is_shared_then_retryable() {
        let api = Arc::new(GatedCubeApi::default());
        let controller = SelectionController::new(api.clone(), manual());
        let failure = ClientError::Network("connection refused".to_string());

        let (first, second, _) = tokio::join!(controller.load_catalog(), controller.load_catalog(), async {
            api.meta.wait_for_pending(1).await;
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            api.meta.answer(0, Err(failure.clone()));
        });

        assert_eq!(first.unwrap_err(), ControllerError::CatalogLoad(failure.clone()));
        assert_eq!(second.unwrap_err(), ControllerError::CatalogLoad(failure.clone()));
        assert_eq!(api.meta.calls(), 1);
        assert_eq!(controller.catalog_status().await, CatalogStatus::Failed(failure));
        assert!(controller.catalog().is_empty());

        let meta = mock_meta().await;
        let (retry, _) = tokio::join!(controller.load_catalog(), async {
            api.meta.wait_for_pending(1).await;
            api.meta.answer(0, Ok(meta));
        });
        assert_eq!(retry.unwrap().cubes().len(), 2);
        assert_eq!(api.meta.calls(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn newer_sql_preview_wins_over_late_response() {
        let api = Arc::new(GatedCubeApi::default());
        let controller = loaded(api.clone()).await;

        let (a, b, _) = tokio::join!(
            controller.toggle_measure("Orders.count", true),
            controller.toggle_dimension("Orders.status", true),
            async {
                api.sql.wait_for_pending(2).await;
                let query_b = api.sql.answer(1, Ok(Some("SQL B".to_string()))).unwrap();
                assert_eq!(query_b.dimensions, ["Orders.status"]);
                for _ in 0..10 {
                    tokio::task::yield_now().await;
                }
                let query_a = api.sql.answer(0, Ok(Some("SQL A".to_string()))).unwrap();
                assert!(query_a.dimensions.is_empty());
            }
        );

        assert_eq!(b, SqlPreview::Generated("SQL B".to_string()));
        assert_eq!(a, SqlPreview::Generated("SQL B".to_string()));
        assert_eq!(controller.sql_preview().await.text(), "SQL B");
        assert!(!controller.snapshot().await.sql_loading);
    }

    #[test_log::test(tokio::test)]
    async fn empty_query_skips_request_and_supersedes_pending() {
        let api = Arc::new(GatedCubeApi::default());
        let controller = loaded(api.clone()).await;

        assert_eq!(controller.refresh_sql_preview().await, SqlPreview::Empty);
        assert_eq!(api.sql.calls(), 0);

        let (pending, reset) = tokio::join!(controller.toggle_measure("Orders.count", true), async {
            api.sql.wait_for_pending(1).await;
            let reset = controller.reset().await;
            api.sql.answer(0, Ok(Some("SQL A".to_string())));
            reset
        });

        assert_eq!(reset, SqlPreview::Empty);
        assert_eq!(pending, SqlPreview::Empty);
        assert_eq!(controller.sql_preview().await.text(), "");
        assert_eq!(api.sql.calls(), 1);
    }

    #[rstest::rstest]
    #[case::generated(Ok(Some("SELECT 1".to_string())), "SELECT 1")]
    #[case::nothing(Ok(None), NO_SQL_GENERATED)]
    #[case::failure(Err(ClientError::Network("timeout".to_string())), SQL_FETCH_FAILED)]
    #[tokio::test]
    async fn sql_preview_text(
        #[case] response: Result<Option<String>, ClientError>,
        #[case] expected: &str,
    ) {
        let api = Arc::new(GatedCubeApi::default());
        let controller = loaded(api.clone()).await;

        let (preview, _) = tokio::join!(controller.toggle_measure("Orders.count", true), async {
            api.sql.wait_for_pending(1).await;
            api.sql.answer(0, response);
        });
        assert_eq!(preview.text(), expected);
        assert_eq!(controller.snapshot().await.sql_preview.text(), expected);
    }

    #[test_log::test(tokio::test)]
    async fn deselecting_cube_prunes_and_requeries() {
        let controller = SelectionController::new(LocalCubeApi::mock(), SelectionConfig::default());
        controller.load_catalog().await.unwrap();

        controller.toggle_cube("Orders", true).await;
        controller.toggle_cube("Users", true).await;
        controller.toggle_measure("Orders.count", true).await;
        assert_eq!(controller.relevant_dimensions().await.len(), 5);

        let preview = controller.toggle_cube("Orders", false).await;
        assert_eq!(
            preview.text(),
            "SELECT Users.city, Users.gender FROM Users LIMIT 100"
        );
        let query = controller.derived_query().await;
        assert_eq!(query.dimensions, ["Users.city", "Users.gender"]);
        assert!(query.measures.is_empty());

        let groups = controller.grouped_measures().await;
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].cube_name, "Users");
        assert_eq!(controller.relevant_measures().await[0].name, "Users.count");
    }

    #[test_log::test(tokio::test)]
    async fn query_error_leaves_selection_untouched() {
        let controller = SelectionController::new(LocalCubeApi::mock(), manual());
        controller.load_catalog().await.unwrap();

        controller.toggle_measure("Orders.revenue", true).await;
        let before = controller.derived_query().await;

        let err = controller.execute_query().await.unwrap_err();
        assert_eq!(err.to_string(), "Query failed: Member 'Orders.revenue' not found");
        assert_eq!(
            controller.result_view().await,
            ResultView::Failed("Member 'Orders.revenue' not found".to_string())
        );
        assert_eq!(controller.derived_query().await, before);
        assert_eq!(controller.sql_preview().await, SqlPreview::NotGenerated);
    }

    #[test_log::test(tokio::test)]
    async fn newer_query_result_wins() {
        let api = Arc::new(GatedCubeApi::default());
        let controller = loaded(api.clone()).await;

        let setup = async {
            api.sql.wait_for_pending(1).await;
            api.sql.answer(0, Ok(None));
        };
        tokio::join!(controller.toggle_measure("Orders.count", true), setup);

        let (first, second, _) = tokio::join!(controller.execute_query(), controller.execute_query(), async {
            api.load.wait_for_pending(2).await;
            api.load.answer(1, Ok(LoadResponse::default()));
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            api.load.answer(0, Err(ClientError::Api("stale".to_string())));
        });

        assert!(matches!(second.unwrap(), ResultView::Ready(_)));
        assert!(matches!(first.unwrap(), ResultView::Ready(_)));
        assert!(matches!(controller.result_view().await, ResultView::Ready(_)));
    }

    #[test_log::test(tokio::test)]
    async fn selection_change_clears_result_view() {
        let controller = SelectionController::new(LocalCubeApi::mock(), manual());
        controller.load_catalog().await.unwrap();

        controller.toggle_measure("Orders.count", true).await;
        assert!(matches!(controller.execute_query().await.unwrap(), ResultView::Ready(_)));

        controller.toggle_measure("Users.count", true).await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.query.measures, ["Orders.count", "Users.count"]);
        assert_eq!(snapshot.result, ResultView::Idle);
    }

    #[test_log::test(tokio::test)]
    async fn selection_change_discards_running_query() {
        let api = Arc::new(GatedCubeApi::default());
        let controller = loaded(api.clone()).await;

        let (_, result, _) = tokio::join!(
            async {
                api.sql.wait_for_pending(1).await;
                api.sql.answer(0, Ok(None));
            },
            async {
                controller.toggle_measure("Orders.count", true).await;
                controller.execute_query().await
            },
            async {
                api.load.wait_for_pending(1).await;
                let toggled = async {
                    api.sql.wait_for_pending(1).await;
                    api.sql.answer(0, Ok(None));
                };
                tokio::join!(controller.toggle_dimension("Orders.status", true), toggled);
                api.load.answer(0, Ok(LoadResponse::default()));
            }
        );

        assert_eq!(result.unwrap(), ResultView::Idle);
        assert_eq!(controller.result_view().await, ResultView::Idle);
        assert_eq!(controller.derived_query().await.dimensions, ["Orders.status"]);
    }

    #[test_log::test(tokio::test)]
    async fn empty_selection_does_not_execute() {
        let api = Arc::new(GatedCubeApi::default());
        let controller = loaded(api.clone()).await;

        let (preview, result) = controller.refresh().await;
        assert_eq!(preview, SqlPreview::Empty);
        assert_eq!(result.unwrap(), ResultView::Idle);
        assert_eq!(api.load.calls(), 0);
        assert_eq!(api.sql.calls(), 0);
    }
}
