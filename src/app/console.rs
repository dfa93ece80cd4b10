use crate::app::views::{render_client_index, render_rule_settings, OutputFormat};
use crate::core::export::DownloadArtifact;
use crate::core::loader::{ClientListController, ClientListState, LoadOutcome, DEFAULT_PAGE_SIZE};
use crate::core::routes::Route;
use crate::core::settings::{RuleSettingsController, RuleSettingsState, LOAD_RULES_ERROR};
use crate::domain::model::{CodeList, SortOrder};
use crate::domain::ports::{ClientDirectory, RuleSource, Storage};
use crate::utils::error::{ConsoleError, Result};
use crate::utils::validation::validate_non_empty_string;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ClientsQuery {
    pub page_size: usize,
    /// `None` 代表一路載入到最後一頁
    pub max_pages: Option<usize>,
    pub sort: SortOrder,
    /// 使用者要求的重試次數
    pub retries: usize,
}

impl Default for ClientsQuery {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: Some(1),
            sort: SortOrder::Ascending,
            retries: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RulesQuery {
    pub search: Option<String>,
    pub retries: usize,
}

/// A page after loading, before rendering.
#[derive(Debug)]
pub enum LoadedPage {
    ClientIndex(ClientListState),
    ClientSettings(RuleSettingsState),
}

impl LoadedPage {
    pub fn error(&self) -> Option<&str> {
        match self {
            LoadedPage::ClientIndex(state) => state.error(),
            LoadedPage::ClientSettings(state) => state.error(),
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match self {
            LoadedPage::ClientIndex(state) => render_client_index(state, format),
            LoadedPage::ClientSettings(state) => render_rule_settings(state, format),
        }
    }

    /// 停在錯誤畫面時，對應的可重試錯誤
    pub fn failure(&self) -> Option<ConsoleError> {
        self.error().map(|message| ConsoleError::SourceUnavailable {
            message: message.to_string(),
        })
    }
}

/// Ties the data source, storage and views together.
pub struct RuleConsole<B, S>
where
    B: ClientDirectory + RuleSource + 'static,
    S: Storage,
{
    backend: Arc<B>,
    storage: S,
}

impl<B, S> RuleConsole<B, S>
where
    B: ClientDirectory + RuleSource + 'static,
    S: Storage,
{
    pub fn new(backend: B, storage: S) -> Self {
        Self {
            backend: Arc::new(backend),
            storage,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Loads the client index the way scrolling would: the first page, then
    /// one page per sentinel event until `max_pages` or exhaustion.
    pub async fn client_index(&self, query: &ClientsQuery) -> Result<ClientListState> {
        let mut controller = ClientListController::new(Arc::clone(&self.backend), query.page_size);
        controller.set_sort_order(query.sort);

        let mut outcome = controller.load_until(query.max_pages).await?;
        let mut retries_left = query.retries;
        while outcome == LoadOutcome::Failed && controller.can_retry() && retries_left > 0 {
            retries_left -= 1;
            outcome = controller.retry().await?;
            if outcome != LoadOutcome::Failed {
                outcome = controller.load_until(query.max_pages).await?;
            }
        }

        Ok(controller.into_state())
    }

    pub async fn client_settings(
        &self,
        client_id: &str,
        query: &RulesQuery,
    ) -> Result<RuleSettingsState> {
        let mut controller = RuleSettingsController::new(Arc::clone(&self.backend), client_id);
        if let Some(term) = &query.search {
            controller.state_mut().set_search(term.as_str());
        }

        let mut loaded = controller.load().await?;
        let mut retries_left = query.retries;
        while !loaded && controller.can_retry() && retries_left > 0 {
            retries_left -= 1;
            tracing::info!("🔁 Retrying rules for client {}", client_id);
            loaded = controller.load().await?;
        }

        Ok(controller.into_state())
    }

    /// Writes one code list of a rule, returning the file name.
    pub async fn download(
        &self,
        client_id: &str,
        rule_id: &str,
        list: CodeList,
        retries: usize,
    ) -> Result<String> {
        validate_non_empty_string("client_id", client_id)?;
        validate_non_empty_string("rule_id", rule_id)?;

        let query = RulesQuery {
            search: None,
            retries,
        };
        let state = self.client_settings(client_id, &query).await?;
        if state.error().is_some() {
            return Err(ConsoleError::SourceUnavailable {
                message: LOAD_RULES_ERROR.to_string(),
            });
        }

        let rule = state
            .rules()
            .iter()
            .find(|rule| rule.id == rule_id)
            .ok_or_else(|| ConsoleError::NotFound {
                kind: "Rule".to_string(),
                id: format!("{} (client {})", rule_id, client_id),
            })?;

        let artifact = DownloadArtifact::for_rule(rule, list);
        let file_name = artifact.save(&self.storage).await?;
        tracing::info!(
            "💾 Saved {} ({} codes)",
            file_name,
            rule.codes(list).len()
        );
        Ok(file_name)
    }

    /// Loads whatever page `route` points at.
    pub async fn load(
        &self,
        route: &Route,
        clients: &ClientsQuery,
        rules: &RulesQuery,
    ) -> Result<LoadedPage> {
        tracing::debug!("Opening {}", route);
        match route {
            Route::ClientIndex => Ok(LoadedPage::ClientIndex(self.client_index(clients).await?)),
            Route::ClientSettings { client_id } => Ok(LoadedPage::ClientSettings(
                self.client_settings(client_id, rules).await?,
            )),
        }
    }

    pub async fn open(
        &self,
        route: &Route,
        clients: &ClientsQuery,
        rules: &RulesQuery,
        format: OutputFormat,
    ) -> Result<String> {
        self.load(route, clients, rules).await?.render(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockBackend;
    use crate::adapters::storage::LocalStorage;
    use crate::domain::model::{Client, Page, Rule};
    use crate::utils::error::ErrorSeverity;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Backend whose every call fails with a non-network error.
    #[derive(Default)]
    struct BrokenBackend {
        calls: AtomicUsize,
    }

    impl BrokenBackend {
        fn broken(&self) -> ConsoleError {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ConsoleError::ValidationError {
                message: "unexpected response shape".to_string(),
            }
        }
    }

    #[async_trait]
    impl ClientDirectory for BrokenBackend {
        async fn fetch_clients(&self, _page: usize, _page_size: usize) -> Result<Page<Client>> {
            Err(self.broken())
        }
    }

    #[async_trait]
    impl RuleSource for BrokenBackend {
        async fn fetch_rules(&self) -> Result<Vec<Rule>> {
            Err(self.broken())
        }
    }

    fn console(backend: MockBackend, dir: &TempDir) -> RuleConsole<MockBackend, LocalStorage> {
        RuleConsole::new(
            backend,
            LocalStorage::new(dir.path().to_str().unwrap().to_string()),
        )
    }

    #[tokio::test]
    async fn test_client_index_scrolls_to_the_end() {
        let dir = TempDir::new().unwrap();
        let console = console(MockBackend::new(Duration::ZERO), &dir);

        let query = ClientsQuery {
            page_size: 6,
            max_pages: None,
            ..Default::default()
        };
        let state = console.client_index(&query).await.unwrap();

        assert_eq!(state.clients().len(), 20);
        assert_eq!(state.loaded_page(), 4);
        assert!(!state.has_more());
        // 4 pages, no extra request after exhaustion
        assert_eq!(console.backend().calls(), 4);
    }

    #[tokio::test]
    async fn test_client_index_stops_at_max_pages() {
        let dir = TempDir::new().unwrap();
        let console = console(MockBackend::new(Duration::ZERO), &dir);

        let query = ClientsQuery {
            page_size: 5,
            max_pages: Some(2),
            ..Default::default()
        };
        let state = console.client_index(&query).await.unwrap();
        assert_eq!(state.clients().len(), 10);
        assert!(state.has_more());
    }

    #[tokio::test]
    async fn test_failure_without_retry_surfaces_error() {
        let dir = TempDir::new().unwrap();
        let console = console(MockBackend::new(Duration::ZERO).fail_next(1), &dir);

        let state = console.client_index(&ClientsQuery::default()).await.unwrap();
        assert_eq!(state.error(), Some("Unable to load clients"));
        assert!(state.clients().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_retry_recovers() {
        let dir = TempDir::new().unwrap();
        let console = console(MockBackend::new(Duration::ZERO).fail_next(2), &dir);

        let query = ClientsQuery {
            retries: 2,
            ..Default::default()
        };
        let state = console.client_index(&query).await.unwrap();
        assert_eq!(state.error(), None);
        assert_eq!(state.clients().len(), 10);
        assert_eq!(console.backend().calls(), 3);
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let dir = TempDir::new().unwrap();
        let console = console(MockBackend::new(Duration::ZERO), &dir);

        let name = console
            .download(
                "d4e5f6a7-b8c9-0123-def1-234567890123",
                "rule-008",
                CodeList::ExcludedNpis,
                0,
            )
            .await
            .unwrap();

        assert_eq!(name, "excluded_npis_rule-008.txt");
        let content = std::fs::read_to_string(dir.path().join(&name)).unwrap();
        assert_eq!(content.lines().count(), 5);
        assert!(content.starts_with("5432109876\n"));
    }

    #[tokio::test]
    async fn test_download_rejects_rule_of_another_client() {
        let dir = TempDir::new().unwrap();
        let console = console(MockBackend::new(Duration::ZERO), &dir);

        let err = console
            .download(
                "a1b2c3d4-e5f6-7890-abcd-ef1234567890",
                "rule-003",
                CodeList::AllowedNdcs,
                0,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_open_settings_route() {
        let dir = TempDir::new().unwrap();
        let console = console(MockBackend::new(Duration::ZERO), &dir);

        let route: Route = "/clients/a1b2c3d4-e5f6-7890-abcd-ef1234567890/settings"
            .parse()
            .unwrap();
        let rules = RulesQuery {
            search: Some("meddadv".to_string()),
            retries: 0,
        };
        let out = console
            .open(&route, &ClientsQuery::default(), &rules, OutputFormat::Table)
            .await
            .unwrap();
        assert!(out.contains("1 of 2 rules"));
        assert!(out.contains("rule-002"));
        assert!(!out.contains("rule-001"));
    }

    #[tokio::test]
    async fn test_rules_retry_recovers() {
        let dir = TempDir::new().unwrap();
        let console = console(MockBackend::new(Duration::ZERO).fail_next(1), &dir);

        let query = RulesQuery {
            search: None,
            retries: 1,
        };
        let state = console
            .client_settings("a1b2c3d4-e5f6-7890-abcd-ef1234567890", &query)
            .await
            .unwrap();

        assert_eq!(state.error(), None);
        assert_eq!(state.rules().len(), 2);
        assert_eq!(console.backend().calls(), 2);
    }

    #[tokio::test]
    async fn test_non_network_failures_are_not_retried() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
        let console = RuleConsole::new(BrokenBackend::default(), storage);

        let clients = ClientsQuery {
            retries: 3,
            ..Default::default()
        };
        let state = console.client_index(&clients).await.unwrap();
        assert_eq!(state.error(), Some("Unable to load clients"));
        assert_eq!(console.backend().calls.load(Ordering::SeqCst), 1);

        let rules = RulesQuery {
            search: None,
            retries: 3,
        };
        let state = console.client_settings("client-01", &rules).await.unwrap();
        assert_eq!(state.error(), Some(LOAD_RULES_ERROR));
        assert_eq!(console.backend().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_load_is_an_error_in_json_output() {
        let dir = TempDir::new().unwrap();
        let console = console(MockBackend::new(Duration::ZERO).fail_next(1), &dir);

        let result = console
            .open(
                &Route::ClientIndex,
                &ClientsQuery::default(),
                &RulesQuery::default(),
                OutputFormat::Json,
            )
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, ConsoleError::SourceUnavailable { .. }));
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[tokio::test]
    async fn test_loaded_page_reports_failure_behind_table_view() {
        let dir = TempDir::new().unwrap();
        let console = console(MockBackend::new(Duration::ZERO).fail_next(1), &dir);

        let page = console
            .load(
                &Route::settings("a1b2c3d4-e5f6-7890-abcd-ef1234567890"),
                &ClientsQuery::default(),
                &RulesQuery::default(),
            )
            .await
            .unwrap();

        assert!(page.render(OutputFormat::Table).unwrap().starts_with("Unable to load rules"));
        let err = page.failure().unwrap();
        assert!(err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[tokio::test]
    async fn test_download_rejects_blank_ids_before_fetching() {
        let dir = TempDir::new().unwrap();
        let console = console(MockBackend::new(Duration::ZERO), &dir);

        let err = console
            .download("  ", "rule-001", CodeList::ExcludedNpis, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidConfigValueError { ref field, .. } if field == "client_id"));

        let err = console
            .download("a1b2c3d4-e5f6-7890-abcd-ef1234567890", "", CodeList::ExcludedNpis, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidConfigValueError { ref field, .. } if field == "rule_id"));
        assert_eq!(console.backend().calls(), 0);
    }
}
