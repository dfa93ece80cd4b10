//! Incremental client list loading.
//!
//! [`ClientListState`] holds everything the client index needs (accumulated
//! rows, pagination cursor, in-flight request, error, sort order) and only
//! changes through its transition methods. The sentinel trigger is
//! level-triggered: every visibility event re-reads the current state, so a
//! single subscription is enough and events arriving while a page is in
//! flight are dropped.
//!
//! [`ClientListController`] drives the state against an injected
//! [`ClientDirectory`].

use crate::core::sort::sort_clients;
use crate::domain::model::{Client, Page, SortOrder};
use crate::domain::ports::ClientDirectory;
use crate::utils::error::{ConsoleError, Result};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const LOAD_CLIENTS_ERROR: &str = "Unable to load clients";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    /// 第一頁，會取代目前的清單
    Initial,
    /// 後續頁，附加在清單後面
    More,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
    pub kind: LoadKind,
}

/// What the index view should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase<'a> {
    Loading,
    Failed(&'a str),
    Ready,
}

#[derive(Debug, Clone)]
pub struct ClientListState {
    clients: Vec<Client>,
    page_size: usize,
    loaded_page: usize,
    has_more: bool,
    in_flight: Option<PageRequest>,
    error: Option<String>,
    sort_order: SortOrder,
}

impl ClientListState {
    pub fn new(page_size: usize) -> Self {
        Self {
            clients: Vec::new(),
            page_size: page_size.max(1),
            loaded_page: 0,
            has_more: true,
            in_flight: None,
            error: None,
            sort_order: SortOrder::Ascending,
        }
    }

    /// 開始載入第一頁。已有請求進行中時回傳 `None`。
    pub fn begin_initial(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        let request = PageRequest {
            page: 1,
            page_size: self.page_size,
            kind: LoadKind::Initial,
        };
        self.in_flight = Some(request);
        self.error = None;
        Some(request)
    }

    /// Sentinel became visible. Returns the next page request when
    /// `has_more && !in_flight`, otherwise nothing happens.
    pub fn on_sentinel_visible(&mut self) -> Option<PageRequest> {
        // 初次載入尚未完成或處於錯誤畫面時，sentinel 不會被渲染
        if self.loaded_page == 0 || self.error.is_some() {
            return None;
        }
        if !self.has_more || self.in_flight.is_some() {
            return None;
        }
        let request = PageRequest {
            page: self.loaded_page + 1,
            page_size: self.page_size,
            kind: LoadKind::More,
        };
        self.in_flight = Some(request);
        Some(request)
    }

    /// The error view's retry action re-issues the initial fetch.
    pub fn retry(&mut self) -> Option<PageRequest> {
        self.begin_initial()
    }

    /// An empty page ends the list even when it claims `has_more`, so a
    /// misbehaving directory cannot keep the sentinel firing forever.
    pub fn complete(&mut self, request: PageRequest, page: Page<Client>) -> Result<()> {
        self.settle(request)?;
        let has_more = page.has_more && !page.data.is_empty();
        match request.kind {
            LoadKind::Initial => self.clients = page.data,
            LoadKind::More => self.clients.extend(page.data),
        }
        self.loaded_page = request.page;
        self.has_more = has_more;
        self.error = None;
        Ok(())
    }

    /// 失敗時保留已累積的資料，只記錄可重試的錯誤
    pub fn fail(&mut self, request: PageRequest) -> Result<()> {
        self.settle(request)?;
        self.error = Some(LOAD_CLIENTS_ERROR.to_string());
        Ok(())
    }

    fn settle(&mut self, request: PageRequest) -> Result<()> {
        match self.in_flight {
            Some(current) if current == request => {
                self.in_flight = None;
                Ok(())
            }
            Some(current) => Err(ConsoleError::StateError {
                message: format!(
                    "page {} settled while page {} is in flight",
                    request.page, current.page
                ),
            }),
            None => Err(ConsoleError::StateError {
                message: format!("page {} settled with nothing in flight", request.page),
            }),
        }
    }

    pub fn toggle_sort(&mut self) -> SortOrder {
        self.sort_order = self.sort_order.toggle();
        self.sort_order
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
    }

    /// Accumulated rows in display order.
    pub fn sorted(&self) -> Vec<&Client> {
        sort_clients(&self.clients, self.sort_order)
    }

    pub fn phase(&self) -> ListPhase<'_> {
        if matches!(
            self.in_flight,
            Some(PageRequest {
                kind: LoadKind::Initial,
                ..
            })
        ) {
            return ListPhase::Loading;
        }
        match &self.error {
            Some(message) => ListPhase::Failed(message.as_str()),
            None => ListPhase::Ready,
        }
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_loading_more(&self) -> bool {
        matches!(
            self.in_flight,
            Some(PageRequest {
                kind: LoadKind::More,
                ..
            })
        )
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn loaded_page(&self) -> usize {
        self.loaded_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { page: usize, received: usize },
    Skipped,
    Failed,
}

pub struct ClientListController<D: ClientDirectory> {
    directory: D,
    state: ClientListState,
    retryable_failure: bool,
}

impl<D: ClientDirectory> ClientListController<D> {
    pub fn new(directory: D, page_size: usize) -> Self {
        Self {
            directory,
            state: ClientListState::new(page_size),
            retryable_failure: false,
        }
    }

    pub fn state(&self) -> &ClientListState {
        &self.state
    }

    pub fn into_state(self) -> ClientListState {
        self.state
    }

    /// True while the error view is shown for a failure that a retry may fix.
    pub fn can_retry(&self) -> bool {
        self.state.error().is_some() && self.retryable_failure
    }

    pub fn toggle_sort(&mut self) -> SortOrder {
        self.state.toggle_sort()
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.state.set_sort_order(order);
    }

    pub async fn load_initial(&mut self) -> Result<LoadOutcome> {
        let request = self.state.begin_initial();
        self.run(request).await
    }

    pub async fn sentinel_visible(&mut self) -> Result<LoadOutcome> {
        let request = self.state.on_sentinel_visible();
        self.run(request).await
    }

    pub async fn retry(&mut self) -> Result<LoadOutcome> {
        tracing::info!("🔁 Retrying client list from the first page");
        let request = self.state.retry();
        self.run(request).await
    }

    /// Keeps "scrolling" until the directory is exhausted, a fetch fails or
    /// `max_pages` pages are loaded in total.
    pub async fn load_until(&mut self, max_pages: Option<usize>) -> Result<LoadOutcome> {
        let mut last = if self.state.loaded_page() == 0 {
            self.load_initial().await?
        } else {
            LoadOutcome::Skipped
        };

        loop {
            if matches!(last, LoadOutcome::Failed) {
                return Ok(last);
            }
            if let Some(max) = max_pages {
                if self.state.loaded_page() >= max {
                    return Ok(last);
                }
            }
            match self.sentinel_visible().await? {
                LoadOutcome::Skipped => return Ok(last),
                outcome => last = outcome,
            }
        }
    }

    async fn run(&mut self, request: Option<PageRequest>) -> Result<LoadOutcome> {
        let Some(request) = request else {
            tracing::debug!("Sentinel event ignored (in flight or exhausted)");
            return Ok(LoadOutcome::Skipped);
        };

        tracing::debug!(
            "Fetching clients page {} (size {})",
            request.page,
            request.page_size
        );
        match self
            .directory
            .fetch_clients(request.page, request.page_size)
            .await
        {
            Ok(page) => {
                let received = page.data.len();
                if received == 0 && page.has_more {
                    tracing::warn!(
                        "⚠️ Page {} was empty but reported more; treating the list as exhausted",
                        request.page
                    );
                }
                self.state.complete(request, page)?;
                tracing::info!(
                    "📥 Loaded page {} ({} clients, {} total, has_more={})",
                    request.page,
                    received,
                    self.state.clients().len(),
                    self.state.has_more()
                );
                Ok(LoadOutcome::Loaded {
                    page: request.page,
                    received,
                })
            }
            Err(e) => {
                tracing::error!("❌ Failed to load clients page {}: {}", request.page, e);
                self.retryable_failure = e.is_retryable();
                self.state.fail(request)?;
                Ok(LoadOutcome::Failed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn client(n: usize) -> Client {
        Client {
            id: format!("client-{:02}", n),
            name: format!("Pharmacy {:02}", n),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            active: true,
        }
    }

    fn page(range: std::ops::RangeInclusive<usize>, has_more: bool) -> Page<Client> {
        Page {
            data: range.map(client).collect(),
            has_more,
        }
    }

    #[test]
    fn test_sentinel_ignored_before_initial_load() {
        let mut state = ClientListState::new(10);
        assert!(state.on_sentinel_visible().is_none());

        let request = state.begin_initial().unwrap();
        assert_eq!(state.phase(), ListPhase::Loading);
        assert!(state.on_sentinel_visible().is_none());

        state.complete(request, page(1..=10, true)).unwrap();
        assert_eq!(state.phase(), ListPhase::Ready);
        assert_eq!(state.clients().len(), 10);
    }

    #[test]
    fn test_at_most_one_page_in_flight() {
        let mut state = ClientListState::new(10);
        let initial = state.begin_initial().unwrap();
        state.complete(initial, page(1..=10, true)).unwrap();

        let next = state.on_sentinel_visible().unwrap();
        assert_eq!(next.page, 2);
        assert!(state.is_loading_more());
        // 重複的可見事件都被忽略
        assert!(state.on_sentinel_visible().is_none());
        assert!(state.on_sentinel_visible().is_none());
        assert!(state.begin_initial().is_none());

        state.complete(next, page(11..=20, false)).unwrap();
        assert_eq!(state.clients().len(), 20);
        assert!(!state.has_more());
        assert!(state.on_sentinel_visible().is_none());
    }

    #[test]
    fn test_failure_keeps_accumulated_rows() {
        let mut state = ClientListState::new(5);
        let initial = state.begin_initial().unwrap();
        state.complete(initial, page(1..=5, true)).unwrap();

        let next = state.on_sentinel_visible().unwrap();
        state.fail(next).unwrap();

        assert_eq!(state.clients().len(), 5);
        assert_eq!(state.phase(), ListPhase::Failed(LOAD_CLIENTS_ERROR));
        assert!(state.on_sentinel_visible().is_none());

        let retry = state.retry().unwrap();
        assert_eq!(retry.page, 1);
        assert_eq!(retry.kind, LoadKind::Initial);
        state.complete(retry, page(1..=5, true)).unwrap();
        assert_eq!(state.clients().len(), 5);
        assert_eq!(state.loaded_page(), 1);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_settling_a_stale_request_is_rejected() {
        let mut state = ClientListState::new(10);
        let initial = state.begin_initial().unwrap();
        let stale = PageRequest {
            page: 3,
            page_size: 10,
            kind: LoadKind::More,
        };
        assert!(state.complete(stale, page(21..=30, false)).is_err());
        assert!(state.is_in_flight());
        state.complete(initial, page(1..=10, true)).unwrap();
        assert!(state.fail(initial).is_err());
    }

    #[test]
    fn test_empty_page_with_more_ends_the_list() {
        let mut state = ClientListState::new(10);
        let initial = state.begin_initial().unwrap();
        state.complete(initial, page(1..=10, true)).unwrap();

        let next = state.on_sentinel_visible().unwrap();
        state
            .complete(
                next,
                Page {
                    data: vec![],
                    has_more: true,
                },
            )
            .unwrap();

        assert!(!state.has_more());
        assert_eq!(state.clients().len(), 10);
        assert!(state.on_sentinel_visible().is_none());
    }

    #[test]
    fn test_sort_toggle_reorders_view_only() {
        let mut state = ClientListState::new(10);
        let initial = state.begin_initial().unwrap();
        state.complete(initial, page(1..=3, false)).unwrap();

        assert_eq!(state.sorted()[0].id, "client-01");
        assert_eq!(state.toggle_sort(), SortOrder::Descending);
        assert_eq!(state.sorted()[0].id, "client-03");
        assert_eq!(state.clients()[0].id, "client-01");
    }
}
