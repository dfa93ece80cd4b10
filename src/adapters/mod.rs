// Adapters layer: concrete implementations for external systems (data sources, storage).

pub mod http;
pub mod mock;
pub mod storage;

use crate::adapters::http::HttpBackend;
use crate::adapters::mock::MockBackend;
use crate::domain::model::{Client, Page, Rule};
use crate::domain::ports::{ClientDirectory, RuleSource};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The data source picked by configuration.
pub enum Backend {
    Mock(MockBackend),
    Http(HttpBackend),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Mock(_) => "mock",
            Backend::Http(_) => "http",
        }
    }
}

#[async_trait]
impl ClientDirectory for Backend {
    async fn fetch_clients(&self, page: usize, page_size: usize) -> Result<Page<Client>> {
        match self {
            Backend::Mock(mock) => mock.fetch_clients(page, page_size).await,
            Backend::Http(http) => http.fetch_clients(page, page_size).await,
        }
    }
}

#[async_trait]
impl RuleSource for Backend {
    async fn fetch_rules(&self) -> Result<Vec<Rule>> {
        match self {
            Backend::Mock(mock) => mock.fetch_rules().await,
            Backend::Http(http) => http.fetch_rules().await,
        }
    }
}
