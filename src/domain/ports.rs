use crate::domain::model::{Client, Page, Rule};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 客戶目錄，分頁從 1 開始
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    async fn fetch_clients(&self, page: usize, page_size: usize) -> Result<Page<Client>>;
}

#[async_trait]
pub trait RuleSource: Send + Sync {
    async fn fetch_rules(&self) -> Result<Vec<Rule>>;
}

#[async_trait]
impl<T: ClientDirectory + ?Sized> ClientDirectory for std::sync::Arc<T> {
    async fn fetch_clients(&self, page: usize, page_size: usize) -> Result<Page<Client>> {
        (**self).fetch_clients(page, page_size).await
    }
}

#[async_trait]
impl<T: RuleSource + ?Sized> RuleSource for std::sync::Arc<T> {
    async fn fetch_rules(&self) -> Result<Vec<Rule>> {
        (**self).fetch_rules().await
    }
}
