use crate::domain::model::{Client, Page, Rule};
use crate::domain::ports::{ClientDirectory, RuleSource};
use crate::utils::error::{ConsoleError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Backend speaking plain JSON over HTTP GET:
///
/// * `GET {base}/clients?page=N&pageSize=M` → `{"data": [...], "hasMore": bool}`
/// * `GET {base}/rules` → `[...]`
pub struct HttpBackend {
    base_url: String,
    client: HttpClient,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        validate_url("source.endpoint", base_url)?;

        let mut builder = HttpClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T> {
        tracing::debug!("Making API request to: {}", url);
        let response = self.client.get(&url).query(query).send().await?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(ConsoleError::ApiStatusError {
                status: response.status().as_u16(),
                url,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ClientDirectory for HttpBackend {
    async fn fetch_clients(&self, page: usize, page_size: usize) -> Result<Page<Client>> {
        self.get_json(
            self.url("clients"),
            &[("page", page.to_string()), ("pageSize", page_size.to_string())],
        )
        .await
    }
}

#[async_trait]
impl RuleSource for HttpBackend {
    async fn fetch_rules(&self) -> Result<Vec<Rule>> {
        self.get_json(self.url("rules"), &[]).await
    }
}
