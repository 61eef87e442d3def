use async_trait::async_trait;

use super::{ChainDataProvider, ProviderStatus};
use crate::address::{AddressDetails, Transaction};
use crate::config::{WalletConfig, DEFAULT_PAGE_LIMIT};
use crate::error::ProviderError;

/// Explorer backend client.
pub struct ExplorerClient {
    client: reqwest::Client,
    base_url: String,
    page_limit: u32,
}

impl ExplorerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    pub fn from_config(config: &WalletConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.explorer_url.trim_end_matches('/').to_string(),
            page_limit: config.page_limit,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ProviderError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl ChainDataProvider for ExplorerClient {
    async fn status(&self) -> ProviderStatus {
        let url = format!("{}/infos", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => ProviderStatus::Online,
            Ok(response) => {
                log::debug!("Explorer status check returned {}", response.status());
                ProviderStatus::Offline
            }
            Err(e) => {
                log::debug!("Explorer unreachable: {}", e);
                ProviderStatus::Offline
            }
        }
    }

    async fn fetch_address_details(&self, hash: &str) -> Result<AddressDetails, ProviderError> {
        let url = format!("{}/addresses/{}", self.base_url, hash);
        self.get_json(&url).await
    }

    async fn fetch_confirmed_transactions(
        &self,
        hash: &str,
        page: u32,
    ) -> Result<Vec<Transaction>, ProviderError> {
        let url = format!(
            "{}/addresses/{}/transactions?page={}&limit={}",
            self.base_url,
            hash,
            page.max(1),
            self.page_limit
        );
        self.get_json(&url).await
    }
}
