//! Chain data access
//!
//! - `ChainDataProvider` - seam consumed by the address manager
//! - `ExplorerClient` - HTTP implementation over the explorer backend

pub mod client;

use async_trait::async_trait;

use crate::address::{AddressDetails, Transaction};
use crate::error::ProviderError;

pub use client::ExplorerClient;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderStatus {
    Online,
    Offline,
}

#[async_trait]
pub trait ChainDataProvider: Send + Sync {
    /// Connectivity check issued before every refresh.
    async fn status(&self) -> ProviderStatus;

    async fn fetch_address_details(&self, hash: &str) -> Result<AddressDetails, ProviderError>;

    /// Confirmed transactions of `hash`, newest first. Pages start at 1.
    async fn fetch_confirmed_transactions(
        &self,
        hash: &str,
        page: u32,
    ) -> Result<Vec<Transaction>, ProviderError>;
}
