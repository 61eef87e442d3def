//! Alephium wallet address tracking
//!
//! Keeps the derived addresses of a wallet per network, merges confirmed
//! history from an explorer backend with locally submitted pending
//! transactions, and polls until those transactions confirm.
//!
//! # Architecture
//!
//! - **Address**: identity, settings, on-chain snapshot, transaction history
//!   and available balance of one derived address
//! - **Registry**: addresses keyed by hash and network
//! - **Manager**: session, settings persistence, refresh and pending bookkeeping
//! - **Reconciler**: background polling of pending transactions
//!
//! Cryptography and chain access stay outside the crate, behind
//! [`keys::AddressDeriver`] and [`explorer::ChainDataProvider`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use alephium_wallet::{AddressManager, ExplorerClient, FileMetadataStore, PendingReconciler, WalletConfig};
//!
//! let config = WalletConfig::from_env();
//! let provider = Arc::new(ExplorerClient::from_config(&config)?);
//! let store = Arc::new(FileMetadataStore::new_with_base_dir(config.wallet_dir.clone()));
//! let (manager, events) = AddressManager::new(config.network, provider, store);
//! let manager = Arc::new(manager);
//!
//! let reconciler = PendingReconciler::new(manager.clone(), config.poll_interval).spawn();
//! manager.add_pending_transaction(tx).await?;
//! ```

pub mod address;
pub mod config;
pub mod error;
pub mod events;
pub mod explorer;
pub mod keys;
pub mod manager;
pub mod network;
pub mod reconciler;
pub mod registry;
pub mod storage;

pub use address::{
    Address, AddressDetails, AddressSettings, Amount, PendingTransaction, PendingTxType,
    Transaction,
};
pub use config::WalletConfig;
pub use error::{ProviderError, StorageError, WalletError};
pub use events::{Notification, WalletEvent};
pub use explorer::{ChainDataProvider, ExplorerClient, ProviderStatus};
pub use keys::{AddressDeriver, DeriveRequest, DerivedAddress, WalletSession};
pub use manager::{AddressManager, PendingCheck, RefreshMode, RefreshReport};
pub use network::NetworkName;
pub use reconciler::{PendingReconciler, ReconcilerHandle, ReconcilerState};
pub use registry::{AddressKey, AddressRegistry};
pub use storage::{AddressMetadata, AddressMetadataStore, FileMetadataStore};
