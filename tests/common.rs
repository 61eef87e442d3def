//! Common test utilities for address manager integration tests
//!
//! This module provides shared test infrastructure including:
//! - An in-memory chain data provider with failure injection
//! - A deterministic address deriver
//! - Helpers to build managers and collect emitted events

#![allow(dead_code)]

use alephium_wallet::address::group_of_address;
use alephium_wallet::{
    Address, AddressDeriver, AddressDetails, AddressManager, AddressSettings, Amount,
    ChainDataProvider, DeriveRequest, DerivedAddress, FileMetadataStore, NetworkName,
    ProviderError, ProviderStatus, Transaction, WalletError, WalletEvent, WalletSession,
};
use async_trait::async_trait;
use bitcoin::base58;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

pub const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
pub const WALLET_NAME: &str = "test-wallet";

pub fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

/// Deterministic P2PKH hash for a derivation index
pub fn hash_for(index: u32) -> String {
    let mut bytes = [0u8; 33];
    bytes[1..5].copy_from_slice(&index.to_le_bytes());
    bytes[32] = 0xab;
    base58::encode(&bytes)
}

pub fn test_address(index: u32) -> Address {
    Address::new(
        hash_for(index),
        format!("pub-{}", index),
        format!("priv-{}", index),
        index,
        AddressSettings::default(),
        NetworkName::Mainnet,
    )
    .expect("valid test address")
}

pub fn confirmed_tx(hash: &str, timestamp: u64) -> Transaction {
    Transaction {
        hash: hash.to_string(),
        block_hash: format!("block-{}", hash),
        timestamp,
        inputs: Vec::new(),
        outputs: Vec::new(),
        gas_amount: 20000,
        gas_price: None,
    }
}

// ============================================================================
// Mock chain data provider
// ============================================================================

#[derive(Default)]
struct MockState {
    offline: bool,
    details: HashMap<String, AddressDetails>,
    pages: HashMap<String, Vec<Vec<Transaction>>>,
    failing: HashSet<String>,
    detail_calls: HashMap<String, usize>,
}

#[derive(Default)]
pub struct MockProvider {
    state: Mutex<MockState>,
    /// Held for writing by tests that need a provider call to hang
    pub gate: tokio::sync::RwLock<()>,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub fn set_balance(&self, hash: &str, balance: u64, tx_number: u64) {
        self.state.lock().unwrap().details.insert(
            hash.to_string(),
            AddressDetails {
                balance: Amount::from(balance),
                locked_balance: Amount::zero(),
                tx_number,
            },
        );
    }

    /// Put a transaction at the top of the first page
    pub fn confirm(&self, address: &str, tx_hash: &str, timestamp: u64) {
        let mut state = self.state.lock().unwrap();
        let pages = state.pages.entry(address.to_string()).or_default();
        if pages.is_empty() {
            pages.push(Vec::new());
        }
        pages[0].insert(0, confirmed_tx(tx_hash, timestamp));
    }

    pub fn push_page(&self, address: &str, txs: Vec<Transaction>) {
        let mut state = self.state.lock().unwrap();
        state.pages.entry(address.to_string()).or_default().push(txs);
    }

    pub fn fail(&self, hash: &str) {
        self.state.lock().unwrap().failing.insert(hash.to_string());
    }

    pub fn detail_calls(&self, hash: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .detail_calls
            .get(hash)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ChainDataProvider for MockProvider {
    async fn status(&self) -> ProviderStatus {
        let _gate = self.gate.read().await;
        if self.state.lock().unwrap().offline {
            ProviderStatus::Offline
        } else {
            ProviderStatus::Online
        }
    }

    async fn fetch_address_details(&self, hash: &str) -> Result<AddressDetails, ProviderError> {
        let mut state = self.state.lock().unwrap();
        *state.detail_calls.entry(hash.to_string()).or_insert(0) += 1;
        if state.failing.contains(hash) {
            return Err(ProviderError::Malformed(format!("bad payload for {}", hash)));
        }
        Ok(state.details.get(hash).cloned().unwrap_or_default())
    }

    async fn fetch_confirmed_transactions(
        &self,
        hash: &str,
        page: u32,
    ) -> Result<Vec<Transaction>, ProviderError> {
        let state = self.state.lock().unwrap();
        if state.failing.contains(hash) {
            return Err(ProviderError::Malformed(format!("bad payload for {}", hash)));
        }
        let txs = state
            .pages
            .get(hash)
            .and_then(|pages| pages.get(page.saturating_sub(1) as usize))
            .cloned()
            .unwrap_or_default();
        Ok(txs)
    }
}

// ============================================================================
// Mock address deriver
// ============================================================================

pub struct MockDeriver;

impl AddressDeriver for MockDeriver {
    fn derive(&self, _mnemonic: &str, request: &DeriveRequest) -> Result<DerivedAddress, WalletError> {
        let candidates: Box<dyn Iterator<Item = u32>> = match request.index {
            Some(index) => Box::new(std::iter::once(index)),
            None => Box::new(0..10_000),
        };

        for index in candidates {
            if request.skip_indexes.contains(&index) {
                continue;
            }
            let hash = hash_for(index);
            if let Some(group) = request.group {
                if group_of_address(&hash)? != group {
                    continue;
                }
            }
            return Ok(DerivedAddress {
                hash,
                public_key: format!("pub-{}", index),
                private_key: format!("priv-{}", index),
                index,
            });
        }

        Err(WalletError::Derivation("no candidate index left".into()))
    }
}

// ============================================================================
// Test environment
// ============================================================================

pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub provider: Arc<MockProvider>,
    pub store: Arc<FileMetadataStore>,
    pub manager: Arc<AddressManager>,
    pub events: UnboundedReceiver<WalletEvent>,
}

impl TestEnvironment {
    pub fn new() -> Self {
        init_logger();
        let temp_dir = TempDir::new().expect("temp dir");
        let provider = MockProvider::new();
        let store = Arc::new(FileMetadataStore::new_with_base_dir(temp_dir.path().to_path_buf()));
        let (manager, events) =
            AddressManager::new(NetworkName::Mainnet, provider.clone(), store.clone());

        Self {
            temp_dir,
            provider,
            store,
            manager: Arc::new(manager),
            events,
        }
    }

    pub async fn unlock(&self) {
        let session = WalletSession::new(WALLET_NAME, MNEMONIC).expect("valid session");
        self.manager.unlock(session).await;
    }

    /// Drain every event emitted so far
    pub fn drain_events(&mut self) -> Vec<WalletEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
