//! Address Manager - Orchestration Layer
//!
//! Owns the address registry and the wallet session, and coordinates the
//! chain data provider, the metadata store and the UI event channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};

use crate::address::{Address, AddressDetails, AddressSettings, PendingTransaction, Transaction};
use crate::error::{ProviderError, WalletError};
use crate::events::{EventReceiver, EventSender, Notification};
use crate::explorer::{ChainDataProvider, ProviderStatus};
use crate::keys::{AddressDeriver, DeriveRequest, WalletSession};
use crate::network::NetworkName;
use crate::registry::AddressRegistry;
use crate::storage::{AddressMetadata, AddressMetadataStore};

/// Why a refresh was issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshMode {
    /// Explicit user action, always propagated
    User,
    /// Background reconciliation, propagated only when a pending
    /// transaction got confirmed or the fetched data differs from the cache
    PendingCheck,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshReport {
    pub mode: RefreshMode,
    /// The cycle was skipped because the provider is offline
    pub offline: bool,
    pub refreshed: Vec<String>,
    pub failed: Vec<String>,
    /// Pending transactions pruned because they were confirmed
    pub confirmed_pending: usize,
    pub should_update: bool,
}

impl RefreshReport {
    fn new(mode: RefreshMode) -> Self {
        Self {
            mode,
            offline: false,
            refreshed: Vec::new(),
            failed: Vec::new(),
            confirmed_pending: 0,
            should_update: false,
        }
    }
}

/// Outcome of one reconciliation attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingCheck {
    /// Nothing is pending on the current network
    Idle,
    /// A previous check has not finished yet
    InFlight,
    Checked(RefreshReport),
}

/// Resets the in-flight flag even if the check future is dropped midway.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct AddressManager {
    registry: RwLock<AddressRegistry>,
    session: RwLock<Option<WalletSession>>,
    provider: Arc<dyn ChainDataProvider>,
    store: Arc<dyn AddressMetadataStore>,
    events: EventSender,
    pending_wakeup: Notify,
    pending_check_in_flight: AtomicBool,
}

impl AddressManager {
    // ============================================================================
    // Constructor
    // ============================================================================

    pub fn new(
        network: NetworkName,
        provider: Arc<dyn ChainDataProvider>,
        store: Arc<dyn AddressMetadataStore>,
    ) -> (Self, EventReceiver) {
        let (events, receiver) = EventSender::channel();

        let manager = Self {
            registry: RwLock::new(AddressRegistry::new(network)),
            session: RwLock::new(None),
            provider,
            store,
            events,
            pending_wakeup: Notify::new(),
            pending_check_in_flight: AtomicBool::new(false),
        };
        (manager, receiver)
    }

    // ============================================================================
    // Session & network
    // ============================================================================

    pub async fn unlock(&self, session: WalletSession) {
        log::info!("Wallet '{}' unlocked", session.wallet_name);
        *self.session.write().await = Some(session);
    }

    /// End the session: every cached address of every network is dropped.
    pub async fn lock(&self) {
        if let Some(session) = self.session.write().await.take() {
            log::info!("Wallet '{}' locked", session.wallet_name);
        }
        self.registry.write().await.clear();
        self.pending_wakeup.notify_one();
    }

    /// Delete the persisted metadata of the active wallet and end the session.
    pub async fn remove_wallet(&self) -> Result<(), WalletError> {
        let session = self.require_session().await?;
        self.store.delete_wallet(&session.wallet_name)?;
        self.lock().await;
        Ok(())
    }

    async fn require_session(&self) -> Result<WalletSession, WalletError> {
        self.session.read().await.clone().ok_or_else(|| {
            WalletError::MissingWalletIdentity("no unlocked wallet (name and mnemonic required)".into())
        })
    }

    pub async fn current_network(&self) -> NetworkName {
        self.registry.read().await.current_network()
    }

    /// Switch the active network. Caches of other networks are kept.
    pub async fn switch_network(&self, network: NetworkName) {
        let mut registry = self.registry.write().await;
        if registry.current_network() != network {
            log::info!("Switching network {} -> {}", registry.current_network(), network);
            registry.set_current_network(network);
        }
        drop(registry);
        self.pending_wakeup.notify_one();
    }

    // ============================================================================
    // Queries
    // ============================================================================

    pub async fn addresses(&self) -> Vec<Address> {
        self.registry
            .read()
            .await
            .addresses_for_current_network()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn address(&self, hash: &str) -> Option<Address> {
        self.registry.read().await.get(hash).cloned()
    }

    pub async fn main_address(&self) -> Option<Address> {
        self.registry
            .read()
            .await
            .main_address_for_current_network()
            .cloned()
    }

    pub async fn hashes_needing_pending_check(&self) -> Vec<String> {
        self.registry.read().await.hashes_needing_pending_check()
    }

    pub(crate) fn pending_wakeup(&self) -> &Notify {
        &self.pending_wakeup
    }

    // ============================================================================
    // Address lifecycle
    // ============================================================================

    /// Store addresses under the current network and announce them.
    pub async fn upsert_addresses(&self, addresses: Vec<Address>) {
        let hashes: Vec<String> = addresses.iter().map(|a| a.hash.clone()).collect();
        if self.registry.write().await.upsert(addresses) {
            self.events.addresses_updated(hashes);
        }
    }

    /// Rebuild the addresses of the unlocked wallet from persisted metadata.
    pub async fn restore_addresses(&self, deriver: &dyn AddressDeriver) -> Result<usize, WalletError> {
        let session = self.require_session().await?;
        let network = self.current_network().await;
        let entries = self.store.load_address_metadata(&session.wallet_name)?;

        let mut addresses = Vec::with_capacity(entries.len());
        for entry in &entries {
            let request = DeriveRequest {
                index: Some(entry.index),
                ..DeriveRequest::default()
            };
            let derived = deriver.derive(session.mnemonic(), &request)?;
            if derived.hash != entry.hash {
                log::warn!(
                    "Stored hash of address #{} does not match derived {}, using derived key",
                    entry.index,
                    derived.hash
                );
            }
            addresses.push(Address::from_derived(derived, entry.settings(), network)?);
        }

        let count = addresses.len();
        self.upsert_addresses(addresses).await;
        log::info!("Restored {} address(es) for wallet '{}'", count, session.wallet_name);
        Ok(count)
    }

    /// Persist and register a new address. A new main address takes the flag
    /// away from the previous one.
    pub async fn save_new_address(&self, address: Address) -> Result<(), WalletError> {
        let session = self.require_session().await?;
        let mut registry = self.registry.write().await;
        let changed = self.persist_and_upsert(&session, &mut registry, address)?;
        drop(registry);

        self.events.addresses_updated(changed);
        Ok(())
    }

    /// Derive, persist and register one new address.
    pub async fn generate_new_address(
        &self,
        deriver: &dyn AddressDeriver,
        group: Option<u8>,
        settings: AddressSettings,
    ) -> Result<Address, WalletError> {
        let session = self.require_session().await?;
        let (network, skip_indexes) = {
            let registry = self.registry.read().await;
            (registry.current_network(), registry.known_indexes())
        };

        let request = DeriveRequest {
            group,
            index: None,
            skip_indexes,
        };
        let derived = deriver.derive(session.mnemonic(), &request)?;
        let address = Address::from_derived(derived, settings, network)?;
        if let Some(group) = group {
            if address.group != group {
                return Err(WalletError::Derivation(format!(
                    "requested group {} but derived {} in group {}",
                    group, address.hash, address.group
                )));
            }
        }

        self.save_new_address(address.clone()).await?;
        log::info!("New address #{} {} in group {}", address.index, address.hash, address.group);
        Ok(address)
    }

    /// One new address in every group that is not skipped.
    pub async fn generate_one_address_per_group(
        &self,
        deriver: &dyn AddressDeriver,
        label_prefix: Option<&str>,
        color: &str,
        skip_groups: &[u8],
    ) -> Result<Vec<Address>, WalletError> {
        let mut created = Vec::new();

        for group in 0..crate::address::TOTAL_NUMBER_OF_GROUPS {
            if skip_groups.contains(&group) {
                continue;
            }
            let settings = AddressSettings {
                label: label_prefix.map(|prefix| format!("{} {}", prefix, group)),
                color: color.to_string(),
                is_main: false,
            };
            created.push(self.generate_new_address(deriver, Some(group), settings).await?);
        }

        Ok(created)
    }

    /// Scan successive derivation indexes and keep the addresses that have
    /// on-chain activity, stopping after `gap_limit` consecutive empty ones.
    pub async fn discover_active_addresses(
        &self,
        deriver: &dyn AddressDeriver,
        gap_limit: u32,
    ) -> Result<Vec<Address>, WalletError> {
        let session = self.require_session().await?;
        if self.provider.status().await == ProviderStatus::Offline {
            self.events.notify(Notification::Offline);
            return Ok(Vec::new());
        }

        let (network, known) = {
            let registry = self.registry.read().await;
            (registry.current_network(), registry.known_indexes())
        };

        let mut discovered = Vec::new();
        let mut empty_in_a_row = 0;
        let mut index = 0u32;

        while empty_in_a_row < gap_limit {
            if known.contains(&index) {
                index += 1;
                continue;
            }
            let request = DeriveRequest {
                index: Some(index),
                ..DeriveRequest::default()
            };
            let derived = deriver.derive(session.mnemonic(), &request)?;
            let details = self.provider.fetch_address_details(&derived.hash).await?;

            if details.tx_number > 0 {
                let mut address = Address::from_derived(derived, AddressSettings::default(), network)?;
                address.set_details(details);
                log::info!("Discovered active address #{} {}", address.index, address.hash);
                self.save_new_address(address.clone()).await?;
                discovered.push(address);
                empty_in_a_row = 0;
            } else {
                empty_in_a_row += 1;
            }
            index += 1;
        }

        Ok(discovered)
    }

    /// Change label, color or main flag of an address.
    ///
    /// Requires an unlocked wallet: the settings are persisted before the
    /// in-memory entry is replaced.
    pub async fn update_address_settings(
        &self,
        hash: &str,
        settings: AddressSettings,
    ) -> Result<(), WalletError> {
        let session = self.require_session().await?;
        let mut registry = self.registry.write().await;

        let mut updated = registry
            .get(hash)
            .cloned()
            .ok_or_else(|| WalletError::AddressNotFound(hash.to_string()))?;
        updated.settings = settings;

        let changed = self.persist_and_upsert(&session, &mut registry, updated)?;
        drop(registry);

        self.events.addresses_updated(changed);
        Ok(())
    }

    /// Persist `address` and, when it is the new main address, every other
    /// main address of the current network with the flag cleared.
    ///
    /// The registry is only touched once every write succeeded. Returns the
    /// hashes of all entries that changed, `address` first.
    fn persist_and_upsert(
        &self,
        session: &WalletSession,
        registry: &mut AddressRegistry,
        address: Address,
    ) -> Result<Vec<String>, WalletError> {
        let mut demoted: Vec<Address> = Vec::new();
        if address.settings.is_main {
            demoted = registry
                .addresses_for_current_network()
                .into_iter()
                .filter(|other| other.hash != address.hash && other.settings.is_main)
                .cloned()
                .collect();
            for other in &mut demoted {
                other.settings.is_main = false;
            }
        }

        self.store
            .store_address_metadata(&session.wallet_name, &AddressMetadata::from(&address))?;
        for other in &demoted {
            self.store
                .store_address_metadata(&session.wallet_name, &AddressMetadata::from(other))?;
            log::debug!("Address {} is no longer the main address", other.hash);
        }

        let mut changed = vec![address.hash.clone()];
        changed.extend(demoted.iter().map(|other| other.hash.clone()));

        let mut entries = vec![address];
        entries.extend(demoted);
        registry.upsert(entries);
        Ok(changed)
    }

    // ============================================================================
    // Pending transactions
    // ============================================================================

    /// Record a freshly submitted transaction on its origin address and wake
    /// the reconciler.
    pub async fn add_pending_transaction(&self, tx: PendingTransaction) -> Result<(), WalletError> {
        let from = tx.from_address.clone();
        {
            let mut registry = self.registry.write().await;
            let address = registry
                .get_mut(&from)
                .ok_or_else(|| WalletError::AddressNotFound(from.clone()))?;

            log::info!("Pending {:?} transaction {} from {}", tx.tx_type, tx.tx_id, from);
            address.add_pending_transaction(tx);
            address.update_pending_transactions();
        }

        self.events.addresses_updated(vec![from]);
        self.pending_wakeup.notify_one();
        Ok(())
    }

    /// Refresh every address that is waiting on a pending transaction.
    ///
    /// At most one check runs at a time; a call made while another is still
    /// waiting on the provider returns [`PendingCheck::InFlight`].
    pub async fn check_pending_transactions(&self) -> PendingCheck {
        let Some(_guard) = InFlightGuard::acquire(&self.pending_check_in_flight) else {
            log::debug!("Pending check still in flight, skipping");
            return PendingCheck::InFlight;
        };

        let hashes = self.hashes_needing_pending_check().await;
        if hashes.is_empty() {
            return PendingCheck::Idle;
        }

        log::debug!("Checking {} address(es) with pending transactions", hashes.len());
        PendingCheck::Checked(self.refresh_addresses(&hashes, RefreshMode::PendingCheck).await)
    }

    // ============================================================================
    // Refresh
    // ============================================================================

    /// Refresh every address of the current network.
    pub async fn refresh_all(&self) -> RefreshReport {
        let hashes: Vec<String> = self.addresses().await.into_iter().map(|a| a.hash).collect();
        self.refresh_addresses(&hashes, RefreshMode::User).await
    }

    /// Drop the confirmed history of `hashes` and fetch it again from page one.
    ///
    /// The cached history of an address is only replaced once its first page
    /// was fetched, so an offline provider or a failing address keeps what is
    /// already displayed.
    pub async fn reload_addresses(&self, hashes: &[String]) -> RefreshReport {
        self.refresh(hashes, RefreshMode::User, true).await
    }

    /// Fetch details and the first confirmed page of `hashes`, one address
    /// after the other.
    ///
    /// Transient failures are reported as notifications: an offline provider
    /// skips the whole cycle, a failing address is skipped on its own.
    pub async fn refresh_addresses(&self, hashes: &[String], mode: RefreshMode) -> RefreshReport {
        self.refresh(hashes, mode, false).await
    }

    async fn refresh(&self, hashes: &[String], mode: RefreshMode, reload: bool) -> RefreshReport {
        let mut report = RefreshReport::new(mode);
        if hashes.is_empty() {
            return report;
        }

        if self.provider.status().await == ProviderStatus::Offline {
            self.events.notify(Notification::Offline);
            report.offline = true;
            return report;
        }

        let network = self.current_network().await;
        let mut updated = Vec::new();

        for hash in hashes {
            let (details, txs) = match self.fetch_address_data(hash).await {
                Ok(data) => data,
                Err(e) => {
                    self.events.notify(Notification::AddressFetchFailed {
                        hash: hash.clone(),
                        reason: e.to_string(),
                    });
                    report.failed.push(hash.clone());
                    continue;
                }
            };

            let mut registry = self.registry.write().await;
            if registry.current_network() != network {
                log::debug!("Network changed while refreshing, dropping data of {}", hash);
                continue;
            }
            let Some(address) = registry.get_mut(hash) else {
                log::debug!("Address {} disappeared while refreshing", hash);
                continue;
            };

            let pending_before = address.transactions.pending.len();
            let details_changed = address.details != details;
            if reload {
                address.transactions.reset_confirmed();
            }
            let added = address.merge_confirmed(1, txs);
            // recomputes the available balance and prunes confirmed pending
            address.set_details(details);
            let pending_after = address.transactions.pending.len();
            drop(registry);

            let confirmed = pending_before.saturating_sub(pending_after);
            if confirmed > 0 {
                log::info!("{} pending transaction(s) of {} confirmed", confirmed, hash);
            }
            report.confirmed_pending += confirmed;
            report.refreshed.push(hash.clone());

            if mode == RefreshMode::User || confirmed > 0 || details_changed || added > 0 {
                updated.push(hash.clone());
            }
        }

        report.should_update = !updated.is_empty();
        self.events.addresses_updated(updated);
        report
    }

    async fn fetch_address_data(
        &self,
        hash: &str,
    ) -> Result<(AddressDetails, Vec<Transaction>), ProviderError> {
        futures::future::try_join(
            self.provider.fetch_address_details(hash),
            self.provider.fetch_confirmed_transactions(hash, 1),
        )
        .await
    }

    /// Load the next page of confirmed history. Returns how many transactions
    /// were new.
    pub async fn fetch_next_transactions_page(&self, hash: &str) -> Result<usize, WalletError> {
        let page = {
            let registry = self.registry.read().await;
            let address = registry
                .get(hash)
                .ok_or_else(|| WalletError::AddressNotFound(hash.to_string()))?;
            if address.transactions.all_pages_loaded {
                return Ok(0);
            }
            address.transactions.loaded_page + 1
        };

        let txs = self.provider.fetch_confirmed_transactions(hash, page).await?;

        let added = {
            let mut registry = self.registry.write().await;
            let address = registry
                .get_mut(hash)
                .ok_or_else(|| WalletError::AddressNotFound(hash.to_string()))?;
            let added = address.merge_confirmed(page, txs);
            address.update_pending_transactions();
            added
        };

        log::debug!("Loaded page {} of {}: {} new transaction(s)", page, hash, added);
        self.events.addresses_updated(vec![hash.to_string()]);
        Ok(added)
    }
}
