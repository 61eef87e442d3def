use serde::{Deserialize, Serialize};
use std::fmt;

use super::amount::Amount;
use super::balance;
use super::group::group_of_address;
use super::transactions::{PendingTransaction, Transaction, TransactionHistory};
use crate::error::WalletError;
use crate::keys::DerivedAddress;
use crate::network::NetworkName;

/// Characters of the hash kept when an address has no label.
const SHORT_HASH_LEN: usize = 10;

/// User controlled settings of an address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSettings {
    #[serde(default)]
    pub label: Option<String>,
    pub color: String,
    #[serde(default)]
    pub is_main: bool,
}

impl Default for AddressSettings {
    fn default() -> Self {
        Self {
            label: None,
            color: "#64f6c2".to_string(),
            is_main: false,
        }
    }
}

/// Latest known on-chain snapshot of an address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDetails {
    pub balance: Amount,
    #[serde(default)]
    pub locked_balance: Amount,
    #[serde(default)]
    pub tx_number: u64,
}

/// One derived address on one network.
#[derive(Clone)]
pub struct Address {
    pub hash: String,
    pub index: u32,
    pub group: u8,
    public_key: String,
    private_key: String,
    pub settings: AddressSettings,
    pub details: AddressDetails,
    pub transactions: TransactionHistory,
    available_balance: Amount,
    pub network: NetworkName,
}

impl Address {
    pub fn new(
        hash: impl Into<String>,
        public_key: impl Into<String>,
        private_key: impl Into<String>,
        index: u32,
        settings: AddressSettings,
        network: NetworkName,
    ) -> Result<Self, WalletError> {
        let hash = hash.into();
        let group = group_of_address(&hash)?;

        Ok(Self {
            hash,
            index,
            group,
            public_key: public_key.into(),
            private_key: private_key.into(),
            settings,
            details: AddressDetails::default(),
            transactions: TransactionHistory::default(),
            available_balance: Amount::zero(),
            network,
        })
    }

    /// Build an address from freshly derived key material.
    pub fn from_derived(
        derived: DerivedAddress,
        settings: AddressSettings,
        network: NetworkName,
    ) -> Result<Self, WalletError> {
        Self::new(
            derived.hash,
            derived.public_key,
            derived.private_key,
            derived.index,
            settings,
            network,
        )
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn available_balance(&self) -> &Amount {
        &self.available_balance
    }

    /// Label if set, otherwise an ellipsized hash.
    pub fn name(&self) -> String {
        match self.settings.label.as_deref() {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => self.short_hash(),
        }
    }

    pub fn short_hash(&self) -> String {
        let prefix: String = self.hash.chars().take(SHORT_HASH_LEN).collect();
        format!("{}...", prefix)
    }

    /// Replace the on-chain snapshot and recompute the spendable balance.
    pub fn set_details(&mut self, details: AddressDetails) {
        let had_pending = !self.transactions.pending.is_empty();
        self.details = details;
        if !had_pending {
            self.available_balance = self.details.balance.clone();
        }
        self.update_pending_transactions();
    }

    /// Merge a page of confirmed transactions.
    ///
    /// The first page is fetched again on every refresh, so only an empty
    /// later page marks the history as complete.
    pub fn merge_confirmed(&mut self, page: u32, txs: Vec<Transaction>) -> usize {
        let history_ends = page > 1 && txs.is_empty();
        let added = self.transactions.merge_confirmed(txs);
        self.transactions.mark_page_loaded(page, history_ends);
        added
    }

    /// Record a transaction submitted from this address.
    ///
    /// No deduplication happens here and the available balance is left
    /// untouched until [`Address::update_pending_transactions`] runs.
    pub fn add_pending_transaction(&mut self, tx: PendingTransaction) {
        self.transactions.pending.push(tx);
    }

    /// Drop pending transactions that now appear as confirmed and recompute
    /// the available balance from what remains.
    pub fn update_pending_transactions(&mut self) {
        let history = &mut self.transactions;
        let confirmed = &history.confirmed;
        history
            .pending
            .retain(|pending| !confirmed.iter().any(|tx| tx.hash == pending.tx_id));

        self.available_balance = balance::available_balance(
            &self.details.balance,
            &self.available_balance,
            &self.transactions.pending,
        );
    }

    pub fn has_pending_on(&self, network: NetworkName) -> bool {
        self.transactions
            .pending
            .iter()
            .any(|tx| tx.network == network)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Address")
            .field("hash", &self.hash)
            .field("index", &self.index)
            .field("group", &self.group)
            .field("private_key", &"<redacted>")
            .field("settings", &self.settings)
            .field("details", &self.details)
            .field("available_balance", &self.available_balance)
            .field("pending", &self.transactions.pending.len())
            .field("confirmed", &self.transactions.confirmed.len())
            .field("network", &self.network)
            .finish()
    }
}
