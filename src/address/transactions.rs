//! Confirmed and pending transaction records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::amount::Amount;
use crate::network::NetworkName;

/// Input of a confirmed transaction as reported by the explorer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub atto_alph_amount: Option<Amount>,
}

/// Output of a confirmed transaction as reported by the explorer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutput {
    pub address: String,
    pub atto_alph_amount: Amount,
}

/// A finalized transaction sourced from the chain data provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub block_hash: String,
    /// Block timestamp in milliseconds since the epoch
    pub timestamp: u64,
    #[serde(default)]
    pub inputs: Vec<TransactionInput>,
    #[serde(default)]
    pub outputs: Vec<TransactionOutput>,
    #[serde(default)]
    pub gas_amount: u64,
    #[serde(default)]
    pub gas_price: Option<Amount>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingTxType {
    Transfer,
    Sweep,
    Consolidation,
}

impl PendingTxType {
    /// Sweeps and consolidations claim everything spendable at submission time.
    pub fn claims_all_available(&self) -> bool {
        matches!(self, PendingTxType::Sweep | PendingTxType::Consolidation)
    }
}

/// A transaction submitted locally that the network has not confirmed yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransaction {
    pub tx_id: String,
    pub from_address: String,
    pub to_address: String,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(rename = "type")]
    pub tx_type: PendingTxType,
    pub network: NetworkName,
    pub timestamp: DateTime<Utc>,
}

impl PendingTransaction {
    pub fn new(
        tx_id: impl Into<String>,
        from_address: impl Into<String>,
        to_address: impl Into<String>,
        amount: Option<Amount>,
        tx_type: PendingTxType,
        network: NetworkName,
    ) -> Self {
        Self {
            tx_id: tx_id.into(),
            from_address: from_address.into(),
            to_address: to_address.into(),
            amount,
            tx_type,
            network,
            timestamp: Utc::now(),
        }
    }
}

/// Confirmed history, pending set and pagination cursor of one address.
#[derive(Clone, Debug, Default)]
pub struct TransactionHistory {
    /// Newest first, unique by hash
    pub confirmed: Vec<Transaction>,
    pub pending: Vec<PendingTransaction>,
    /// Highest confirmed page fetched so far (0 = none)
    pub loaded_page: u32,
    pub all_pages_loaded: bool,
}

impl TransactionHistory {
    /// Merge a page of confirmed transactions into the history.
    ///
    /// Entries already present are replaced by the incoming copy. Returns the
    /// number of transactions that were not known before.
    pub fn merge_confirmed(&mut self, incoming: Vec<Transaction>) -> usize {
        let mut added = 0;
        for tx in incoming {
            match self.confirmed.iter_mut().find(|known| known.hash == tx.hash) {
                Some(known) => *known = tx,
                None => {
                    self.confirmed.push(tx);
                    added += 1;
                }
            }
        }
        self.confirmed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        added
    }

    /// Record that `page` was fetched. The cursor never moves backwards.
    pub fn mark_page_loaded(&mut self, page: u32, history_ends: bool) {
        self.loaded_page = self.loaded_page.max(page);
        if history_ends {
            self.all_pages_loaded = true;
        }
    }

    /// Drop the confirmed history so the next fetch starts from page one.
    /// Pending transactions are kept.
    pub fn reset_confirmed(&mut self) {
        self.confirmed.clear();
        self.loaded_page = 0;
        self.all_pages_loaded = false;
    }
}
