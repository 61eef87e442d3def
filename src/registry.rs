//! Network scoped address registry
//!
//! Addresses are keyed by `(hash, network)` so switching networks exposes a
//! disjoint set of entries while the caches of other networks survive.

use std::collections::HashMap;

use crate::address::Address;
use crate::network::NetworkName;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AddressKey {
    pub hash: String,
    pub network: NetworkName,
}

impl AddressKey {
    pub fn new(hash: impl Into<String>, network: NetworkName) -> Self {
        Self {
            hash: hash.into(),
            network,
        }
    }
}

#[derive(Debug)]
pub struct AddressRegistry {
    current_network: NetworkName,
    entries: HashMap<AddressKey, Address>,
}

impl AddressRegistry {
    pub fn new(current_network: NetworkName) -> Self {
        Self {
            current_network,
            entries: HashMap::new(),
        }
    }

    pub fn current_network(&self) -> NetworkName {
        self.current_network
    }

    pub fn set_current_network(&mut self, network: NetworkName) {
        self.current_network = network;
    }

    /// Store addresses under the current network, replacing whole entries.
    ///
    /// Returns `false` without touching the registry when `addresses` is empty.
    pub fn upsert(&mut self, addresses: Vec<Address>) -> bool {
        if addresses.is_empty() {
            return false;
        }
        for mut address in addresses {
            address.network = self.current_network;
            let key = AddressKey::new(address.hash.clone(), self.current_network);
            self.entries.insert(key, address);
        }
        true
    }

    pub fn get(&self, hash: &str) -> Option<&Address> {
        self.entries.get(&AddressKey::new(hash, self.current_network))
    }

    pub fn get_mut(&mut self, hash: &str) -> Option<&mut Address> {
        self.entries.get_mut(&AddressKey::new(hash, self.current_network))
    }

    pub fn get_by_key(&self, key: &AddressKey) -> Option<&Address> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current network entries, ordered by derivation index.
    pub fn addresses_for_current_network(&self) -> Vec<&Address> {
        let mut addresses: Vec<&Address> = self
            .entries
            .values()
            .filter(|address| address.network == self.current_network)
            .collect();
        addresses.sort_by_key(|address| address.index);
        addresses
    }

    /// The main address of the current network.
    ///
    /// Should several entries carry the flag, the lowest index wins.
    pub fn main_address_for_current_network(&self) -> Option<&Address> {
        self.addresses_for_current_network()
            .into_iter()
            .find(|address| address.settings.is_main)
    }

    pub fn addresses_with_pending_sent_transactions(&self) -> Vec<&Address> {
        self.addresses_for_current_network()
            .into_iter()
            .filter(|address| address.has_pending_on(self.current_network))
            .collect()
    }

    /// Hashes the pending transaction reconciler has to look at: senders with
    /// pending transactions and registered recipients of those transactions.
    pub fn hashes_needing_pending_check(&self) -> Vec<String> {
        let senders = self.addresses_with_pending_sent_transactions();
        let mut hashes: Vec<String> = senders.iter().map(|a| a.hash.clone()).collect();

        for sender in &senders {
            for tx in &sender.transactions.pending {
                if tx.network != self.current_network || tx.to_address == sender.hash {
                    continue;
                }
                if self.get(&tx.to_address).is_some() && !hashes.contains(&tx.to_address) {
                    hashes.push(tx.to_address.clone());
                }
            }
        }
        hashes
    }

    /// Indexes already derived for this wallet on the current network.
    pub fn known_indexes(&self) -> Vec<u32> {
        self.addresses_for_current_network()
            .iter()
            .map(|address| address.index)
            .collect()
    }

    /// Drop every entry of every network (session end).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{Amount, AddressSettings, PendingTransaction, PendingTxType};
    use bitcoin::base58;

    fn hash(seed: u8) -> String {
        let mut bytes = vec![0u8];
        bytes.extend_from_slice(&[seed; 32]);
        base58::encode(&bytes)
    }

    fn address(seed: u8, index: u32, is_main: bool) -> Address {
        let settings = AddressSettings {
            is_main,
            ..AddressSettings::default()
        };
        Address::new(hash(seed), "pub", "priv", index, settings, NetworkName::Mainnet).unwrap()
    }

    #[test]
    fn test_upsert_empty_is_noop() {
        let mut registry = AddressRegistry::new(NetworkName::Mainnet);
        assert!(!registry.upsert(Vec::new()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_upsert_stamps_current_network() {
        let mut registry = AddressRegistry::new(NetworkName::Testnet);
        registry.upsert(vec![address(1, 0, false)]);
        let stored = registry
            .get_by_key(&AddressKey::new(hash(1), NetworkName::Testnet))
            .unwrap();
        assert_eq!(stored.network, NetworkName::Testnet);
    }

    #[test]
    fn test_upsert_replaces_whole_entry() {
        let mut registry = AddressRegistry::new(NetworkName::Mainnet);
        let mut first = address(1, 0, false);
        first.settings.label = Some("old".into());
        registry.upsert(vec![first]);

        registry.upsert(vec![address(1, 0, false)]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&hash(1)).unwrap().settings.label, None);
    }

    #[test]
    fn test_network_scoping() {
        let mut registry = AddressRegistry::new(NetworkName::Testnet);
        registry.upsert(vec![address(1, 0, true)]);

        registry.set_current_network(NetworkName::Mainnet);
        assert!(registry.addresses_for_current_network().is_empty());
        assert!(registry.main_address_for_current_network().is_none());
        assert!(registry.get(&hash(1)).is_none());

        registry.upsert(vec![address(1, 0, false)]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.addresses_for_current_network().len(), 1);

        registry.set_current_network(NetworkName::Testnet);
        assert!(registry.main_address_for_current_network().is_some());
    }

    #[test]
    fn test_main_address_lowest_index_wins() {
        let mut registry = AddressRegistry::new(NetworkName::Mainnet);
        registry.upsert(vec![address(3, 5, true), address(2, 1, true), address(1, 0, false)]);
        assert_eq!(registry.main_address_for_current_network().unwrap().index, 1);
    }

    #[test]
    fn test_pending_check_includes_registered_recipients() {
        let mut registry = AddressRegistry::new(NetworkName::Mainnet);
        let mut sender = address(1, 0, true);
        sender.add_pending_transaction(PendingTransaction::new(
            "tx1",
            hash(1),
            hash(2),
            Some(Amount::from(10u64)),
            PendingTxType::Transfer,
            NetworkName::Mainnet,
        ));
        sender.add_pending_transaction(PendingTransaction::new(
            "tx2",
            hash(1),
            hash(9),
            Some(Amount::from(10u64)),
            PendingTxType::Transfer,
            NetworkName::Mainnet,
        ));
        registry.upsert(vec![sender, address(2, 1, false), address(3, 2, false)]);

        assert_eq!(registry.addresses_with_pending_sent_transactions().len(), 1);
        assert_eq!(registry.hashes_needing_pending_check(), vec![hash(1), hash(2)]);
    }

    #[test]
    fn test_pending_of_other_network_is_ignored() {
        let mut registry = AddressRegistry::new(NetworkName::Mainnet);
        let mut sender = address(1, 0, false);
        sender.add_pending_transaction(PendingTransaction::new(
            "tx1",
            hash(1),
            hash(2),
            None,
            PendingTxType::Transfer,
            NetworkName::Testnet,
        ));
        registry.upsert(vec![sender]);
        assert!(registry.hashes_needing_pending_check().is_empty());
    }
}
