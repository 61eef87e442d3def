//! Data models for address metadata storage

use serde::{Deserialize, Serialize};

use crate::address::{Address, AddressSettings};

/// Persisted settings of one derived address. Never carries key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressMetadata {
    pub index: u32,
    pub hash: String,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default)]
    pub label: Option<String>,
    pub color: String,
}

impl AddressMetadata {
    pub fn settings(&self) -> AddressSettings {
        AddressSettings {
            label: self.label.clone(),
            color: self.color.clone(),
            is_main: self.is_main,
        }
    }
}

impl From<&Address> for AddressMetadata {
    fn from(address: &Address) -> Self {
        Self {
            index: address.index,
            hash: address.hash.clone(),
            is_main: address.settings.is_main,
            label: address.settings.label.clone(),
            color: address.settings.color.clone(),
        }
    }
}
