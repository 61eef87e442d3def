//! Address metadata persistence
//!
//! - `AddressMetadataStore` trait consumed by the address manager
//! - File system implementation
//! - Data models

mod file_system;
mod models;

pub use file_system::FileMetadataStore;
pub use models::AddressMetadata;

use crate::error::StorageError;

pub trait AddressMetadataStore: Send + Sync {
    /// Insert or replace the entry with the same derivation index.
    fn store_address_metadata(
        &self,
        wallet_name: &str,
        metadata: &AddressMetadata,
    ) -> Result<(), StorageError>;

    fn load_address_metadata(&self, wallet_name: &str) -> Result<Vec<AddressMetadata>, StorageError>;

    fn delete_wallet(&self, wallet_name: &str) -> Result<(), StorageError>;
}
