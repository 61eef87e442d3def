use std::fs;
use std::path::PathBuf;

use super::models::AddressMetadata;
use super::AddressMetadataStore;
use crate::error::StorageError;

const ADDRESSES_FILE: &str = "addresses.json";

#[derive(Clone)]
pub struct FileMetadataStore {
    base_path: PathBuf,
}

impl FileMetadataStore {
    /// Create a store rooted at the default directory ("./wallets")
    pub fn new() -> Self {
        Self {
            base_path: PathBuf::from("./wallets"),
        }
    }

    /// Create a store with a custom base directory
    pub fn new_with_base_dir(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn wallet_dir(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    pub fn wallet_exists(&self, name: &str) -> bool {
        self.wallet_dir(name).exists()
    }

    /// List all wallet names in the storage directory
    pub fn list_wallets(&self) -> Result<Vec<String>, StorageError> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut wallets = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    wallets.push(name.to_string());
                }
            }
        }
        wallets.sort();
        Ok(wallets)
    }

    fn write_all(&self, name: &str, entries: &[AddressMetadata]) -> Result<(), StorageError> {
        let wallet_dir = self.wallet_dir(name);
        fs::create_dir_all(&wallet_dir)?;

        let path = wallet_dir.join(ADDRESSES_FILE);
        let tmp_path = wallet_dir.join(format!("{}.tmp", ADDRESSES_FILE));
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&tmp_path, json)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }
}

impl Default for FileMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressMetadataStore for FileMetadataStore {
    fn store_address_metadata(
        &self,
        wallet_name: &str,
        metadata: &AddressMetadata,
    ) -> Result<(), StorageError> {
        let mut entries = self.load_address_metadata(wallet_name)?;

        match entries.iter_mut().find(|entry| entry.index == metadata.index) {
            Some(entry) => *entry = metadata.clone(),
            None => entries.push(metadata.clone()),
        }
        entries.sort_by_key(|entry| entry.index);

        self.write_all(wallet_name, &entries)?;
        log::debug!(
            "Stored metadata of address #{} for wallet '{}'",
            metadata.index,
            wallet_name
        );
        Ok(())
    }

    /// Load metadata, or an empty list if nothing was stored yet
    fn load_address_metadata(&self, wallet_name: &str) -> Result<Vec<AddressMetadata>, StorageError> {
        let path = self.wallet_dir(wallet_name).join(ADDRESSES_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(path)?;
        let entries = serde_json::from_str(&contents)?;
        Ok(entries)
    }

    fn delete_wallet(&self, wallet_name: &str) -> Result<(), StorageError> {
        let wallet_dir = self.wallet_dir(wallet_name);

        if !wallet_dir.exists() {
            return Err(StorageError::FileNotFound(wallet_dir.display().to_string()));
        }

        log::warn!("Deleting wallet directory: {:?}", wallet_dir);
        fs::remove_dir_all(&wallet_dir)?;
        log::info!("Wallet '{}' metadata deleted", wallet_name);

        Ok(())
    }
}
