//! Key derivation seam
//!
//! Cryptography lives outside this crate. Address derivation is consumed
//! through [`AddressDeriver`], implemented by the host application on top of
//! its wallet SDK.

use bip39::Mnemonic;
use std::fmt;

use crate::error::WalletError;

/// Constraints for deriving one new address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeriveRequest {
    /// Only accept an address of this group
    pub group: Option<u8>,
    /// Derive exactly this index
    pub index: Option<u32>,
    /// Indexes that must not be returned
    pub skip_indexes: Vec<u32>,
}

/// Key material produced by the crypto provider.
#[derive(Clone)]
pub struct DerivedAddress {
    pub hash: String,
    pub public_key: String,
    pub private_key: String,
    pub index: u32,
}

impl fmt::Debug for DerivedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedAddress")
            .field("hash", &self.hash)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

pub trait AddressDeriver: Send + Sync {
    fn derive(&self, mnemonic: &str, request: &DeriveRequest) -> Result<DerivedAddress, WalletError>;
}

/// Identity of the unlocked wallet.
///
/// Persisting address settings needs a stable wallet identity, so most write
/// operations refuse to run without one.
#[derive(Clone)]
pub struct WalletSession {
    pub wallet_name: String,
    mnemonic: String,
}

impl WalletSession {
    pub fn new(wallet_name: &str, mnemonic: &str) -> Result<Self, WalletError> {
        if wallet_name.trim().is_empty() {
            return Err(WalletError::MissingWalletIdentity("wallet name is empty".into()));
        }
        let parsed = Mnemonic::parse(mnemonic)
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

        Ok(Self {
            wallet_name: wallet_name.to_string(),
            mnemonic: parsed.to_string(),
        })
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("wallet_name", &self.wallet_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_session_validates_mnemonic() {
        assert!(WalletSession::new("main", MNEMONIC).is_ok());
        assert!(matches!(
            WalletSession::new("main", "not a mnemonic"),
            Err(WalletError::InvalidMnemonic(_))
        ));
        assert!(matches!(
            WalletSession::new("  ", MNEMONIC),
            Err(WalletError::MissingWalletIdentity(_))
        ));
    }

    #[test]
    fn test_session_debug_hides_mnemonic() {
        let session = WalletSession::new("main", MNEMONIC).unwrap();
        assert!(!format!("{:?}", session).contains("abandon"));
    }
}
