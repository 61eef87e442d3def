//! Network names
//!
//! The same wallet produces independent address state on every network it
//! connects to, so most state in this crate is tagged with a [`NetworkName`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkName {
    Mainnet,
    Testnet,
    Localhost,
    Custom,
}

impl NetworkName {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkName::Mainnet => "mainnet",
            NetworkName::Testnet => "testnet",
            NetworkName::Localhost => "localhost",
            NetworkName::Custom => "custom",
        }
    }

    /// Default explorer backend for this network.
    ///
    /// `Custom` networks have no preset and fall back to the local backend.
    pub fn default_explorer_url(&self) -> &'static str {
        match self {
            NetworkName::Mainnet => "https://backend.mainnet.alephium.org",
            NetworkName::Testnet => "https://backend.testnet.alephium.org",
            NetworkName::Localhost | NetworkName::Custom => "http://localhost:9090",
        }
    }
}

impl fmt::Display for NetworkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" => Ok(NetworkName::Mainnet),
            "testnet" => Ok(NetworkName::Testnet),
            "localhost" => Ok(NetworkName::Localhost),
            "custom" => Ok(NetworkName::Custom),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}
