//! Wallet configuration from environment variables
//!
//! Controls the Alephium network, the explorer backend endpoint and the
//! pending transaction polling cadence. Defaults to mainnet.

use crate::network::NetworkName;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Interval between two pending transaction checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Number of confirmed transactions requested per page.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

#[derive(Clone, Debug)]
pub struct WalletConfig {
    /// Network selected at startup
    pub network: NetworkName,
    /// Explorer backend base URL
    pub explorer_url: String,
    /// Pending transaction polling interval
    pub poll_interval: Duration,
    /// Per request timeout for the explorer client
    pub request_timeout: Duration,
    /// Confirmed transactions fetched per page
    pub page_limit: u32,
    /// Directory holding per-wallet address metadata
    pub wallet_dir: PathBuf,
}

impl WalletConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `ALEPHIUM_NETWORK`: "mainnet" (default), "testnet" or "localhost"
    /// - `EXPLORER_API_URL`: explorer backend endpoint (defaults per network)
    /// - `PENDING_POLL_INTERVAL_MS`: polling interval in milliseconds (default 2000)
    /// - `REQUEST_TIMEOUT_SECS`: explorer request timeout (default 30)
    /// - `WALLET_DIR`: metadata directory (default "./wallets")
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Watch a local devnet
    /// ALEPHIUM_NETWORK=localhost EXPLORER_API_URL=http://localhost:9090 cargo run -- my-wallet
    /// ```
    pub fn from_env() -> Self {
        let network_str = env::var("ALEPHIUM_NETWORK").unwrap_or_else(|_| "mainnet".to_string());

        let network = match network_str.parse::<NetworkName>() {
            Ok(network) => {
                log::info!("Using {} network", network);
                network
            }
            Err(e) => {
                log::warn!("{}, defaulting to mainnet", e);
                NetworkName::Mainnet
            }
        };

        let explorer_url = env::var("EXPLORER_API_URL").unwrap_or_else(|_| {
            let default_url = network.default_explorer_url().to_string();
            log::info!("Explorer URL: {} ({} default)", default_url, network);
            default_url
        });

        let poll_interval = env::var("PENDING_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let wallet_dir = env::var("WALLET_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./wallets"));

        Self {
            network,
            explorer_url: explorer_url.trim_end_matches('/').to_string(),
            poll_interval,
            request_timeout,
            page_limit: DEFAULT_PAGE_LIMIT,
            wallet_dir,
        }
    }
}

impl Default for WalletConfig {
    /// Default configuration (mainnet)
    fn default() -> Self {
        Self {
            network: NetworkName::Mainnet,
            explorer_url: NetworkName::Mainnet.default_explorer_url().to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: Duration::from_secs(30),
            page_limit: DEFAULT_PAGE_LIMIT,
            wallet_dir: PathBuf::from("./wallets"),
        }
    }
}
