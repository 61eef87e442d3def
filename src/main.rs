use alephium_wallet::{
    Address, AddressManager, AddressMetadataStore, ExplorerClient, FileMetadataStore,
    WalletConfig,
};
use anyhow::Context;
use std::env;
use std::sync::Arc;

/// Print a watch-only balance summary of the addresses stored for a wallet.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize logger (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let wallet_name = env::args()
        .nth(1)
        .context("usage: alephium-wallet <wallet-name>")?;

    let config = WalletConfig::from_env();
    let provider = Arc::new(ExplorerClient::from_config(&config)?);
    let store = Arc::new(FileMetadataStore::new_with_base_dir(config.wallet_dir.clone()));

    let entries = store.load_address_metadata(&wallet_name)?;
    if entries.is_empty() {
        anyhow::bail!(
            "no address metadata stored for wallet '{}' in {:?}",
            wallet_name,
            config.wallet_dir
        );
    }

    // keys stay with the crypto provider, a summary only needs hashes
    let addresses = entries
        .iter()
        .map(|entry| Address::new(&entry.hash, "", "", entry.index, entry.settings(), config.network))
        .collect::<Result<Vec<_>, _>>()?;

    // notifications are already logged by the manager
    let (manager, _events) = AddressManager::new(config.network, provider, store);
    manager.upsert_addresses(addresses).await;

    log::info!("Refreshing {} address(es) of '{}' on {}", entries.len(), wallet_name, config.network);
    let report = manager.refresh_all().await;

    if report.offline {
        anyhow::bail!("explorer at {} is offline", config.explorer_url);
    }

    for address in manager.addresses().await {
        log::info!(
            "{}{} #{} (group {}): balance {}, available {}, locked {}, {} transaction(s)",
            address.name(),
            if address.settings.is_main { " [main]" } else { "" },
            address.index,
            address.group,
            address.details.balance,
            address.available_balance(),
            address.details.locked_balance,
            address.details.tx_number
        );
    }

    Ok(())
}
