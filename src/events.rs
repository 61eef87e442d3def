//! Events delivered to the UI adapter
//!
//! Transient failures never escape the refresh boundary as errors; they are
//! turned into [`Notification`]s instead. State changes that deserve a
//! re-render are announced with [`WalletEvent::AddressesUpdated`].

use std::fmt;
use tokio::sync::mpsc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// The chain data provider could not be reached
    Offline,
    /// Fetching data for one address failed
    AddressFetchFailed { hash: String, reason: String },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Offline => {
                f.write_str("Could not fetch data because the wallet is offline")
            }
            Notification::AddressFetchFailed { hash, reason } => {
                write!(f, "Error while fetching data for address {}: {}", hash, reason)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletEvent {
    Notification(Notification),
    AddressesUpdated(Vec<String>),
}

pub type EventReceiver = mpsc::UnboundedReceiver<WalletEvent>;

/// Sending half held by the address manager.
#[derive(Clone, Debug)]
pub struct EventSender(mpsc::UnboundedSender<WalletEvent>);

impl EventSender {
    pub fn channel() -> (EventSender, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSender(tx), rx)
    }

    pub fn notify(&self, notification: Notification) {
        log::warn!("{}", notification);
        self.send(WalletEvent::Notification(notification));
    }

    pub fn addresses_updated(&self, hashes: Vec<String>) {
        if !hashes.is_empty() {
            self.send(WalletEvent::AddressesUpdated(hashes));
        }
    }

    fn send(&self, event: WalletEvent) {
        // a closed receiver only means nobody is rendering anymore
        if self.0.send(event).is_err() {
            log::debug!("Event receiver dropped");
        }
    }
}
