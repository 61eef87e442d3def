//! Address model
//!
//! - Amounts and balance accounting
//! - Address groups
//! - Confirmed / pending transaction history
//! - The address entity itself

pub mod amount;
pub mod balance;
pub mod entity;
pub mod group;
pub mod transactions;

pub use amount::Amount;
pub use entity::{Address, AddressDetails, AddressSettings};
pub use group::{group_of_address, TOTAL_NUMBER_OF_GROUPS};
pub use transactions::{
    PendingTransaction, PendingTxType, Transaction, TransactionHistory, TransactionInput,
    TransactionOutput,
};
