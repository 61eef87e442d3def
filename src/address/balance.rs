//! Available balance accounting under pending transactions

use super::amount::Amount;
use super::transactions::PendingTransaction;

/// Compute the spendable balance of an address.
///
/// A pending sweep or consolidation freezes the balance at `previous_available`
/// because it claims whatever was spendable when it was submitted. Otherwise
/// the pending amounts are subtracted from `total`, missing amounts counting
/// as zero.
///
/// The result never exceeds `total`. Callers are expected to never submit more
/// than what was available; should pending debits exceed the total anyway the
/// result is clamped to zero instead of wrapping.
pub fn available_balance(
    total: &Amount,
    previous_available: &Amount,
    pending: &[PendingTransaction],
) -> Amount {
    if pending.iter().any(|tx| tx.tx_type.claims_all_available()) {
        return previous_available.min(total).clone();
    }

    let pending_sum: Amount = pending.iter().filter_map(|tx| tx.amount.as_ref()).sum();
    total.saturating_sub(&pending_sum)
}
