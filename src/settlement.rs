//! Settlement detection for pending external payments.
//!
//! After a checkout is launched the only ground truth is the ledger of
//! record: the payment has settled once a credit entry carrying the pending
//! reference appears. [`find_settlement`] is the pure predicate the poll
//! driver evaluates against each freshly fetched page.

use chrono::{DateTime, Utc};

use crate::models::PaymentProvider;
use crate::models::ledger::{Direction, LedgerEntry};

/// An in-flight external payment awaiting ledger confirmation.
///
/// Created when a checkout session is launched, cleared on completion or
/// when the poll schedule is exhausted.
#[derive(Debug, Clone)]
pub struct PendingPayment {
    pub provider: PaymentProvider,
    /// Settlement reference returned by the checkout endpoint. For IAP this
    /// is the store transaction id.
    pub reference: String,
    pub expected_amount_cents: i64,
    /// Checkout launch time; entries older than this can never be the
    /// settlement.
    pub started_at: DateTime<Utc>,
}

/// Scans a ledger page for the entry that settles `pending`.
///
/// An entry qualifies when all of the following hold:
/// - `direction` is credit;
/// - its metadata reference matches the pending reference — `reference` for
///   hosted checkouts, `transaction_id` or `product_id` for IAP;
/// - its amount is within the provider's tolerance of the expected amount;
/// - it occurred at or after the checkout was launched.
///
/// The first qualifying entry in scan order wins; pages arrive newest-first
/// and any qualifying entry is proof of settlement.
pub fn find_settlement<'a>(
    pending: &PendingPayment,
    entries: &'a [LedgerEntry],
) -> Option<&'a LedgerEntry> {
    entries.iter().find(|entry| matches(pending, entry))
}

fn matches(pending: &PendingPayment, entry: &LedgerEntry) -> bool {
    if entry.direction != Direction::Credit {
        return false;
    }
    if entry.occurred_at < pending.started_at {
        return false;
    }
    let amount_delta = (entry.amount_cents - pending.expected_amount_cents).abs();
    if amount_delta > pending.provider.amount_tolerance_cents() {
        return false;
    }
    reference_matches(pending, entry)
}

fn reference_matches(pending: &PendingPayment, entry: &LedgerEntry) -> bool {
    if entry.metadata_str("reference") == Some(pending.reference.as_str()) {
        return true;
    }
    // IAP settlements are keyed by store identifiers rather than a checkout
    // reference.
    pending.provider == PaymentProvider::Iap
        && (entry.metadata_str("transaction_id") == Some(pending.reference.as_str())
            || entry.metadata_str("product_id") == Some(pending.reference.as_str()))
}
