//! Checkout-session creation and IAP receipt verification.
//!
//! Hosted providers (Stripe, BTCPay, iPay) return a `payment_url` the app
//! opens externally; the returned [`PendingPayment`] is then handed to
//! [`PollRegistry::start`](crate::poll::PollRegistry::start) to watch the
//! ledger for settlement. IAP goes through receipt verification instead: a
//! 409 from the backend means verification is already underway and the
//! caller should enter the same pending-poll state rather than fail.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::Result;
use crate::client::WalletClient;
use crate::error::{ApiError, WalletError};
use crate::models::PaymentProvider;
use crate::models::checkout::{CheckoutRequest, CheckoutSession, IapVerifyRequest};
use crate::models::ledger::LedgerEntry;
use crate::settlement::PendingPayment;

/// Result of an IAP verification call.
#[derive(Debug)]
pub enum IapOutcome {
    /// The backend verified the receipt synchronously and minted the coins.
    Settled(LedgerEntry),
    /// Verification is still running (HTTP 409); poll the ledger.
    Verifying(PendingPayment),
}

/// `POST /coin/purchase/{provider}/` — creates a hosted checkout session.
///
/// Returns the session plus the [`PendingPayment`] context to poll with.
///
/// # Errors
///
/// Returns [`WalletError::Config`] for [`PaymentProvider::Iap`], which has
/// no hosted checkout — use [`verify_iap`].
pub async fn create_checkout(
    client: &WalletClient,
    provider: PaymentProvider,
    amount_cents: i64,
) -> Result<(CheckoutSession, PendingPayment)> {
    if provider == PaymentProvider::Iap {
        return Err(WalletError::Config(
            "IAP purchases verify receipts instead of opening a checkout".to_string(),
        ));
    }

    let url = client.join(&format!("/coin/purchase/{}/", provider.as_str()))?;
    let request = CheckoutRequest { amount_cents };
    let session: CheckoutSession = client.post_json(url, &request, None).await?;
    info!(
        provider = provider.as_str(),
        reference = session.reference,
        amount_cents = session.amount_cents,
        "checkout session created"
    );

    let pending = PendingPayment {
        provider,
        reference: session.reference.clone(),
        expected_amount_cents: session.amount_cents,
        started_at: Utc::now(),
    };
    Ok((session, pending))
}

/// `POST /coin/purchase/iap/verify/` — verifies a platform store receipt.
///
/// `expected_amount_cents` is the SLC value of the purchased product; the
/// settlement check needs it when verification falls back to polling.
pub async fn verify_iap(
    client: &WalletClient,
    request: &IapVerifyRequest,
    expected_amount_cents: i64,
) -> Result<IapOutcome> {
    let url = client.join("/coin/purchase/iap/verify/")?;
    // Taken before the request goes out: on a 409 the mint may have posted
    // while this call was in flight, and the settlement check rejects
    // entries older than this instant.
    let started_at = Utc::now();
    let result = client.post_json::<_, LedgerEntry>(url, request, None).await;
    iap_outcome(result, request, expected_amount_cents, started_at)
}

/// Maps the verify response to an [`IapOutcome`]: a 409 means verification
/// is already underway server-side and becomes a pending-poll context
/// rather than an error.
fn iap_outcome(
    result: Result<LedgerEntry>,
    request: &IapVerifyRequest,
    expected_amount_cents: i64,
    started_at: DateTime<Utc>,
) -> Result<IapOutcome> {
    match result {
        Ok(entry) => {
            info!(entry_id = entry.id, "IAP receipt verified");
            Ok(IapOutcome::Settled(entry))
        }
        Err(WalletError::Api(ApiError::AlreadyVerifying)) => {
            info!(
                transaction_id = request.transaction_id,
                "IAP verification already in progress, entering pending poll"
            );
            Ok(IapOutcome::Verifying(PendingPayment {
                provider: PaymentProvider::Iap,
                reference: request.transaction_id.clone(),
                expected_amount_cents,
                started_at,
            }))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::checkout::IapPlatform;
    use crate::models::ledger::{Direction, LedgerEntry};

    fn verify_request() -> IapVerifyRequest {
        IapVerifyRequest {
            platform: IapPlatform::AppStore,
            product_id: "coins_500".to_string(),
            transaction_id: "txn-42".to_string(),
            receipt: "receipt-blob".to_string(),
        }
    }

    fn minted_entry() -> LedgerEntry {
        LedgerEntry {
            id: "le-1".to_string(),
            event_id: "evt-1".to_string(),
            event_type: "mint".to_string(),
            occurred_at: Utc::now(),
            account_key: "acct-1".to_string(),
            amount_cents: 500,
            currency: "SLC".to_string(),
            direction: Direction::Credit,
            note: None,
            metadata: serde_json::json!({ "transaction_id": "txn-42" }),
        }
    }

    #[test]
    fn synchronous_verification_settles() {
        let outcome =
            iap_outcome(Ok(minted_entry()), &verify_request(), 500, Utc::now()).unwrap();
        match outcome {
            IapOutcome::Settled(entry) => assert_eq!(entry.id, "le-1"),
            other => panic!("expected Settled, got {other:?}"),
        }
    }

    #[test]
    fn already_verifying_becomes_pending_poll_context() {
        let started_at = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        let outcome = iap_outcome(
            Err(WalletError::Api(ApiError::AlreadyVerifying)),
            &verify_request(),
            500,
            started_at,
        )
        .unwrap();
        match outcome {
            IapOutcome::Verifying(pending) => {
                assert_eq!(pending.provider, PaymentProvider::Iap);
                assert_eq!(pending.reference, "txn-42");
                assert_eq!(pending.expected_amount_cents, 500);
                // The pre-request instant, so a mint posted mid-flight
                // still passes the settlement recency check.
                assert_eq!(pending.started_at, started_at);
            }
            other => panic!("expected Verifying, got {other:?}"),
        }
    }

    #[test]
    fn other_errors_still_fail() {
        let result = iap_outcome(
            Err(WalletError::Api(ApiError::Throttled)),
            &verify_request(),
            500,
            Utc::now(),
        );
        assert!(matches!(
            result,
            Err(WalletError::Api(ApiError::Throttled))
        ));
    }
}
