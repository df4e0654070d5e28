//! Client-side submission rejection: invalid requests never reach the wire.

use slcwallet::WalletError;
use slcwallet::client::WalletClient;
use slcwallet::config::{ApiConfig, AppConfig};
use slcwallet::guard::SubmitError;
use slcwallet::models::transfer::Receiver;

/// Client pointed at a closed port: any request that escapes local
/// validation fails with a transport error instead of a local rejection,
/// which would flunk the asserts below.
fn offline_client() -> WalletClient {
    let config = AppConfig {
        api: ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ws_url: "ws://127.0.0.1:9".to_string(),
            ca_bundle: None,
            access_token: Some("tok-test".to_string()),
        },
    };
    WalletClient::new(&config).expect("client should build")
}

fn receiver() -> Receiver {
    Receiver::UserId {
        to_user_id: "u-99".to_string(),
    }
}

#[tokio::test]
async fn non_positive_transfer_rejected_without_network() {
    let client = offline_client();
    let err = client
        .transfer(receiver(), 0, None, 1_000)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WalletError::Rejected(SubmitError::NonPositiveAmount { .. })
    ));
}

#[tokio::test]
async fn transfer_of_full_balance_rejected_without_network() {
    // balance=1000, amount=1000 — must be strictly less than the balance.
    let client = offline_client();
    let err = client
        .transfer(receiver(), 1_000, None, 1_000)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WalletError::Rejected(SubmitError::ExceedsBalance {
            amount_cents: 1_000,
            balance_cents: 1_000,
        })
    ));
}

#[tokio::test]
async fn unlisted_spend_reference_rejected_without_network() {
    let client = offline_client();
    let err = client
        .spend(100, "product:rocket", None, 1_000)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WalletError::Rejected(SubmitError::ReferenceNotAllowed { .. })
    ));
}

#[tokio::test]
async fn negative_spend_rejected_without_network() {
    let client = offline_client();
    let err = client
        .spend(-1, "product:tip", None, 1_000)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WalletError::Rejected(SubmitError::NonPositiveAmount { .. })
    ));
}

#[tokio::test]
async fn valid_submission_passes_the_guard_and_reaches_transport() {
    let client = offline_client();
    let err = client
        .spend(100, "product:tip", None, 1_000)
        .await
        .unwrap_err();
    // The request was allowed through and failed at the (closed) socket.
    assert!(matches!(err, WalletError::Http(_)));
}
