//! Checkout-session and IAP verification models.

use serde::{Deserialize, Serialize};

/// Response from a provider checkout-session creation endpoint.
///
/// `payment_url` is opened externally (Stripe/BTCPay/iPay hosted pages);
/// IAP flows never produce one because the platform store runs the checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Settlement reference echoed back in the ledger entry metadata.
    pub reference: String,
    pub amount_cents: i64,
    #[serde(default)]
    pub payment_url: Option<String>,
}

/// Body of a checkout-session creation request.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    pub amount_cents: i64,
}

/// Platform the IAP receipt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IapPlatform {
    AppStore,
    PlayStore,
}

/// Body of `POST /coin/purchase/iap/verify/`.
#[derive(Debug, Clone, Serialize)]
pub struct IapVerifyRequest {
    pub platform: IapPlatform,
    pub product_id: String,
    /// Store transaction identifier (also matched by the settlement check).
    pub transaction_id: String,
    /// Opaque platform receipt / purchase token.
    pub receipt: String,
}
