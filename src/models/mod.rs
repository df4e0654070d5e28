//! Wire models for the SelfLink wallet REST API.
//!
//! Contains the payment-provider enumeration, the backend error envelope,
//! and per-endpoint request/response types in the submodules.

pub mod auth;
pub mod balance;
pub mod checkout;
pub mod gift;
pub mod ledger;
pub mod spend;
pub mod transfer;

use std::collections::HashMap;

use serde::Deserialize;

/// External payment providers that can mint SLC into the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentProvider {
    /// Platform in-app purchase (App Store / Play Store receipts).
    Iap,
    Stripe,
    BtcPay,
    IPay,
}

impl PaymentProvider {
    /// Returns the wire-format provider name used in URLs and metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProvider::Iap => "iap",
            PaymentProvider::Stripe => "stripe",
            PaymentProvider::BtcPay => "btcpay",
            PaymentProvider::IPay => "ipay",
        }
    }

    /// Settlement amount tolerance in cents.
    ///
    /// BTCPay invoices settle from satoshi conversions and may land one cent
    /// off the quoted amount; every other provider settles exactly.
    pub fn amount_tolerance_cents(&self) -> i64 {
        match self {
            PaymentProvider::BtcPay => 1,
            _ => 0,
        }
    }

    /// All providers, in checkout display order.
    pub const ALL: [PaymentProvider; 4] = [
        PaymentProvider::Iap,
        PaymentProvider::Stripe,
        PaymentProvider::BtcPay,
        PaymentProvider::IPay,
    ];
}

/// Raw backend error envelope: `{detail?, code?, <field>: [..]}`.
///
/// Any top-level key other than `detail`/`code` whose value is an array of
/// strings is treated as a field-level validation error.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ErrorEnvelope {
    /// Extracts field-name → messages pairs from the envelope's extra keys.
    pub fn field_errors(&self) -> HashMap<String, Vec<String>> {
        let mut fields = HashMap::new();
        for (name, value) in &self.extra {
            if let Some(items) = value.as_array() {
                let messages: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect();
                if !messages.is_empty() {
                    fields.insert(name.clone(), messages);
                }
            }
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_wire_names() {
        assert_eq!(PaymentProvider::Iap.as_str(), "iap");
        assert_eq!(PaymentProvider::Stripe.as_str(), "stripe");
        assert_eq!(PaymentProvider::BtcPay.as_str(), "btcpay");
        assert_eq!(PaymentProvider::IPay.as_str(), "ipay");
    }

    #[test]
    fn only_btcpay_tolerates_rounding() {
        assert_eq!(PaymentProvider::BtcPay.amount_tolerance_cents(), 1);
        assert_eq!(PaymentProvider::Stripe.amount_tolerance_cents(), 0);
        assert_eq!(PaymentProvider::Iap.amount_tolerance_cents(), 0);
        assert_eq!(PaymentProvider::IPay.amount_tolerance_cents(), 0);
    }

    #[test]
    fn envelope_collects_field_arrays() {
        let envelope: ErrorEnvelope = serde_json::from_str(
            r#"{"detail": "bad request", "amount_cents": ["must be positive"], "count": 3}"#,
        )
        .unwrap();
        assert_eq!(envelope.detail.as_deref(), Some("bad request"));
        let fields = envelope.field_errors();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["amount_cents"], vec!["must be positive"]);
    }
}
