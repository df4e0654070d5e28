//! Coin transfer (gift) request model.

use serde::Serialize;

/// Receiver of a transfer, addressed either by user id or by account key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Receiver {
    UserId { to_user_id: String },
    AccountKey { receiver_account_key: String },
}

/// Body of `POST /coin/transfer/`.
#[derive(Debug, Clone, Serialize)]
pub struct TransferRequest {
    #[serde(flatten)]
    pub receiver: Receiver,
    pub amount_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
