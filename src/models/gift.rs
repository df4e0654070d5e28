//! Realtime gift-event wire model.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A coin-gift notification delivered over the realtime channel.
///
/// The transport is at-least-once; `event_id` matches the ledger entry's
/// `event_id` and is the deduplication key.
#[derive(Debug, Clone, Deserialize)]
pub struct GiftEvent {
    pub event_id: String,
    pub from_user_id: String,
    pub to_account_key: String,
    pub amount_cents: i64,
    pub currency: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
}
