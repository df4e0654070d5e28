//! Ledger entry and page models.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Direction of a ledger entry relative to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Credit,
    Debit,
}

/// One immutable entry in the SLC ledger of record.
///
/// Created server-side only; the client reads pages and never mutates them.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    /// Identifier of the originating event (shared with realtime delivery).
    pub event_id: String,
    /// Event kind, e.g. `"transfer"`, `"spend"`, `"mint"`, `"refund"`.
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    pub account_key: String,
    pub amount_cents: i64,
    pub currency: String,
    pub direction: Direction,
    #[serde(default)]
    pub note: Option<String>,
    /// Provider- and event-specific payload (settlement references live here).
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl LedgerEntry {
    /// Returns a string field from the entry metadata, if present.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// One page of ledger entries, newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerPage {
    pub results: Vec<LedgerEntry>,
    /// Opaque token for the next page; `None` at the end of the ledger.
    pub next_cursor: Option<String>,
}
