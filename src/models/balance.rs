//! Balance snapshot model.

use serde::Deserialize;

/// Point-in-time SLC balance for one account.
///
/// Always refetched from the backend; never mutated locally except for the
/// optimistic adjustment during a pending gift send, which is reconciled
/// against the next fetch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Balance {
    pub account_key: String,
    pub balance_cents: i64,
    pub currency: String,
}
