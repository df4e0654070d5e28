//! Crate-level error types.
//!
//! [`WalletError`] unifies every error source (configuration, HTTP transport,
//! JSON, normalized API errors) behind a single enum so callers can match on
//! the variant they care about while still using the `?` operator for easy
//! propagation. Backend failures are never surfaced as raw transport errors:
//! [`crate::client::WalletClient`] normalizes every non-2xx response into an
//! [`ApiError`] before it reaches the caller.

use std::collections::HashMap;
use std::fmt;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WalletError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// Configuration was missing, inconsistent, or could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// The request never produced an HTTP response (DNS, TLS, timeout).
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A TLS root bundle could not be read or parsed.
    #[error("tls error: {0}")]
    Tls(String),

    /// The realtime gift stream connection failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// The backend answered with a non-success status, normalized into a
    /// category the UI layer can act on.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A submission was rejected locally before any request was sent.
    #[error(transparent)]
    Rejected(#[from] crate::guard::SubmitError),
}

impl WalletError {
    /// True when the session is no longer usable and the caller must force a
    /// logout (HTTP 401 or 403).
    pub fn requires_logout(&self) -> bool {
        matches!(
            self,
            WalletError::Api(ApiError::Unauthorized) | WalletError::Api(ApiError::Forbidden)
        )
    }
}

/// Normalized backend error, one variant per category the client reacts to.
///
/// The wire shape is a loose envelope (`detail`, `code`, per-field string
/// arrays); [`crate::client`] folds it into these variants so no caller ever
/// inspects raw JSON.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// HTTP 401 — session expired or token invalid. Forces logout.
    #[error("session expired, please sign in again")]
    Unauthorized,

    /// HTTP 403 — authenticated but not allowed. Forces logout.
    #[error("account is not permitted to perform this action")]
    Forbidden,

    /// HTTP 429 — rate limited. Callers enter a local cooldown.
    #[error("too many requests, slow down")]
    Throttled,

    /// HTTP 409 on IAP verification — the purchase is already being
    /// verified. Treated as "enter pending poll state", not failure.
    #[error("purchase is already being verified")]
    AlreadyVerifying,

    /// HTTP 400 with a cursor complaint — pagination state is stale and the
    /// pager must reload from the newest page.
    #[error("pagination cursor is no longer valid")]
    InvalidCursor,

    /// A known domain error code with a fixed user-facing message.
    #[error("{code}")]
    Domain {
        code: DomainCode,
        /// Raw backend detail, kept for logging.
        detail: Option<String>,
    },

    /// Field-level validation errors from a 4xx response.
    #[error("validation failed: {}", format_fields(.0))]
    Fields(HashMap<String, Vec<String>>),

    /// Any other non-success status.
    #[error("request failed with status {status}: {detail}")]
    Unexpected { status: u16, detail: String },
}

fn format_fields(fields: &HashMap<String, Vec<String>>) -> String {
    let mut names: Vec<&str> = fields.keys().map(String::as_str).collect();
    names.sort_unstable();
    names.join(", ")
}

/// Domain error codes shared with the backend, each carrying a fixed
/// user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainCode {
    InsufficientFunds,
    InvalidAmount,
    InvalidReceiver,
    AccountInactive,
    AccountInvalid,
}

impl DomainCode {
    /// Parses a backend `code` value, returning `None` for unknown codes.
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "insufficient_funds" => Some(Self::InsufficientFunds),
            "invalid_amount" => Some(Self::InvalidAmount),
            "invalid_receiver" => Some(Self::InvalidReceiver),
            "account_inactive" => Some(Self::AccountInactive),
            "account_invalid" => Some(Self::AccountInvalid),
            _ => None,
        }
    }

    /// Returns the wire-format code string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InsufficientFunds => "insufficient_funds",
            Self::InvalidAmount => "invalid_amount",
            Self::InvalidReceiver => "invalid_receiver",
            Self::AccountInactive => "account_inactive",
            Self::AccountInvalid => "account_invalid",
        }
    }
}

impl fmt::Display for DomainCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::InsufficientFunds => "not enough SLC for this action",
            Self::InvalidAmount => "that amount is not valid",
            Self::InvalidReceiver => "receiver not found or cannot accept coins",
            Self::AccountInactive => "this wallet account is inactive",
            Self::AccountInvalid => "this wallet account is invalid",
        };
        f.write_str(msg)
    }
}
