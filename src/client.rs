//! REST client for the SelfLink wallet backend.
//!
//! [`WalletClient`] owns the HTTP connection pool, the bearer token, and the
//! submission guard. Every non-2xx response is classified into an
//! [`ApiError`] before it reaches the caller, so the rest of the crate never
//! touches raw status codes or error JSON.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::Result;
use crate::config::AppConfig;
use crate::error::{ApiError, DomainCode, WalletError};
use crate::guard::TransferGuard;
use crate::models::ErrorEnvelope;
use crate::models::balance::Balance;
use crate::models::ledger::{LedgerEntry, LedgerPage};
use crate::models::spend::SpendRequest;
use crate::models::transfer::{Receiver, TransferRequest};
use crate::poll::WalletBackend;

/// Header carrying the idempotency key on transfer submissions.
const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Tracks the last idempotency nonce issued so every call returns a strictly
/// increasing value even when the wall-clock hasn't advanced.
static LAST_NONCE: AtomicU64 = AtomicU64::new(0);

/// Typed client over the wallet REST API.
pub struct WalletClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: RwLock<Option<String>>,
    guard: Mutex<TransferGuard>,
}

impl WalletClient {
    /// Builds a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Config`] if the base URL does not parse and
    /// [`WalletError::Tls`] if a pinned CA bundle is configured but cannot
    /// be loaded.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let base_url = Url::parse(&config.api.base_url)
            .map_err(|e| WalletError::Config(format!("invalid api base url: {e}")))?;

        let mut builder = reqwest::Client::builder();
        if let Some(bundle) = &config.api.ca_bundle {
            let tls = crate::tls::build_tls_config(bundle)?;
            builder = builder.use_preconfigured_tls(tls);
        }
        let http = builder
            .build()
            .map_err(|e| WalletError::Tls(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            access_token: RwLock::new(config.api.access_token.clone()),
            guard: Mutex::new(TransferGuard::new()),
        })
    }

    /// Installs the access token used for subsequent requests.
    pub fn set_access_token(&self, token: &str) {
        *self.access_token.write().expect("token lock poisoned") = Some(token.to_string());
    }

    /// Drops the access token (forced logout).
    pub fn clear_access_token(&self) {
        *self.access_token.write().expect("token lock poisoned") = None;
    }

    /// `GET /coin/balance/`
    pub async fn balance(&self) -> Result<Balance> {
        let url = self.join("/coin/balance/")?;
        self.get_json(url).await
    }

    /// `GET /coin/ledger/?cursor=&limit=`
    ///
    /// `cursor = None` requests the newest page. A stale cursor surfaces as
    /// [`ApiError::InvalidCursor`], which
    /// [`LedgerPager`](crate::pager::LedgerPager) turns into a full reload.
    pub async fn fetch_ledger(&self, cursor: Option<&str>, limit: u32) -> Result<LedgerPage> {
        let url = ledger_url(&self.base_url, cursor, limit)?;
        self.get_json(url).await
    }

    /// `POST /coin/transfer/`
    ///
    /// Validated locally first: the amount must be positive and strictly
    /// below `balance_cents`. Carries an idempotency key so a retried gift
    /// send cannot double-debit.
    pub async fn transfer(
        &self,
        receiver: Receiver,
        amount_cents: i64,
        note: Option<String>,
        balance_cents: i64,
    ) -> Result<LedgerEntry> {
        self.guard
            .lock()
            .expect("guard lock poisoned")
            .check_transfer(amount_cents, balance_cents)?;

        let request = TransferRequest {
            receiver,
            amount_cents,
            note,
        };
        let key = next_idempotency_key();
        let url = self.join("/coin/transfer/")?;
        let result = self.post_json(url, &request, Some(&key)).await;
        self.note_if_throttled(&result);
        if result.is_ok() {
            info!(amount_cents, "transfer submitted");
        }
        result
    }

    /// `POST /coin/spend/`
    ///
    /// Validated locally first: positive amount, at most the balance, and a
    /// reference inside the allow-list.
    pub async fn spend(
        &self,
        amount_cents: i64,
        reference: &str,
        note: Option<String>,
        balance_cents: i64,
    ) -> Result<LedgerEntry> {
        let reference = self
            .guard
            .lock()
            .expect("guard lock poisoned")
            .check_spend(amount_cents, balance_cents, reference)?;

        let request = SpendRequest {
            amount_cents,
            reference,
            note,
        };
        let url = self.join("/coin/spend/")?;
        let result = self.post_json(url, &request, None).await;
        self.note_if_throttled(&result);
        if result.is_ok() {
            info!(amount_cents, reference = reference.as_str(), "spend submitted");
        }
        result
    }

    fn note_if_throttled<T>(&self, result: &Result<T>) {
        if matches!(result, Err(WalletError::Api(ApiError::Throttled))) {
            self.guard
                .lock()
                .expect("guard lock poisoned")
                .note_throttled();
        }
    }

    pub(crate) fn join(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| WalletError::Config(format!("invalid endpoint path {path:?}: {e}")))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");
        let mut request = self.http.get(url);
        if let Some(token) = self.access_token.read().expect("token lock poisoned").clone() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        Self::parse(response).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
        idempotency_key: Option<&str>,
    ) -> Result<T> {
        debug!(%url, "POST");
        let mut request = self.http.post(url).json(body);
        if let Some(token) = self.access_token.read().expect("token lock poisoned").clone() {
            request = request.bearer_auth(token);
        }
        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_HEADER, key);
        }
        let response = request.send().await?;
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status.as_u16(), &body).into())
    }
}

impl WalletBackend for WalletClient {
    fn fetch_balance(&self) -> impl Future<Output = Result<Balance>> + Send {
        self.balance()
    }

    fn fetch_newest_ledger(&self, limit: u32) -> impl Future<Output = Result<LedgerPage>> + Send {
        self.fetch_ledger(None, limit)
    }
}

/// Builds the ledger endpoint URL, percent-encoding the opaque cursor.
pub(crate) fn ledger_url(base: &Url, cursor: Option<&str>, limit: u32) -> Result<Url> {
    let mut url = base
        .join("/coin/ledger/")
        .map_err(|e| WalletError::Config(format!("invalid ledger path: {e}")))?;
    {
        let mut query = url.query_pairs_mut();
        if let Some(cursor) = cursor {
            query.append_pair("cursor", cursor);
        }
        query.append_pair("limit", &limit.to_string());
    }
    Ok(url)
}

/// Classifies a non-2xx response into an [`ApiError`].
///
/// Status takes precedence (401/403/429/409); after that the error envelope
/// decides: a cursor complaint maps to [`ApiError::InvalidCursor`], a known
/// domain code to [`ApiError::Domain`], field arrays to
/// [`ApiError::Fields`], and anything else to [`ApiError::Unexpected`].
pub(crate) fn classify_error(status: u16, body: &str) -> ApiError {
    match status {
        401 => return ApiError::Unauthorized,
        403 => return ApiError::Forbidden,
        429 => return ApiError::Throttled,
        409 => return ApiError::AlreadyVerifying,
        _ => {}
    }

    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(code) = envelope.code.as_deref() {
            if code == "invalid_cursor" {
                return ApiError::InvalidCursor;
            }
            if let Some(domain) = DomainCode::parse(code) {
                return ApiError::Domain {
                    code: domain,
                    detail: envelope.detail,
                };
            }
        }
        if status == 400
            && let Some(detail) = envelope.detail.as_deref()
            && detail.to_ascii_lowercase().contains("invalid cursor")
        {
            return ApiError::InvalidCursor;
        }
        let fields = envelope.field_errors();
        if !fields.is_empty() {
            return ApiError::Fields(fields);
        }
        if let Some(detail) = envelope.detail {
            return ApiError::Unexpected { status, detail };
        }
    }

    ApiError::Unexpected {
        status,
        detail: body.chars().take(200).collect(),
    }
}

/// Returns a strictly monotonically-increasing idempotency key.
///
/// Uses the wall-clock (nanosecond resolution) as the baseline but
/// guarantees that successive calls always return a larger value, even when
/// the clock resolution is too coarse or the clock jumps backwards.
fn next_idempotency_key() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_nanos() as u64;

    let mut prev = LAST_NONCE.load(Ordering::Relaxed);
    loop {
        let nonce = now.max(prev + 1);
        match LAST_NONCE.compare_exchange_weak(prev, nonce, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return format!("slc-{nonce:x}"),
            Err(actual) => prev = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_url_percent_encodes_cursor() {
        let base = Url::parse("https://api.selflink.app").unwrap();
        let url = ledger_url(&base, Some("opaque:cursor"), 10).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.selflink.app/coin/ledger/?cursor=opaque%3Acursor&limit=10"
        );
    }

    #[test]
    fn ledger_url_without_cursor_omits_parameter() {
        let base = Url::parse("https://api.selflink.app").unwrap();
        let url = ledger_url(&base, None, 25).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.selflink.app/coin/ledger/?limit=25"
        );
    }

    #[test]
    fn status_classification_takes_precedence() {
        assert_eq!(classify_error(401, ""), ApiError::Unauthorized);
        assert_eq!(classify_error(403, "{}"), ApiError::Forbidden);
        assert_eq!(classify_error(429, "slow down"), ApiError::Throttled);
        assert_eq!(classify_error(409, "{}"), ApiError::AlreadyVerifying);
    }

    #[test]
    fn invalid_cursor_by_code_and_by_detail() {
        assert_eq!(
            classify_error(400, r#"{"code": "invalid_cursor"}"#),
            ApiError::InvalidCursor
        );
        assert_eq!(
            classify_error(400, r#"{"detail": "Invalid cursor supplied."}"#),
            ApiError::InvalidCursor
        );
    }

    #[test]
    fn domain_codes_classified() {
        let err = classify_error(
            400,
            r#"{"code": "insufficient_funds", "detail": "balance too low"}"#,
        );
        assert_eq!(
            err,
            ApiError::Domain {
                code: DomainCode::InsufficientFunds,
                detail: Some("balance too low".to_string()),
            }
        );
    }

    #[test]
    fn field_errors_classified() {
        let err = classify_error(400, r#"{"amount_cents": ["must be positive"]}"#);
        match err {
            ApiError::Fields(fields) => {
                assert_eq!(fields["amount_cents"], vec!["must be positive"]);
            }
            other => panic!("expected Fields, got {other:?}"),
        }
    }

    #[test]
    fn unknown_errors_keep_status_and_detail() {
        let err = classify_error(500, r#"{"detail": "server exploded"}"#);
        assert_eq!(
            err,
            ApiError::Unexpected {
                status: 500,
                detail: "server exploded".to_string(),
            }
        );

        let err = classify_error(502, "<html>bad gateway</html>");
        assert!(matches!(err, ApiError::Unexpected { status: 502, .. }));
    }

    #[test]
    fn idempotency_keys_are_unique() {
        let mut prev = next_idempotency_key();
        for _ in 0..1_000 {
            let current = next_idempotency_key();
            assert_ne!(current, prev, "idempotency key repeated");
            prev = current;
        }
    }
}
