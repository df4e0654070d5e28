//! Authentication flows against the SelfLink backend.
//!
//! Every flow returns a [`TokenPair`] and installs the access token on the
//! client; persisting the pair to the keychain is the caller's choice (see
//! [`persist_tokens`]). A 401 or 403 anywhere in the crate means the session
//! is dead — [`force_logout`] drops the in-memory token and wipes the
//! keychain.

use base64::prelude::*;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::info;

use crate::Result;
use crate::client::WalletClient;
use crate::credentials::{self, CredentialKey};
use crate::models::auth::{
    LoginRequest, RefreshRequest, RegisterRequest, SocialCallbackRequest, SocialProvider, TokenPair,
};

/// `POST /auth/login/`
pub async fn login(client: &WalletClient, request: &LoginRequest) -> Result<TokenPair> {
    let url = client.join("/auth/login/")?;
    let pair: TokenPair = client.post_json(url, request, None).await?;
    client.set_access_token(&pair.access);
    info!("signed in");
    Ok(pair)
}

/// `POST /auth/register/`
pub async fn register(client: &WalletClient, request: &RegisterRequest) -> Result<TokenPair> {
    let url = client.join("/auth/register/")?;
    let pair: TokenPair = client.post_json(url, request, None).await?;
    client.set_access_token(&pair.access);
    info!("account registered");
    Ok(pair)
}

/// `POST /auth/refresh/`
pub async fn refresh(client: &WalletClient, refresh_token: &str) -> Result<TokenPair> {
    let url = client.join("/auth/refresh/")?;
    let request = RefreshRequest {
        refresh: refresh_token.to_string(),
    };
    let pair: TokenPair = client.post_json(url, &request, None).await?;
    client.set_access_token(&pair.access);
    Ok(pair)
}

/// `POST /auth/social/{provider}/callback/`
pub async fn social_callback(
    client: &WalletClient,
    provider: SocialProvider,
    code: &str,
) -> Result<TokenPair> {
    let url = client.join(&format!("/auth/social/{}/callback/", provider.as_str()))?;
    let request = SocialCallbackRequest {
        code: code.to_string(),
    };
    let pair: TokenPair = client.post_json(url, &request, None).await?;
    client.set_access_token(&pair.access);
    info!(provider = provider.as_str(), "signed in via social provider");
    Ok(pair)
}

/// Stores both tokens in the platform keychain.
pub fn persist_tokens(pair: &TokenPair) -> Result<()> {
    credentials::save(CredentialKey::AccessToken, &pair.access)?;
    credentials::save(CredentialKey::RefreshToken, &pair.refresh)
}

/// Drops the in-memory access token and wipes the keychain.
///
/// Called when the backend answers 401/403 (see
/// [`WalletError::requires_logout`](crate::WalletError::requires_logout)).
pub fn force_logout(client: &WalletClient) {
    client.clear_access_token();
    credentials::clear_all();
    info!("session cleared, sign-in required");
}

#[derive(Deserialize)]
struct JwtClaims {
    exp: i64,
}

/// Reads the expiry instant from a JWT access token, or `None` when the
/// token is not a parseable JWT.
///
/// Lets callers refresh proactively instead of waiting for a 401.
pub fn token_expiry(access_token: &str) -> Option<DateTime<Utc>> {
    let payload = access_token.split('.').nth(1)?;
    let bytes = BASE64_URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: JwtClaims = serde_json::from_slice(&bytes).ok()?;
    Utc.timestamp_opt(claims.exp, 0).single()
}
