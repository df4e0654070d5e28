//! Secure token storage via the platform keychain.
//!
//! Provides functions to load, save, and clear the auth tokens stored in
//! the system keychain. At startup, [`populate_env_from_keychain`] copies
//! any stored access token into `SELFLINK_ACCESS_TOKEN` so the existing
//! config flow picks it up transparently.

use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Keychain service name used for all stored credentials.
const SERVICE: &str = "selflink";

/// Known credential keys managed by this module.
#[derive(Clone, Copy, Debug)]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
}

impl CredentialKey {
    /// Returns the keychain entry identifier.
    pub fn keyring_id(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Returns the environment variable name for this credential.
    pub fn env_var(self) -> &'static str {
        match self {
            Self::AccessToken => "SELFLINK_ACCESS_TOKEN",
            Self::RefreshToken => "SELFLINK_REFRESH_TOKEN",
        }
    }

    /// All credential keys.
    pub const ALL: [CredentialKey; 2] = [Self::AccessToken, Self::RefreshToken];
}

/// Loads a credential from the keychain, returning `None` if not set.
pub fn load(key: CredentialKey) -> Option<Zeroizing<String>> {
    let entry = keyring::Entry::new(SERVICE, key.keyring_id()).ok()?;
    match entry.get_password() {
        Ok(password) => Some(Zeroizing::new(password)),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!(key = key.keyring_id(), error = %e, "failed to read keychain entry");
            None
        }
    }
}

/// Saves a credential to the keychain.
pub fn save(key: CredentialKey, value: &str) -> crate::Result<()> {
    let entry = keyring::Entry::new(SERVICE, key.keyring_id())
        .map_err(|e| crate::WalletError::Config(format!("keyring entry error: {e}")))?;
    entry
        .set_password(value)
        .map_err(|e| crate::WalletError::Config(format!("failed to save to keychain: {e}")))
}

/// Removes every stored credential (forced logout).
pub fn clear_all() {
    for key in CredentialKey::ALL {
        if let Ok(entry) = keyring::Entry::new(SERVICE, key.keyring_id()) {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => {
                    warn!(key = key.keyring_id(), error = %e, "failed to clear keychain entry");
                }
            }
        }
    }
}

/// Populates environment variables from the keychain for any credentials not
/// already set in the environment.
///
/// Call this at startup before [`crate::config::fetch_config`].
pub fn populate_env_from_keychain() {
    for key in CredentialKey::ALL {
        if std::env::var(key.env_var()).is_err()
            && let Some(value) = load(key)
        {
            debug!(key = key.env_var(), "loaded credential from keychain");
            // SAFETY: single-threaded at this point (before tokio runtime starts tasks)
            unsafe {
                std::env::set_var(key.env_var(), value.as_str());
            }
        }
    }
}
