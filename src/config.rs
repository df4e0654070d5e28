//! Application configuration loaded from environment variables.
//!
//! - `SELFLINK_API_URL` — overrides the default REST base URL
//! - `SELFLINK_WS_URL` — overrides the realtime gift-stream endpoint
//! - `SELFLINK_CA_BUNDLE` — optional path to a pinned CA PEM bundle
//! - `SELFLINK_ACCESS_TOKEN` — optional pre-issued access token
//!   (normally populated from the keychain, see [`crate::credentials`])

use std::path::PathBuf;

/// Default REST base URL.
const DEFAULT_API_URL: &str = "https://api.selflink.app";

/// Default realtime gift-stream endpoint.
const DEFAULT_WS_URL: &str = "wss://rt.selflink.app/gifts";

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
}

/// Backend connection settings.
#[derive(Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub ws_url: String,
    pub ca_bundle: Option<PathBuf>,
    pub access_token: Option<String>,
}

/// Loads the application configuration from environment variables.
///
/// Every variable is optional; empty values are treated as absent.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let base_url = non_empty_var("SELFLINK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let ws_url = non_empty_var("SELFLINK_WS_URL").unwrap_or_else(|| DEFAULT_WS_URL.to_string());
    let ca_bundle = non_empty_var("SELFLINK_CA_BUNDLE").map(PathBuf::from);
    let access_token = non_empty_var("SELFLINK_ACCESS_TOKEN");

    Ok(AppConfig {
        api: ApiConfig {
            base_url,
            ws_url,
            ca_bundle,
            access_token,
        },
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper that temporarily sets env vars, runs `f`, then restores originals.
    ///
    /// # Safety
    ///
    /// Tests using this helper must run with `--test-threads=1` or otherwise
    /// ensure no other threads read these env vars concurrently.
    fn with_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let originals: Vec<(&str, Option<String>)> = vars
            .iter()
            .map(|(k, _)| (*k, std::env::var(k).ok()))
            .collect();

        for (k, v) in vars {
            // SAFETY: config tests run single-threaded (see test runner config).
            unsafe {
                match v {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }

        f();

        for (k, original) in originals {
            // SAFETY: restoring original values, same single-threaded context.
            unsafe {
                match original {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn defaults_without_env_vars() {
        with_env(
            &[
                ("SELFLINK_API_URL", None),
                ("SELFLINK_WS_URL", None),
                ("SELFLINK_CA_BUNDLE", None),
                ("SELFLINK_ACCESS_TOKEN", None),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.api.base_url, DEFAULT_API_URL);
                assert_eq!(config.api.ws_url, DEFAULT_WS_URL);
                assert!(config.api.ca_bundle.is_none());
                assert!(config.api.access_token.is_none());
            },
        );
    }

    #[test]
    fn overrides_from_env() {
        with_env(
            &[
                ("SELFLINK_API_URL", Some("https://staging.selflink.app")),
                ("SELFLINK_WS_URL", Some("wss://staging-rt.selflink.app")),
                ("SELFLINK_CA_BUNDLE", Some("/etc/selflink/ca.pem")),
                ("SELFLINK_ACCESS_TOKEN", Some("tok-1")),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.api.base_url, "https://staging.selflink.app");
                assert_eq!(config.api.ws_url, "wss://staging-rt.selflink.app");
                assert_eq!(
                    config.api.ca_bundle.as_deref(),
                    Some(std::path::Path::new("/etc/selflink/ca.pem"))
                );
                assert_eq!(config.api.access_token.as_deref(), Some("tok-1"));
            },
        );
    }

    #[test]
    fn empty_values_treated_as_absent() {
        with_env(
            &[
                ("SELFLINK_API_URL", Some("")),
                ("SELFLINK_WS_URL", Some("")),
                ("SELFLINK_CA_BUNDLE", Some("")),
                ("SELFLINK_ACCESS_TOKEN", Some("")),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.api.base_url, DEFAULT_API_URL);
                assert_eq!(config.api.ws_url, DEFAULT_WS_URL);
                assert!(config.api.ca_bundle.is_none());
                assert!(config.api.access_token.is_none());
            },
        );
    }
}
