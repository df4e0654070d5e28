//! TLS configuration with a pinned CA bundle.
//!
//! When `SELFLINK_CA_BUNDLE` points at a PEM file, the HTTP client trusts
//! only the certificate authorities in that bundle instead of the platform
//! roots. Deployments pin the CA that signs `api.selflink.app`.

use std::path::Path;

use rustls::ClientConfig;

use crate::Result;

/// Builds a [`ClientConfig`] whose root store contains only the CAs found in
/// the PEM bundle at `path`.
///
/// # Errors
///
/// Returns [`WalletError::Tls`](crate::WalletError::Tls) if the file cannot
/// be read, the PEM cannot be parsed, or it contains no usable certificate.
pub fn build_tls_config(path: &Path) -> Result<ClientConfig> {
    let pem = std::fs::read(path).map_err(|e| {
        crate::WalletError::Tls(format!("failed to read CA bundle {}: {e}", path.display()))
    })?;

    let certs: Vec<_> = rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| crate::WalletError::Tls(format!("failed to parse CA PEM: {e}")))?;

    let mut root_store = rustls::RootCertStore::empty();
    let (added, _) = root_store.add_parsable_certificates(certs);
    if added == 0 {
        return Err(crate::WalletError::Tls(format!(
            "no usable certificates in CA bundle {}",
            path.display()
        )));
    }

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(config)
}
