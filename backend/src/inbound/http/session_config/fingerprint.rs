//! Session key fingerprints.
//!
//! A truncated SHA-256 of the signing half of the key is logged at startup
//! so operators can tell which key a running instance uses without the key
//! itself ever reaching the logs.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// First 8 bytes of the SHA-256 of the signing key, hex encoded.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use entry_watch::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::derive_from(&[7; 64]));
/// assert_eq!(fp.len(), 16);
/// assert_eq!(fp, key_fingerprint(&Key::derive_from(&[7; 64])));
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    digest
        .get(..FINGERPRINT_BYTES)
        .map(hex::encode)
        .unwrap_or_default()
}
