//! Client identity derivation.

use gateway_core::ClientIdentity;
use sha2::{Digest, Sha256};
use std::net::SocketAddr;

/// Hex characters kept from the address digest
pub const IDENTITY_LEN: usize = 12;

/// Fallback address when nothing identifies the caller
pub const UNKNOWN_ADDRESS: &str = "unknown";

/// Derive the rate-limit key for a caller address.
///
/// SHA-256 of the address, hex encoded, truncated to [`IDENTITY_LEN`].
#[must_use]
pub fn client_identity(address: &str) -> ClientIdentity {
    let digest = Sha256::digest(address.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(IDENTITY_LEN);
    ClientIdentity::new(hex)
}

/// Resolve the caller address.
///
/// First `X-Forwarded-For` entry, then `X-Real-IP`, then the socket peer.
#[must_use]
pub fn client_address(
    forwarded_for: Option<&str>,
    real_ip: Option<&str>,
    peer: Option<SocketAddr>,
) -> String {
    let non_blank = |ip: &&str| !ip.is_empty();
    forwarded_for
        .and_then(|xff| xff.split(',').next())
        .map(str::trim)
        .filter(non_blank)
        .or_else(|| real_ip.map(str::trim).filter(non_blank))
        .map(String::from)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_stable_and_short() {
        let a = client_identity("203.0.113.7");
        let b = client_identity("203.0.113.7");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), IDENTITY_LEN);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_identity_does_not_contain_address() {
        let id = client_identity("127.0.0.1");
        assert!(!id.as_str().contains("127"));
        assert_ne!(id, client_identity("127.0.0.2"));
    }

    #[test]
    fn test_known_digest_prefix() {
        // sha256("unknown")
        assert_eq!(client_identity("unknown").as_str(), "b23a6a8439c0");
    }

    #[test]
    fn test_address_prefers_forwarded_for() {
        let peer: SocketAddr = "10.0.0.1:5555".parse().unwrap();
        assert_eq!(
            client_address(Some("198.51.100.1, 10.0.0.2"), Some("192.0.2.9"), Some(peer)),
            "198.51.100.1"
        );
        assert_eq!(client_address(None, Some(" 192.0.2.9 "), Some(peer)), "192.0.2.9");
        assert_eq!(client_address(None, None, Some(peer)), "10.0.0.1");
        assert_eq!(client_address(Some(" "), Some("192.0.2.9"), None), "192.0.2.9");
        assert_eq!(client_address(Some(""), None, None), UNKNOWN_ADDRESS);
    }
}
