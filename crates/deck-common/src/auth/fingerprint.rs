//! Device fingerprint derivation

use deck_core::DeviceFingerprint;
use sha2::{Digest, Sha256};

/// Hex characters kept from the digest
const FINGERPRINT_LENGTH: usize = 32;

/// Derive a device fingerprint from request headers.
///
/// SHA-256 over `user_agent|accept_language|accept_encoding`, truncated.
/// Missing headers contribute an empty component.
pub fn derive_fingerprint(
    user_agent: &str,
    accept_language: &str,
    accept_encoding: &str,
) -> DeviceFingerprint {
    let components = [user_agent, accept_language, accept_encoding].join("|");
    let digest = hex::encode(Sha256::digest(components.as_bytes()));
    DeviceFingerprint::new(&digest[..FINGERPRINT_LENGTH])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_and_truncated() {
        let a = derive_fingerprint("Mozilla/5.0", "en-US", "gzip, br");
        let b = derive_fingerprint("Mozilla/5.0", "en-US", "gzip, br");

        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), FINGERPRINT_LENGTH);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_each_header_contributes() {
        let base = derive_fingerprint("Mozilla/5.0", "en-US", "gzip");
        assert_ne!(base, derive_fingerprint("curl/8.0", "en-US", "gzip"));
        assert_ne!(base, derive_fingerprint("Mozilla/5.0", "hi-IN", "gzip"));
        assert_ne!(base, derive_fingerprint("Mozilla/5.0", "en-US", "br"));
    }

    #[test]
    fn test_components_are_delimited() {
        assert_ne!(
            derive_fingerprint("ab", "c", ""),
            derive_fingerprint("a", "bc", "")
        );
    }
}
