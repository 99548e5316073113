use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Cache key for a request URL.
///
/// URLs contain characters that are unsafe in file names, so the key is the
/// first 16 bytes of the SHA-256 digest, hex encoded.
pub fn url_cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    hex_string(&digest[..16])
}

/// Convert bytes to hex string
fn hex_string(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing into a String cannot fail
        let _ = write!(&mut hex, "{:02x}", byte);
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_cache_key_shape() {
        let key = url_cache_key("https://api.github.com/repos/acme/widget");
        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_url_cache_key_is_stable_and_distinct() {
        let a = url_cache_key("https://api.github.com/repos/acme/widget");
        let b = url_cache_key("https://api.github.com/repos/acme/widget");
        let c = url_cache_key("https://api.github.com/repos/acme/gadget");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_hex_string() {
        assert_eq!(hex_string(&[0x00, 0xab, 0x10]), "00ab10");
    }
}
