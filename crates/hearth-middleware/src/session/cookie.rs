//! Session cookie encoding.
//!
//! Signed values have the form `s:<id>.<signature>`, where the signature is
//! the unpadded URL-safe base64 HMAC-SHA256 of the id. Unsigned values are
//! the bare id.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use http::header::COOKIE;
use http::HeaderMap;
use sha2::Sha256;

use super::SessionError;

type HmacSha256 = Hmac<Sha256>;

const SIGNED_PREFIX: &str = "s:";

/// Signs and verifies cookie values.
#[derive(Clone)]
pub struct CookieSigner {
    mac: HmacSha256,
}

impl CookieSigner {
    /// Creates a signer from a secret.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingSecret`] for an empty secret.
    pub fn new(secret: &str) -> Result<Self, SessionError> {
        if secret.is_empty() {
            return Err(SessionError::MissingSecret);
        }
        let mac =
            HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SessionError::MissingSecret)?;
        Ok(Self { mac })
    }

    /// Produces `s:<value>.<signature>`.
    #[must_use]
    pub fn sign(&self, value: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(value.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{SIGNED_PREFIX}{value}.{signature}")
    }

    /// Returns the inner value if the signature verifies.
    #[must_use]
    pub fn unsign<'v>(&self, signed: &'v str) -> Option<&'v str> {
        let (value, signature) = signed.strip_prefix(SIGNED_PREFIX)?.rsplit_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(value.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(value)
    }
}

impl std::fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSigner").finish_non_exhaustive()
    }
}

/// Finds a cookie by name across every `Cookie` header.
pub(crate) fn find_cookie<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_sign_and_unsign() {
        let signer = CookieSigner::new("keyboard cat").unwrap();
        let signed = signer.sign("abc123");

        assert!(signed.starts_with("s:abc123."));
        assert_eq!(signer.unsign(&signed), Some("abc123"));
    }

    #[test]
    fn test_tampered_value_rejected() {
        let signer = CookieSigner::new("keyboard cat").unwrap();
        let signed = signer.sign("abc123").replace("abc123", "abc124");
        assert_eq!(signer.unsign(&signed), None);
    }

    #[test]
    fn test_other_secret_rejected() {
        let signed = CookieSigner::new("one").unwrap().sign("abc123");
        assert_eq!(CookieSigner::new("two").unwrap().unsign(&signed), None);
    }

    #[test]
    fn test_unsigned_value_rejected() {
        let signer = CookieSigner::new("secret").unwrap();
        assert_eq!(signer.unsign("abc123"), None);
        assert_eq!(signer.unsign("s:abc123"), None);
    }

    #[test]
    fn test_empty_secret() {
        assert_eq!(CookieSigner::new("").unwrap_err(), SessionError::MissingSecret);
    }

    #[test]
    fn test_find_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; sid=abc"));
        headers.append(COOKIE, HeaderValue::from_static("lang=\"en\""));

        assert_eq!(find_cookie(&headers, "sid"), Some("abc"));
        assert_eq!(find_cookie(&headers, "lang"), Some("en"));
        assert_eq!(find_cookie(&headers, "missing"), None);
    }
}
