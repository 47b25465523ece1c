//! Request signing.
//!
//! Every call to the LiblibAI API carries four query parameters proving
//! possession of the secret key: `AccessKey`, `Signature`, `Timestamp` and
//! `SignatureNonce`. The signature is an HMAC-SHA1 over
//! `path & timestamp & nonce`, keyed with the secret and encoded as URL-safe
//! base64 without padding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::distr::Alphanumeric;
use rand::Rng;
use sha1::Sha1;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{LiblibError, Result};

type HmacSha1 = Hmac<Sha1>;

/// Length of the random `SignatureNonce`.
pub const NONCE_LEN: usize = 16;

/// An access key / secret key pair.
///
/// The secret never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_key: String,
    secret_key: String,
}

impl Credential {
    /// Build a credential, rejecting empty keys.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        let access_key = access_key.into();
        let secret_key = secret_key.into();
        if access_key.trim().is_empty() {
            return Err(LiblibError::Configuration("access key is required".into()));
        }
        if secret_key.trim().is_empty() {
            return Err(LiblibError::Configuration("secret key is required".into()));
        }
        Ok(Self {
            access_key,
            secret_key,
        })
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub(crate) fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// A path together with the signature parameters computed for it.
///
/// Valid for a single request only; sign again for the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub path: String,
    pub access_key: String,
    pub signature: String,
    pub timestamp: u64,
    pub nonce: String,
}

impl SignedRequest {
    /// The path with the signature appended as a query string.
    pub fn signed_path(&self) -> String {
        format!(
            "{}?AccessKey={}&Signature={}&Timestamp={}&SignatureNonce={}",
            self.path, self.access_key, self.signature, self.timestamp, self.nonce
        )
    }
}

impl fmt::Display for SignedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signed_path())
    }
}

/// Signs request paths with a fixed credential.
///
/// Holds no mutable state, so one signer can be shared across tasks.
#[derive(Debug, Clone)]
pub struct Signer {
    credential: Credential,
}

impl Signer {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Sign `path` using the current wall-clock time and a fresh nonce.
    pub fn sign(&self, path: &str) -> Result<SignedRequest> {
        self.sign_at(path, SystemTime::now())
    }

    /// Sign `path` as of `now` with a fresh nonce.
    pub fn sign_at(&self, path: &str, now: SystemTime) -> Result<SignedRequest> {
        let timestamp = now
            .duration_since(UNIX_EPOCH)
            .map_err(|_| LiblibError::InvalidInput("system clock is before the Unix epoch".into()))?
            .as_millis() as u64;
        self.sign_with(path, timestamp, &generate_nonce())
    }

    /// Sign `path` with an explicit timestamp and nonce. Pure.
    pub fn sign_with(&self, path: &str, timestamp: u64, nonce: &str) -> Result<SignedRequest> {
        if path.is_empty() {
            return Err(LiblibError::InvalidInput("cannot sign an empty path".into()));
        }
        if path.contains('?') {
            return Err(LiblibError::InvalidInput(format!(
                "path must not carry a query string: {}",
                path
            )));
        }
        let signature = signature(path, self.credential.secret_key(), timestamp, nonce)?;
        Ok(SignedRequest {
            path: path.to_string(),
            access_key: self.credential.access_key().to_string(),
            signature,
            timestamp,
            nonce: nonce.to_string(),
        })
    }
}

/// Compute the URL-safe signature for `path & timestamp & nonce`.
pub fn signature(path: &str, secret_key: &str, timestamp: u64, nonce: &str) -> Result<String> {
    let payload = format!("{}&{}&{}", path, timestamp, nonce);
    let mut mac = HmacSha1::new_from_slice(secret_key.as_bytes())
        .map_err(|e| LiblibError::InvalidInput(format!("unusable secret key: {}", e)))?;
    mac.update(payload.as_bytes());
    // Same as standard base64 with `+`->`-`, `/`->`_` and `=` stripped.
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

/// Generate a 16-character alphanumeric nonce.
pub fn generate_nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    const SECRET: &str = "z7GnvLQUF5IdVWdSepHBx4lk_RqXmjPY";

    fn signer() -> Signer {
        Signer::new(Credential::new("d7owdUWeAxCrB2cnzj6ThA", SECRET).unwrap())
    }

    #[test]
    fn test_golden_signature() {
        let sig = signature(
            "/api/generate/webui/status",
            SECRET,
            1_700_000_000_000,
            "abcdEFGH12345678",
        )
        .unwrap();
        assert_eq!(sig, "WaiFEx26mEPq6DNr-va4HMxPIDk");
    }

    #[test]
    fn test_golden_signature_other_path() {
        let sig = signature(
            "/api/generate/webui/text2img",
            SECRET,
            1_700_000_000_000,
            "abcdEFGH12345678",
        )
        .unwrap();
        assert_eq!(sig, "YspEthQyH5fKGoNzy-Y2bqfuWTQ");
    }

    #[test]
    fn test_sign_with_is_deterministic() {
        let s = signer();
        let a = s.sign_with("/api/x", 42, "nonce").unwrap();
        let b = s.sign_with("/api/x", 42, "nonce").unwrap();
        assert_eq!(a, b);

        let c = s.sign_with("/api/x", 43, "nonce").unwrap();
        assert_ne!(a.signature, c.signature);
        let d = s.sign_with("/api/x", 42, "other").unwrap();
        assert_ne!(a.signature, d.signature);
    }

    #[test]
    fn test_signature_is_url_safe() {
        let s = signer();
        for ts in 0..200u64 {
            let req = s.sign_with("/api/generate/webui/status", ts, "abcdEFGH12345678").unwrap();
            assert!(!req.signature.contains('+'), "{}", req.signature);
            assert!(!req.signature.contains('/'), "{}", req.signature);
            assert!(!req.signature.ends_with('='), "{}", req.signature);
            // SHA-1 digest is 20 bytes -> 27 unpadded base64 chars
            assert_eq!(req.signature.len(), 27);
        }
    }

    #[test]
    fn test_signed_path_format() {
        let req = signer()
            .sign_with("/api/generate/webui/status", 1_700_000_000_000, "abcdEFGH12345678")
            .unwrap();
        assert_eq!(
            req.signed_path(),
            "/api/generate/webui/status?AccessKey=d7owdUWeAxCrB2cnzj6ThA\
             &Signature=WaiFEx26mEPq6DNr-va4HMxPIDk&Timestamp=1700000000000\
             &SignatureNonce=abcdEFGH12345678"
        );
        assert_eq!(req.to_string(), req.signed_path());
    }

    #[test]
    fn test_empty_path_rejected() {
        let err = signer().sign("").unwrap_err();
        assert!(matches!(err, LiblibError::InvalidInput(_)));
    }

    #[test]
    fn test_path_with_query_rejected() {
        let err = signer().sign("/api/x?foo=bar").unwrap_err();
        assert!(matches!(err, LiblibError::InvalidInput(_)));
    }

    #[test]
    fn test_sign_at_uses_millis() {
        let now = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        let req = signer().sign_at("/api/x", now).unwrap();
        assert_eq!(req.timestamp, 1_700_000_000_123);
        assert_eq!(req.nonce.len(), NONCE_LEN);
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let s = signer();
        let a = s.sign("/api/x").unwrap();
        let b = s.sign("/api/x").unwrap();
        assert_ne!(a.nonce, b.nonce);
    }

    #[test]
    fn test_nonce_alphabet_and_uniqueness() {
        let nonces: HashSet<String> = (0..1000).map(|_| generate_nonce()).collect();
        assert_eq!(nonces.len(), 1000);
        for n in &nonces {
            assert_eq!(n.len(), NONCE_LEN);
            assert!(n.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_credential_rejects_empty_keys() {
        assert!(matches!(
            Credential::new("", "secret"),
            Err(LiblibError::Configuration(_))
        ));
        assert!(matches!(
            Credential::new("key", ""),
            Err(LiblibError::Configuration(_))
        ));
        assert!(matches!(
            Credential::new("   ", "secret"),
            Err(LiblibError::Configuration(_))
        ));
    }

    #[test]
    fn test_credential_debug_hides_secret() {
        let cred = Credential::new("ak", "super-secret").unwrap();
        let dbg = format!("{:?}", cred);
        assert!(dbg.contains("ak"));
        assert!(!dbg.contains("super-secret"));
    }
}
