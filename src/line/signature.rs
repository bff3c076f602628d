use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Checks an `x-line-signature` header value against the channel secret.
///
/// LINE signs the raw request body with HMAC-SHA256 keyed by the channel
/// secret and sends the digest base64-encoded. The comparison must run over
/// the body bytes exactly as received, before any JSON parsing.
pub fn verify(secret: &str, signature: &str, body: &[u8]) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let expected = BASE64.encode(mac.finalize().into_bytes());
    expected == signature
}

/// Computes the signature the way the platform does. Test requests need it
/// to produce headers that pass `verify`.
#[cfg(test)]
pub(crate) fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_signature_accepted() {
        let body = br#"{"events":[]}"#;
        let sig = sign("channel-secret", body);
        assert!(verify("channel-secret", &sig, body));
    }

    #[test]
    fn test_tampered_body_rejected() {
        let sig = sign("channel-secret", br#"{"events":[]}"#);
        assert!(!verify("channel-secret", &sig, br#"{"events":[{}]}"#));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let body = br#"{"events":[]}"#;
        let sig = sign("channel-secret", body);
        assert!(!verify("other-secret", &sig, body));
    }

    #[test]
    fn test_garbage_signature_rejected() {
        assert!(!verify("channel-secret", "not a signature", b"{}"));
        assert!(!verify("channel-secret", "", b"{}"));
    }
}
