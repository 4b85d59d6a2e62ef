//! services/web/src/web/token.rs
//!
//! Signed, time-limited tokens that prove ownership of an email address.
//!
//! A token is `base64url(payload) "." base64url(HMAC-SHA256(secret, payload))`,
//! where the payload is `"<email>:<issued-at unix seconds>"`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::digest::{Key, KeyInit};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("bad signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

/// Expands a secret of any length into the block-sized HMAC key: secrets
/// longer than a block are hashed first, shorter ones are zero-padded.
fn block_key(secret: &[u8]) -> Key<HmacSha256> {
    let mut key = Key::<HmacSha256>::default();
    if secret.len() > key.len() {
        let digest = <Sha256 as sha2::Digest>::digest(secret);
        key[..digest.len()].copy_from_slice(&digest);
    } else {
        key[..secret.len()].copy_from_slice(secret);
    }
    key
}

#[derive(Clone)]
pub struct TokenSigner {
    mac: HmacSha256,
    max_age_secs: i64,
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>, max_age_secs: i64) -> Self {
        Self {
            mac: <HmacSha256 as KeyInit>::new(&block_key(secret.as_ref())),
            max_age_secs,
        }
    }

    pub fn generate(&self, email: &str) -> String {
        self.generate_at(email, Utc::now())
    }

    pub fn generate_at(&self, email: &str, issued_at: DateTime<Utc>) -> String {
        let payload = format!("{}:{}", email, issued_at.timestamp());
        let signature = self.sign(payload.as_bytes());
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(signature)
        )
    }

    /// Returns the email the token was issued for.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let (payload_b64, signature_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;

        self.mac
            .clone()
            .chain_update(&payload)
            .verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let payload = String::from_utf8(payload).map_err(|_| TokenError::Malformed)?;
        let (email, issued_at) = payload.rsplit_once(':').ok_or(TokenError::Malformed)?;
        let issued_at: i64 = issued_at.parse().map_err(|_| TokenError::Malformed)?;

        if now.timestamp() - issued_at > self.max_age_secs {
            return Err(TokenError::Expired);
        }
        Ok(email.to_string())
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        self.mac.clone().chain_update(payload).finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_valid_token_yields_email() {
        let signer = TokenSigner::new("secret", 3600);
        let token = signer.generate("alice@example.com");
        assert_eq!(signer.verify(&token).unwrap(), "alice@example.com");
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = TokenSigner::new("secret", 3600);
        let issued = Utc::now() - Duration::seconds(3601);
        let token = signer.generate_at("alice@example.com", issued);
        assert_eq!(signer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_other_secret_rejected() {
        let token = TokenSigner::new("secret", 3600).generate("alice@example.com");
        let other = TokenSigner::new("different", 3600);
        assert_eq!(other.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let signer = TokenSigner::new("secret", 3600);
        let token = signer.generate("alice@example.com");
        let (_, signature) = token.split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(format!("mallory@example.com:{}", Utc::now().timestamp()));
        let forged = format!("{}.{}", forged_payload, signature);
        assert_eq!(signer.verify(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_block_key_matches_standard_hmac() {
        for secret in [&b"short"[..], &[7u8; 64][..], &[9u8; 150][..]] {
            let expected = <HmacSha256 as Mac>::new_from_slice(secret)
                .unwrap()
                .chain_update(b"payload")
                .finalize()
                .into_bytes();
            let actual = <HmacSha256 as KeyInit>::new(&block_key(secret))
                .chain_update(b"payload")
                .finalize()
                .into_bytes();
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_garbage_is_malformed() {
        let signer = TokenSigner::new("secret", 3600);
        assert_eq!(signer.verify("no-dot-here"), Err(TokenError::Malformed));
        assert_eq!(signer.verify("!!!.???"), Err(TokenError::Malformed));
    }
}
