//! HS256 signing and verification of session claims.

use crate::claim::SessionClaim;
use crate::error::{AuthError, AuthResult, Refusal};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;

/// Minimum secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

const GENERATED_SECRET_LEN: usize = 64;

/// Signs and verifies session tokens with a shared secret.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    /// Creates a signer from raw secret bytes.
    pub fn from_secret(secret: &[u8]) -> AuthResult<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::InvalidSecret(format!(
                "secret is {} bytes, at least {MIN_SECRET_LEN} required",
                secret.len()
            )));
        }

        Ok(Self::with_key(secret))
    }

    /// Creates a signer from a base64-encoded secret.
    pub fn from_base64(secret: &str) -> AuthResult<Self> {
        let bytes = STANDARD
            .decode(secret.trim())
            .map_err(|e| AuthError::InvalidSecret(e.to_string()))?;
        Self::from_secret(&bytes)
    }

    /// Creates a signer with a random secret that lives only as long as the
    /// process.
    #[must_use]
    pub fn generate() -> Self {
        let mut secret = [0u8; GENERATED_SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::with_key(&secret)
    }

    fn with_key(secret: &[u8]) -> Self {
        // Expiry and issuer are checked against the injected clock and the
        // configured issuer, not by the JWT library.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Signs a claim into a compact JWT.
    pub fn sign(&self, claim: &SessionClaim) -> AuthResult<String> {
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claim,
            &self.encoding,
        )?)
    }

    /// Verifies the signature and decodes the claim.
    pub fn verify(&self, token: &str) -> AuthResult<SessionClaim> {
        jsonwebtoken::decode::<SessionClaim>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let refusal = match e.kind() {
                    ErrorKind::InvalidSignature => Refusal::BadSignature,
                    _ => Refusal::Malformed,
                };
                AuthError::Refused(refusal)
            })
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn claim() -> SessionClaim {
        SessionClaim::issue("nonce", "citadel", "alice", 1_000, None)
    }

    #[test]
    fn test_sign_then_verify() {
        let signer = TokenSigner::from_secret(SECRET).unwrap();
        let token = signer.sign(&claim()).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(signer.verify(&token).unwrap(), claim());
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = TokenSigner::from_secret(b"short").unwrap_err();
        assert!(matches!(err, AuthError::InvalidSecret(_)));
    }

    #[test]
    fn test_base64_secret() {
        let encoded = STANDARD.encode(SECRET);
        assert!(TokenSigner::from_base64(&encoded).is_ok());
        assert!(matches!(
            TokenSigner::from_base64("not base64!").unwrap_err(),
            AuthError::InvalidSecret(_)
        ));
    }

    #[test]
    fn test_other_secret_is_bad_signature() {
        let token = TokenSigner::from_secret(SECRET).unwrap().sign(&claim()).unwrap();
        let other = TokenSigner::generate();
        assert!(matches!(
            other.verify(&token).unwrap_err(),
            AuthError::Refused(Refusal::BadSignature)
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let signer = TokenSigner::generate();
        assert!(matches!(
            signer.verify("not-a-token").unwrap_err(),
            AuthError::Refused(Refusal::Malformed)
        ));
    }

    #[test]
    fn test_tampered_payload_is_refused() {
        let signer = TokenSigner::from_secret(SECRET).unwrap();
        let token = signer.sign(&claim()).unwrap();
        let mut parts: Vec<String> = token.split('.').map(ToString::to_string).collect();
        let forged = SessionClaim::issue("nonce", "citadel", "mallory", 1_000, None);
        let forged_json = serde_json::to_vec(&forged).unwrap();
        parts[1] = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(forged_json);

        assert!(matches!(
            signer.verify(&parts.join(".")).unwrap_err(),
            AuthError::Refused(_)
        ));
    }
}
