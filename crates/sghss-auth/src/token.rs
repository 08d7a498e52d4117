//! Bearer token issuing and validation.
//!
//! Tokens are HS256 JWTs carrying the account id (as the subject), the
//! username and the role tag. Tokens carry no expiry, matching the access
//! policy this system ships with, so validation does not require `exp`.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Claims carried by an SGHSS bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Account id, stringified.
    pub sub: String,
    /// Login handle.
    pub username: String,
    /// Role tag (medico, admin, recepcionista).
    pub tipo_usuario: String,
}

impl Claims {
    /// Parse the subject back into an account id.
    pub fn account_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Errors from token encode/decode.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    Encoding(jsonwebtoken::errors::Error),

    #[error("Token inválido")]
    Invalid,
}

/// Issues and validates bearer tokens with a symmetric secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Create a token service from the configured secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens are issued without an expiry claim.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token for an account.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] if signing fails.
    pub fn issue(
        &self,
        account_id: i32,
        username: &str,
        user_kind: &str,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: account_id.to_string(),
            username: username.to_string(),
            tipo_usuario: user_kind.to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }

    /// Decode and validate a token, returning its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for any malformed, tampered or
    /// wrongly-signed token.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_decode_roundtrip() {
        let service = TokenService::new("test-secret");
        let token = service.issue(42, "dr.silva", "medico").unwrap();

        let claims = service.decode(&token).unwrap();
        assert_eq!(claims.account_id(), Some(42));
        assert_eq!(claims.username, "dr.silva");
        assert_eq!(claims.tipo_usuario, "medico");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = TokenService::new("secret-a");
        let verifier = TokenService::new("secret-b");

        let token = issuer.issue(1, "admin", "admin").unwrap();
        assert!(matches!(verifier.decode(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let service = TokenService::new("test-secret");
        assert!(matches!(
            service.decode("not.a.token"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_non_numeric_subject_has_no_account_id() {
        let claims = Claims {
            sub: "abc".into(),
            username: "x".into(),
            tipo_usuario: "admin".into(),
        };
        assert_eq!(claims.account_id(), None);
    }
}
