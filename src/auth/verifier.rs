//! Credential verification.
//!
//! # Responsibilities
//! - Define the verification contract the gate depends on
//! - Validate bearer tokens (signature, expiry) and produce claims
//!
//! # Design Decisions
//! - The identity provider is reachable only through `TokenVerifier`,
//!   so tests can substitute a stub and count calls
//! - Verification answers "is this caller known", nothing more;
//!   role and permission checks belong to the backend services

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::schema::AuthConfig;

/// Identity and metadata carried by a validated credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject the token was issued to.
    #[serde(default)]
    pub sub: String,

    /// Expiry as seconds since the Unix epoch.
    #[serde(default)]
    pub exp: u64,

    /// Issuer, when present in the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Why a credential failed verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("token expired")]
    Expired,

    #[error("token rejected: {0}")]
    Rejected(String),
}

/// Verification contract for bearer credentials.
pub trait TokenVerifier: Send + Sync {
    /// Validate a token and return its claims.
    fn verify(&self, token: &str) -> Result<Claims, VerifyError>;
}

/// JWT verifier (HS256) backed by a shared secret.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Build a verifier from the auth configuration.
    pub fn from_config(config: &AuthConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_secs;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        if let Some(audience) = &config.audience {
            validation.set_audience(&[audience]);
        }

        Self {
            decoding_key,
            validation,
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => VerifyError::Expired,
                _ => VerifyError::Rejected(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn now_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    fn mint(secret: &str, claims: &Claims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn verifier(secret: &str) -> JwtVerifier {
        let config = AuthConfig {
            jwt_secret: secret.into(),
            leeway_secs: 0,
            ..AuthConfig::default()
        };
        JwtVerifier::from_config(&config)
    }

    #[test]
    fn valid_token_yields_claims() {
        let claims = Claims {
            sub: "user-17".into(),
            exp: now_secs() + 600,
            iss: None,
        };
        let token = mint("secret", &claims);
        let verified = verifier("secret").verify(&token).unwrap();
        assert_eq!(verified.sub, "user-17");
    }

    #[test]
    fn expired_token_rejected() {
        let claims = Claims {
            sub: "user-17".into(),
            exp: now_secs() - 3600,
            iss: None,
        };
        let token = mint("secret", &claims);
        assert!(matches!(
            verifier("secret").verify(&token),
            Err(VerifyError::Expired)
        ));
    }

    #[test]
    fn wrong_signature_rejected() {
        let claims = Claims {
            sub: "user-17".into(),
            exp: now_secs() + 600,
            iss: None,
        };
        let token = mint("other-secret", &claims);
        assert!(matches!(
            verifier("secret").verify(&token),
            Err(VerifyError::Rejected(_))
        ));
    }

    #[test]
    fn garbage_token_rejected() {
        assert!(verifier("secret").verify("not-a-jwt").is_err());
    }
}
