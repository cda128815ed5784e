//! src/services/token_service.rs
//!
//! TokenService — HS256 signing and verification of bearer tokens against a
//! single shared secret. The serving process only ever calls `verify`;
//! `sign` backs the offline `--issue-token` CLI mode.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::models::claims::Claims;

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Build a TokenService from the shared secret. The secret is read once
    /// at startup and never rotated at runtime.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            // HS256 with default `exp` validation.
            validation: Validation::default(),
        }
    }

    /// Sign a claims set for `subject` with the given role and lifetime.
    pub fn sign(
        &self,
        subject: &str,
        role: &str,
        ttl_secs: u64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + ttl_secs as i64,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Verify signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }
}
