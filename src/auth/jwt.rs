//! Session token codec
//!
//! Issues and verifies the signed, time-limited bearer tokens binding a user
//! id and role name. Verification is all-or-nothing: a bad signature, a
//! malformed token or an elapsed expiry all fail the same way.

use crate::config::AuthConfig;
use crate::utils::error::{ApiError, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use uuid::Uuid;

/// JWT claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Role name at issuance time; informational — the resolver reloads the
    /// authoritative role from the store on every request
    pub role: Option<String>,
    /// Issued at timestamp
    pub iat: u64,
    /// Expiration timestamp
    pub exp: u64,
}

/// Codec for session tokens
#[derive(Clone)]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    lifetime: u64,
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCodec")
            .field("algorithm", &self.algorithm)
            .field("lifetime", &self.lifetime)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl JwtCodec {
    /// Create a codec from the auth configuration
    pub fn new(config: &AuthConfig) -> Result<Self> {
        if config.jwt_secret.is_empty() {
            return Err(ApiError::config("JWT secret is not configured"));
        }
        let secret = config.jwt_secret.as_bytes();
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            lifetime: config.token_lifetime,
        })
    }

    /// Issue a signed token for a user and role
    pub fn issue(&self, user_id: Uuid, role: Option<&str>) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ApiError::internal(format!("System time error: {}", e)))?
            .as_secs();

        let claims = Claims {
            sub: user_id,
            role: role.map(str::to_string),
            iat: now,
            exp: now + self.lifetime,
        };

        let header = Header::new(self.algorithm);
        let token = encode(&header, &claims, &self.encoding_key).map_err(ApiError::Jwt)?;
        debug!("Issued session token for user: {}", user_id);
        Ok(token)
    }

    /// Verify and decode a token; any failure is terminal for the request
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(self.algorithm);
        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            warn!("Token verification failed: {}", e);
            ApiError::InvalidToken
        })?;
        Ok(token_data.claims)
    }

    /// Configured token lifetime in seconds
    pub fn lifetime(&self) -> u64 {
        self.lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> JwtCodec {
        JwtCodec::new(&AuthConfig {
            jwt_secret: "test-secret-test-secret-test-secret!".to_string(),
            token_lifetime: 3600,
        })
        .unwrap()
    }

    #[test]
    fn test_roundtrip_preserves_subject_and_role() {
        let codec = codec();
        let user_id = Uuid::new_v4();
        let token = codec.issue(user_id, Some("teacher")).unwrap();
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role.as_deref(), Some("teacher"));
    }

    #[test]
    fn test_roundtrip_without_role() {
        let codec = codec();
        let token = codec.issue(Uuid::new_v4(), None).unwrap();
        let claims = codec.verify(&token).unwrap();
        assert!(claims.role.is_none());
    }

    #[test]
    fn test_garbage_token_fails() {
        let codec = codec();
        assert!(matches!(
            codec.verify("garbage"),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn test_tampered_signature_fails() {
        let codec = codec();
        let token = codec.issue(Uuid::new_v4(), Some("admin")).unwrap();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[2] = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string();
        let forged = parts.join(".");
        assert!(matches!(
            codec.verify(&forged),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let codec = codec();
        let other = JwtCodec::new(&AuthConfig {
            jwt_secret: "another-secret-another-secret-another!".to_string(),
            token_lifetime: 3600,
        })
        .unwrap();
        let token = other.issue(Uuid::new_v4(), Some("admin")).unwrap();
        assert!(matches!(codec.verify(&token), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_fails() {
        let codec = codec();
        let past = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            - 7200;
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: Some("admin".to_string()),
            iat: past,
            exp: past + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test-secret-test-secret-test-secret!".as_bytes()),
        )
        .unwrap();
        assert!(matches!(codec.verify(&token), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn test_empty_secret_is_fatal() {
        let result = JwtCodec::new(&AuthConfig {
            jwt_secret: String::new(),
            token_lifetime: 3600,
        });
        assert!(matches!(result, Err(ApiError::Config(_))));
    }
}
