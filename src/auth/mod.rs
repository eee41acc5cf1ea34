//! Authentication and authorization
//!
//! Every request to a protected route flows through the same chain: bearer
//! token extraction and verification ([`jwt`]), identity resolution against
//! the credential store ([`identity`]), role gating ([`gates`]) and, for
//! entity-scoped operations, ownership checks ([`scope`]).

pub mod gates;
pub mod identity;
pub mod jwt;
pub mod password;
pub mod scope;

use crate::config::AuthConfig;
use crate::utils::error::Result;
use jwt::JwtCodec;

/// Authentication system shared through the application state
#[derive(Clone)]
pub struct AuthSystem {
    jwt: JwtCodec,
}

impl AuthSystem {
    /// Build the auth system; fails at startup when the secret is unusable
    pub fn new(config: &AuthConfig) -> Result<Self> {
        Ok(Self {
            jwt: JwtCodec::new(config)?,
        })
    }

    /// Session token codec
    pub fn jwt(&self) -> &JwtCodec {
        &self.jwt
    }
}
