use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role granted to every newly registered user
pub const ROLE_USER: &str = "user";
/// Role allowed to manage other users
pub const ROLE_ADMIN: &str = "admin";

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct JwtClaims {
    pub sub: String,   // Subject (user ID)
    pub email: String, // User email
    pub role: String,  // User role
    pub exp: i64,      // Expiration time
    pub iat: i64,      // Issued at
}

impl JwtClaims {
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

/// Stateless HS256 token issuer and verifier
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expires_in_secs: i64,
}

impl JwtAuth {
    /// Create a JWT auth instance.
    ///
    /// # Example
    /// ```ignore
    /// use axum_helpers::{JwtAuth, JwtConfig};
    /// use core_config::FromEnv;
    ///
    /// let jwt_auth = JwtAuth::new(&JwtConfig::from_env()?);
    /// ```
    pub fn new(config: &JwtConfig) -> Self {
        tracing::info!(expires_in_secs = config.expires_in_secs, "JWT auth initialized");
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            expires_in_secs: config.expires_in_secs,
        }
    }

    /// Sign a token for the given user
    pub fn create_token(&self, user_id: &str, email: &str, role: &str) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            exp: (now + Duration::seconds(self.expires_in_secs)).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Verify JWT token signature and expiry and decode claims
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &self.decoding,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(secret: &str, expires_in_secs: i64) -> JwtAuth {
        JwtAuth::new(&JwtConfig::new(secret).unwrap().with_expires_in(expires_in_secs))
    }

    #[test]
    fn test_token_round_trip() {
        let auth = auth("this-is-a-valid-secret-with-32-chars!", 3600);
        let token = auth.create_token("user-1", "a@b.c", ROLE_ADMIN).unwrap();

        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "a@b.c");
        assert!(claims.has_role(ROLE_ADMIN));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let issuer = auth("this-is-a-valid-secret-with-32-chars!", 3600);
        let verifier = auth("another-valid-secret-with-32-chars!!!", 3600);
        let token = issuer.create_token("user-1", "a@b.c", ROLE_USER).unwrap();

        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = auth("this-is-a-valid-secret-with-32-chars!", -3600);
        let token = auth.create_token("user-1", "a@b.c", ROLE_USER).unwrap();

        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let auth = auth("this-is-a-valid-secret-with-32-chars!", 3600);
        assert!(auth.verify_token("not.a.token").is_err());
    }
}
