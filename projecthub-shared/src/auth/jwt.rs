//! JWT issuing and validation
//!
//! Tokens are HS256-signed and carry the user id as `sub`. Two token types
//! exist: short-lived access tokens sent with every request and long-lived
//! refresh tokens that can only be exchanged for a new access token.
//!
//! # Example
//!
//! ```
//! use projecthub_shared::auth::jwt::{JwtKeys, TokenType};
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let keys = JwtKeys::new("a-secret-that-is-at-least-32-bytes-long");
//! let user_id = Uuid::new_v4();
//!
//! let token = keys.issue(user_id, TokenType::Access)?;
//! let claims = keys.validate_access(&token)?;
//! assert_eq!(claims.sub, user_id);
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Value of the `iss` claim on every token
pub const ISSUER: &str = "projecthub";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format or claim validation failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was issued by someone else
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Token is valid but of the wrong type for this use
    #[error("Expected {expected} token, got {actual} token")]
    WrongTokenType {
        expected: TokenType,
        actual: TokenType,
    },
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Sent as `Authorization: Bearer` on API calls
    Access,

    /// Exchanged for new access tokens
    Refresh,
}

impl TokenType {
    /// Lifetime of a freshly issued token of this type
    pub fn lifetime(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Issuer - always [`ISSUER`]
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Access or refresh
    pub token_type: TokenType,
}

impl Claims {
    /// Claims with the default lifetime for `token_type`
    pub fn new(user_id: Uuid, token_type: TokenType) -> Self {
        Self::with_lifetime(user_id, token_type, token_type.lifetime())
    }

    /// Claims with an explicit lifetime (negative values produce expired claims)
    pub fn with_lifetime(user_id: Uuid, token_type: TokenType, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            nbf: now.timestamp(),
            token_type,
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signing and verification keys derived from the shared secret
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

impl JwtKeys {
    /// Derives both keys from `secret`
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs `claims`
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| JwtError::CreateError(e.to_string()))
    }

    /// Issues a token of the given type for `user_id`
    pub fn issue(&self, user_id: Uuid, token_type: TokenType) -> Result<String, JwtError> {
        self.encode(&Claims::new(user_id, token_type))
    }

    /// Verifies signature, expiry, `nbf` and issuer, then returns the claims
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
                _ => JwtError::ValidationError(e.to_string()),
            }
        })?;

        Ok(data.claims)
    }

    /// Validates and requires an access token
    pub fn validate_access(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_typed(token, TokenType::Access)
    }

    /// Validates and requires a refresh token
    pub fn validate_refresh(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_typed(token, TokenType::Refresh)
    }

    /// Exchanges a refresh token for a new access token for the same user
    pub fn refresh(&self, refresh_token: &str) -> Result<String, JwtError> {
        let claims = self.validate_refresh(refresh_token)?;
        self.issue(claims.sub, TokenType::Access)
    }

    fn validate_typed(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let claims = self.validate(token)?;

        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType {
                expected,
                actual: claims.token_type,
            });
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_token_lifetimes() {
        assert_eq!(TokenType::Access.lifetime(), Duration::hours(24));
        assert_eq!(TokenType::Refresh.lifetime(), Duration::days(30));
    }

    #[test]
    fn test_issue_and_validate() {
        let keys = JwtKeys::new(SECRET);
        let user_id = Uuid::new_v4();

        let token = keys.issue(user_id, TokenType::Access).unwrap();
        let claims = keys.validate(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = JwtKeys::new(SECRET)
            .issue(Uuid::new_v4(), TokenType::Access)
            .unwrap();

        let result = JwtKeys::new("another-secret-key-at-least-32-bytes").validate(&token);
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_expired_token() {
        let keys = JwtKeys::new(SECRET);
        let claims =
            Claims::with_lifetime(Uuid::new_v4(), TokenType::Access, Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = keys.encode(&claims).unwrap();
        assert!(matches!(keys.validate(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_foreign_issuer_is_rejected() {
        let keys = JwtKeys::new(SECRET);
        let mut claims = Claims::new(Uuid::new_v4(), TokenType::Access);
        claims.iss = "someone-else".to_string();

        let token = keys.encode(&claims).unwrap();
        assert!(matches!(keys.validate(&token), Err(JwtError::InvalidIssuer)));
    }

    #[test]
    fn test_token_type_is_enforced() {
        let keys = JwtKeys::new(SECRET);
        let access = keys.issue(Uuid::new_v4(), TokenType::Access).unwrap();
        let refresh = keys.issue(Uuid::new_v4(), TokenType::Refresh).unwrap();

        assert!(keys.validate_access(&access).is_ok());
        assert!(keys.validate_refresh(&refresh).is_ok());
        assert!(matches!(
            keys.validate_access(&refresh),
            Err(JwtError::WrongTokenType { .. })
        ));
        assert!(keys.validate_refresh(&access).is_err());
    }

    #[test]
    fn test_refresh_issues_access_token_for_same_user() {
        let keys = JwtKeys::new(SECRET);
        let user_id = Uuid::new_v4();
        let refresh = keys.issue(user_id, TokenType::Refresh).unwrap();

        let access = keys.refresh(&refresh).unwrap();
        let claims = keys.validate_access(&access).unwrap();
        assert_eq!(claims.sub, user_id);

        // An access token cannot be used to refresh
        assert!(keys.refresh(&access).is_err());
    }

    #[test]
    fn test_garbage_token() {
        let keys = JwtKeys::new(SECRET);
        assert!(keys.validate("not.a.jwt").is_err());
    }
}
