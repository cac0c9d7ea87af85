//! Authentication middleware for Axum
//!
//! `jwt_auth` validates the `Authorization: Bearer <token>` header, checks
//! that the token's user still exists and is active, and stores an
//! [`AuthContext`] in the request extensions. Handlers then take
//! `AuthContext` as an extractor; when the middleware did not run (or
//! rejected the request) the extractor itself answers 401.
//!
//! # Example
//!
//! ```no_run
//! use axum::{middleware, routing::get, Router};
//! use projecthub_shared::auth::{
//!     jwt::JwtKeys,
//!     middleware::{jwt_auth, AuthContext, Authenticator},
//! };
//! use sqlx::PgPool;
//!
//! async fn whoami(auth: AuthContext) -> String {
//!     auth.user_id.to_string()
//! }
//!
//! fn app(pool: PgPool) -> Router {
//!     let keys = JwtKeys::new("a-secret-that-is-at-least-32-bytes-long");
//!     Router::new()
//!         .route("/me", get(whoami))
//!         .layer(middleware::from_fn_with_state(Authenticator::new(keys, pool), jwt_auth))
//! }
//! ```

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{JwtError, JwtKeys};
use crate::models::user::User;

/// Identity of the caller, added to request extensions after authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not a Bearer token
    #[error("{0}")]
    InvalidFormat(String),

    /// Token rejected
    #[error("{0}")]
    InvalidToken(String),

    /// Token is valid but its user was deleted or deactivated
    #[error("Account is inactive or no longer exists")]
    InactiveAccount,

    /// The user lookup failed
    #[error("Authentication temporarily unavailable")]
    Unavailable(#[from] sqlx::Error),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid token issuer".to_string()),
            other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AuthError::Unavailable(e) => {
                tracing::error!(error = %e, "User lookup failed during authentication");
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
            // Credential failures are 401 so clients know to re-authenticate
            _ => (StatusCode::UNAUTHORIZED, "unauthorized"),
        };

        let body = Json(json!({
            "error": error,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Extracts and validates the bearer token from request headers
pub fn authenticate(headers: &HeaderMap, keys: &JwtKeys) -> Result<AuthContext, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = keys.validate_access(token)?;

    Ok(AuthContext::new(claims.sub))
}

/// State for [`jwt_auth`]: token keys plus the pool used to look up the user
#[derive(Clone)]
pub struct Authenticator {
    pub keys: JwtKeys,
    pub pool: PgPool,
}

impl Authenticator {
    pub fn new(keys: JwtKeys, pool: PgPool) -> Self {
        Self { keys, pool }
    }
}

/// JWT authentication middleware
///
/// Use with `axum::middleware::from_fn_with_state(authenticator, jwt_auth)`.
pub async fn jwt_auth(
    State(authenticator): State<Authenticator>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth = authenticate(req.headers(), &authenticator.keys)?;

    match User::find_by_id(&authenticator.pool, auth.user_id).await? {
        Some(user) if user.is_active => {}
        _ => {
            tracing::debug!(user_id = %auth.user_id, "Token for missing or inactive user");
            return Err(AuthError::InactiveAccount);
        }
    }

    tracing::debug!(user_id = %auth.user_id, "Request authenticated");
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AuthError::MissingCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenType;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authenticate_valid_access_token() {
        let keys = JwtKeys::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id, TokenType::Access).unwrap();

        let auth = authenticate(&headers_with(&format!("Bearer {}", token)), &keys).unwrap();
        assert_eq!(auth.user_id, user_id);
    }

    #[test]
    fn test_authenticate_missing_header() {
        let keys = JwtKeys::new(SECRET);
        assert!(matches!(
            authenticate(&HeaderMap::new(), &keys),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_authenticate_wrong_scheme() {
        let keys = JwtKeys::new(SECRET);
        assert!(matches!(
            authenticate(&headers_with("Basic dXNlcjpwYXNz"), &keys),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_authenticate_rejects_refresh_token() {
        let keys = JwtKeys::new(SECRET);
        let token = keys.issue(Uuid::new_v4(), TokenType::Refresh).unwrap();

        assert!(matches!(
            authenticate(&headers_with(&format!("Bearer {}", token)), &keys),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_auth_errors_are_unauthorized() {
        for err in [
            AuthError::MissingCredentials,
            AuthError::InvalidFormat("x".to_string()),
            AuthError::InvalidToken("y".to_string()),
            AuthError::InactiveAccount,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_lookup_failure_is_service_unavailable() {
        let response = AuthError::Unavailable(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
