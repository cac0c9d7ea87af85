/// Authentication and authorization utilities
///
/// This module provides the security primitives for ProjectHub:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`jwt`]: Access/refresh token issuing and validation
/// - [`middleware`]: Axum middleware and the [`middleware::AuthContext`] extractor
/// - [`authorization`]: Project role checks
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id (19 MiB memory, 2 iterations)
/// - **JWT Tokens**: HS256, 24h access tokens and 30d refresh tokens
/// - **Project Roles**: Owner > Admin > Member > Viewer
///
/// # Example
///
/// ```no_run
/// use projecthub_shared::auth::password::{hash_password, verify_password};
/// use projecthub_shared::auth::jwt::{JwtKeys, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Str0ng!Passw0rd")?;
/// assert!(verify_password("Str0ng!Passw0rd", &hash)?);
///
/// let keys = JwtKeys::new("a-secret-that-is-at-least-32-bytes-long");
/// let token = keys.issue(Uuid::new_v4(), TokenType::Access)?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
