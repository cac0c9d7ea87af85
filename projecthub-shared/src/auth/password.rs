//! Password hashing with Argon2id
//!
//! Hashes are stored as PHC strings, so the parameters travel with each hash
//! and verification keeps working if the defaults below change.
//!
//! # Example
//!
//! ```
//! use projecthub_shared::auth::password::{hash_password, verify_password};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("Tr1cky!pass")?;
//! assert!(verify_password("Tr1cky!pass", &hash)?);
//! assert!(!verify_password("wrong", &hash)?);
//! # Ok(())
//! # }
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Memory cost in KiB (19 MiB)
const MEMORY_COST_KIB: u32 = 19_456;
/// Number of passes
const TIME_COST: u32 = 2;
/// Degree of parallelism
const PARALLELISM: u32 = 1;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Stored hash could not be parsed
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),

    /// Verification failed for a reason other than a mismatch
    #[error("Failed to verify password: {0}")]
    VerifyError(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a plaintext password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Checks a plaintext password against a stored PHC hash
///
/// Returns `Ok(false)` on a mismatch and an error only when the stored hash
/// is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Validates password strength
///
/// A password must be at least [`MIN_PASSWORD_LENGTH`] characters, mix upper
/// and lower case letters, contain a digit and a symbol, and must not contain
/// the account's username.
pub fn validate_password_strength(password: &str, username: Option<&str>) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if !password.chars().any(char::is_uppercase) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !password.chars().any(char::is_lowercase) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }

    if password.chars().all(char::is_alphanumeric) {
        return Err("Password must contain at least one special character".to_string());
    }

    if let Some(username) = username.filter(|u| u.len() >= 3) {
        if password.to_lowercase().contains(&username.to_lowercase()) {
            return Err("Password must not contain the username".to_string());
        }
    }

    Ok(())
}
