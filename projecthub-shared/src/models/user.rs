/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(150) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     first_name VARCHAR(150),
///     last_name VARCHAR(150),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use projecthub_shared::models::user::{CreateUser, User};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     username: "ada".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     first_name: Some("Ada".to_string()),
///     last_name: None,
/// }).await?;
///
/// let same = User::find_by_login(&pool, "ADA@example.com").await?;
/// assert_eq!(same.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A user account
///
/// The password hash never leaves the server: it is skipped when serializing.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Unique login name
    pub username: String,

    /// Unique email address, stored lowercase
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    /// Inactive users cannot log in
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,

    /// Normalized to lowercase on insert
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation when the username or email is taken.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name)
            VALUES ($1, LOWER($2), $3, $4, $5)
            RETURNING id, username, email, password_hash, first_name, last_name,
                      is_active, created_at, updated_at, last_login_at
            "#,
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.first_name)
        .bind(data.last_name)
        .fetch_one(pool)
        .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   is_active, created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by username or (case-insensitive) email
    ///
    /// Used by login, which accepts either identifier.
    pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   is_active, created_at, updated_at, last_login_at
            FROM users
            WHERE username = $1 OR email = LOWER($1)
            LIMIT 1
            "#,
        )
        .bind(login)
        .fetch_optional(pool)
        .await
    }

    /// Lists all users, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   is_active, created_at, updated_at, last_login_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Replaces the stored password hash
    ///
    /// Returns false if the user doesn't exist.
    pub async fn set_password_hash(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamps the last login time, called after successful authentication
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user (cascades to owned projects, comments and likes)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            first_name: None,
            last_name: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "ada");
    }
}
