/// Project model and database operations
///
/// Projects are owned by a user and parent every other collaborative record
/// (comments, files, tags, members, references, likes). Deleting a project
/// cascades to all of them; deactivating only flips `is_active`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(200) NOT NULL,
///     description TEXT,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// A project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,

    /// User who owns the project
    pub owner_id: Uuid,

    pub name: String,

    pub description: Option<String>,

    /// False once the project has been deactivated
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// Full replacement of a project's editable fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProject {
    pub name: String,
    pub description: Option<String>,

    /// New owner; None keeps the current owner
    pub owner_id: Option<Uuid>,
}

impl Project {
    /// Inserts a new, active project
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (owner_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, name, description, is_active, created_at, updated_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.name)
        .bind(data.description)
        .fetch_one(pool)
        .await
    }

    /// Finds a project by ID, active or not
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, owner_id, name, description, is_active, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists every project, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, owner_id, name, description, is_active, created_at, updated_at
            FROM projects
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Overwrites name, description and (optionally) owner
    ///
    /// Returns None if the project doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = $2,
                description = $3,
                owner_id = COALESCE($4, owner_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, name, description, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.owner_id)
        .fetch_optional(pool)
        .await
    }

    /// Sets `is_active = false` and returns the updated row
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, name, description, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Permanently deletes a project and, through cascades, its children
    ///
    /// Takes any executor so it can share a transaction with file cleanup.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks whether a project exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
