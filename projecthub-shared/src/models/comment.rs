//! Comments left by users on projects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A comment on a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub project_id: Uuid,

    /// Author
    pub user_id: Uuid,

    pub content: String,

    /// False once soft-deleted
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
}

impl Comment {
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (project_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, project_id, user_id, content, is_active, created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.user_id)
        .bind(data.content)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, project_id, user_id, content, is_active, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Active comments of a project in posting order
    pub async fn list_active_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, project_id, user_id, content, is_active, created_at, updated_at
            FROM comments
            WHERE project_id = $1 AND is_active
            ORDER BY created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Replaces the comment text
    pub async fn update_content(
        pool: &PgPool,
        id: Uuid,
        content: String,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, user_id, content, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(pool)
        .await
    }

    /// Soft delete
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, user_id, content, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Hard delete
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
