//! External reference links attached to a project
//!
//! Stored in `project_references` since `references` is reserved in SQL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A titled link with an optional description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reference {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReference {
    pub project_id: Uuid,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
}

impl Reference {
    pub async fn create(pool: &PgPool, data: CreateReference) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Reference>(
            r#"
            INSERT INTO project_references (project_id, title, url, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, title, url, description, created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.title)
        .bind(data.url)
        .bind(data.description)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Reference>(
            r#"
            SELECT id, project_id, title, url, description, created_at, updated_at
            FROM project_references
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Reference>(
            r#"
            SELECT id, project_id, title, url, description, created_at, updated_at
            FROM project_references
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: CreateReference,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Reference>(
            r#"
            UPDATE project_references
            SET project_id = $2, title = $3, url = $4, description = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, title, url, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.project_id)
        .bind(data.title)
        .bind(data.url)
        .bind(data.description)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_references WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
