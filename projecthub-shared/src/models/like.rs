//! Likes: one per (user, project)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLike {
    pub user_id: Uuid,
    pub project_id: Uuid,
}

impl Like {
    /// Fails with a unique violation if the user already likes the project
    pub async fn create(pool: &PgPool, data: CreateLike) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Like>(
            r#"
            INSERT INTO likes (user_id, project_id)
            VALUES ($1, $2)
            RETURNING id, user_id, project_id, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.project_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Like>(
            "SELECT id, user_id, project_id, created_at FROM likes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Like>(
            "SELECT id, user_id, project_id, created_at FROM likes ORDER BY created_at ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Moves a like to another user/project pair
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: CreateLike,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Like>(
            r#"
            UPDATE likes
            SET user_id = $2, project_id = $3
            WHERE id = $1
            RETURNING id, user_id, project_id, created_at
            "#,
        )
        .bind(id)
        .bind(data.user_id)
        .bind(data.project_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM likes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
