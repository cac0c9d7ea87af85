/// Tag and ProjectTag models
///
/// Tags are global labels with unique names; `project_tags` links them to
/// projects, at most once per (project, tag) pair.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(50) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE project_tags (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     tag_id UUID NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT project_tags_project_tag_key UNIQUE (project_id, tag_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A label that can be attached to projects
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Fails with a unique violation if the name is taken
    pub async fn create(pool: &PgPool, name: String) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name, created_at FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All tags, alphabetically
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name, created_at FROM tags ORDER BY name ASC")
            .fetch_all(pool)
            .await
    }

    /// Tags attached to one project, alphabetically
    pub async fn list_for_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name, t.created_at
            FROM tags t
            JOIN project_tags pt ON pt.tag_id = t.id
            WHERE pt.project_id = $1
            ORDER BY t.name ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Deletes a tag and detaches it from every project
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Link between a project and a tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectTag {
    pub id: Uuid,
    pub project_id: Uuid,
    pub tag_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectTag {
    pub project_id: Uuid,
    pub tag_id: Uuid,
}

/// One row of the active-projects-with-tags join
///
/// Projects without tags appear once with `tag_*` set to None.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectTagRow {
    pub project_id: Uuid,
    pub project_name: String,
    pub project_description: Option<String>,
    pub owner_id: Uuid,
    pub tag_id: Option<Uuid>,
    pub tag_name: Option<String>,
}

impl ProjectTag {
    /// Fails with a unique violation if the tag is already attached
    pub async fn create(pool: &PgPool, data: CreateProjectTag) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ProjectTag>(
            r#"
            INSERT INTO project_tags (project_id, tag_id)
            VALUES ($1, $2)
            RETURNING id, project_id, tag_id, created_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.tag_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectTag>(
            "SELECT id, project_id, tag_id, created_at FROM project_tags WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectTag>(
            "SELECT id, project_id, tag_id, created_at FROM project_tags ORDER BY created_at ASC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: CreateProjectTag,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectTag>(
            r#"
            UPDATE project_tags
            SET project_id = $2, tag_id = $3
            WHERE id = $1
            RETURNING id, project_id, tag_id, created_at
            "#,
        )
        .bind(id)
        .bind(data.project_id)
        .bind(data.tag_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_tags WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Every active project left-joined with its tags
    ///
    /// Ordered by project so rows of one project are contiguous.
    pub async fn active_project_rows(pool: &PgPool) -> Result<Vec<ProjectTagRow>, sqlx::Error> {
        sqlx::query_as::<_, ProjectTagRow>(
            r#"
            SELECT p.id AS project_id,
                   p.name AS project_name,
                   p.description AS project_description,
                   p.owner_id,
                   t.id AS tag_id,
                   t.name AS tag_name
            FROM projects p
            LEFT JOIN project_tags pt ON pt.project_id = p.id
            LEFT JOIN tags t ON t.id = pt.tag_id
            WHERE p.is_active
            ORDER BY p.created_at DESC, p.id, t.name
            "#,
        )
        .fetch_all(pool)
        .await
    }
}
