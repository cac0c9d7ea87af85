/// File and ProjectFile models
///
/// Uploaded content is described by two tables: `files` holds the blob
/// metadata (name, type, size, checksum, storage key) and `project_files`
/// attaches a file to a project with its own description and activation flag.
/// A [`ProjectFile`] is always read joined with its `files` row.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE files (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     original_name VARCHAR(255) NOT NULL,
///     content_type VARCHAR(255) NOT NULL,
///     size_bytes BIGINT NOT NULL CHECK (size_bytes >= 0),
///     checksum CHAR(64) NOT NULL,
///     storage_key VARCHAR(512) NOT NULL UNIQUE,
///     uploaded_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE project_files (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     file_id UUID NOT NULL REFERENCES files(id) ON DELETE CASCADE,
///     description TEXT,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The insert functions take any [`sqlx::PgExecutor`] so uploads can write
/// both rows inside one transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Metadata of a stored blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct File {
    pub id: Uuid,

    /// Client-supplied filename, informational only
    pub original_name: String,

    pub content_type: String,

    pub size_bytes: i64,

    /// Hex-encoded SHA-256 of the content
    pub checksum: String,

    /// Key in the blob store, generated server-side
    #[serde(skip_serializing, default)]
    pub storage_key: String,

    /// None once the uploader's account is deleted
    pub uploaded_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

/// Input for recording a stored blob
#[derive(Debug, Clone)]
pub struct CreateFile {
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub checksum: String,
    pub storage_key: String,
    pub uploaded_by: Option<Uuid>,
}

impl File {
    /// Inserts a file row
    pub async fn create<'e, E>(executor: E, data: CreateFile) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, File>(
            r#"
            INSERT INTO files (original_name, content_type, size_bytes, checksum, storage_key, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, original_name, content_type, size_bytes, checksum, storage_key,
                      uploaded_by, created_at
            "#,
        )
        .bind(data.original_name)
        .bind(data.content_type)
        .bind(data.size_bytes)
        .bind(data.checksum)
        .bind(data.storage_key)
        .bind(data.uploaded_by)
        .fetch_one(executor)
        .await
    }

    /// Deletes a file row (cascading to its project attachment) and returns
    /// the storage key so the caller can remove the blob
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<Option<String>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("DELETE FROM files WHERE id = $1 RETURNING storage_key")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Deletes every file attached to a project, returning their storage keys
    ///
    /// `files` has no project column, so project deletion would otherwise
    /// leave these rows behind.
    pub async fn delete_for_project<'e, E>(
        executor: E,
        project_id: Uuid,
    ) -> Result<Vec<String>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            r#"
            DELETE FROM files
            WHERE id IN (SELECT file_id FROM project_files WHERE project_id = $1)
            RETURNING storage_key
            "#,
        )
        .bind(project_id)
        .fetch_all(executor)
        .await
    }
}

/// A file attached to a project, joined with its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectFile {
    pub id: Uuid,
    pub project_id: Uuid,
    pub file_id: Uuid,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,

    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub checksum: String,
    pub uploaded_by: Option<Uuid>,

    #[serde(skip_serializing, default)]
    pub storage_key: String,
}

/// Input for attaching a file to a project
#[derive(Debug, Clone)]
pub struct CreateProjectFile {
    pub project_id: Uuid,
    pub file_id: Uuid,
    pub description: Option<String>,
}

const PROJECT_FILE_COLUMNS: &str = r#"
    pf.id, pf.project_id, pf.file_id, pf.description, pf.is_active, pf.created_at,
    f.original_name, f.content_type, f.size_bytes, f.checksum, f.uploaded_by, f.storage_key
"#;

impl ProjectFile {
    /// Attaches an existing file row to a project
    pub async fn create<'e, E>(executor: E, data: CreateProjectFile) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            r#"
            WITH pf AS (
                INSERT INTO project_files (project_id, file_id, description)
                VALUES ($1, $2, $3)
                RETURNING id, project_id, file_id, description, is_active, created_at
            )
            SELECT {PROJECT_FILE_COLUMNS}
            FROM pf JOIN files f ON f.id = pf.file_id
            "#
        );

        sqlx::query_as::<_, ProjectFile>(&query)
            .bind(data.project_id)
            .bind(data.file_id)
            .bind(data.description)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {PROJECT_FILE_COLUMNS} FROM project_files pf JOIN files f ON f.id = pf.file_id WHERE pf.id = $1"
        );

        sqlx::query_as::<_, ProjectFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active files of a project in upload order
    pub async fn list_active_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {PROJECT_FILE_COLUMNS}
            FROM project_files pf JOIN files f ON f.id = pf.file_id
            WHERE pf.project_id = $1 AND pf.is_active
            ORDER BY pf.created_at ASC
            "#
        );

        sqlx::query_as::<_, ProjectFile>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Soft delete; the blob stays in storage
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            WITH pf AS (
                UPDATE project_files SET is_active = FALSE
                WHERE id = $1
                RETURNING id, project_id, file_id, description, is_active, created_at
            )
            SELECT {PROJECT_FILE_COLUMNS}
            FROM pf JOIN files f ON f.id = pf.file_id
            "#
        );

        sqlx::query_as::<_, ProjectFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
