//! File upload, download and removal
//!
//! An upload writes the blob first, then the `files` and `project_files`
//! rows in one transaction. If the transaction fails the blob is removed
//! again so storage never holds content without a row pointing at it.

use bytes::Bytes;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::models::file::{CreateFile, CreateProjectFile, File, ProjectFile};
use crate::models::project::Project;
use crate::storage::{checksum, discard, storage_key, BlobStore};

/// Fallback when the client sends no content type
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An incoming upload
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub project_id: Uuid,
    pub uploaded_by: Uuid,
    pub original_name: String,
    pub content_type: Option<String>,
    pub description: Option<String>,
    pub data: Bytes,
}

pub struct FileService;

impl FileService {
    /// Stores the content and records it as a file of the project
    pub async fn upload(
        pool: &PgPool,
        storage: &dyn BlobStore,
        upload: NewUpload,
    ) -> ServiceResult<ProjectFile> {
        if upload.data.is_empty() {
            return Err(ServiceError::Invalid("Uploaded file is empty".to_string()));
        }

        if !Project::exists(pool, upload.project_id).await? {
            return Err(ServiceError::not_found("Project", upload.project_id));
        }

        let key = storage_key(upload.project_id);
        let size_bytes = upload.data.len() as i64;
        let digest = checksum(&upload.data);

        storage.put(&key, upload.data).await?;

        let record = CreateFile {
            original_name: sanitize_filename(&upload.original_name),
            content_type: upload
                .content_type
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            size_bytes,
            checksum: digest,
            storage_key: key.clone(),
            uploaded_by: Some(upload.uploaded_by),
        };

        match Self::insert_rows(pool, record, upload.project_id, upload.description).await {
            Ok(project_file) => {
                tracing::info!(
                    project_file_id = %project_file.id,
                    project_id = %project_file.project_id,
                    size_bytes,
                    backend = storage.name(),
                    "File uploaded"
                );
                Ok(project_file)
            }
            Err(e) => {
                discard(storage, &key).await;
                Err(e.into())
            }
        }
    }

    async fn insert_rows(
        pool: &PgPool,
        record: CreateFile,
        project_id: Uuid,
        description: Option<String>,
    ) -> Result<ProjectFile, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let file = File::create(&mut *tx, record).await?;
        let project_file = ProjectFile::create(
            &mut *tx,
            CreateProjectFile {
                project_id,
                file_id: file.id,
                description,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(project_file)
    }

    pub async fn retrieve(pool: &PgPool, id: Uuid) -> ServiceResult<ProjectFile> {
        ProjectFile::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("ProjectFile", id))
    }

    /// Active files of an existing project
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> ServiceResult<Vec<ProjectFile>> {
        if !Project::exists(pool, project_id).await? {
            return Err(ServiceError::not_found("Project", project_id));
        }

        Ok(ProjectFile::list_active_by_project(pool, project_id).await?)
    }

    /// Metadata plus content of a project file
    pub async fn download(
        pool: &PgPool,
        storage: &dyn BlobStore,
        id: Uuid,
    ) -> ServiceResult<(ProjectFile, Bytes)> {
        let project_file = Self::retrieve(pool, id).await?;
        let data = storage.get(&project_file.storage_key).await?;
        Ok((project_file, data))
    }

    pub async fn deactivate(pool: &PgPool, id: Uuid) -> ServiceResult<ProjectFile> {
        ProjectFile::deactivate(pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("ProjectFile", id))
    }

    /// Removes the attachment, the file row and the blob
    ///
    /// Once the rows are gone the call succeeds even if the blob can't be
    /// removed; the failure is logged.
    pub async fn destroy(pool: &PgPool, storage: &dyn BlobStore, id: Uuid) -> ServiceResult<()> {
        let project_file = Self::retrieve(pool, id).await?;

        let key = File::delete(pool, project_file.file_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("ProjectFile", id))?;

        discard(storage, &key).await;
        tracing::info!(project_file_id = %id, "File deleted");

        Ok(())
    }
}

/// Strips directory components and control characters from a client filename
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "upload".to_string()
    } else {
        cleaned.chars().take(255).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\notes.txt"), "notes.txt");
        assert_eq!(sanitize_filename("a\u{0}b.txt"), "ab.txt");
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("dir/"), "upload");
        assert_eq!(sanitize_filename(".."), "upload");
        assert_eq!(sanitize_filename(&"x".repeat(300)).len(), 255);
    }
}
