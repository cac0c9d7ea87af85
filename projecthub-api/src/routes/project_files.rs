/// Project file endpoints
///
/// - `POST /v1/project-files` - Multipart upload (`project`, `file`, optional `description`)
/// - `GET /v1/project-files/:id` - File metadata
/// - `GET /v1/project-files/:id/download` - File content
/// - `POST /v1/project-files/:id/deactivate` - Soft delete
/// - `DELETE /v1/project-files/:id` - Remove row, file record and blob
///
/// Uploading needs write permission on the project; deactivating and
/// deleting are open to the uploader and to project managers.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail, REQUIRED_FIELD},
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use projecthub_shared::{
    auth::{
        authorization::{self, ProjectPermission},
        middleware::AuthContext,
    },
    models::file::ProjectFile,
    services::file::{FileService, NewUpload, DEFAULT_CONTENT_TYPE},
};
use uuid::Uuid;

/// Parts of an upload form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub project: Option<Uuid>,
    pub file: Option<UploadedPart>,
    pub description: Option<String>,
}

/// The `file` part of an upload form
#[derive(Debug)]
pub struct UploadedPart {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Reads the multipart fields an upload understands; others are skipped
pub async fn read_upload_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UploadForm> {
    let mut multipart = multipart.map_err(|r| ApiError::BadRequest(r.body_text()))?;
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;

                form.file = Some(UploadedPart {
                    file_name,
                    content_type,
                    data,
                });
            }
            "project" | "project_id" => {
                let text = field.text().await?;
                let id = Uuid::parse_str(text.trim())
                    .map_err(|_| ApiError::field("project", "Must be a valid UUID."))?;
                form.project = Some(id);
            }
            "description" => {
                let text = field.text().await?;
                form.description = Some(text).filter(|t| !t.trim().is_empty());
            }
            _ => tracing::debug!(field = %name, "Skipping unknown multipart field"),
        }
    }

    Ok(form)
}

/// Turns a parsed `file` part into an upload for `project_id`
pub fn into_upload(
    auth: &AuthContext,
    project_id: Uuid,
    part: UploadedPart,
    description: Option<String>,
) -> NewUpload {
    NewUpload {
        project_id,
        uploaded_by: auth.user_id,
        original_name: part.file_name,
        content_type: part.content_type,
        description,
        data: part.data,
    }
}

/// Upload a file to a project
///
/// # Errors
///
/// - `400 Bad Request`: Missing `project`/`file` parts or empty file
/// - `403 Forbidden`: No write permission on the project
/// - `404 Not Found`: Project doesn't exist
/// - `413 Payload Too Large`: Body exceeds the upload limit
pub async fn create_project_file(
    State(state): State<AppState>,
    auth: AuthContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<ProjectFile>)> {
    let form = read_upload_form(multipart).await?;

    let (project_id, part) = match (form.project, form.file) {
        (Some(project_id), Some(part)) => (project_id, part),
        (project, file) => {
            let mut details = Vec::new();
            if project.is_none() {
                details.push(missing("project"));
            }
            if file.is_none() {
                details.push(missing("file"));
            }
            return Err(ApiError::ValidationError(details));
        }
    };

    authorization::require_permission(&state.db, &auth, project_id, ProjectPermission::Write)
        .await?;

    let project_file = FileService::upload(
        &state.db,
        state.storage.as_ref(),
        into_upload(&auth, project_id, part, form.description),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project_file)))
}

fn missing(field: &str) -> ValidationErrorDetail {
    ValidationErrorDetail {
        field: field.to_string(),
        message: REQUIRED_FIELD.to_string(),
    }
}

pub async fn get_project_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectFile>> {
    Ok(Json(FileService::retrieve(&state.db, id).await?))
}

/// Stream the stored content with its original content type
pub async fn download_project_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let (project_file, data) = FileService::download(&state.db, state.storage.as_ref(), id).await?;

    let content_type = HeaderValue::from_str(&project_file.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        project_file.original_name.replace('"', "")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    tracing::debug!(project_file_id = %id, size_bytes = data.len(), "Serving file download");

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        ],
        data,
    )
        .into_response())
}

pub async fn deactivate_project_file(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectFile>> {
    let project_file = FileService::retrieve(&state.db, id).await?;
    authorization::require_author_or_permission(
        &state.db,
        &auth,
        project_file.project_id,
        project_file.uploaded_by,
        ProjectPermission::Manage,
    )
    .await?;

    let project_file = FileService::deactivate(&state.db, id).await?;
    tracing::info!(project_file_id = %id, "Project file deactivated");

    Ok(Json(project_file))
}

pub async fn delete_project_file(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let project_file = FileService::retrieve(&state.db, id).await?;
    authorization::require_author_or_permission(
        &state.db,
        &auth,
        project_file.project_id,
        project_file.uploaded_by,
        ProjectPermission::Manage,
    )
    .await?;

    FileService::destroy(&state.db, state.storage.as_ref(), id).await?;

    Ok(StatusCode::NO_CONTENT)
}
