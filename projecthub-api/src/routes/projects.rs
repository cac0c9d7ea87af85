/// Project endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects` - List projects (newest first)
/// - `POST /v1/projects` - Create project (owner defaults to the caller)
/// - `GET /v1/projects/projects_tags` - Active projects with their tags
/// - `GET /v1/projects/:id` - Get project
/// - `PUT /v1/projects/:id` - Update project (manage)
/// - `DELETE /v1/projects/:id` - Delete project and its files (owner)
/// - `POST /v1/projects/:id/deactivate` - Soft delete (manage)
/// - `GET|POST /v1/projects/:id/comments` - Active comments / add comment
/// - `GET|POST /v1/projects/:id/files` - Active files / upload (write)
/// - `GET|POST /v1/projects/:id/tags` - Tags / attach tag (write)

use crate::{
    app::AppState,
    error::{required, ApiError, ApiResult, REQUIRED_FIELD},
    extract::ValidatedJson,
    routes::project_files::{into_upload, read_upload_form},
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use projecthub_shared::{
    auth::{
        authorization::{self, ProjectPermission},
        middleware::AuthContext,
    },
    models::{
        comment::{Comment, CreateComment},
        file::ProjectFile,
        project::{CreateProject, Project, UpdateProject},
        tag::Tag,
    },
    services::{
        comment::CommentService,
        file::FileService,
        project::{ProjectService, ProjectWithTags},
        project_tag::ProjectTagService,
        tag::TagService,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create or replace a project
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters."))]
    pub name: String,

    #[validate(length(max = 5000, message = "Ensure this field has at most 5000 characters."))]
    pub description: Option<String>,

    /// Owning user; the caller when absent on create, unchanged on update
    #[serde(default, alias = "owner_id")]
    pub owner: Option<Uuid>,
}

/// Comment posted under a project
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectCommentRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 5000, message = "Content must be between 1 and 5000 characters."))]
    pub content: String,
}

/// Tag to attach to a project
#[derive(Debug, Deserialize, Validate)]
pub struct AttachTagRequest {
    #[validate(required(message = "This field is required."))]
    pub tag_id: Option<Uuid>,
}

pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(ProjectService::list(&state.db).await?))
}

/// Create a project
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or unknown owner
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(req): ValidatedJson<ProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = ProjectService::create(
        &state.db,
        CreateProject {
            owner_id: req.owner.unwrap_or(auth.user_id),
            name: req.name,
            description: req.description,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    Ok(Json(ProjectService::retrieve(&state.db, id).await?))
}

/// Replace a project's name and description (and owner when given)
///
/// # Errors
///
/// - `403 Forbidden`: Caller can't manage the project, or changes the owner
///   without owning it
/// - `404 Not Found`: Project doesn't exist
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ProjectRequest>,
) -> ApiResult<Json<Project>> {
    authorization::require_permission(&state.db, &auth, id, ProjectPermission::Manage).await?;

    if let Some(new_owner) = req.owner {
        let current = ProjectService::retrieve(&state.db, id).await?;
        if new_owner != current.owner_id {
            authorization::require_permission(&state.db, &auth, id, ProjectPermission::Own)
                .await?;
        }
    }

    let project = ProjectService::update(
        &state.db,
        id,
        UpdateProject {
            name: req.name,
            description: req.description,
            owner_id: req.owner,
        },
    )
    .await?;

    tracing::info!(project_id = %id, user_id = %auth.user_id, "Project updated");
    Ok(Json(project))
}

/// Hard delete a project, its children and its stored files
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    authorization::require_permission(&state.db, &auth, id, ProjectPermission::Own).await?;

    ProjectService::destroy(&state.db, state.storage.as_ref(), id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn deactivate_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    authorization::require_permission(&state.db, &auth, id, ProjectPermission::Manage).await?;

    Ok(Json(ProjectService::deactivate(&state.db, id).await?))
}

pub async fn list_project_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(CommentService::list_for_project(&state.db, id).await?))
}

pub async fn create_project_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ProjectCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    ProjectService::retrieve(&state.db, id).await?;

    let comment = CommentService::create(
        &state.db,
        CreateComment {
            project_id: id,
            user_id: auth.user_id,
            content: req.content,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_project_files(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ProjectFile>>> {
    Ok(Json(FileService::list_for_project(&state.db, id).await?))
}

/// Upload a file to the project in the path
///
/// A `project` part in the form, if any, is ignored.
pub async fn upload_project_file(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<ProjectFile>)> {
    authorization::require_permission(&state.db, &auth, id, ProjectPermission::Write).await?;

    let form = read_upload_form(multipart).await?;
    let part = form
        .file
        .ok_or_else(|| ApiError::field("file", REQUIRED_FIELD))?;

    let project_file = FileService::upload(
        &state.db,
        state.storage.as_ref(),
        into_upload(&auth, id, part, form.description),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project_file)))
}

pub async fn list_project_tags(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(TagService::list_for_project(&state.db, id).await?))
}

/// Attach an existing tag to the project, returning the tag
///
/// # Errors
///
/// - `403 Forbidden`: No write permission on the project
/// - `404 Not Found`: Project or tag doesn't exist
/// - `409 Conflict`: Tag already attached
pub async fn attach_project_tag(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<AttachTagRequest>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    let tag_id = required("tag_id", req.tag_id)?;

    authorization::require_permission(&state.db, &auth, id, ProjectPermission::Write).await?;

    let tag = ProjectTagService::attach(&state.db, id, tag_id).await?;

    Ok((StatusCode::CREATED, Json(tag)))
}

/// Every active project once, with its distinct tags
pub async fn projects_tags(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProjectWithTags>>> {
    Ok(Json(ProjectService::projects_tags(&state.db).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_request_owner_alias() {
        let owner = Uuid::new_v4();
        let req: ProjectRequest = serde_json::from_value(serde_json::json!({
            "name": "Alpha",
            "owner_id": owner,
        }))
        .unwrap();

        assert_eq!(req.owner, Some(owner));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_project_request_requires_name() {
        let req: ProjectRequest =
            serde_json::from_value(serde_json::json!({ "description": "no name" })).unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_attach_tag_requires_tag_id() {
        let req: AttachTagRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(req.validate().is_err());
    }
}
