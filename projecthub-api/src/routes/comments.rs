/// Comment endpoints
///
/// - `POST /v1/comments` - Create comment (caller becomes the author)
/// - `GET /v1/comments/:id` - Get comment, active or not
/// - `PUT /v1/comments/:id` - Replace content
/// - `DELETE /v1/comments/:id` - Hard delete
/// - `POST /v1/comments/:id/deactivate` - Soft delete
///
/// Changes are allowed for the author and for anyone who can manage the
/// comment's project.

use crate::{
    app::AppState,
    error::{required, ApiResult},
    extract::ValidatedJson,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use projecthub_shared::{
    auth::{
        authorization::{self, ProjectPermission},
        middleware::AuthContext,
    },
    models::comment::{Comment, CreateComment},
    services::{comment::CommentService, project::ProjectService},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[serde(default, alias = "project_id")]
    #[validate(required(message = "This field is required."))]
    pub project: Option<Uuid>,

    #[serde(default)]
    #[validate(length(min = 1, max = 5000, message = "Content must be between 1 and 5000 characters."))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 5000, message = "Content must be between 1 and 5000 characters."))]
    pub content: String,
}

pub async fn create_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(req): ValidatedJson<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let project_id = required("project", req.project)?;
    ProjectService::retrieve(&state.db, project_id).await?;

    let comment = CommentService::create(
        &state.db,
        CreateComment {
            project_id,
            user_id: auth.user_id,
            content: req.content,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Comment>> {
    Ok(Json(CommentService::retrieve(&state.db, id).await?))
}

/// Loads the comment and checks the caller may change it
async fn editable_comment(state: &AppState, auth: &AuthContext, id: Uuid) -> ApiResult<Comment> {
    let comment = CommentService::retrieve(&state.db, id).await?;

    authorization::require_author_or_permission(
        &state.db,
        auth,
        comment.project_id,
        Some(comment.user_id),
        ProjectPermission::Manage,
    )
    .await?;

    Ok(comment)
}

pub async fn update_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateCommentRequest>,
) -> ApiResult<Json<Comment>> {
    editable_comment(&state, &auth, id).await?;

    Ok(Json(CommentService::update(&state.db, id, req.content).await?))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    editable_comment(&state, &auth, id).await?;
    CommentService::destroy(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn deactivate_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Comment>> {
    editable_comment(&state, &auth, id).await?;

    let comment = CommentService::deactivate(&state.db, id).await?;
    tracing::info!(comment_id = %id, user_id = %auth.user_id, "Comment deactivated");

    Ok(Json(comment))
}
