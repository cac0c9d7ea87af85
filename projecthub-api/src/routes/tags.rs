/// Tag endpoints: `GET /v1/tags`, `POST /v1/tags`, `DELETE /v1/tags/:id`

use crate::{app::AppState, error::ApiResult, extract::ValidatedJson};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use projecthub_shared::{models::tag::Tag, services::tag::TagService};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters."))]
    pub name: String,
}

pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(TagService::list(&state.db).await?))
}

/// Create a tag
///
/// # Errors
///
/// - `400 Bad Request`: Blank or too long name
/// - `409 Conflict`: Name already taken
pub async fn create_tag(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateTagRequest>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    let tag = TagService::create(&state.db, &req.name).await?;
    tracing::debug!(tag_id = %tag.id, name = %tag.name, "Tag created");

    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    TagService::destroy(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
