/// Like endpoints (`/v1/likes`)
///
/// `user` defaults to the caller. Likes can only be created, changed or
/// removed on one's own behalf.

use crate::{
    app::AppState,
    error::{required, ApiError, ApiResult},
    extract::ValidatedJson,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use projecthub_shared::{
    auth::{authorization, middleware::AuthContext},
    models::like::{CreateLike, Like},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LikeRequest {
    #[serde(default, alias = "user_id")]
    pub user: Option<Uuid>,

    #[serde(default, alias = "project_id")]
    #[validate(required(message = "This field is required."))]
    pub project: Option<Uuid>,
}

impl LikeRequest {
    /// Resolves the payload for `auth`, rejecting likes on behalf of others
    fn into_create(self, auth: &AuthContext) -> ApiResult<CreateLike> {
        let project_id = required("project", self.project)?;
        let user_id = self.user.unwrap_or(auth.user_id);

        authorization::require_ownership(auth, user_id)
            .map_err(|_| ApiError::Forbidden("You can only like on your own behalf".to_string()))?;

        Ok(CreateLike {
            user_id,
            project_id,
        })
    }
}

async fn own_like(state: &AppState, auth: &AuthContext, id: Uuid) -> ApiResult<Like> {
    let like = Like::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Like {} not found", id)))?;

    authorization::require_ownership(auth, like.user_id)?;
    Ok(like)
}

pub async fn list_likes(State(state): State<AppState>) -> ApiResult<Json<Vec<Like>>> {
    Ok(Json(Like::list(&state.db).await?))
}

pub async fn create_like(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(req): ValidatedJson<LikeRequest>,
) -> ApiResult<(StatusCode, Json<Like>)> {
    let data = req.into_create(&auth)?;
    let like = Like::create(&state.db, data).await?;

    tracing::debug!(like_id = %like.id, project_id = %like.project_id, "Project liked");
    Ok((StatusCode::CREATED, Json(like)))
}

pub async fn get_like(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Like>> {
    let like = Like::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Like {} not found", id)))?;

    Ok(Json(like))
}

pub async fn update_like(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<LikeRequest>,
) -> ApiResult<Json<Like>> {
    own_like(&state, &auth, id).await?;
    let data = req.into_create(&auth)?;

    let like = Like::update(&state.db, id, data)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Like {} not found", id)))?;

    Ok(Json(like))
}

pub async fn delete_like(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    own_like(&state, &auth, id).await?;
    Like::delete(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_defaults_to_caller() {
        let auth = AuthContext::new(Uuid::new_v4());
        let project = Uuid::new_v4();
        let req = LikeRequest {
            user: None,
            project: Some(project),
        };

        let data = req.into_create(&auth).unwrap();
        assert_eq!(data.user_id, auth.user_id);
        assert_eq!(data.project_id, project);
    }

    #[test]
    fn test_like_for_someone_else_is_forbidden() {
        let auth = AuthContext::new(Uuid::new_v4());
        let req = LikeRequest {
            user: Some(Uuid::new_v4()),
            project: Some(Uuid::new_v4()),
        };

        assert!(matches!(req.into_create(&auth), Err(ApiError::Forbidden(_))));
    }
}
