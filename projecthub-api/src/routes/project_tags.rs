/// Project-tag link endpoints (`/v1/project-tags`)
///
/// Creating, changing or removing a link needs write permission on the
/// project. Moving a link to another project needs it on both.

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
    models::tag::{CreateProjectTag, ProjectTag},
    services::project_tag::ProjectTagService,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ProjectTagRequest {
    #[serde(default, alias = "project_id")]
    #[validate(required(message = "This field is required."))]
    pub project: Option<Uuid>,

    #[serde(default, alias = "tag_id")]
    #[validate(required(message = "This field is required."))]
    pub tag: Option<Uuid>,
}

impl ProjectTagRequest {
    fn into_create(self) -> ApiResult<CreateProjectTag> {
        Ok(CreateProjectTag {
            project_id: required("project", self.project)?,
            tag_id: required("tag", self.tag)?,
        })
    }
}

pub async fn list_project_tag_links(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProjectTag>>> {
    Ok(Json(ProjectTagService::list(&state.db).await?))
}

pub async fn create_project_tag_link(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(req): ValidatedJson<ProjectTagRequest>,
) -> ApiResult<(StatusCode, Json<ProjectTag>)> {
    let data = req.into_create()?;
    authorization::require_permission(&state.db, &auth, data.project_id, ProjectPermission::Write)
        .await?;

    let link = ProjectTagService::create(&state.db, data).await?;

    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn get_project_tag_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectTag>> {
    Ok(Json(ProjectTagService::retrieve(&state.db, id).await?))
}

pub async fn update_project_tag_link(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ProjectTagRequest>,
) -> ApiResult<Json<ProjectTag>> {
    let data = req.into_create()?;
    let current = ProjectTagService::retrieve(&state.db, id).await?;

    authorization::require_permission(&state.db, &auth, current.project_id, ProjectPermission::Write)
        .await?;
    if data.project_id != current.project_id {
        authorization::require_permission(&state.db, &auth, data.project_id, ProjectPermission::Write)
            .await?;
    }

    Ok(Json(ProjectTagService::update(&state.db, id, data).await?))
}

pub async fn delete_project_tag_link(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let current = ProjectTagService::retrieve(&state.db, id).await?;
    authorization::require_permission(&state.db, &auth, current.project_id, ProjectPermission::Write)
        .await?;

    ProjectTagService::destroy(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
