/// Project member endpoints (`/v1/members`)
///
/// Adding, changing and removing members needs manage permission on the
/// project. Granting the `owner` role needs ownership.

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
    auth::{
        authorization::{self, ProjectPermission},
        middleware::AuthContext,
    },
    models::project_member::{CreateProjectMember, MemberRole, ProjectMember},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct MemberRequest {
    #[serde(default, alias = "project_id")]
    #[validate(required(message = "This field is required."))]
    pub project: Option<Uuid>,

    #[serde(default, alias = "user_id")]
    #[validate(required(message = "This field is required."))]
    pub user: Option<Uuid>,

    /// Defaults to `member`
    #[serde(default)]
    pub role: MemberRole,
}

impl MemberRequest {
    fn into_create(self) -> ApiResult<CreateProjectMember> {
        Ok(CreateProjectMember {
            project_id: required("project", self.project)?,
            user_id: required("user", self.user)?,
            role: self.role,
        })
    }
}

fn required_permission(role: MemberRole) -> ProjectPermission {
    match role {
        MemberRole::Owner => ProjectPermission::Own,
        _ => ProjectPermission::Manage,
    }
}

async fn find_member(state: &AppState, id: Uuid) -> ApiResult<ProjectMember> {
    ProjectMember::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Member {} not found", id)))
}

pub async fn list_members(State(state): State<AppState>) -> ApiResult<Json<Vec<ProjectMember>>> {
    Ok(Json(ProjectMember::list(&state.db).await?))
}

pub async fn create_member(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(req): ValidatedJson<MemberRequest>,
) -> ApiResult<(StatusCode, Json<ProjectMember>)> {
    let data = req.into_create()?;
    authorization::require_permission(&state.db, &auth, data.project_id, required_permission(data.role))
        .await?;

    let member = ProjectMember::create(&state.db, data).await?;
    tracing::info!(
        project_id = %member.project_id,
        user_id = %member.user_id,
        role = member.role.as_str(),
        "Member added"
    );

    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectMember>> {
    Ok(Json(find_member(&state, id).await?))
}

pub async fn update_member(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<MemberRequest>,
) -> ApiResult<Json<ProjectMember>> {
    let data = req.into_create()?;
    let current = find_member(&state, id).await?;

    authorization::require_permission(
        &state.db,
        &auth,
        current.project_id,
        required_permission(current.role),
    )
    .await?;
    authorization::require_permission(&state.db, &auth, data.project_id, required_permission(data.role))
        .await?;

    let member = ProjectMember::update(&state.db, id, data)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Member {} not found", id)))?;

    tracing::info!(member_id = %id, role = member.role.as_str(), "Member updated");
    Ok(Json(member))
}

pub async fn delete_member(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let current = find_member(&state, id).await?;
    authorization::require_permission(
        &state.db,
        &auth,
        current.project_id,
        required_permission(current.role),
    )
    .await?;

    ProjectMember::delete(&state.db, id).await?;
    tracing::info!(member_id = %id, project_id = %current.project_id, "Member removed");

    Ok(StatusCode::NO_CONTENT)
}
