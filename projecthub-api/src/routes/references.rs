/// Project reference endpoints (`/v1/references`)
///
/// References are titled links attached to a project. Creating, changing
/// and removing them needs write permission on the project.

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
    models::reference::{CreateReference, Reference},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ReferenceRequest {
    #[serde(default, alias = "project_id")]
    #[validate(required(message = "This field is required."))]
    pub project: Option<Uuid>,

    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters."))]
    pub title: String,

    #[serde(default)]
    #[validate(url(message = "Enter a valid URL."))]
    pub url: String,

    #[validate(length(max = 5000, message = "Ensure this field has at most 5000 characters."))]
    pub description: Option<String>,
}

impl ReferenceRequest {
    fn into_create(self) -> ApiResult<CreateReference> {
        Ok(CreateReference {
            project_id: required("project", self.project)?,
            title: self.title,
            url: self.url,
            description: self.description,
        })
    }
}

async fn find_reference(state: &AppState, id: Uuid) -> ApiResult<Reference> {
    Reference::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Reference {} not found", id)))
}

pub async fn list_references(State(state): State<AppState>) -> ApiResult<Json<Vec<Reference>>> {
    Ok(Json(Reference::list(&state.db).await?))
}

pub async fn create_reference(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(req): ValidatedJson<ReferenceRequest>,
) -> ApiResult<(StatusCode, Json<Reference>)> {
    let data = req.into_create()?;
    authorization::require_permission(&state.db, &auth, data.project_id, ProjectPermission::Write)
        .await?;

    let reference = Reference::create(&state.db, data).await?;
    tracing::debug!(reference_id = %reference.id, project_id = %reference.project_id, "Reference added");

    Ok((StatusCode::CREATED, Json(reference)))
}

pub async fn get_reference(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Reference>> {
    Ok(Json(find_reference(&state, id).await?))
}

pub async fn update_reference(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ReferenceRequest>,
) -> ApiResult<Json<Reference>> {
    let data = req.into_create()?;
    let current = find_reference(&state, id).await?;

    authorization::require_permission(&state.db, &auth, current.project_id, ProjectPermission::Write)
        .await?;
    if data.project_id != current.project_id {
        authorization::require_permission(&state.db, &auth, data.project_id, ProjectPermission::Write)
            .await?;
    }

    let reference = Reference::update(&state.db, id, data)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Reference {} not found", id)))?;

    Ok(Json(reference))
}

pub async fn delete_reference(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let current = find_reference(&state, id).await?;
    authorization::require_permission(&state.db, &auth, current.project_id, ProjectPermission::Write)
        .await?;

    Reference::delete(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_url_must_be_valid() {
        let req: ReferenceRequest = serde_json::from_value(serde_json::json!({
            "project": Uuid::new_v4(),
            "title": "Docs",
            "url": "not a url",
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("url"));
        assert!(!errors.field_errors().contains_key("title"));
    }

    #[test]
    fn test_reference_request_valid() {
        let req: ReferenceRequest = serde_json::from_value(serde_json::json!({
            "project_id": Uuid::new_v4(),
            "title": "Docs",
            "url": "https://example.com/docs",
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        assert!(req.into_create().is_ok());
    }
}
