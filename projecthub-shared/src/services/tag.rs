//! Tag operations

use sqlx::PgPool;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::models::project::Project;
use crate::models::tag::Tag;

pub struct TagService;

impl TagService {
    pub async fn list(pool: &PgPool) -> ServiceResult<Vec<Tag>> {
        Ok(Tag::list(pool).await?)
    }

    /// Creates a tag; the name is trimmed first
    pub async fn create(pool: &PgPool, name: &str) -> ServiceResult<Tag> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Invalid("Tag name must not be blank".to_string()));
        }

        Ok(Tag::create(pool, name.to_string()).await?)
    }

    pub async fn destroy(pool: &PgPool, id: Uuid) -> ServiceResult<()> {
        if !Tag::delete(pool, id).await? {
            return Err(ServiceError::not_found("Tag", id));
        }
        Ok(())
    }

    /// Tags of an existing project
    pub async fn list_for_project(pool: &PgPool, project_id: Uuid) -> ServiceResult<Vec<Tag>> {
        if !Project::exists(pool, project_id).await? {
            return Err(ServiceError::not_found("Project", project_id));
        }

        Ok(Tag::list_for_project(pool, project_id).await?)
    }
}
