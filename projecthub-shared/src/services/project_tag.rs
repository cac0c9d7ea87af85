//! Attaching tags to projects

use sqlx::PgPool;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::models::project::Project;
use crate::models::tag::{CreateProjectTag, ProjectTag, Tag};

pub struct ProjectTagService;

impl ProjectTagService {
    /// Attaches `tag_id` to `project_id` and returns the tag
    ///
    /// Both sides are looked up first so a bad id is a 404 rather than a
    /// foreign key failure.
    pub async fn attach(pool: &PgPool, project_id: Uuid, tag_id: Uuid) -> ServiceResult<Tag> {
        if !Project::exists(pool, project_id).await? {
            return Err(ServiceError::not_found("Project", project_id));
        }

        let tag = Tag::find_by_id(pool, tag_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Tag", tag_id))?;

        ProjectTag::create(pool, CreateProjectTag { project_id, tag_id }).await?;
        tracing::debug!(project_id = %project_id, tag_id = %tag_id, "Tag attached");

        Ok(tag)
    }

    pub async fn list(pool: &PgPool) -> ServiceResult<Vec<ProjectTag>> {
        Ok(ProjectTag::list(pool).await?)
    }

    pub async fn create(pool: &PgPool, data: CreateProjectTag) -> ServiceResult<ProjectTag> {
        Ok(ProjectTag::create(pool, data).await?)
    }

    pub async fn retrieve(pool: &PgPool, id: Uuid) -> ServiceResult<ProjectTag> {
        ProjectTag::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("ProjectTag", id))
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: CreateProjectTag,
    ) -> ServiceResult<ProjectTag> {
        ProjectTag::update(pool, id, data)
            .await?
            .ok_or_else(|| ServiceError::not_found("ProjectTag", id))
    }

    pub async fn destroy(pool: &PgPool, id: Uuid) -> ServiceResult<()> {
        if !ProjectTag::delete(pool, id).await? {
            return Err(ServiceError::not_found("ProjectTag", id));
        }
        Ok(())
    }
}
