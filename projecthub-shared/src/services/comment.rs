//! Comment operations

use sqlx::PgPool;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::models::comment::{Comment, CreateComment};
use crate::models::project::Project;

pub struct CommentService;

impl CommentService {
    /// Active comments of an existing project
    pub async fn list_for_project(pool: &PgPool, project_id: Uuid) -> ServiceResult<Vec<Comment>> {
        if !Project::exists(pool, project_id).await? {
            return Err(ServiceError::not_found("Project", project_id));
        }

        Ok(Comment::list_active_by_project(pool, project_id).await?)
    }

    pub async fn create(pool: &PgPool, data: CreateComment) -> ServiceResult<Comment> {
        let comment = Comment::create(pool, data).await?;
        tracing::debug!(comment_id = %comment.id, project_id = %comment.project_id, "Comment created");
        Ok(comment)
    }

    pub async fn retrieve(pool: &PgPool, id: Uuid) -> ServiceResult<Comment> {
        Comment::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Comment", id))
    }

    pub async fn update(pool: &PgPool, id: Uuid, content: String) -> ServiceResult<Comment> {
        Comment::update_content(pool, id, content)
            .await?
            .ok_or_else(|| ServiceError::not_found("Comment", id))
    }

    pub async fn destroy(pool: &PgPool, id: Uuid) -> ServiceResult<()> {
        if !Comment::delete(pool, id).await? {
            return Err(ServiceError::not_found("Comment", id));
        }

        tracing::debug!(comment_id = %id, "Comment deleted");
        Ok(())
    }

    pub async fn deactivate(pool: &PgPool, id: Uuid) -> ServiceResult<Comment> {
        Comment::deactivate(pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Comment", id))
    }
}
