//! Project operations

use serde::Serialize;
use std::collections::HashMap;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::models::file::File;
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::tag::{ProjectTag, ProjectTagRow};
use crate::storage::{discard, BlobStore};

/// An active project together with its tags
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectWithTags {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub tags: Vec<TagSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagSummary {
    pub id: Uuid,
    pub name: String,
}

pub struct ProjectService;

impl ProjectService {
    pub async fn list(pool: &PgPool) -> ServiceResult<Vec<Project>> {
        Ok(Project::list(pool).await?)
    }

    pub async fn create(pool: &PgPool, data: CreateProject) -> ServiceResult<Project> {
        let project = Project::create(pool, data).await?;
        tracing::info!(project_id = %project.id, owner_id = %project.owner_id, "Project created");
        Ok(project)
    }

    pub async fn retrieve(pool: &PgPool, id: Uuid) -> ServiceResult<Project> {
        Project::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project", id))
    }

    pub async fn update(pool: &PgPool, id: Uuid, data: UpdateProject) -> ServiceResult<Project> {
        Project::update(pool, id, data)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project", id))
    }

    pub async fn deactivate(pool: &PgPool, id: Uuid) -> ServiceResult<Project> {
        let project = Project::deactivate(pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project", id))?;

        tracing::info!(project_id = %id, "Project deactivated");
        Ok(project)
    }

    /// Deletes the project, its rows (via cascade) and its file blobs
    ///
    /// Rows go first inside one transaction; blobs are removed after commit
    /// and a failed blob removal is only logged.
    pub async fn destroy(pool: &PgPool, storage: &dyn BlobStore, id: Uuid) -> ServiceResult<()> {
        let mut tx = pool.begin().await?;

        let keys = File::delete_for_project(&mut *tx, id).await?;

        if !Project::delete(&mut *tx, id).await? {
            tx.rollback().await?;
            return Err(ServiceError::not_found("Project", id));
        }

        tx.commit().await?;

        for key in &keys {
            discard(storage, key).await;
        }

        tracing::info!(project_id = %id, files = keys.len(), "Project deleted");
        Ok(())
    }

    /// Every active project with its distinct tags
    pub async fn projects_tags(pool: &PgPool) -> ServiceResult<Vec<ProjectWithTags>> {
        let rows = ProjectTag::active_project_rows(pool).await?;
        Ok(group_project_tags(rows))
    }
}

/// Folds join rows into one entry per project, keeping first-seen order
///
/// Tags repeated for a project are collapsed; a project whose rows carry no
/// tag gets an empty list.
pub fn group_project_tags(rows: Vec<ProjectTagRow>) -> Vec<ProjectWithTags> {
    let mut projects: Vec<ProjectWithTags> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for row in rows {
        let slot = *index.entry(row.project_id).or_insert_with(|| {
            projects.push(ProjectWithTags {
                id: row.project_id,
                name: row.project_name.clone(),
                description: row.project_description.clone(),
                owner_id: row.owner_id,
                tags: Vec::new(),
            });
            projects.len() - 1
        });

        if let (Some(tag_id), Some(tag_name)) = (row.tag_id, row.tag_name) {
            let tags = &mut projects[slot].tags;
            if !tags.iter().any(|t| t.id == tag_id) {
                tags.push(TagSummary {
                    id: tag_id,
                    name: tag_name,
                });
            }
        }
    }

    projects
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(project_id: Uuid, name: &str, tag: Option<(Uuid, &str)>) -> ProjectTagRow {
        ProjectTagRow {
            project_id,
            project_name: name.to_string(),
            project_description: None,
            owner_id: Uuid::nil(),
            tag_id: tag.map(|(id, _)| id),
            tag_name: tag.map(|(_, n)| n.to_string()),
        }
    }

    #[test]
    fn test_group_project_tags() {
        let alpha = Uuid::new_v4();
        let beta = Uuid::new_v4();
        let rust = Uuid::new_v4();
        let web = Uuid::new_v4();

        let grouped = group_project_tags(vec![
            row(alpha, "alpha", Some((rust, "rust"))),
            row(alpha, "alpha", Some((web, "web"))),
            row(alpha, "alpha", Some((rust, "rust"))),
            row(beta, "beta", None),
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].id, alpha);
        assert_eq!(
            grouped[0].tags.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["rust", "web"]
        );
        assert_eq!(grouped[1].id, beta);
        assert!(grouped[1].tags.is_empty());
    }

    #[test]
    fn test_group_project_tags_non_contiguous_rows() {
        let alpha = Uuid::new_v4();
        let beta = Uuid::new_v4();
        let tag = Uuid::new_v4();

        let grouped = group_project_tags(vec![
            row(alpha, "alpha", Some((tag, "t"))),
            row(beta, "beta", Some((tag, "t"))),
            row(alpha, "alpha", Some((tag, "t"))),
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].tags.len(), 1);
        assert_eq!(grouped[1].tags.len(), 1);
    }

    #[test]
    fn test_group_project_tags_empty() {
        assert!(group_project_tags(Vec::new()).is_empty());
    }
}
