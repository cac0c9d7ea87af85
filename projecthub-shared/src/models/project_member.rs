/// Project member model and database operations
///
/// Members give users other than the owner a role inside a project. The role
/// decides which mutations they may perform (see `auth::authorization`).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE member_role AS ENUM ('owner', 'admin', 'member', 'viewer');
///
/// CREATE TABLE project_members (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role member_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT project_members_project_user_key UNIQUE (project_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **owner**: Full control, including deleting the project
/// - **admin**: Manage members, edit and deactivate the project, moderate content
/// - **member**: Upload files, attach tags, add references
/// - **viewer**: Read-only access
///
/// # Example
///
/// ```no_run
/// use projecthub_shared::models::project_member::{CreateProjectMember, MemberRole, ProjectMember};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let member = ProjectMember::create(&pool, CreateProjectMember {
///     project_id,
///     user_id,
///     role: MemberRole::Admin,
/// }).await?;
///
/// let role = ProjectMember::get_role(&pool, project_id, user_id).await?;
/// assert_eq!(role, Some(MemberRole::Admin));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Roles a user can hold in a project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Full control, including deletion
    Owner,

    /// Can manage members and moderate project content
    Admin,

    /// Can contribute files, tags and references
    #[default]
    Member,

    /// Read-only access
    Viewer,
}

impl MemberRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
            MemberRole::Viewer => "viewer",
        }
    }

    /// Checks if this role is at least as privileged as `required`
    ///
    /// Hierarchy: Owner > Admin > Member > Viewer
    pub fn has_permission(&self, required: &MemberRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    fn permission_level(&self) -> u8 {
        match self {
            MemberRole::Owner => 4,
            MemberRole::Admin => 3,
            MemberRole::Member => 2,
            MemberRole::Viewer => 1,
        }
    }
}

/// A user's membership in a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMember {
    pub id: Uuid,

    pub project_id: Uuid,

    pub user_id: Uuid,

    /// Role within the project
    pub role: MemberRole,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectMember {
    pub project_id: Uuid,

    pub user_id: Uuid,

    /// Role to assign (defaults to Member)
    #[serde(default)]
    pub role: MemberRole,
}

impl ProjectMember {
    /// Adds a user to a project
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The user is already a member (unique constraint violation)
    /// - Project or user doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateProjectMember) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            INSERT INTO project_members (project_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING id, project_id, user_id, role, created_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Finds a membership by its ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT id, project_id, user_id, role, created_at
            FROM project_members
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists every membership across all projects
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT id, project_id, user_id, role, created_at
            FROM project_members
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Gets a user's role in a project
    ///
    /// # Returns
    ///
    /// The role if the user is a member, None otherwise. Project ownership is
    /// not consulted here; see `auth::authorization::effective_role`.
    pub async fn get_role(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<MemberRole>, sqlx::Error> {
        let role: Option<MemberRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// Replaces a membership's project, user and role
    ///
    /// # Returns
    ///
    /// The updated membership, or None if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: CreateProjectMember,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(
            r#"
            UPDATE project_members
            SET project_id = $2, user_id = $3, role = $4
            WHERE id = $1
            RETURNING id, project_id, user_id, role, created_at
            "#,
        )
        .bind(id)
        .bind(data.project_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_optional(pool)
        .await
    }

    /// Removes a membership
    ///
    /// # Returns
    ///
    /// True if the membership was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_members WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(MemberRole::Owner.as_str(), "owner");
        assert_eq!(MemberRole::Admin.as_str(), "admin");
        assert_eq!(MemberRole::Member.as_str(), "member");
        assert_eq!(MemberRole::Viewer.as_str(), "viewer");
    }

    #[test]
    fn test_role_hierarchy() {
        assert!(MemberRole::Owner.has_permission(&MemberRole::Admin));
        assert!(MemberRole::Admin.has_permission(&MemberRole::Admin));
        assert!(MemberRole::Member.has_permission(&MemberRole::Viewer));
        assert!(!MemberRole::Member.has_permission(&MemberRole::Admin));
        assert!(!MemberRole::Viewer.has_permission(&MemberRole::Member));
    }

    #[test]
    fn test_default_role_is_member() {
        let data: CreateProjectMember = serde_json::from_value(serde_json::json!({
            "project_id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
        }))
        .unwrap();
        assert_eq!(data.role, MemberRole::Member);
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&MemberRole::Admin).unwrap(), "\"admin\"");
        let role: MemberRole = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(role, MemberRole::Viewer);
    }
}
