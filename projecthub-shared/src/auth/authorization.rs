/// Authorization helpers and permission checks
///
/// Access to a project's content is decided by the caller's role in that
/// project:
///
/// 1. **Ownership**: the project's `owner_id` always acts as `Owner`
/// 2. **Membership**: otherwise the role from `project_members`, if any
/// 3. **Authorship**: comments and files may also be changed by whoever
///    created them, regardless of role
///
/// Reads are open to every authenticated user; these checks gate mutations.
///
/// # Example
///
/// ```no_run
/// use projecthub_shared::auth::authorization::{require_permission, ProjectPermission};
/// use projecthub_shared::auth::middleware::AuthContext;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// async fn check(pool: &PgPool, auth: &AuthContext, project_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
///     // Admins and the owner may edit the project
///     require_permission(pool, auth, project_id, ProjectPermission::Manage).await?;
///     Ok(())
/// }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::project::Project;
use crate::models::project_member::{MemberRole, ProjectMember};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// The project the check refers to doesn't exist
    #[error("Project {0} not found")]
    ProjectNotFound(Uuid),

    /// Caller has no role in the project
    #[error("Not a member of project {0}")]
    NotMember(Uuid),

    /// Caller's role is too low
    #[error("Insufficient permissions: requires {required:?}, has {actual:?}")]
    InsufficientRole {
        required: MemberRole,
        actual: MemberRole,
    },

    /// Caller doesn't own the resource
    #[error("Not authorized to access this resource")]
    NotAuthorized,

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Permission levels for project-scoped actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectPermission {
    /// Read permission (Viewer+)
    Read,

    /// Contribute files, tags and references (Member+)
    Write,

    /// Edit or deactivate the project, manage members, moderate (Admin+)
    Manage,

    /// Delete the project (Owner only)
    Own,
}

impl ProjectPermission {
    /// Gets the minimum role required for this permission
    pub fn min_role(&self) -> MemberRole {
        match self {
            ProjectPermission::Read => MemberRole::Viewer,
            ProjectPermission::Write => MemberRole::Member,
            ProjectPermission::Manage => MemberRole::Admin,
            ProjectPermission::Own => MemberRole::Owner,
        }
    }
}

/// Resolves the caller's role in a project
///
/// # Returns
///
/// `Owner` for the project owner, the membership role for members, None for
/// everyone else.
///
/// # Errors
///
/// `AuthzError::ProjectNotFound` if the project doesn't exist.
pub async fn effective_role(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Option<MemberRole>, AuthzError> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(AuthzError::ProjectNotFound(project_id))?;

    if project.owner_id == user_id {
        return Ok(Some(MemberRole::Owner));
    }

    Ok(ProjectMember::get_role(pool, project_id, user_id).await?)
}

/// Checks a resolved role against a permission level
pub fn check_role(
    project_id: Uuid,
    role: Option<MemberRole>,
    permission: ProjectPermission,
) -> Result<(), AuthzError> {
    let role = role.ok_or(AuthzError::NotMember(project_id))?;
    let required = permission.min_role();

    if !role.has_permission(&required) {
        return Err(AuthzError::InsufficientRole {
            required,
            actual: role,
        });
    }

    Ok(())
}

/// Checks if the caller holds `permission` in a project
///
/// # Errors
///
/// Returns error if:
/// - The project doesn't exist
/// - The caller has no role in it
/// - The caller's role is insufficient
pub async fn require_permission(
    pool: &PgPool,
    auth: &AuthContext,
    project_id: Uuid,
    permission: ProjectPermission,
) -> Result<(), AuthzError> {
    let role = effective_role(pool, project_id, auth.user_id).await?;
    check_role(project_id, role, permission)
}

/// Checks if user owns a resource
pub fn require_ownership(auth: &AuthContext, resource_owner_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id != resource_owner_id {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}

/// Allows the resource's author, or anyone holding `permission` in the project
///
/// `author_id` is optional because file uploaders are nulled when their
/// account is deleted.
pub async fn require_author_or_permission(
    pool: &PgPool,
    auth: &AuthContext,
    project_id: Uuid,
    author_id: Option<Uuid>,
    permission: ProjectPermission,
) -> Result<(), AuthzError> {
    if author_id == Some(auth.user_id) {
        return Ok(());
    }

    require_permission(pool, auth, project_id, permission).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_permission_min_role() {
        assert_eq!(ProjectPermission::Read.min_role(), MemberRole::Viewer);
        assert_eq!(ProjectPermission::Write.min_role(), MemberRole::Member);
        assert_eq!(ProjectPermission::Manage.min_role(), MemberRole::Admin);
        assert_eq!(ProjectPermission::Own.min_role(), MemberRole::Owner);
    }

    #[test]
    fn test_check_role() {
        let project_id = Uuid::new_v4();

        assert!(check_role(project_id, Some(MemberRole::Owner), ProjectPermission::Own).is_ok());
        assert!(check_role(project_id, Some(MemberRole::Admin), ProjectPermission::Manage).is_ok());
        assert!(check_role(project_id, Some(MemberRole::Member), ProjectPermission::Write).is_ok());

        assert!(matches!(
            check_role(project_id, Some(MemberRole::Viewer), ProjectPermission::Write),
            Err(AuthzError::InsufficientRole { .. })
        ));
        assert!(matches!(
            check_role(project_id, Some(MemberRole::Admin), ProjectPermission::Own),
            Err(AuthzError::InsufficientRole { .. })
        ));
        assert!(matches!(
            check_role(project_id, None, ProjectPermission::Read),
            Err(AuthzError::NotMember(id)) if id == project_id
        ));
    }

    #[test]
    fn test_require_ownership() {
        let user_id = Uuid::new_v4();
        let auth = AuthContext::new(user_id);

        assert!(require_ownership(&auth, user_id).is_ok());
        assert!(require_ownership(&auth, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_authz_error_display() {
        let err = AuthzError::NotMember(Uuid::new_v4());
        assert!(err.to_string().contains("Not a member"));

        let err = AuthzError::NotAuthorized;
        assert!(err.to_string().contains("Not authorized"));
    }
}
