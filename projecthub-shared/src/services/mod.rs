/// Service layer used by the HTTP handlers
///
/// Each service is a set of functions, one per operation, that call the
/// model queries and turn a missing row into [`ServiceError::NotFound`].
/// Operations that touch more than one table or the blob store (uploads,
/// project deletion) are coordinated here.
///
/// # Services
///
/// - [`project::ProjectService`]: project CRUD, deactivation, tag aggregate
/// - [`comment::CommentService`]: comment CRUD and soft delete
/// - [`file::FileService`]: uploads, downloads and file removal
/// - [`tag::TagService`]: global tags
/// - [`project_tag::ProjectTagService`]: attaching tags to projects

pub mod comment;
pub mod file;
pub mod project;
pub mod project_tag;
pub mod tag;

use uuid::Uuid;

use crate::storage::StorageError;

/// Service error types
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Referenced record doesn't exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// Input passed type checks but can't be processed
    #[error("{0}")]
    Invalid(String),

    /// Database error
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Blob store error
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        ServiceError::NotFound { entity, id }
    }
}

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let id = Uuid::new_v4();
        let err = ServiceError::not_found("Project", id);
        assert_eq!(err.to_string(), format!("Project {} not found", id));
    }
}
