/// Database models for ProjectHub
///
/// Each model owns its SQL and exposes async CRUD functions taking a `PgPool`
/// (or, for writes that must share a transaction, any `PgExecutor`).
///
/// # Models
///
/// - `user`: User accounts and credentials
/// - `project`: Projects, the parent of every other collaborative record
/// - `comment`: Comments on projects (soft-deletable)
/// - `like`: One like per user and project
/// - `project_member`: Project roles for users other than the owner
/// - `reference`: External links attached to projects
/// - `file`: Stored blobs and their attachment to projects
/// - `tag`: Global tags and project-tag links
///
/// # Example
///
/// ```no_run
/// use projecthub_shared::models::project::{CreateProject, Project};
/// use projecthub_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(owner_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let project = Project::create(&pool, CreateProject {
///     owner_id,
///     name: "Compiler".to_string(),
///     description: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod file;
pub mod like;
pub mod project;
pub mod project_member;
pub mod reference;
pub mod tag;
pub mod user;
