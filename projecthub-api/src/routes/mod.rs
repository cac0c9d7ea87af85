/// API route handlers
///
/// One module per resource:
///
/// - `health`: Health check
/// - `users`: Registration, login, token refresh, password change
/// - `projects`: Projects and their nested comments, files and tags
/// - `comments`: Comments
/// - `project_files`: Uploaded project files
/// - `tags`: Tags
/// - `project_tags`: Project-tag links
/// - `likes`, `members`, `references`: Per-project records

pub mod comments;
pub mod health;
pub mod likes;
pub mod members;
pub mod project_files;
pub mod project_tags;
pub mod projects;
pub mod references;
pub mod tags;
pub mod users;
