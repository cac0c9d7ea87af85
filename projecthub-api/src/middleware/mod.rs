/// Middleware modules for the API server
///
/// Authentication lives in `projecthub_shared::auth::middleware`; this
/// module holds HTTP concerns specific to the server:
/// - Security headers

pub mod security;
