/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use projecthub_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = projecthub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::security::{security_headers, SecurityHeaders},
    routes,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use projecthub_shared::{
    auth::{
        jwt::JwtKeys,
        middleware::{jwt_auth, Authenticator},
    },
    storage::{local::LocalDiskStore, BlobStore},
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; every
/// field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Token signing and verification keys
    pub jwt: JwtKeys,

    /// Where uploaded file content lives
    pub storage: Arc<dyn BlobStore>,
}

impl AppState {
    /// Creates state backed by a local disk store under `UPLOAD_DIR`
    pub fn new(db: PgPool, config: Config) -> Self {
        let storage = Arc::new(LocalDiskStore::new(config.storage.upload_dir.clone()));
        Self::with_storage(db, config, storage)
    }

    /// Creates state with an explicit blob store
    pub fn with_storage(db: PgPool, config: Config, storage: Arc<dyn BlobStore>) -> Self {
        Self {
            db,
            jwt: JwtKeys::new(&config.jwt.secret),
            config: Arc::new(config),
            storage,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                              # Health check (public)
/// └── /v1/
///     ├── /users/register|login|refresh    # Public
///     ├── /users, /users/:id, /users/change_password
///     ├── /projects[/:id]                  # + /deactivate, /comments, /files, /tags
///     ├── /projects/projects_tags
///     ├── /comments[/:id]                  # + /deactivate
///     ├── /project-files[/:id]             # + /download, /deactivate
///     ├── /tags[/:id]
///     └── /project-tags, /likes, /members, /references [/:id]
/// ```
///
/// Everything under `/v1` except the three public user routes requires a
/// bearer access token. Auth is a route layer, so unknown paths still
/// answer 404 rather than 401.
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. Request body limit (413 above `MAX_UPLOAD_BYTES`)
/// 2. Security headers
/// 3. CORS
/// 4. Request tracing
pub fn build_router(state: AppState) -> Router {
    use routes::{
        comments, health, likes, members, project_files, project_tags, projects, references,
        tags, users,
    };

    let max_body = state.config.storage.max_upload_bytes;

    let public_routes = Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/refresh", post(users::refresh));

    let protected_routes = Router::new()
        // Users
        .route("/users", get(users::list_users))
        .route("/users/change_password", post(users::change_password))
        .route("/users/:id", get(users::get_user))
        // Projects
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/projects/projects_tags", get(projects::projects_tags))
        .route(
            "/projects/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/projects/:id/deactivate", post(projects::deactivate_project))
        .route(
            "/projects/:id/comments",
            get(projects::list_project_comments).post(projects::create_project_comment),
        )
        .route(
            "/projects/:id/files",
            get(projects::list_project_files).post(projects::upload_project_file),
        )
        .route(
            "/projects/:id/tags",
            get(projects::list_project_tags).post(projects::attach_project_tag),
        )
        // Comments
        .route("/comments", post(comments::create_comment))
        .route(
            "/comments/:id",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route("/comments/:id/deactivate", post(comments::deactivate_comment))
        // Project files
        .route("/project-files", post(project_files::create_project_file))
        .route(
            "/project-files/:id",
            get(project_files::get_project_file).delete(project_files::delete_project_file),
        )
        .route(
            "/project-files/:id/download",
            get(project_files::download_project_file),
        )
        .route(
            "/project-files/:id/deactivate",
            post(project_files::deactivate_project_file),
        )
        // Tags
        .route("/tags", get(tags::list_tags).post(tags::create_tag))
        .route("/tags/:id", axum::routing::delete(tags::delete_tag))
        // Project-tag links
        .route(
            "/project-tags",
            get(project_tags::list_project_tag_links).post(project_tags::create_project_tag_link),
        )
        .route(
            "/project-tags/:id",
            get(project_tags::get_project_tag_link)
                .put(project_tags::update_project_tag_link)
                .delete(project_tags::delete_project_tag_link),
        )
        // Likes
        .route("/likes", get(likes::list_likes).post(likes::create_like))
        .route(
            "/likes/:id",
            get(likes::get_like)
                .put(likes::update_like)
                .delete(likes::delete_like),
        )
        // Members
        .route("/members", get(members::list_members).post(members::create_member))
        .route(
            "/members/:id",
            get(members::get_member)
                .put(members::update_member)
                .delete(members::delete_member),
        )
        // References
        .route(
            "/references",
            get(references::list_references).post(references::create_reference),
        )
        .route(
            "/references/:id",
            get(references::get_reference)
                .put(references::update_reference)
                .delete(references::delete_reference),
        )
        .route_layer(middleware::from_fn_with_state(
            Authenticator::new(state.jwt.clone(), state.db.clone()),
            jwt_auth,
        ));

    let v1_routes = Router::new().merge(public_routes).merge(protected_routes);

    let cors = if state.config.cors_allows_any() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(Duration::from_secs(3600))
    };

    let security = SecurityHeaders {
        hsts: state.config.api.enable_hsts,
    };

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(middleware::from_fn_with_state(security, security_headers))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(RequestBodyLimitLayer::new(max_body))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use projecthub_shared::{
        auth::jwt::TokenType,
        db::pool::{create_lazy_pool, DatabaseConfig as PoolConfig},
    };
    use serde_json::Value;
    use std::collections::HashMap;
    use tower::ServiceExt;
    use uuid::Uuid;

    const SECRET: &str = "router-test-secret-at-least-32-bytes";

    /// Router over a pool that never connects; only paths that finish before
    /// a query succeeds are exercised.
    fn test_app(max_upload: &str) -> Router {
        let vars: HashMap<&str, String> = HashMap::from([
            ("DATABASE_URL", "postgresql://localhost:1/unreachable".to_string()),
            ("JWT_SECRET", SECRET.to_string()),
            ("MAX_UPLOAD_BYTES", max_upload.to_string()),
            ("UPLOAD_DIR", std::env::temp_dir().display().to_string()),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

        let pool = create_lazy_pool(&PoolConfig {
            url: config.database.url.clone(),
            min_connections: 0,
            acquire_timeout_seconds: 1,
            ..Default::default()
        })
        .unwrap();

        build_router(AppState::new(pool, config))
    }

    fn bearer(token_type: TokenType) -> String {
        let token = JwtKeys::new(SECRET).issue(Uuid::new_v4(), token_type).unwrap();
        format!("Bearer {}", token)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_protected_route_without_token_is_401() {
        let response = test_app("1048576")
            .oneshot(Request::get("/v1/projects").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let response = test_app("1048576")
            .oneshot(
                Request::get("/v1/projects")
                    .header(header::AUTHORIZATION, bearer(TokenType::Refresh))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = test_app("1048576")
            .oneshot(Request::get("/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let response = test_app("1048576")
            .oneshot(
                Request::post("/v1/users/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_register_missing_fields_is_400_with_details() {
        let response = test_app("1048576")
            .oneshot(
                Request::post("/v1/users/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");

        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|d| d["field"].as_str())
            .collect();
        assert!(fields.contains(&"username"));
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"password"));
    }

    #[tokio::test]
    async fn test_valid_token_without_database_is_503() {
        let response = test_app("1048576")
            .oneshot(
                Request::get("/v1/projects")
                    .header(header::AUTHORIZATION, bearer(TokenType::Access))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"], "service_unavailable");
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let response = test_app("64")
            .oneshot(
                Request::post("/v1/users/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::CONTENT_LENGTH, "200")
                    .body(Body::from(vec![b' '; 200]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_security_headers_on_every_response() {
        let response = test_app("1048576")
            .oneshot(Request::get("/v1/projects").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn test_health_reports_degraded_without_database() {
        let response = test_app("1048576")
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["database"], "disconnected");
    }
}
