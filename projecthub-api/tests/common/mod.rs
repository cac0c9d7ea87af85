//! Common test utilities for integration tests
//!
//! - Test database setup (migrations applied on first use)
//! - Test user creation with a real password hash
//! - JWT token generation
//! - Request helpers returning status and JSON body
//!
//! Tests need `DATABASE_URL`; `TestContext::new` returns `None` without it
//! so the suite passes on machines without PostgreSQL.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use projecthub_api::app::{build_router, AppState};
use projecthub_api::config::Config;
use projecthub_shared::auth::jwt::{JwtKeys, TokenType};
use projecthub_shared::auth::password::hash_password;
use projecthub_shared::db::migrations::{ensure_database_exists, run_migrations};
use projecthub_shared::models::user::{CreateUser, User};
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;
use tempfile::TempDir;
use tower::Service as _;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Password every test user is created with
pub const TEST_PASSWORD: &str = "Sturdy-Passw0rd!";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,

    /// Upload directory; removed on drop
    pub upload_dir: TempDir,
}

impl TestContext {
    /// Creates a context with a fresh user, or None when no database is configured
    pub async fn new() -> anyhow::Result<Option<Self>> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping");
            return Ok(None);
        };

        let upload_dir = tempfile::tempdir()?;

        let vars: HashMap<&str, String> = HashMap::from([
            ("DATABASE_URL", database_url),
            ("JWT_SECRET", TEST_SECRET.to_string()),
            ("UPLOAD_DIR", upload_dir.path().display().to_string()),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).cloned())?;

        ensure_database_exists(&config.database.url).await?;
        let db = PgPool::connect(&config.database.url).await?;
        run_migrations(&db).await?;

        let user = create_user(&db).await?;
        let jwt_token = token_for(user.id);

        let app = build_router(AppState::new(db.clone(), config.clone()));

        Ok(Some(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
            upload_dir,
        }))
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Sends a JSON request as the context's user
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_as(&self.jwt_token, method, uri, body).await
    }

    /// Sends a JSON request with `token` (empty for none)
    pub async fn send_as(
        &self,
        token: &str,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if !token.is_empty() {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.call(request).await
    }

    /// Sends a prepared request, returning status and JSON body (Null when empty)
    pub async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        // Projects owned by the user cascade with it
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

/// Creates a user whose password is [`TEST_PASSWORD`]
pub async fn create_user(db: &PgPool) -> anyhow::Result<User> {
    let suffix = Uuid::new_v4().simple().to_string();

    let user = User::create(
        db,
        CreateUser {
            username: format!("user_{}", &suffix[..12]),
            email: format!("{}@example.com", suffix),
            password_hash: hash_password(TEST_PASSWORD)?,
            first_name: Some("Test".to_string()),
            last_name: None,
        },
    )
    .await?;

    Ok(user)
}

/// Access token for `user_id`
pub fn token_for(user_id: Uuid) -> String {
    JwtKeys::new(TEST_SECRET)
        .issue(user_id, TokenType::Access)
        .unwrap()
}

/// Builds a multipart body with the given text fields and one `file` part
pub fn multipart_body(
    boundary: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((file_name, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
