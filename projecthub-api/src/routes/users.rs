/// User account endpoints
///
/// # Endpoints
///
/// Public:
/// - `POST /v1/users/register` - Register new user
/// - `POST /v1/users/login` - Login and get tokens
/// - `POST /v1/users/refresh` - Exchange a refresh token for an access token
///
/// Authenticated:
/// - `POST /v1/users/change_password` - Change the caller's password
/// - `GET /v1/users` - List users
/// - `GET /v1/users/:id` - Get one user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, REQUIRED_FIELD},
    extract::ValidatedJson,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use projecthub_shared::{
    auth::{jwt::TokenType, middleware::AuthContext, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login name: letters, digits and `@ . + - _`
    #[serde(default)]
    #[validate(
        length(min = 3, max = 150, message = "Username must be between 3 and 150 characters."),
        custom(function = "validate_username")
    )]
    pub username: String,

    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    /// Password (also checked for strength)
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,

    #[validate(length(max = 150, message = "Ensure this field has at most 150 characters."))]
    pub first_name: Option<String>,

    #[validate(length(max = 150, message = "Ensure this field has at most 150 characters."))]
    pub last_name: Option<String>,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_chars");
        err.message = Some("Username may only contain letters, digits and @/./+/-/_ characters.".into());
        Err(err)
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email address
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,

    /// Always "Bearer"
    pub token_type: &'static str,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Refresh token request
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,

    pub token_type: &'static str,

    pub expires_in: i64,
}

/// Change password request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub old_password: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub new_password: String,
}

/// Register a new user
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or weak password
/// - `409 Conflict`: Username or email already exists
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    password::validate_password_strength(&req.password, Some(&req.username))
        .map_err(|e| ApiError::field("password", e))?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login with username (or email) and password
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields
/// - `401 Unauthorized`: Invalid credentials or disabled account
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let invalid = || ApiError::Unauthorized("Invalid username or password".to_string());

    let user = User::find_by_login(&state.db, req.username.trim())
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    if !user.is_active {
        return Err(ApiError::Unauthorized("Account is disabled".to_string()));
    }

    User::update_last_login(&state.db, user.id).await?;

    let access_token = state.jwt.issue(user.id, TokenType::Access)?;
    let refresh_token = state.jwt.issue(user.id, TokenType::Refresh)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        user,
        access_token,
        refresh_token,
        token_type: "Bearer",
        expires_in: TokenType::Access.lifetime().num_seconds(),
    }))
}

/// Exchange a refresh token for a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid, expired or non-refresh token
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = state.jwt.refresh(&req.refresh_token)?;

    Ok(Json(RefreshResponse {
        access_token,
        token_type: "Bearer",
        expires_in: TokenType::Access.lifetime().num_seconds(),
    }))
}

/// Change the caller's password
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields or weak new password
/// - `401 Unauthorized`: Old password doesn't match
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    if !password::verify_password(&req.old_password, &user.password_hash)? {
        return Err(ApiError::Unauthorized("Old password is incorrect".to_string()));
    }

    password::validate_password_strength(&req.new_password, Some(&user.username))
        .map_err(|e| ApiError::field("new_password", e))?;

    if req.new_password == req.old_password {
        return Err(ApiError::field(
            "new_password",
            "New password must differ from the old one.",
        ));
    }

    let password_hash = password::hash_password(&req.new_password)?;
    User::set_password_hash(&state.db, user.id, &password_hash).await?;

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(User::list(&state.db).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))?;

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "not-an-email",
            "password": "",
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_username_characters() {
        assert!(validate_username("ada.lovelace+1@x").is_ok());
        assert!(validate_username("with space").is_err());
        assert!(validate_username("semi;colon").is_err());
    }

    #[test]
    fn test_required_message_constant_matches() {
        let req: LoginRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        let errors = req.validate().unwrap_err();
        let message = errors.field_errors()["username"][0]
            .message
            .as_ref()
            .map(|m| m.to_string());
        assert_eq!(message.as_deref(), Some(REQUIRED_FIELD));
    }
}
