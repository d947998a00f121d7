//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login and token checks.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{ServiceError, ServiceResult};
use crate::services::auth::{self, Registration};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// Age arrives as a number from API clients and as a string from HTML forms.
#[derive(Deserialize, ToSchema, Debug, Clone)]
#[serde(untagged)]
pub enum AgeInput {
    Number(i64),
    Text(String),
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub age: Option<AgeInput>,
    pub sex: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

impl RegisterRequest {
    /// Rejects blank required fields and implausible values before any lookup happens.
    pub fn validate(self) -> ServiceResult<Registration> {
        let name = required(self.name, "name")?;
        let email = required(self.email, "email")?;
        let password = required_raw(self.password, "password")?;

        let (local, domain) = email.split_once('@').unwrap_or(("", ""));
        if local.is_empty() || domain.is_empty() || email.contains(char::is_whitespace) {
            return Err(ServiceError::Validation(format!("'{}' is not a valid email address", email)));
        }

        let age = match self.age {
            None => None,
            Some(AgeInput::Number(n)) => Some(n),
            Some(AgeInput::Text(s)) if s.trim().is_empty() => None,
            Some(AgeInput::Text(s)) => Some(s.trim().parse::<i64>().map_err(|_| {
                ServiceError::Validation(format!("'{}' is not a valid age", s))
            })?),
        };
        let age = match age {
            Some(n) if !(0..=150).contains(&n) => {
                return Err(ServiceError::Validation(format!("{} is not a valid age", n)))
            }
            other => other.map(|n| n as i32),
        };

        let sex = self
            .sex
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Registration {
            name,
            email,
            password,
            age,
            sex,
        })
    }
}

fn required(value: Option<String>, field: &str) -> ServiceResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::Validation(format!("Missing required field '{}'", field)))
}

// Passwords are not trimmed.
fn required_raw(value: Option<String>, field: &str) -> ServiceResult<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::Validation(format!("Missing required field '{}'", field)))
}

pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ServiceResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ServiceError::Validation(e.body_text()))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created successfully", body = TokenResponse),
        (status = 400, description = "Invalid request or user already exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ServiceResult<Json<TokenResponse>> {
    let registration = json_body(payload)?.validate()?;
    let token = auth::register(&state, registration).await?;
    Ok(Json(TokenResponse { token }))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ServiceResult<Json<TokenResponse>> {
    let req = json_body(payload)?;
    let token = auth::login(&state, &req.email, &req.password).await?;
    Ok(Json(TokenResponse { token }))
}

/// GET /auth/is-verify - Confirms the `token` header is still valid
#[utoipa::path(
    get,
    path = "/auth/is-verify",
    responses(
        (status = 200, description = "Token is valid", body = bool),
        (status = 401, description = "Token is missing, invalid or expired")
    ),
    params(
        ("token" = String, Header, description = "Session token from register or login.")
    )
)]
pub async fn is_verify_handler() -> Json<bool> {
    // Reaching this handler means `require_auth` accepted the token.
    Json(true)
}
