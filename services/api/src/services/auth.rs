//! services/api/src/services/auth.rs
//!
//! Registration, login and token verification.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lucidcare_core::{domain::NewUser, ports::PortError};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::web::state::AppState;

const BAD_CREDENTIALS: &str = "Password or Email is incorrect";

/// A registration that has passed boundary validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: Option<i32>,
    pub sex: Option<String>,
}

/// Emails are compared case-insensitively and without surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates the user and returns a session token for them.
pub async fn register(state: &AppState, registration: Registration) -> ServiceResult<String> {
    let email = normalize_email(&registration.email);

    match state.db.get_user_by_email(&email).await {
        Ok(_) => return Err(ServiceError::Validation("User already exists".to_string())),
        Err(PortError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let salt = SaltString::generate(&mut OsRng);
    let hashed_password = Argon2::default()
        .hash_password(registration.password.as_bytes(), &salt)
        .map_err(|e| ServiceError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    let user = state
        .db
        .create_user(NewUser {
            name: registration.name,
            email,
            hashed_password,
            age: registration.age,
            sex: registration.sex,
        })
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => ServiceError::Validation("User already exists".to_string()),
            other => {
                error!("Failed to create user: {:?}", other);
                other.into()
            }
        })?;

    info!(user_id = %user.user_id, "Registered new user");
    issue_token(state, user.user_id)
}

/// Checks the credentials and returns a fresh session token.
pub async fn login(state: &AppState, email: &str, password: &str) -> ServiceResult<String> {
    let credentials = state
        .db
        .get_user_by_email(&normalize_email(email))
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => ServiceError::Auth(BAD_CREDENTIALS.to_string()),
            other => other.into(),
        })?;

    let parsed_hash = PasswordHash::new(&credentials.hashed_password)
        .map_err(|e| ServiceError::Internal(format!("Stored password hash is unreadable: {}", e)))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        warn!(user_id = %credentials.user_id, "Rejected login with wrong password");
        return Err(ServiceError::Auth(BAD_CREDENTIALS.to_string()));
    }

    issue_token(state, credentials.user_id)
}

/// Returns the user id a valid token was issued to.
pub fn verify(state: &AppState, token: &str) -> ServiceResult<Uuid> {
    state
        .tokens
        .verify(token)
        .map_err(|e| ServiceError::Auth(format!("Token is invalid: {}", e)))
}

fn issue_token(state: &AppState, user_id: Uuid) -> ServiceResult<String> {
    state
        .tokens
        .issue(user_id)
        .map_err(|e| ServiceError::Internal(e.to_string()))
}
