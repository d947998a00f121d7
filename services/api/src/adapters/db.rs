//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lucidcare_core::domain::{Language, NewUser, Summary, User, UserCredentials};
use lucidcare_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    name: String,
    email: String,
    age: Option<i32>,
    sex: Option<String>,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            age: self.age,
            sex: self.sex,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct SummaryRecord {
    summary_id: i64,
    user_id: Uuid,
    summary_text: String,
    language: String,
    created_at: DateTime<Utc>,
}
impl SummaryRecord {
    fn to_domain(self) -> PortResult<Summary> {
        let language = self.language.parse::<Language>().map_err(|e| {
            PortError::Unexpected(format!("Summary {} has {}", self.summary_id, e))
        })?;
        Ok(Summary {
            summary_id: self.summary_id,
            user_id: self.user_id,
            summary_text: self.summary_text,
            language,
            created_at: self.created_at,
        })
    }
}

const SUMMARY_COLUMNS: &str = "summary_id, user_id, summary_text, language, created_at";

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, user: NewUser) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, name, email, hashed_password, age, sex) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING user_id, name, email, age, sex, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(user.age)
        .bind(&user.sex)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PortError::Conflict(format!("User with email {} already exists", user.email))
            }
            other => unexpected(other),
        })?;

        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_summary(
        &self,
        user_id: Uuid,
        summary_text: &str,
        language: Language,
    ) -> PortResult<Summary> {
        let record = sqlx::query_as::<_, SummaryRecord>(&format!(
            "INSERT INTO summaries (user_id, summary_text, language) VALUES ($1, $2, $3) RETURNING {}",
            SUMMARY_COLUMNS
        ))
        .bind(user_id)
        .bind(summary_text)
        .bind(language.code())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn get_summaries_by_user(&self, user_id: Uuid) -> PortResult<Vec<Summary>> {
        let records = sqlx::query_as::<_, SummaryRecord>(&format!(
            "SELECT {} FROM summaries WHERE user_id = $1 ORDER BY created_at DESC, summary_id DESC",
            SUMMARY_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_user_summaries_by_ids(
        &self,
        user_id: Uuid,
        summary_ids: &[i64],
    ) -> PortResult<Vec<Summary>> {
        let records = sqlx::query_as::<_, SummaryRecord>(&format!(
            "SELECT {} FROM summaries WHERE user_id = $1 AND summary_id = ANY($2)",
            SUMMARY_COLUMNS
        ))
        .bind(user_id)
        .bind(summary_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }
}
