//! crates/lucidcare_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{
    ComparisonEntry, ComparisonResult, Language, NewUser, Summary, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Conflict(String),
    #[error("Unreadable document: {0}")]
    InvalidDocument(String),
    #[error("Analysis failed: {0}")]
    Analysis(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---

    /// Fails with `PortError::Conflict` when the email is already registered.
    async fn create_user(&self, user: NewUser) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    // --- Summary Management ---
    async fn create_summary(
        &self,
        user_id: Uuid,
        summary_text: &str,
        language: Language,
    ) -> PortResult<Summary>;

    /// Newest first.
    async fn get_summaries_by_user(&self, user_id: Uuid) -> PortResult<Vec<Summary>>;

    /// Returns only the rows among `summary_ids` that `user_id` owns, in no particular order.
    async fn get_user_summaries_by_ids(
        &self,
        user_id: Uuid,
        summary_ids: &[i64],
    ) -> PortResult<Vec<Summary>>;
}

#[async_trait]
pub trait DocumentTextExtractor: Send + Sync {
    /// Pulls readable text out of an uploaded report.
    async fn extract_text(&self, file_name: &str, data: &[u8]) -> PortResult<String>;
}

#[async_trait]
pub trait ReportAnalysisService: Send + Sync {
    /// Produces a plain-text, patient-friendly summary of a report in the given language.
    async fn summarize_report(&self, report_text: &str, language: Language) -> PortResult<String>;
}

#[async_trait]
pub trait ComparisonService: Send + Sync {
    /// Compares summaries that are already ordered oldest first.
    async fn compare_summaries(&self, entries: &[ComparisonEntry]) -> PortResult<ComparisonResult>;
}
