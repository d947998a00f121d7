//! crates/lucidcare_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Users
//=========================================================================================

/// Represents a registered user - used throughout app.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub sex: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// Everything needed to insert a user row. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub age: Option<i32>,
    pub sex: Option<String>,
}

//=========================================================================================
// Summaries
//=========================================================================================

/// The output language of a generated summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Malayalam,
}

impl Language {
    /// The short code used on the wire and in the database.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Malayalam => "ml",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Malayalam => "Malayalam",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported language '{0}', expected one of: en, ml")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::English),
            "ml" => Ok(Language::Malayalam),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

/// A generated plain-language summary of one uploaded report.
#[derive(Debug, Clone)]
pub struct Summary {
    pub summary_id: i64,
    pub user_id: Uuid,
    pub summary_text: String,
    pub language: Language,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// Comparisons
//=========================================================================================

/// The direction of change, used both for the overall verdict and per metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Improved,
    Deteriorated,
    Stable,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Improved => "improved",
            Trend::Deteriorated => "deteriorated",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown trend '{0}', expected improved, deteriorated or stable")]
pub struct UnknownTrend(pub String);

impl FromStr for Trend {
    type Err = UnknownTrend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "improved" => Ok(Trend::Improved),
            "deteriorated" => Ok(Trend::Deteriorated),
            "stable" => Ok(Trend::Stable),
            other => Err(UnknownTrend(other.to_string())),
        }
    }
}

/// A summary as submitted for comparison, in the order the analysis sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonEntry {
    pub summary_id: i64,
    pub created_at: DateTime<Utc>,
    pub text: String,
}

/// One metric's movement between the earliest and latest report.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricHighlight {
    pub metric: String,
    pub change: Trend,
    pub old_value: String,
    pub new_value: String,
    pub note: String,
}

/// The structured delta between two or more summaries. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub verdict: Trend,
    pub confidence: u8,
    pub summary: String,
    pub highlights: Vec<MetricHighlight>,
    pub recommendation: String,
}
