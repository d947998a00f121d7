//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the report endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::{ServiceError, ServiceResult};
use crate::services::{comparison, history, reports, reports::UploadedReport};
use crate::web::{
    auth::{self, json_body, AgeInput, LoginRequest, RegisterRequest, TokenResponse},
    middleware::AuthUser,
    state::AppState,
};
use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        State,
    },
    response::Json,
    Extension,
};
use chrono::{DateTime, Utc};
use lucidcare_core::{
    domain::{ComparisonResult, Language, MetricHighlight, Summary},
    history::SummaryGroup,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::is_verify_handler,
        analyze_handler,
        list_summaries_handler,
        summary_history_handler,
        compare_handler,
    ),
    components(
        schemas(
            RegisterRequest, AgeInput, LoginRequest, TokenResponse, AnalyzeResponse,
            SummaryResponse, HistoryGroupResponse, HistoryEntryResponse, CompareRequest,
            CompareItem, ComparisonResponse, HighlightResponse
        )
    ),
    tags(
        (name = "LucidCare API", description = "Medical report summaries and comparisons.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The response payload sent after a report was summarized and stored.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct AnalyzeResponse {
    pub summary: String,
    pub summary_id: i64,
    pub language: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    pub summary_id: i64,
    pub summary_text: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

impl From<Summary> for SummaryResponse {
    fn from(s: Summary) -> Self {
        Self {
            summary_id: s.summary_id,
            summary_text: s.summary_text,
            language: s.language.code().to_string(),
            created_at: s.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HistoryGroupResponse {
    pub label: String,
    pub summaries: Vec<HistoryEntryResponse>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub summary_id: i64,
    pub title: String,
    pub preview: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

impl From<SummaryGroup> for HistoryGroupResponse {
    fn from(group: SummaryGroup) -> Self {
        Self {
            label: group.label,
            summaries: group
                .entries
                .into_iter()
                .map(|e| HistoryEntryResponse {
                    summary_id: e.summary.summary_id,
                    title: e.title,
                    preview: e.preview,
                    language: e.summary.language.code().to_string(),
                    created_at: e.summary.created_at,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CompareRequest {
    pub summaries: Vec<CompareItem>,
}

/// A summary picked for comparison. The stored text is authoritative, so
/// `fullText` is accepted but not required.
#[derive(Deserialize, ToSchema)]
pub struct CompareItem {
    pub id: i64,
    #[serde(rename = "fullText", default)]
    pub full_text: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComparisonResponse {
    /// One of `improved`, `deteriorated`, `stable`.
    pub verdict: String,
    /// 0-100.
    pub confidence: u8,
    pub summary: String,
    pub highlights: Vec<HighlightResponse>,
    pub recommendation: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HighlightResponse {
    pub metric: String,
    pub change: String,
    pub old_value: String,
    pub new_value: String,
    pub note: String,
}

impl From<MetricHighlight> for HighlightResponse {
    fn from(h: MetricHighlight) -> Self {
        Self {
            metric: h.metric,
            change: h.change.as_str().to_string(),
            old_value: h.old_value,
            new_value: h.new_value,
            note: h.note,
        }
    }
}

impl From<ComparisonResult> for ComparisonResponse {
    fn from(r: ComparisonResult) -> Self {
        Self {
            verdict: r.verdict.as_str().to_string(),
            confidence: r.confidence,
            summary: r.summary,
            highlights: r.highlights.into_iter().map(Into::into).collect(),
            recommendation: r.recommendation,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Summarize an uploaded medical report.
///
/// Accepts a multipart/form-data request with a `pdf` file part and an optional
/// `language` text part (`en` or `ml`, default `en`).
#[utoipa::path(
    post,
    path = "/analyze",
    request_body(content_type = "multipart/form-data", description = "The report (`pdf`) and target `language`."),
    responses(
        (status = 200, description = "Report summarized", body = AnalyzeResponse),
        (status = 400, description = "Bad request (e.g., missing file or unknown language)"),
        (status = 401, description = "Missing or invalid token"),
        (status = 502, description = "The analysis service failed")
    ),
    params(
        ("token" = String, Header, description = "Session token from register or login.")
    )
)]
pub async fn analyze_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServiceResult<Json<AnalyzeResponse>> {
    let mut multipart =
        multipart.map_err(|e| ServiceError::Validation(e.body_text()))?;

    let mut report: Option<UploadedReport> = None;
    let mut language = Language::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ServiceError::Validation(format!("Failed to read multipart data: {}", e.body_text()))
    })? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("pdf") => {
                let file_name = field.file_name().unwrap_or("report.pdf").to_string();
                let data = field.bytes().await.map_err(|e| {
                    ServiceError::Validation(format!("Failed to read file bytes: {}", e.body_text()))
                })?;
                report = Some(UploadedReport { file_name, data });
            }
            Some("language") => {
                let raw = field.text().await.map_err(|e| {
                    ServiceError::Validation(format!("Failed to read language: {}", e.body_text()))
                })?;
                if !raw.trim().is_empty() {
                    language = raw
                        .parse::<Language>()
                        .map_err(|e| ServiceError::Validation(e.to_string()))?;
                }
            }
            _ => {}
        }
    }

    let report = report.ok_or_else(|| {
        ServiceError::Validation("Please upload a Medical Report (PDF).".to_string())
    })?;

    let summary = reports::analyze(&app_state, user_id, report, language).await?;
    Ok(Json(AnalyzeResponse {
        summary: summary.summary_text,
        summary_id: summary.summary_id,
        language: summary.language.code().to_string(),
    }))
}

/// List the caller's summaries, newest first.
#[utoipa::path(
    get,
    path = "/summaries",
    responses(
        (status = 200, description = "The caller's summaries", body = [SummaryResponse]),
        (status = 401, description = "Missing or invalid token")
    ),
    params(
        ("token" = String, Header, description = "Session token from register or login.")
    )
)]
pub async fn list_summaries_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ServiceResult<Json<Vec<SummaryResponse>>> {
    let summaries = history::list_summaries(&app_state, user_id).await?;
    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

/// List the caller's summaries grouped into "Today", "Yesterday", "N days ago" and dates.
#[utoipa::path(
    get,
    path = "/summaries/history",
    responses(
        (status = 200, description = "The caller's summaries by recency", body = [HistoryGroupResponse]),
        (status = 401, description = "Missing or invalid token")
    ),
    params(
        ("token" = String, Header, description = "Session token from register or login.")
    )
)]
pub async fn summary_history_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ServiceResult<Json<Vec<HistoryGroupResponse>>> {
    let groups = history::grouped_history(&app_state, user_id, Utc::now()).await?;
    Ok(Json(groups.into_iter().map(Into::into).collect()))
}

/// Compare two or more of the caller's summaries.
#[utoipa::path(
    post,
    path = "/compare",
    request_body = CompareRequest,
    responses(
        (status = 200, description = "Comparison produced", body = ComparisonResponse),
        (status = 400, description = "Fewer than two summaries"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "A summary does not exist or belongs to someone else"),
        (status = 502, description = "The analysis service failed or returned a malformed result")
    ),
    params(
        ("token" = String, Header, description = "Session token from register or login.")
    )
)]
pub async fn compare_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> ServiceResult<Json<ComparisonResponse>> {
    let req = json_body(payload)?;
    let ids: Vec<i64> = req.summaries.iter().map(|s| s.id).collect();
    let result = comparison::compare(&app_state, user_id, &ids).await?;
    Ok(Json(result.into()))
}
