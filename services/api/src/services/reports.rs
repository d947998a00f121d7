//! services/api/src/services/reports.rs
//!
//! Report ingestion: extract the text of an uploaded report, have it summarized
//! in the requested language, and store the summary for the uploader.

use bytes::Bytes;
use lucidcare_core::domain::{Language, Summary};
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::web::state::AppState;

/// A file received from the client, not yet inspected.
#[derive(Debug, Clone)]
pub struct UploadedReport {
    pub file_name: String,
    pub data: Bytes,
}

pub async fn analyze(
    state: &AppState,
    user_id: Uuid,
    report: UploadedReport,
    language: Language,
) -> ServiceResult<Summary> {
    if report.data.is_empty() {
        return Err(ServiceError::Validation(
            "Please upload a Medical Report (PDF).".to_string(),
        ));
    }

    let start_time = Instant::now();
    info!(
        %user_id,
        file_name = %report.file_name,
        bytes = report.data.len(),
        %language,
        "Analyzing uploaded report"
    );

    let report_text = state
        .extractor
        .extract_text(&report.file_name, &report.data)
        .await?;
    if report_text.trim().is_empty() {
        return Err(ServiceError::Validation(
            "No readable text was found in the uploaded report.".to_string(),
        ));
    }

    let summary_text = state
        .analyzer
        .summarize_report(&report_text, language)
        .await
        .map_err(|e| {
            error!("Report analysis failed: {:?}", e);
            ServiceError::from(e)
        })?;
    if summary_text.trim().is_empty() {
        return Err(ServiceError::Analysis(
            "The analysis service returned an empty summary.".to_string(),
        ));
    }

    let summary = state
        .db
        .create_summary(user_id, summary_text.trim(), language)
        .await?;

    info!(
        %user_id,
        summary_id = summary.summary_id,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Stored new summary"
    );
    Ok(summary)
}
