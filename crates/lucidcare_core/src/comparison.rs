//! crates/lucidcare_core/src/comparison.rs
//!
//! Pure rules around comparative analysis: which summaries may be compared,
//! the order they are presented in, and what counts as a complete result.

use std::collections::HashSet;

use crate::domain::{ComparisonEntry, ComparisonResult, MetricHighlight, Summary, Trend};

pub const MIN_SUMMARIES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComparisonError {
    #[error("At least two distinct summaries are required for a comparison")]
    TooFewSummaries,
    #[error("Summaries not found: {0:?}")]
    MissingSummaries(Vec<i64>),
    #[error("Comparison result is missing '{0}'")]
    MissingField(&'static str),
    #[error("Comparison result has an invalid '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// De-duplicates the requested ids, keeping first occurrence order.
pub fn requested_ids(ids: &[i64]) -> Result<Vec<i64>, ComparisonError> {
    let mut seen = HashSet::new();
    let distinct: Vec<i64> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

    if distinct.len() < MIN_SUMMARIES {
        return Err(ComparisonError::TooFewSummaries);
    }
    Ok(distinct)
}

/// Checks that every requested summary was found and orders them oldest first.
///
/// `found` must already be restricted to the requesting user's summaries, so a
/// foreign id shows up here as missing.
pub fn order_for_comparison(
    requested: &[i64],
    found: Vec<Summary>,
) -> Result<Vec<ComparisonEntry>, ComparisonError> {
    let found_ids: HashSet<i64> = found.iter().map(|s| s.summary_id).collect();
    let missing: Vec<i64> = requested
        .iter()
        .copied()
        .filter(|id| !found_ids.contains(id))
        .collect();
    if !missing.is_empty() {
        return Err(ComparisonError::MissingSummaries(missing));
    }

    let mut entries: Vec<ComparisonEntry> = found
        .into_iter()
        .filter(|s| requested.contains(&s.summary_id))
        .map(|s| ComparisonEntry {
            summary_id: s.summary_id,
            created_at: s.created_at,
            text: s.summary_text,
        })
        .collect();
    entries.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then(a.summary_id.cmp(&b.summary_id))
    });

    if entries.len() < MIN_SUMMARIES {
        return Err(ComparisonError::TooFewSummaries);
    }
    Ok(entries)
}

/// A comparison as reported by the analysis capability, before validation.
#[derive(Debug, Clone, Default)]
pub struct ComparisonDraft {
    pub verdict: Option<String>,
    pub confidence: Option<f64>,
    pub summary: Option<String>,
    pub highlights: Option<Vec<HighlightDraft>>,
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct HighlightDraft {
    pub metric: Option<String>,
    pub change: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub note: Option<String>,
}

impl ComparisonDraft {
    /// Validates the draft into a result. All five top-level fields must be present.
    pub fn finish(self) -> Result<ComparisonResult, ComparisonError> {
        let verdict = required_text(self.verdict, "verdict")?;
        let verdict = verdict
            .parse::<Trend>()
            .map_err(|e| ComparisonError::InvalidField {
                field: "verdict",
                reason: e.to_string(),
            })?;

        let confidence = self
            .confidence
            .ok_or(ComparisonError::MissingField("confidence"))?;
        if !confidence.is_finite() || !(0.0..=100.0).contains(&confidence) {
            return Err(ComparisonError::InvalidField {
                field: "confidence",
                reason: format!("{} is outside 0-100", confidence),
            });
        }

        let summary = required_text(self.summary, "summary")?;
        let recommendation = required_text(self.recommendation, "recommendation")?;
        let highlights = self
            .highlights
            .ok_or(ComparisonError::MissingField("highlights"))?
            .into_iter()
            .map(HighlightDraft::finish)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ComparisonResult {
            verdict,
            confidence: confidence.round() as u8,
            summary,
            highlights,
            recommendation,
        })
    }
}

impl HighlightDraft {
    fn finish(self) -> Result<MetricHighlight, ComparisonError> {
        let metric = required_text(self.metric, "highlights.metric")?;
        let change = required_text(self.change, "highlights.change")?
            .parse::<Trend>()
            .map_err(|e| ComparisonError::InvalidField {
                field: "highlights.change",
                reason: e.to_string(),
            })?;

        Ok(MetricHighlight {
            metric,
            change,
            old_value: self.old_value.unwrap_or_default(),
            new_value: self.new_value.unwrap_or_default(),
            note: self.note.unwrap_or_default(),
        })
    }
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, ComparisonError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ComparisonError::MissingField(field)),
    }
}
