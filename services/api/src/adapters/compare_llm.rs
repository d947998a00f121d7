//! services/api/src/adapters/compare_llm.rs
//!
//! This module contains the adapter for the comparative-analysis LLM.
//! It implements the `ComparisonService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use lucidcare_core::{
    comparison::{ComparisonDraft, HighlightDraft},
    domain::{ComparisonEntry, ComparisonResult},
    ports::{ComparisonService, PortError, PortResult},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

const SYSTEM_INSTRUCTIONS: &str = r#"You are a careful physician comparing a patient's medical report summaries taken at different times.

The reports are given oldest first. Decide whether the patient's overall condition has improved, deteriorated, or stayed stable from the EARLIEST report to the LATEST one.

Respond with a single JSON object and nothing else, using exactly these keys:
{
  "verdict": "improved" | "deteriorated" | "stable",
  "confidence": <integer 0-100>,
  "summary": "<two or three plain sentences for the patient>",
  "highlights": [
    {
      "metric": "<name of a vital, lab value or finding>",
      "change": "improved" | "deteriorated" | "stable",
      "oldValue": "<value in the earliest report>",
      "newValue": "<value in the latest report>",
      "note": "<one short sentence on what the change means>"
    }
  ],
  "recommendation": "<one or two plain sentences on what to do next>"
}

Only list metrics that appear in at least two reports. Do not invent values."#;

static JSON_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").expect("fence pattern is valid")
});

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ComparisonService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiComparisonAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiComparisonAdapter {
    /// Creates a new `OpenAiComparisonAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Lays the reports out oldest first, labelled with their position and date.
pub fn build_comparison_prompt(entries: &[ComparisonEntry]) -> String {
    let last = entries.len().saturating_sub(1);
    let mut prompt = format!(
        "Compare these {} medical report summaries (oldest first):\n",
        entries.len()
    );
    for (i, entry) in entries.iter().enumerate() {
        let position = match i {
            0 => "EARLIEST".to_string(),
            i if i == last => "LATEST".to_string(),
            i => format!("REPORT {}", i + 1),
        };
        prompt.push_str(&format!(
            "\n--- {} (created {}) ---\n{}\n",
            position,
            entry.created_at.format("%Y-%m-%d %H:%M UTC"),
            entry.text.trim()
        ));
    }
    prompt
}

//=========================================================================================
// Parsing the model's answer
//=========================================================================================

#[derive(Deserialize, Default)]
struct RawComparison {
    verdict: Option<String>,
    confidence: Option<Value>,
    summary: Option<String>,
    highlights: Option<Vec<RawHighlight>>,
    recommendation: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawHighlight {
    metric: Option<String>,
    change: Option<String>,
    #[serde(alias = "oldValue")]
    old_value: Option<Value>,
    #[serde(alias = "newValue")]
    new_value: Option<Value>,
    note: Option<String>,
}

/// Pulls the JSON object out of a reply that may be wrapped in a code fence or prose.
fn extract_json_object(reply: &str) -> Option<&str> {
    if let Some(caps) = JSON_FENCE.captures(reply) {
        return caps.get(1).map(|m| m.as_str());
    }
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

fn value_to_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn confidence_number(value: Option<Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Parses and validates the model's reply into a `ComparisonResult`.
pub fn parse_comparison_reply(reply: &str) -> PortResult<ComparisonResult> {
    let json = extract_json_object(reply).ok_or_else(|| {
        PortError::Analysis("Comparison reply did not contain a JSON object.".to_string())
    })?;
    let raw: RawComparison = serde_json::from_str(json)
        .map_err(|e| PortError::Analysis(format!("Comparison reply was not valid JSON: {}", e)))?;

    let draft = ComparisonDraft {
        verdict: raw.verdict,
        confidence: confidence_number(raw.confidence),
        summary: raw.summary,
        highlights: raw.highlights.map(|hs| {
            hs.into_iter()
                .map(|h| HighlightDraft {
                    metric: h.metric,
                    change: h.change,
                    old_value: value_to_text(h.old_value),
                    new_value: value_to_text(h.new_value),
                    note: h.note,
                })
                .collect()
        }),
        recommendation: raw.recommendation,
    };

    draft
        .finish()
        .map_err(|e| PortError::Analysis(e.to_string()))
}

//=========================================================================================
// `ComparisonService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ComparisonService for OpenAiComparisonAdapter {
    async fn compare_summaries(&self, entries: &[ComparisonEntry]) -> PortResult<ComparisonResult> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_comparison_prompt(entries))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.2)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Analysis(e.to_string()))?;

        let reply = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Analysis("Comparison LLM returned no choices in its response.".to_string())
            })?;

        parse_comparison_reply(&reply).inspect_err(|e| {
            warn!("Discarding malformed comparison reply: {}", e);
        })
    }
}
