//! services/api/src/adapters/summary_llm.rs
//!
//! This module contains the adapter for the report-summarizing LLM.
//! It implements the `ReportAnalysisService` port from the `core` crate.

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
    domain::Language,
    ports::{PortError, PortResult, ReportAnalysisService},
};
use once_cell::sync::Lazy;
use regex::Regex;

const SYSTEM_INSTRUCTIONS: &str = r#"You are an expert doctor explaining a detailed diagnosis to a patient.

STRICT FORMATTING RULES:
1. PLAIN TEXT ONLY. Do not use markdown (no bold **, no headers #, no bullets -).
2. NO Emojis.
3. NO Numbered lists for sections.
4. Format exactly like the example below.

REQUIRED OUTPUT FORMAT:

Vitals and Lab Data
[Medical Term] ([Simple Definition]): [Value] -> [Status]
[Medical Term] ([Simple Definition]): [Value] -> [Status]

X-Ray Findings
Condition: [Name]
Location: [Location]
Meaning: [Explanation]

Integrated Summary
[Detailed paragraph explaining the condition, evidence, and next steps in simple language.]

If the report has no imaging section, write "X-Ray Findings" followed by "Not included in this report."
"#;

const ENGLISH_INSTRUCTIONS: &str = r#"OUTPUT LANGUAGE: ENGLISH.
- Provide a detailed layman explanation.
- Connect all dots between the vitals, lab values and any imaging findings."#;

const MALAYALAM_INSTRUCTIONS: &str = r#"OUTPUT LANGUAGE: MALAYALAM.
CRITICAL INSTRUCTION: DO NOT SHORTEN THE REPORT.
Provide a detailed and comprehensive explanation, the same length as you would in English.
Explain why a value is dangerous.
Use simple Malayalam words, but keep the explanation long and clear.
Translate every single finding."#;

static MARKDOWN_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*|__").expect("emphasis pattern is valid"));
static LINE_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:#{1,6}[ \t]+|[-*•][ \t]+)").expect("line marker pattern is valid"));

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ReportAnalysisService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSummaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSummaryAdapter {
    /// Creates a new `OpenAiSummaryAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    fn language_instructions(language: Language) -> &'static str {
        match language {
            Language::English => ENGLISH_INSTRUCTIONS,
            Language::Malayalam => MALAYALAM_INSTRUCTIONS,
        }
    }
}

/// Strips the markdown the model sometimes emits despite being told not to.
pub fn to_plain_text(text: &str) -> String {
    let without_emphasis = MARKDOWN_EMPHASIS.replace_all(text, "");
    let without_markers = LINE_MARKERS.replace_all(&without_emphasis, "");
    without_markers.trim().to_string()
}

//=========================================================================================
// `ReportAnalysisService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ReportAnalysisService for OpenAiSummaryAdapter {
    async fn summarize_report(&self, report_text: &str, language: Language) -> PortResult<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(format!(
                    "{}\n{}",
                    SYSTEM_INSTRUCTIONS,
                    Self::language_instructions(language)
                ))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!(
                    "Here is the raw data:\n\n--- MEDICAL REPORT TEXT ---\n{}\n\nPlease generate the Detailed Integrated Summary in {}.",
                    report_text,
                    language.display_name()
                ))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.3)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Analysis(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Analysis("Summary LLM response contained no text content.".to_string())
            })?;

        let summary = to_plain_text(&content);
        if summary.is_empty() {
            return Err(PortError::Analysis(
                "Summary LLM returned an empty summary.".to_string(),
            ));
        }
        Ok(summary)
    }
}
