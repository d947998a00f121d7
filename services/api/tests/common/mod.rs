//! Shared fixtures for the API integration tests: in-memory fakes for every
//! port and a small client around the real router.

#![allow(dead_code)]

use api_lib::{
    adapters::PdfTextExtractor,
    config::Config,
    services::TokenSigner,
    web::{self, state::AppState},
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use lucidcare_core::{
    domain::{
        ComparisonEntry, ComparisonResult, Language, MetricHighlight, NewUser, Summary, Trend,
        User, UserCredentials,
    },
    ports::{ComparisonService, DatabaseService, PortError, PortResult, ReportAnalysisService},
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, AtomicI64, Ordering},
    Arc, Mutex,
};
use tower::ServiceExt;
use uuid::Uuid;

pub const BOUNDARY: &str = "lucidcare-test-boundary";

//=========================================================================================
// In-memory store
//=========================================================================================

#[derive(Default)]
pub struct InMemoryDb {
    users: Mutex<Vec<(User, String)>>,
    summaries: Mutex<Vec<Summary>>,
    next_summary_id: AtomicI64,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self {
            next_summary_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Inserts a summary with an explicit timestamp, bypassing the analysis flow.
    pub fn insert_summary_at(
        &self,
        user_id: Uuid,
        text: &str,
        language: Language,
        created_at: DateTime<Utc>,
    ) -> i64 {
        let summary_id = self.next_summary_id.fetch_add(1, Ordering::SeqCst);
        self.summaries.lock().unwrap().push(Summary {
            summary_id,
            user_id,
            summary_text: text.to_string(),
            language,
            created_at,
        });
        summary_id
    }

    pub fn user_id_for(&self, email: &str) -> Option<Uuid> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(u, _)| u.user_id)
    }

    pub fn summary_count(&self) -> usize {
        self.summaries.lock().unwrap().len()
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user(&self, user: NewUser) -> PortResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|(u, _)| u.email == user.email) {
            return Err(PortError::Conflict(user.email));
        }
        let created = User {
            user_id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            age: user.age,
            sex: user.sex,
            created_at: Utc::now(),
        };
        users.push((created.clone(), user.hashed_password));
        Ok(created)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(u, hash)| UserCredentials {
                user_id: u.user_id,
                email: u.email.clone(),
                hashed_password: hash.clone(),
            })
            .ok_or_else(|| PortError::NotFound(email.to_string()))
    }

    async fn create_summary(
        &self,
        user_id: Uuid,
        summary_text: &str,
        language: Language,
    ) -> PortResult<Summary> {
        let summary_id = self.insert_summary_at(user_id, summary_text, language, Utc::now());
        self.summaries
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.summary_id == summary_id)
            .cloned()
            .ok_or_else(|| PortError::Unexpected("insert lost".to_string()))
    }

    async fn get_summaries_by_user(&self, user_id: Uuid) -> PortResult<Vec<Summary>> {
        let mut rows: Vec<Summary> = self
            .summaries
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_user_summaries_by_ids(
        &self,
        user_id: Uuid,
        summary_ids: &[i64],
    ) -> PortResult<Vec<Summary>> {
        Ok(self
            .summaries
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id && summary_ids.contains(&s.summary_id))
            .cloned()
            .collect())
    }
}

//=========================================================================================
// Analysis fakes
//=========================================================================================

/// Echoes the report text back with the language code, or fails on demand.
#[derive(Default)]
pub struct StubAnalyzer {
    pub fail: AtomicBool,
}

#[async_trait]
impl ReportAnalysisService for StubAnalyzer {
    async fn summarize_report(&self, report_text: &str, language: Language) -> PortResult<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Analysis("upstream returned 503".to_string()));
        }
        Ok(format!(
            "Vitals and Lab Data\nSummary ({}) of: {}",
            language.code(),
            report_text
        ))
    }
}

/// Records the order in which summaries were submitted.
#[derive(Default)]
pub struct RecordingComparator {
    pub calls: Mutex<Vec<Vec<ComparisonEntry>>>,
    pub fail: AtomicBool,
}

impl RecordingComparator {
    pub fn submitted_ids(&self) -> Vec<Vec<i64>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.iter().map(|e| e.summary_id).collect())
            .collect()
    }
}

#[async_trait]
impl ComparisonService for RecordingComparator {
    async fn compare_summaries(&self, entries: &[ComparisonEntry]) -> PortResult<ComparisonResult> {
        self.calls.lock().unwrap().push(entries.to_vec());
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Analysis("Comparison reply was not valid JSON".to_string()));
        }
        Ok(ComparisonResult {
            verdict: Trend::Improved,
            confidence: 87,
            summary: "Your haemoglobin has recovered.".to_string(),
            highlights: vec![MetricHighlight {
                metric: "Haemoglobin".to_string(),
                change: Trend::Improved,
                old_value: "9.1 g/dL".to_string(),
                new_value: "12.8 g/dL".to_string(),
                note: "Back within the normal range.".to_string(),
            }],
            recommendation: "Continue the current treatment.".to_string(),
        })
    }
}

//=========================================================================================
// Test application
//=========================================================================================

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub db: Arc<InMemoryDb>,
    pub analyzer: Arc<StubAnalyzer>,
    pub comparator: Arc<RecordingComparator>,
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("DATABASE_URL", "postgres://unused/test"),
        ("JWT_SECRET", "integration-test-secret"),
        ("LLM_API_KEY", "unused"),
        ("MAX_UPLOAD_BYTES", "1048576"),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

impl TestApp {
    pub fn new() -> Self {
        let config = Arc::new(test_config());
        let db = Arc::new(InMemoryDb::new());
        let analyzer = Arc::new(StubAnalyzer::default());
        let comparator = Arc::new(RecordingComparator::default());

        let state = Arc::new(AppState {
            db: db.clone(),
            tokens: TokenSigner::new(&config.jwt_secret, config.token_ttl_secs),
            config,
            extractor: Arc::new(PdfTextExtractor::new()),
            analyzer: analyzer.clone(),
            comparator: comparator.clone(),
        });

        Self {
            router: web::router(state.clone()),
            state,
            db,
            analyzer,
            comparator,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header("token", token);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("token", token);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Registers a user and returns their token.
    pub async fn register(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post_json(
                "/auth/register",
                None,
                json!({
                    "name": "Test Patient",
                    "email": email,
                    "password": password,
                    "age": 41,
                    "sex": "female",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn analyze(
        &self,
        token: &str,
        file: Option<(&str, &[u8])>,
        language: Option<&str>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header("token", token)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(file, language)))
            .unwrap();
        self.send(request).await
    }
}

pub fn multipart_body(file: Option<(&str, &[u8])>, language: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some((file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"pdf\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(language) = language {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"language\"\r\n\r\n{}\r\n",
                BOUNDARY, language
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// A one-page PDF whose only content is `text` in Helvetica, with a valid xref table.
pub fn single_page_pdf(text: &str) -> Vec<u8> {
    let content = format!("BT\n/F1 18 Tf\n72 720 Td\n({}) Tj\nET\n", text);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}endstream", content.len(), content),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    pdf
}
