//! Comparative analysis through the HTTP router.

mod common;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use common::TestApp;
use lucidcare_core::domain::Language;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;

fn compare_body(ids: &[i64]) -> Value {
    json!({
        "summaries": ids
            .iter()
            .map(|id| json!({ "id": id, "fullText": "client copy, ignored" }))
            .collect::<Vec<_>>()
    })
}

/// A registered user with three summaries from January, March and June.
async fn patient_with_history(app: &TestApp) -> (String, [i64; 3]) {
    let token = app.register("asha@example.com", "pw").await;
    let user_id = app.db.user_id_for("asha@example.com").unwrap();

    let june = app.db.insert_summary_at(
        user_id,
        "Haemoglobin: 12.8 g/dL -> Normal",
        Language::English,
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
    );
    let january = app.db.insert_summary_at(
        user_id,
        "Haemoglobin: 9.1 g/dL -> Low",
        Language::English,
        Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap(),
    );
    let march = app.db.insert_summary_at(
        user_id,
        "Haemoglobin: 10.9 g/dL -> Low",
        Language::Malayalam,
        Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap(),
    );
    (token, [january, march, june])
}

#[tokio::test]
async fn fewer_than_two_summaries_is_rejected() {
    let app = TestApp::new();
    let (token, [january, _, _]) = patient_with_history(&app).await;

    for ids in [vec![], vec![january], vec![january, january]] {
        let (status, body) = app.post_json("/compare", Some(&token), compare_body(&ids)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "ids {:?}", ids);
        assert!(body["error"].is_string());
    }
    assert!(app.comparator.submitted_ids().is_empty());
}

#[tokio::test]
async fn missing_summaries_field_is_rejected() {
    let app = TestApp::new();
    let token = app.register("asha@example.com", "pw").await;

    let (status, _) = app.post_json("/compare", Some(&token), json!({ "ids": [1, 2] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn summaries_are_compared_oldest_first() {
    let app = TestApp::new();
    let (token, [january, march, june]) = patient_with_history(&app).await;

    let (status, body) = app
        .post_json("/compare", Some(&token), compare_body(&[june, january, march]))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (status, _) = app
        .post_json("/compare", Some(&token), compare_body(&[march, june]))
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        app.comparator.submitted_ids(),
        vec![vec![january, march, june], vec![march, june]]
    );
}

#[tokio::test]
async fn stored_text_is_used_rather_than_the_client_copy() {
    let app = TestApp::new();
    let (token, [january, march, _]) = patient_with_history(&app).await;

    app.post_json("/compare", Some(&token), compare_body(&[march, january]))
        .await;

    let calls = app.comparator.calls.lock().unwrap();
    assert_eq!(calls[0][0].text, "Haemoglobin: 9.1 g/dL -> Low");
    assert_eq!(calls[0][1].text, "Haemoglobin: 10.9 g/dL -> Low");
}

#[tokio::test]
async fn another_users_summary_is_not_found() {
    let app = TestApp::new();
    let (_, [january, _, _]) = patient_with_history(&app).await;
    let ravi = app.register("ravi@example.com", "pw").await;
    app.analyze(&ravi, Some(("labs.txt", b"ravi report")), Some("en")).await;
    let (_, listing) = app.get("/summaries", Some(&ravi)).await;
    let ravi_summary = listing[0]["summary_id"].as_i64().unwrap();

    let (status, body) = app
        .post_json("/compare", Some(&ravi), compare_body(&[ravi_summary, january]))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&january.to_string()));

    let (status, _) = app
        .post_json("/compare", Some(&ravi), compare_body(&[ravi_summary, 9_999]))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert!(app.comparator.submitted_ids().is_empty());
}

#[tokio::test]
async fn comparator_failure_is_a_bad_gateway() {
    let app = TestApp::new();
    let (token, [january, march, _]) = patient_with_history(&app).await;
    app.comparator.fail.store(true, Ordering::SeqCst);

    let (status, body) = app
        .post_json("/compare", Some(&token), compare_body(&[january, march]))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn comparison_response_shape() {
    let app = TestApp::new();
    let (token, [january, _, june]) = patient_with_history(&app).await;

    let (status, body) = app
        .post_json("/compare", Some(&token), compare_body(&[january, june]))
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["verdict"], "improved");
    assert_eq!(body["confidence"], 87);
    assert!(body["summary"].is_string());
    assert!(body["recommendation"].is_string());
    let highlight = &body["highlights"][0];
    assert_eq!(highlight["metric"], "Haemoglobin");
    assert_eq!(highlight["change"], "improved");
    assert_eq!(highlight["oldValue"], "9.1 g/dL");
    assert_eq!(highlight["newValue"], "12.8 g/dL");
}

#[tokio::test]
async fn compare_requires_a_token() {
    let app = TestApp::new();

    let (status, _) = app.post_json("/compare", None, compare_body(&[1, 2])).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
