//! Integration tests for the assessment session API
//!
//! Drives the flow through HTTP the way the landing page does: measurements,
//! teaser, lead gate, contact form and the revealed result.

mod common;

use axum::http::StatusCode;
use common::{json, test_config, TestApp};
use metabolic_risk_backend::config::SessionConfig;
use std::time::Duration;
use rstest::rstest;
use serde_json::json as body;

#[tokio::test]
async fn test_create_session_starts_collecting_input() {
    let app = TestApp::new().await;

    let (status, response) = app.post("/api/v1/sessions", "").await;

    assert_eq!(status, StatusCode::CREATED);
    let session = json(&response);
    assert_eq!(session["state"], "collecting_input");
    assert_eq!(session["lead_gate_open"], false);
    assert!(session.get("preview").is_none());
    assert!(session.get("result").is_none());
}

#[tokio::test]
async fn test_low_risk_respondent_sees_full_result() {
    let app = TestApp::new().await;
    let id = app.start_session().await;

    let (status, response) = app
        .post(
            &format!("/api/v1/sessions/{}/measurements", id),
            &body!({ "weight": "70", "height": "170", "waist": "80" }).to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let session = json(&response);
    assert_eq!(session["state"], "preview_ready");
    assert_eq!(session["preview"]["has_risk"], false);
    assert!(session.get("result").is_none());

    let (status, _) = app
        .post(&format!("/api/v1/sessions/{}/lead-gate", id), "")
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, response) = app
        .post(
            &format!("/api/v1/sessions/{}/lead", id),
            &body!({ "name": "Ana Souza", "phone": "+55 (11) 99999-8888" }).to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let submitted = json(&response);
    assert_eq!(submitted["delivery"], "fell_back_to_local");

    let result = &submitted["session"]["result"];
    assert_eq!(submitted["session"]["state"], "result_revealed");
    assert_eq!(result["greeting"], "Ana, here is your result");
    assert_eq!(result["body_mass_index"], 24.2);
    assert_eq!(result["waist_to_height_ratio"], 0.47);
    assert_eq!(result["bmi"]["label"], "Adequate weight");
    assert_eq!(result["whtr"]["label"], "No elevated risk");
    assert!(result["contact_link"]
        .as_str()
        .unwrap()
        .starts_with("https://wa.me/5511999999999?text="));
}

#[tokio::test]
async fn test_high_risk_respondent_sees_elevated_result() {
    let app = TestApp::new().await;
    let id = app.session_at_lead_gate("95", "170", "110").await;

    let (_, response) = app.get(&format!("/api/v1/sessions/{}", id)).await;
    let session = json(&response);
    assert_eq!(session["state"], "lead_gate_open");
    assert_eq!(session["preview"]["has_risk"], true);

    let (status, response) = app
        .post(
            &format!("/api/v1/sessions/{}/lead", id),
            &body!({ "name": "Rui", "phone": "5521988887777" }).to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let result = &json(&response)["session"]["result"];
    assert_eq!(result["body_mass_index"], 32.9);
    assert_eq!(result["waist_to_height_ratio"], 0.65);
    assert_eq!(result["bmi"]["label"], "Obesity grade I");
    assert_eq!(result["whtr"]["label"], "Elevated cardiometabolic risk");
    assert!(result["whtr_interpretation"].as_str().unwrap().contains("0.50"));
}

#[tokio::test]
async fn test_preview_never_exposes_numbers() {
    let app = TestApp::new().await;
    let id = app.session_at_lead_gate("95", "170", "110").await;

    let (_, response) = app.get(&format!("/api/v1/sessions/{}", id)).await;

    assert!(!response.contains("32.9"));
    assert!(!response.contains("0.65"));
    assert!(json(&response).get("result").is_none());
}

#[tokio::test]
async fn test_invalid_weight_returns_field_errors() {
    let app = TestApp::new().await;
    let id = app.start_session().await;

    let (status, response) = app
        .post(
            &format!("/api/v1/sessions/{}/measurements", id),
            &body!({ "weight": "10", "height": "170", "waist": "80" }).to_string(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = json(&response);
    assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        error["error"]["fields"]["weight"],
        "Weight must be between 20 and 300 kg"
    );
    assert!(error["error"]["fields"].get("height").is_none());

    let (_, response) = app.get(&format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(json(&response)["state"], "collecting_input");
}

#[tokio::test]
async fn test_invalid_lead_keeps_gate_open() {
    let app = TestApp::new().await;
    let id = app.session_at_lead_gate("70", "170", "80").await;

    let (status, response) = app
        .post(
            &format!("/api/v1/sessions/{}/lead", id),
            &body!({ "name": "A", "phone": "11 9999" }).to_string(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = &json(&response)["error"]["fields"];
    assert_eq!(fields["name"], "Name must have at least 2 characters");
    assert!(fields["phone"].is_string());

    let (_, response) = app.get(&format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(json(&response)["state"], "lead_gate_open");
    assert!(app.state.leads().fallback().is_empty().await);
}

#[tokio::test]
async fn test_closing_gate_returns_to_preview() {
    let app = TestApp::new().await;
    let id = app.session_at_lead_gate("70", "170", "80").await;

    let (status, response) = app
        .delete(&format!("/api/v1/sessions/{}/lead-gate", id))
        .await;

    assert_eq!(status, StatusCode::OK);
    let session = json(&response);
    assert_eq!(session["state"], "preview_ready");
    assert_eq!(session["lead_gate_open"], false);
    assert_eq!(session["preview"]["has_risk"], false);
}

#[tokio::test]
async fn test_reset_discards_result() {
    let app = TestApp::new().await;
    let id = app.session_at_lead_gate("70", "170", "80").await;
    app.post(
        &format!("/api/v1/sessions/{}/lead", id),
        &body!({ "name": "Ana", "phone": "5511999998888" }).to_string(),
    )
    .await;

    let (status, response) = app
        .post(&format!("/api/v1/sessions/{}/reset", id), "")
        .await;

    assert_eq!(status, StatusCode::OK);
    let session = json(&response);
    assert_eq!(session["state"], "collecting_input");
    assert!(session.get("result").is_none());
    assert!(session.get("preview").is_none());
}

#[tokio::test]
async fn test_lead_attribution_comes_from_query() {
    let app = TestApp::new().await;
    let id = app.session_at_lead_gate("70", "170", "80").await;

    let (status, _) = app
        .post(
            &format!(
                "/api/v1/sessions/{}/lead?utm_source=google&utm_campaign=spring%20promo&gclid=x",
                id
            ),
            &body!({ "name": "Ana", "phone": "5511999998888" }).to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let leads = app.state.leads().fallback().entries().await;
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].traffic_attribution.utm_source, "google");
    assert_eq!(leads[0].traffic_attribution.utm_campaign, "spring promo");
    assert_eq!(leads[0].traffic_attribution.utm_medium, "");
}

#[rstest]
#[case::lead_before_measurement("lead-gate")]
#[case::reset_is_always_allowed("reset")]
#[tokio::test]
async fn test_transitions_from_collecting_input(#[case] action: &str) {
    let app = TestApp::new().await;
    let id = app.start_session().await;

    let (status, _) = app
        .post(&format!("/api/v1/sessions/{}/{}", id, action), "")
        .await;

    let expected = if action == "reset" {
        StatusCode::OK
    } else {
        StatusCode::CONFLICT
    };
    assert_eq!(status, expected);
}

#[tokio::test]
async fn test_submitting_lead_without_gate_is_conflict() {
    let app = TestApp::new().await;
    let id = app.start_session().await;

    let (status, response) = app
        .post(
            &format!("/api/v1/sessions/{}/lead", id),
            &body!({ "name": "Ana", "phone": "5511999998888" }).to_string(),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json(&response)["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_measurements_after_preview_is_conflict() {
    let app = TestApp::new().await;
    let id = app.session_at_lead_gate("70", "170", "80").await;

    let (status, _) = app
        .post(
            &format!("/api/v1/sessions/{}/measurements", id),
            &body!({ "weight": "80", "height": "170", "waist": "80" }).to_string(),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[rstest]
#[case::unknown_id("8d0f8a52-1f3c-4a8e-9a57-0a4b8f1e2c3d")]
#[case::malformed_id("not-a-session")]
#[tokio::test]
async fn test_unknown_session_is_not_found(#[case] id: &str) {
    let app = TestApp::new().await;

    let (status, response) = app.get(&format!("/api/v1/sessions/{}", id)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&response)["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_field_validation_endpoint() {
    let app = TestApp::new().await;

    let (status, response) = app
        .post(
            "/api/v1/fields/validate",
            &body!({ "field": "height", "value": "1a7,0" }).to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let checked = json(&response);
    assert_eq!(checked["value"], "170");
    assert!(checked.get("error").is_none());

    let (_, response) = app
        .post(
            "/api/v1/fields/validate",
            &body!({ "field": "waist", "value": "" }).to_string(),
        )
        .await;
    assert_eq!(json(&response)["error"], "Waist measurement is required");

    let (status, _) = app
        .post(
            "/api/v1/fields/validate",
            &body!({ "field": "shoe_size", "value": "42" }).to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_phone_format_endpoint() {
    let app = TestApp::new().await;

    let (status, response) = app
        .post(
            "/api/v1/phone/format",
            &body!({ "value": "55119999988889999" }).to_string(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let formatted = json(&response);
    assert_eq!(formatted["formatted"], "+55 (11) 99999-8888");
    assert_eq!(formatted["digits"], "5511999998888");
}

#[tokio::test]
async fn test_idle_session_expires_and_is_evicted() {
    let mut config = test_config();
    config.session = SessionConfig {
        idle_timeout_secs: 0,
        ..Default::default()
    };
    let app = TestApp::with_config(config).await;
    let id = app.start_session().await;

    tokio::time::sleep(Duration::from_millis(20)).await;

    let (status, response) = app.get(&format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&response)["error"]["code"], "NOT_FOUND");
    assert!(app.state.sessions().is_empty().await);
}
