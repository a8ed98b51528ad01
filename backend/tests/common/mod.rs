//! Common test utilities for integration tests
//!
//! This module provides shared setup for integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use metabolic_risk_backend::{
    config::{AppConfig, LeadConfig, ServerConfig, SessionConfig},
    routes,
    state::AppState,
};
use serde_json::Value;
use tower::ServiceExt;

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    /// Application with no lead endpoint and an in-memory fallback store
    pub async fn new() -> Self {
        Self::with_lead_config(LeadConfig::default()).await
    }

    /// Application with a specific lead configuration
    pub async fn with_lead_config(lead: LeadConfig) -> Self {
        let mut config = test_config();
        config.lead = lead;
        Self::with_config(config).await
    }

    /// Application with a full configuration
    pub async fn with_config(config: AppConfig) -> Self {
        let state = AppState::new(config)
            .await
            .expect("Failed to build application state");
        let app = routes::create_router(state.clone());

        Self { app, state }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        self.send("GET", path, None).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        self.send("POST", path, Some(body)).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> (StatusCode, String) {
        self.send("DELETE", path, None).await
    }

    async fn send(&self, method: &str, path: &str, body: Option<&str>) -> (StatusCode, String) {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }

    /// Start a session and return its id
    pub async fn start_session(&self) -> String {
        let (status, body) = self.post("/api/v1/sessions", "").await;
        assert_eq!(status, StatusCode::CREATED);
        json(&body)["id"].as_str().unwrap().to_string()
    }

    /// Start a session and move it to the lead gate with the given measurements
    pub async fn session_at_lead_gate(&self, weight: &str, height: &str, waist: &str) -> String {
        let id = self.start_session().await;

        let body = serde_json::json!({ "weight": weight, "height": height, "waist": waist });
        let (status, _) = self
            .post(&format!("/api/v1/sessions/{}/measurements", id), &body.to_string())
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = self.post(&format!("/api/v1/sessions/{}/lead-gate", id), "").await;
        assert_eq!(status, StatusCode::OK);

        id
    }
}

/// Parse a response body
pub fn json(body: &str) -> Value {
    serde_json::from_str(body).expect("Response body is not JSON")
}

pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
        },
        session: SessionConfig::default(),
        lead: LeadConfig::default(),
        contact: Default::default(),
    }
}
