// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;
use volunteer_trainer::{
    api::{create_app, AppState},
    auth::{PasswordHasher, SessionTokens},
    coordinator::{CoordinatorConfig, JobCoordinator},
    store::InMemoryStore,
    testing::{RecordingLedger, ScriptedPipeline, StaticSystemInfo},
};

pub const SECRET: &[u8] = b"api-test-secret";

pub struct TestApp {
    pub router: Router,
    pub pipeline: ScriptedPipeline,
    pub ledger: RecordingLedger,
}

pub fn app(require_session: bool) -> TestApp {
    let pipeline = ScriptedPipeline::succeeding();
    let ledger = RecordingLedger::new();
    let coordinator = JobCoordinator::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(pipeline.clone()),
        Arc::new(ledger.clone()),
        Arc::new(StaticSystemInfo::sample()),
        SessionTokens::new(SECRET, Duration::from_secs(3600)),
        CoordinatorConfig {
            registry_namespace: "alice".to_string(),
            password_hasher: PasswordHasher::with_iterations(1_000),
            ..CoordinatorConfig::default()
        },
    );
    TestApp {
        router: create_app(AppState::new(Arc::new(coordinator), require_session)),
        pipeline,
        ledger,
    }
}

impl TestApp {
    /// Send a request and decode the JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("x-access-token", token);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Register a@b.com and log in, returning (registration, token).
    pub async fn volunteer_session(&self) -> (Value, String) {
        let (status, registered) = self
            .send(
                Method::POST,
                "/register-volunteer",
                Some(serde_json::json!({"name": "Ada", "email": "a@b.com"})),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, login) = self
            .send(
                Method::POST,
                "/login",
                Some(serde_json::json!({
                    "email": "a@b.com",
                    "password": registered["password"],
                })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let token = login["token"].as_str().unwrap().to_string();
        (registered, token)
    }
}
