//! Shared helpers for HTTP surface tests.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use rstest::fixture;
use serde_json::Value;
use std::sync::Arc;
use taskboard::api::{AppState, router};
use taskboard::config::ServiceConfig;
use taskboard::identity::StaticTokenProvider;
use taskboard::task::adapters::memory::InMemoryTaskRepository;
use taskboard::task::domain::OwnerId;
use tower::ServiceExt;

/// Bearer token of the first test user.
pub const ALICE: &str = "alice-token";
/// Bearer token of the second test user.
pub const BOB: &str = "bob-token";

/// Router plus the identities it accepts.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
    /// Owner behind [`ALICE`].
    pub alice: OwnerId,
    /// Owner behind [`BOB`].
    pub bob: OwnerId,
}

/// Status code and decoded body of a response.
///
/// Empty bodies decode to [`Value::Null`] and non-JSON bodies to a
/// [`Value::String`].
pub struct TestResponse {
    /// Response status.
    pub status: StatusCode,
    /// Decoded body.
    pub body: Value,
}

impl TestApp {
    /// Builds an app over a fresh in-memory repository.
    #[must_use]
    pub fn with_config(config: ServiceConfig) -> Self {
        let alice = OwnerId::new();
        let bob = OwnerId::new();
        let identity = Arc::new(StaticTokenProvider::new([
            (ALICE.to_owned(), alice),
            (BOB.to_owned(), bob),
        ]));
        let state = AppState::new(Arc::new(InMemoryTaskRepository::new()), identity, config);
        Self {
            router: router(state),
            alice,
            bob,
        }
    }

    /// Sends a request and decodes the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built or the body cannot
    /// be read.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse, eyre::Report> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(bearer) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let decoded = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok(TestResponse {
            status,
            body: decoded,
        })
    }

    /// Creates a task as `token` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers `201` with an id.
    pub async fn create_task(&self, token: &str, body: Value) -> Result<String, eyre::Report> {
        let response = self
            .send(Method::POST, "/tasks", Some(token), Some(body))
            .await?;
        eyre::ensure!(
            response.status == StatusCode::CREATED,
            "create failed with {}: {}",
            response.status,
            response.body
        );
        response
            .body
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| eyre::eyre!("created task has no id"))
    }

    /// Returns the ids of `token`'s tasks in list order.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers `200` with an array.
    pub async fn list_ids(&self, token: &str, uri: &str) -> Result<Vec<String>, eyre::Report> {
        let response = self.send(Method::GET, uri, Some(token), None).await?;
        eyre::ensure!(response.status == StatusCode::OK, "list failed: {}", response.body);
        let tasks = response
            .body
            .as_array()
            .ok_or_else(|| eyre::eyre!("list did not return an array"))?;
        Ok(tasks
            .iter()
            .filter_map(|task| task.get("id").and_then(Value::as_str))
            .map(str::to_owned)
            .collect())
    }
}

/// Extracts the `error` message of an error response.
#[must_use]
pub fn error_message(response: &TestResponse) -> Option<&str> {
    response.body.get("error").and_then(Value::as_str)
}

/// Provides an app with default configuration.
#[fixture]
pub fn app() -> TestApp {
    TestApp::with_config(ServiceConfig::default())
}
