//! HTTP layer for Missive: the contact-form submission handler.
//!
//! Exposes [`handle`], which turns one inbound request into one response and
//! never fails, and an axum [`Router`] mounting it at [`CONTACT_PATH`] over
//! any [`SubmissionStore`].

pub mod cors;
pub mod error;
pub mod handlers;
pub mod settings;

pub use error::Error;
pub use settings::ServerConfig;

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  extract::{Request, State},
  response::{IntoResponse, Response},
  routing::any,
};
use bytes::Bytes;
use missive_core::store::SubmissionStore;
use tower_http::trace::TraceLayer;

use handlers::{options, submit};

/// Route the handler is mounted at.
pub const CONTACT_PATH: &str = "/contact";

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
///
/// The store is opened once per process and shared by every request.
pub struct AppState<S: SubmissionStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

impl<S: SubmissionStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      config: Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] serving the contact endpoint.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SubmissionStore + 'static,
{
  Router::new()
    .route(CONTACT_PATH, any(contact_handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn contact_handler<S>(
  State(state): State<AppState<S>>,
  req: Request<Body>,
) -> Response
where
  S: SubmissionStore + 'static,
{
  handle(&state, req).await
}

// ─── Handler ─────────────────────────────────────────────────────────────────

/// Process one contact-form request.
///
/// `OPTIONS` is answered as a CORS preflight, `POST` is validated and
/// persisted, and every other method gets a 405. The store is touched only
/// for a `POST` whose body passes validation, and then exactly once.
pub async fn handle<S>(state: &AppState<S>, req: Request<Body>) -> Response
where
  S: SubmissionStore,
{
  let method = req.method().clone();
  tracing::info!(%method, uri = %req.uri(), "contact form request");

  let result = match method.as_str() {
    "OPTIONS" => Ok(options::handler()),
    "POST" => submit::handler(state, req.into_body()).await,
    _ => Err(Error::MethodNotAllowed(method.clone())),
  };

  match result {
    Ok(response) => response,
    Err(e) => {
      if e.status().is_server_error() {
        tracing::error!(error = %e, "failed to process contact form submission");
      } else {
        tracing::warn!(error = %e, "contact form request refused");
      }
      e.into_response()
    }
  }
}

pub(crate) async fn collect_body(body: Body, limit: usize) -> Result<Bytes, Error> {
  axum::body::to_bytes(body, limit)
    .await
    .map_err(|e| Error::Body(e.to_string()))
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  };

  use axum::http::{Request, StatusCode, header};
  use chrono::DateTime;
  use missive_core::{
    Submission, SubmissionId,
    store::{ClassifyWrite, WriteFailure},
  };
  use missive_store_sqlite::{DEFAULT_TABLE, SqliteStore};
  use serde_json::Value;
  use tower::ServiceExt as _;

  // A store double that records every write attempt and can be told to fail.
  #[derive(Default)]
  struct RecordingStore {
    attempts:  AtomicUsize,
    written:   Mutex<Vec<Submission>>,
    fail_with: Option<WriteFailure>,
  }

  #[derive(Debug, thiserror::Error)]
  #[error("simulated {0:?} failure: connection reset at 10.0.0.7")]
  struct SimulatedFailure(WriteFailure);

  impl ClassifyWrite for SimulatedFailure {
    fn classify(&self) -> WriteFailure { self.0 }
  }

  impl SubmissionStore for RecordingStore {
    type Error = SimulatedFailure;

    fn table(&self) -> &str { "Recording" }

    async fn insert_if_absent(&self, submission: Submission) -> Result<Submission, Self::Error> {
      self.attempts.fetch_add(1, Ordering::SeqCst);
      if let Some(kind) = self.fail_with {
        return Err(SimulatedFailure(kind));
      }
      self.written.lock().unwrap().push(submission.clone());
      Ok(submission)
    }

    async fn get(&self, id: SubmissionId) -> Result<Option<Submission>, Self::Error> {
      Ok(
        self
          .written
          .lock()
          .unwrap()
          .iter()
          .find(|s| s.id == id)
          .cloned(),
      )
    }
  }

  impl RecordingStore {
    fn failing(kind: WriteFailure) -> Self {
      Self {
        fail_with: Some(kind),
        ..Self::default()
      }
    }

    fn attempts(&self) -> usize { self.attempts.load(Ordering::SeqCst) }
  }

  fn state_with<S: SubmissionStore>(store: S) -> AppState<S> {
    AppState {
      store:  Arc::new(store),
      config: Arc::new(ServerConfig::default()),
    }
  }

  async fn sqlite_state() -> AppState<SqliteStore> {
    state_with(SqliteStore::open_in_memory(DEFAULT_TABLE).await.unwrap())
  }

  async fn send<S: SubmissionStore + 'static>(
    state: AppState<S>,
    method: &str,
    body: &str,
  ) -> (StatusCode, axum::http::HeaderMap, Value) {
    let req = Request::builder()
      .method(method)
      .uri(CONTACT_PATH)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, headers, json)
  }

  fn assert_cors(headers: &axum::http::HeaderMap) {
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
  }

  const VALID: &str = r#"{"name":"Jo","email":"jo@x.com","message":"hi"}"#;

  // ── Method gating ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn options_is_a_preflight_and_touches_nothing() {
    let state = state_with(RecordingStore::default());
    let (status, headers, body) = send(state.clone(), "OPTIONS", "").await;

    assert_eq!(status, StatusCode::OK);
    assert_cors(&headers);
    assert_eq!(body["message"], "CORS preflight successful");
    assert_eq!(state.store.attempts(), 0);
  }

  #[tokio::test]
  async fn other_methods_get_405() {
    for method in ["GET", "PUT", "DELETE", "PATCH", "HEAD"] {
      let state = state_with(RecordingStore::default());
      let req = Request::builder()
        .method(method)
        .uri(CONTACT_PATH)
        .body(Body::from(VALID))
        .unwrap();
      let resp = router(state.clone()).oneshot(req).await.unwrap();

      assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
      assert_cors(resp.headers());
      assert_eq!(state.store.attempts(), 0, "{method}");
    }
  }

  #[tokio::test]
  async fn method_not_allowed_body() {
    let (status, _, body) = send(state_with(RecordingStore::default()), "GET", "").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
  }

  // ── Success ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn valid_submission_is_stored_once() {
    let state = sqlite_state().await;
    let (status, headers, body) = send(state.clone(), "POST", VALID).await;

    assert_eq!(status, StatusCode::OK);
    assert_cors(&headers);
    assert_eq!(body["message"], "Contact form submitted successfully");

    let id = SubmissionId::parse(body["submissionId"].as_str().unwrap()).unwrap();
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(timestamp).is_ok(), "{timestamp}");
    assert!(timestamp.ends_with('Z'));

    let stored = state.store.get(id).await.unwrap().expect("record written");
    assert_eq!(stored.name, "Jo");
    assert_eq!(stored.email, "jo@x.com");
    assert_eq!(stored.message, "hi");
    assert_eq!(stored.status.as_str(), "new");
    assert_eq!(stored.source, "contact-form");
    assert_eq!(stored.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true), timestamp);
  }

  #[tokio::test]
  async fn exactly_one_write_per_valid_request() {
    let state = state_with(RecordingStore::default());
    let (status, _, body) = send(state.clone(), "POST", VALID).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.store.attempts(), 1);
    let written = state.store.written.lock().unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].id.as_str(), body["submissionId"]);
  }

  #[tokio::test]
  async fn email_is_normalised_and_subject_defaulted() {
    let state = sqlite_state().await;
    let (status, _, body) = send(
      state.clone(),
      "POST",
      r#"{"name":" Jo ","email":" Foo@BAR.com ","message":" hi "}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let id = SubmissionId::parse(body["submissionId"].as_str().unwrap()).unwrap();
    let stored = state.store.get(id).await.unwrap().unwrap();
    assert_eq!(stored.email, "foo@bar.com");
    assert_eq!(stored.name, "Jo");
    assert_eq!(stored.subject, "No subject");
  }

  #[tokio::test]
  async fn extra_fields_are_ignored() {
    let state = state_with(RecordingStore::default());
    let (status, _, _) = send(
      state.clone(),
      "POST",
      r#"{"name":"Jo","email":"jo@x.com","subject":"Hi","message":"hi",
          "timestamp":"2020-01-01T00:00:00Z","status":"done","id":"contact_1_a"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let written = state.store.written.lock().unwrap();
    assert_eq!(written[0].subject, "Hi");
    assert_eq!(written[0].status.as_str(), "new");
    assert_ne!(written[0].id.as_str(), "contact_1_a");
  }

  // ── Client errors ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_fields_get_400_without_a_write() {
    for body in [
      r#"{"email":"jo@x.com","message":"hi"}"#,
      r#"{"name":"Jo","message":"hi"}"#,
      r#"{"name":"Jo","email":"jo@x.com"}"#,
      r#"{"name":"","email":"jo@x.com","message":"hi"}"#,
      r#"{"name":"Jo","email":"jo@x.com","message":null}"#,
      r#"{"name":false,"email":"jo@x.com","message":"hi"}"#,
      r#"{"name":"Jo","email":0,"message":"hi"}"#,
      r#"{"name":"Jo","email":"jo@x.com","message":0.0}"#,
      r#"{}"#,
    ] {
      let state = state_with(RecordingStore::default());
      let (status, headers, json) = send(state.clone(), "POST", body).await;

      assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
      assert_cors(&headers);
      assert_eq!(
        json["error"],
        "Missing required fields: name, email, and message are required"
      );
      assert_eq!(state.store.attempts(), 0);
    }
  }

  #[tokio::test]
  async fn malformed_email_gets_400_without_a_write() {
    for email in ["not-an-email", "jo@xcom", "jo @x.com", "jo@x.com@y.com"] {
      let state = state_with(RecordingStore::default());
      let body = format!(r#"{{"name":"Jo","email":"{email}","message":"hi"}}"#);
      let (status, _, json) = send(state.clone(), "POST", &body).await;

      assert_eq!(status, StatusCode::BAD_REQUEST, "{email}");
      assert_eq!(json["error"], "Invalid email format");
      assert_eq!(state.store.attempts(), 0);
    }
  }

  #[tokio::test]
  async fn non_object_bodies_get_400_without_a_write() {
    for body in [
      r#"["Jo","jo@x.com",null,"hi"]"#,
      r#""just a string""#,
      "17",
      "true",
    ] {
      let state = state_with(RecordingStore::default());
      let (status, headers, json) = send(state.clone(), "POST", body).await;

      assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
      assert_cors(&headers);
      assert_eq!(
        json["error"],
        "Missing required fields: name, email, and message are required"
      );
      assert_eq!(state.store.attempts(), 0, "{body}");
    }
  }

  #[tokio::test]
  async fn falsy_subject_is_defaulted() {
    for subject in ["false", "0", "null", r#""""#, r#"" ""#] {
      let state = state_with(RecordingStore::default());
      let body =
        format!(r#"{{"name":"Jo","email":"jo@x.com","subject":{subject},"message":"hi"}}"#);
      let (status, _, _) = send(state.clone(), "POST", &body).await;

      assert_eq!(status, StatusCode::OK, "{subject}");
      assert_eq!(state.store.written.lock().unwrap()[0].subject, "No subject");
    }
  }

  #[tokio::test]
  async fn duplicate_keys_keep_the_last_value() {
    let state = state_with(RecordingStore::default());
    let (status, _, _) = send(
      state.clone(),
      "POST",
      r#"{"name":"Ann","email":"jo@x.com","message":"hi","name":"Jo"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.store.attempts(), 1);
    assert_eq!(state.store.written.lock().unwrap()[0].name, "Jo");
  }

  // ── Store outcomes ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn conflict_maps_to_409() {
    let state = state_with(RecordingStore::failing(WriteFailure::Conflict));
    let (status, headers, body) = send(state.clone(), "POST", VALID).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_cors(&headers);
    assert_eq!(body["error"], "Duplicate submission detected");
    assert_eq!(state.store.attempts(), 1);
    assert!(state.store.written.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn store_validation_rejection_maps_to_400() {
    let state = state_with(RecordingStore::failing(WriteFailure::ValidationRejected));
    let (status, _, body) = send(state, "POST", VALID).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid data format");
  }

  #[tokio::test]
  async fn oversized_record_is_rejected_by_sqlite() {
    let state = sqlite_state().await;
    let message = "x".repeat(500 * 1024);
    let body = format!(r#"{{"name":"Jo","email":"jo@x.com","message":"{message}"}}"#);
    let (status, _, json) = send(state, "POST", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid data format");
  }

  #[tokio::test]
  async fn store_outage_maps_to_generic_500() {
    let state = state_with(RecordingStore::failing(WriteFailure::Other));
    let (status, headers, body) = send(state.clone(), "POST", VALID).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&headers);
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["message"], "Failed to process contact form submission");
    assert!(!body.to_string().contains("10.0.0.7"));
    assert_eq!(state.store.attempts(), 1);
  }

  // ── Undecodable bodies ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn undecodable_bodies_get_500_without_a_write() {
    for body in [
      "",
      "{not json",
      "null",
    ] {
      let state = state_with(RecordingStore::default());
      let (status, headers, json) = send(state.clone(), "POST", body).await;

      assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{body}");
      assert_cors(&headers);
      assert_eq!(json["error"], "Internal server error");
      assert_eq!(state.store.attempts(), 0);
    }
  }

  #[tokio::test]
  async fn truthy_non_string_fields_get_500_without_a_write() {
    for body in [
      r#"{"name":42,"email":"jo@x.com","message":"hi"}"#,
      r#"{"name":"Jo","email":"jo@x.com","message":{"text":"hi"}}"#,
      r#"{"name":"Jo","email":"jo@x.com","subject":true,"message":"hi"}"#,
    ] {
      let state = state_with(RecordingStore::default());
      let (status, headers, json) = send(state.clone(), "POST", body).await;

      assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{body}");
      assert_cors(&headers);
      assert_eq!(json["error"], "Internal server error");
      assert_eq!(json["message"], "Failed to process contact form submission");
      assert_eq!(state.store.attempts(), 0, "{body}");
    }
  }

  #[tokio::test]
  async fn non_string_email_gets_400() {
    let state = state_with(RecordingStore::default());
    let (status, _, json) = send(
      state.clone(),
      "POST",
      r#"{"name":"Jo","email":["jo@x.com"],"message":"hi"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid email format");
    assert_eq!(state.store.attempts(), 0);
  }

  #[tokio::test]
  async fn body_over_the_limit_gets_500_without_a_write() {
    let store = RecordingStore::default();
    let state = AppState {
      store:  Arc::new(store),
      config: Arc::new(ServerConfig {
        max_body_bytes: 16,
        ..ServerConfig::default()
      }),
    };
    let (status, _, _) = send(state.clone(), "POST", VALID).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(state.store.attempts(), 0);
  }

  // ── Direct invocation ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn handle_can_be_called_without_the_router() {
    let state = state_with(RecordingStore::default());
    let req = Request::builder()
      .method("POST")
      .uri("/anything")
      .body(Body::from(VALID))
      .unwrap();
    let resp = handle(&state, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_cors(resp.headers());
    assert_eq!(state.store.attempts(), 1);
  }
}
