//! POST handler: validate a submission and write it exactly once.

use axum::{
  Json,
  body::Body,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use chrono::Utc;
use missive_core::{
  Submission, SubmissionId, SubmissionRequest, store::SubmissionStore,
  submission::format_timestamp,
};
use rand_core::OsRng;
use serde::Serialize;

use crate::{AppState, collect_body, cors, error::Error};

/// Body of a successful submission response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Accepted {
  pub message:       &'static str,
  pub submission_id: SubmissionId,
  pub timestamp:     String,
}

pub async fn handler<S>(state: &AppState<S>, body: Body) -> Result<Response, Error>
where
  S: SubmissionStore,
{
  let bytes = collect_body(body, state.config.max_body_bytes).await?;
  let request = SubmissionRequest::from_json(&bytes)?;

  let submission = Submission::from_request(&request, Utc::now(), &mut OsRng)?;

  let submission = state
    .store
    .insert_if_absent(submission)
    .await
    .map_err(Error::from_store)?;

  tracing::info!(
    id = %submission.id,
    table = state.store.table(),
    "stored contact form submission"
  );

  let accepted = Accepted {
    message:       "Contact form submitted successfully",
    timestamp:     format_timestamp(submission.timestamp),
    submission_id: submission.id,
  };
  Ok((StatusCode::OK, cors::headers(), Json(accepted)).into_response())
}
