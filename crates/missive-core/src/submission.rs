//! Submission types: the untrusted request and the durable record built from
//! it.
//!
//! A [`Submission`] is created exactly once per accepted request and is never
//! updated or deleted by this system. Downstream consumers advance its
//! [`SubmissionStatus`].

use std::{fmt, str::FromStr};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rand_core::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  Error, Result,
  id::SubmissionId,
  validate::{self, InvalidSubmission},
};

/// Stored when the caller leaves the subject out or blank.
pub const DEFAULT_SUBJECT: &str = "No subject";

/// Provenance tag attached to every record.
pub const SOURCE: &str = "contact-form";

// ─── Request ─────────────────────────────────────────────────────────────────

/// One field of the request body, read the way the browser-side form would
/// read it.
///
/// JSON falsy values (`null`, `false`, `0`, `""`) and missing keys are
/// [`FieldValue::Absent`]. Any other value that is not a string is kept as
/// [`FieldValue::Unsupported`] so validation can refuse it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldValue {
  #[default]
  Absent,
  Text(String),
  Unsupported(Value),
}

impl FieldValue {
  fn from_json(value: Option<Value>) -> Self {
    match value {
      None | Some(Value::Null) | Some(Value::Bool(false)) => Self::Absent,
      Some(Value::Number(n)) if n.as_f64().is_some_and(|f| f == 0.0) => Self::Absent,
      Some(Value::String(s)) if s.is_empty() => Self::Absent,
      Some(Value::String(s)) => Self::Text(s),
      Some(other) => Self::Unsupported(other),
    }
  }
}

impl From<&str> for FieldValue {
  fn from(s: &str) -> Self { Self::from_json(Some(Value::String(s.to_owned()))) }
}

/// The decoded JSON body of a submission. Only the four named keys of a JSON
/// object are read; everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionRequest {
  pub name:    FieldValue,
  pub email:   FieldValue,
  pub subject: FieldValue,
  pub message: FieldValue,
}

impl SubmissionRequest {
  /// Decode a raw request body.
  ///
  /// Bodies that are JSON but not an object (arrays, strings, numbers,
  /// booleans) have no named fields and decode to an all-absent request.
  /// Duplicate keys keep the last value. Malformed JSON and a bare `null`
  /// are errors.
  pub fn from_json(body: &[u8]) -> Result<Self> {
    match serde_json::from_slice::<Value>(body)? {
      Value::Null => Err(Error::NullBody),
      Value::Object(mut fields) => {
        let mut take = |key: &str| FieldValue::from_json(fields.remove(key));
        Ok(Self {
          name:    take("name"),
          email:   take("email"),
          subject: take("subject"),
          message: take("message"),
        })
      }
      _ => Ok(Self::default()),
    }
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle marker for downstream processing. Records are always created as
/// [`SubmissionStatus::New`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
  #[default]
  New,
}

impl SubmissionStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::New => "new",
    }
  }
}

impl fmt::Display for SubmissionStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for SubmissionStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "new" => Ok(Self::New),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// The durable record persisted for each accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  pub id:         SubmissionId,
  pub name:       String,
  /// Always trimmed and lower-cased.
  pub email:      String,
  pub subject:    String,
  pub message:    String,
  /// Capture time, truncated to milliseconds.
  #[serde(with = "iso8601")]
  pub timestamp:  DateTime<Utc>,
  /// Capture time in whole seconds, for retention policies.
  pub created_at: i64,
  pub status:     SubmissionStatus,
  pub source:     String,
}

impl Submission {
  /// Validate `request` and build the record for it.
  ///
  /// `now` is the capture instant; the id, `timestamp` and `created_at` are
  /// all derived from it. `rng` supplies the id's random suffix.
  pub fn from_request<R: RngCore + ?Sized>(
    request: &SubmissionRequest,
    now: DateTime<Utc>,
    rng: &mut R,
  ) -> Result<Self, InvalidSubmission> {
    let fields = validate::validate(request)?;
    let captured = now.trunc_subsecs(3);

    Ok(Self {
      id:         SubmissionId::generate(captured, rng),
      name:       fields.name.to_owned(),
      email:      fields.email.to_lowercase(),
      subject:    fields.subject.unwrap_or(DEFAULT_SUBJECT).to_owned(),
      message:    fields.message.to_owned(),
      timestamp:  captured,
      created_at: captured.timestamp(),
      status:     SubmissionStatus::New,
      source:     SOURCE.to_owned(),
    })
  }
}

/// Render a timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::InvalidTimestamp {
      value:  s.to_owned(),
      reason: e.to_string(),
    })
}

mod iso8601 {
  use chrono::{DateTime, Utc};
  use serde::{Deserialize, Deserializer, Serializer, de};

  pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&super::format_timestamp(*dt))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(d)?;
    super::parse_timestamp(&raw).map_err(de::Error::custom)
  }
}
