//! Field validation for inbound submissions.
//!
//! Checks run in a fixed order and the first failure wins: presence of the
//! three required fields, then the shape of the email address, then the
//! types of the remaining fields.

use thiserror::Error;

use crate::submission::{FieldValue, SubmissionRequest};

/// Why a submission was refused before reaching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidSubmission {
  #[error("missing required fields: name, email, and message are required")]
  MissingFields,

  #[error("invalid email format")]
  InvalidEmail,

  /// A field held a truthy value that is not a string. The form never sends
  /// these, so the caller treats it as an internal failure rather than a
  /// client error.
  #[error("field `{0}` is not a string")]
  UnsupportedValue(&'static str),
}

/// The trimmed fields of a request that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidFields<'a> {
  pub name:    &'a str,
  pub email:   &'a str,
  /// `None` when the subject was absent or blank.
  pub subject: Option<&'a str>,
  pub message: &'a str,
}

/// A field after trimming.
#[derive(Debug, Clone, Copy)]
enum Presence<'a> {
  Missing,
  Text(&'a str),
  Other,
}

impl<'a> Presence<'a> {
  fn of(field: &'a FieldValue) -> Self {
    match field {
      FieldValue::Absent => Self::Missing,
      FieldValue::Text(s) => match trim(s) {
        "" => Self::Missing,
        t => Self::Text(t),
      },
      FieldValue::Unsupported(_) => Self::Other,
    }
  }

  fn text(self, field: &'static str) -> Result<Option<&'a str>, InvalidSubmission> {
    match self {
      Self::Missing => Ok(None),
      Self::Text(t) => Ok(Some(t)),
      Self::Other => Err(InvalidSubmission::UnsupportedValue(field)),
    }
  }
}

/// Validate `request`, returning borrowed, trimmed views of its fields.
pub fn validate(request: &SubmissionRequest) -> Result<ValidFields<'_>, InvalidSubmission> {
  let name = Presence::of(&request.name);
  let email = Presence::of(&request.email);
  let message = Presence::of(&request.message);

  if [name, email, message]
    .iter()
    .any(|p| matches!(p, Presence::Missing))
  {
    return Err(InvalidSubmission::MissingFields);
  }

  // A non-string email can never be a valid address.
  let Presence::Text(email) = email else {
    return Err(InvalidSubmission::InvalidEmail);
  };
  if !is_valid_email(email) {
    return Err(InvalidSubmission::InvalidEmail);
  }

  let (Some(name), Some(message)) = (name.text("name")?, message.text("message")?) else {
    return Err(InvalidSubmission::MissingFields);
  };

  Ok(ValidFields {
    name,
    email,
    subject: Presence::of(&request.subject).text("subject")?,
    message,
  })
}

/// Accepts `local@domain.tld`-shaped addresses: no whitespace, exactly one
/// `@` with something before it, and a domain holding a `.` that is neither
/// its first nor its last character.
///
/// Equivalent to `^[^\s@]+@[^\s@]+\.[^\s@]+$`. The acceptance boundary is
/// relied upon downstream, so it is kept permissive and must not be tightened.
pub fn is_valid_email(candidate: &str) -> bool {
  if candidate.chars().any(is_whitespace) {
    return false;
  }

  let Some((local, domain)) = candidate.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.contains('@') {
    return false;
  }

  domain
    .char_indices()
    .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Strip leading and trailing whitespace as [`is_whitespace`] defines it.
pub fn trim(s: &str) -> &str { s.trim_matches(is_whitespace) }

/// The ECMAScript `\s` class: Unicode `White_Space` minus U+0085, plus the
/// byte-order mark. Browsers trim and match with this set, so the server does
/// too.
pub fn is_whitespace(c: char) -> bool {
  (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}
