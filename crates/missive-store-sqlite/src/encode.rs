//! Conversion between [`Submission`] and the plain column values stored in
//! SQLite.
//!
//! Timestamps are stored in the same ISO 8601 form the API returns. The id
//! and status are stored as their string forms and re-validated on read.

use missive_core::{
  Submission, SubmissionId,
  submission::{format_timestamp, parse_timestamp},
};

use crate::Result;

/// A row as read from or written to the submissions table.
#[derive(Debug)]
pub struct RawSubmission {
  pub id:         String,
  pub name:       String,
  pub email:      String,
  pub subject:    String,
  pub message:    String,
  pub timestamp:  String,
  pub created_at: i64,
  pub status:     String,
  pub source:     String,
}

impl RawSubmission {
  pub fn from_submission(s: &Submission) -> Self {
    Self {
      id:         s.id.to_string(),
      name:       s.name.clone(),
      email:      s.email.clone(),
      subject:    s.subject.clone(),
      message:    s.message.clone(),
      timestamp:  format_timestamp(s.timestamp),
      created_at: s.created_at,
      status:     s.status.as_str().to_owned(),
      source:     s.source.clone(),
    }
  }

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      email:      row.get(2)?,
      subject:    row.get(3)?,
      message:    row.get(4)?,
      timestamp:  row.get(5)?,
      created_at: row.get(6)?,
      status:     row.get(7)?,
      source:     row.get(8)?,
    })
  }

  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission {
      id:         SubmissionId::parse(&self.id)?,
      name:       self.name,
      email:      self.email,
      subject:    self.subject,
      message:    self.message,
      timestamp:  parse_timestamp(&self.timestamp)?,
      created_at: self.created_at,
      status:     self.status.parse()?,
      source:     self.source,
    })
  }
}
