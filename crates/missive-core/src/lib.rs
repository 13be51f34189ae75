//! Core types and trait definitions for the Missive contact-form intake.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store backend and the HTTP handler both depend on it.

pub mod error;
pub mod id;
pub mod store;
pub mod submission;
pub mod validate;

pub use error::{Error, Result};
pub use id::SubmissionId;
pub use submission::{FieldValue, Submission, SubmissionRequest, SubmissionStatus};
pub use validate::InvalidSubmission;
