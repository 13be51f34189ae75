//! The fixed cross-origin header set attached to every response.
//!
//! Browsers refuse to expose a cross-origin response to the calling page
//! unless these are present, including on errors.

use axum::http::{HeaderName, HeaderValue, header};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "Content-Type";
pub const ALLOW_METHODS: &str = "POST, OPTIONS";

pub fn headers() -> [(HeaderName, HeaderValue); 3] {
  [
    (
      header::ACCESS_CONTROL_ALLOW_ORIGIN,
      HeaderValue::from_static(ALLOW_ORIGIN),
    ),
    (
      header::ACCESS_CONTROL_ALLOW_HEADERS,
      HeaderValue::from_static(ALLOW_HEADERS),
    ),
    (
      header::ACCESS_CONTROL_ALLOW_METHODS,
      HeaderValue::from_static(ALLOW_METHODS),
    ),
  ]
}
