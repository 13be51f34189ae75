//! Submission identifiers.
//!
//! An id has the shape `contact_<millis>_<suffix>`: the capture time in
//! milliseconds since the Unix epoch followed by a random base-36 suffix. The
//! timestamp keeps ids roughly sortable when reading logs; the suffix makes
//! collisions between concurrent submissions in the same millisecond
//! practically impossible. The store's conditional write is the only backstop
//! if one does happen.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rand_core::RngCore;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const PREFIX: &str = "contact_";

/// Number of base-36 characters in the random suffix (~62 bits).
pub const SUFFIX_LEN: usize = 12;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// The primary key of a stored [`Submission`](crate::Submission).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubmissionId(String);

impl SubmissionId {
  /// Mint a fresh id for a submission captured at `at`.
  pub fn generate<R: RngCore + ?Sized>(at: DateTime<Utc>, rng: &mut R) -> Self {
    let mut bits = (u128::from(rng.next_u64()) << 64) | u128::from(rng.next_u64());
    let mut suffix = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
      suffix.push(ALPHABET[(bits % 36) as usize] as char);
      bits /= 36;
    }
    Self(format!("{PREFIX}{}_{suffix}", at.timestamp_millis()))
  }

  /// Validate and wrap an id read back from storage or supplied by a caller.
  pub fn parse(s: &str) -> Result<Self> {
    let well_formed = s
      .strip_prefix(PREFIX)
      .and_then(|rest| rest.split_once('_'))
      .is_some_and(|(millis, suffix)| {
        !millis.is_empty()
          && millis.bytes().all(|b| b.is_ascii_digit())
          && !suffix.is_empty()
          && suffix.bytes().all(|b| b.is_ascii_alphanumeric())
      });

    if well_formed {
      Ok(Self(s.to_owned()))
    } else {
      Err(Error::InvalidId(s.to_owned()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SubmissionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl FromStr for SubmissionId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for SubmissionId {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<SubmissionId> for String {
  fn from(id: SubmissionId) -> Self { id.0 }
}
