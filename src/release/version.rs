//! Add-on version strings
//!
//! KiCad PCM versions are `major[.minor[.patch]]` with at most 4, 4 and 6
//! digits per group. They are not semver: `1` and `1.2` are both valid and
//! are kept verbatim, never normalized. A digit is any Unicode decimal digit.

use crate::core::error::{PackResult, ValidationError};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static VERSION_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\d{1,4}(\.\d{1,4}(\.\d{1,6})?)?$").unwrap());

/// A validated add-on version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddonVersion(String);

impl AddonVersion {
  /// Validate a version string exactly as given
  pub fn parse(input: &str) -> PackResult<Self> {
    if VERSION_PATTERN.is_match(input) {
      Ok(Self(input.to_string()))
    } else {
      Err(
        ValidationError::InvalidVersion {
          input: input.to_string(),
        }
        .into(),
      )
    }
  }

  /// Validate interactive input, ignoring surrounding whitespace
  pub fn parse_prompt(input: &str) -> PackResult<Self> {
    Self::parse(input.trim())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for AddonVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for AddonVersion {
  fn as_ref(&self) -> &str {
    &self.0
  }
}
