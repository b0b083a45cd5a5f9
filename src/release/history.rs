//! Version history stored in metadata.json
//!
//! The history is append-only and newest-first. Existing entries are kept as
//! raw JSON so fields written by older tools survive a rewrite untouched.

use crate::core::error::{PackError, PackResult, ValidationError};
use crate::release::version::AddonVersion;
use crate::utils::read_json_object;
use serde_json::Value;
use std::path::Path;

/// Ordered list of released versions, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionHistory {
  entries: Vec<Value>,
}

impl VersionHistory {
  /// Load history from an existing metadata.json
  ///
  /// A missing file, or a file without a `versions` key, is an empty history.
  pub fn load(metadata_path: &Path) -> PackResult<Self> {
    if !metadata_path.is_file() {
      return Ok(Self::default());
    }

    let mut document = read_json_object(metadata_path)?;
    let entries = match document.remove("versions") {
      None => Vec::new(),
      Some(Value::Array(entries)) => entries,
      Some(_) => {
        return Err(PackError::message(format!(
          "Invalid {}: 'versions' must be an array",
          metadata_path.display()
        )));
      }
    };

    tracing::debug!(
      "loaded {} existing version(s) from {}",
      entries.len(),
      metadata_path.display()
    );
    Ok(Self { entries })
  }

  /// Build a history from raw entries (newest first)
  #[cfg(test)]
  pub fn from_entries(entries: Vec<Value>) -> Self {
    Self { entries }
  }

  #[cfg(test)]
  pub fn entries(&self) -> &[Value] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[cfg(test)]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Version strings in history order
  pub fn versions(&self) -> impl Iterator<Item = &str> {
    self
      .entries
      .iter()
      .filter_map(|entry| entry.get("version").and_then(Value::as_str))
  }

  /// Check whether a version was already released
  pub fn contains(&self, version: &AddonVersion) -> bool {
    self.versions().any(|v| v == version.as_str())
  }

  /// Reject a version that already exists in history
  pub fn ensure_unique(&self, version: &AddonVersion) -> PackResult<()> {
    if self.contains(version) {
      return Err(
        ValidationError::DuplicateVersion {
          version: version.to_string(),
        }
        .into(),
      );
    }
    Ok(())
  }

  /// New history with `entry` at index 0 and all prior entries after it
  pub fn prepend(self, entry: Value) -> Self {
    let mut entries = Vec::with_capacity(self.entries.len() + 1);
    entries.push(entry);
    entries.extend(self.entries);
    Self { entries }
  }

  pub fn into_entries(self) -> Vec<Value> {
    self.entries
  }
}
