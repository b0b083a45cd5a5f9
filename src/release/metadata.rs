//! Add-on metadata documents
//!
//! Two documents are derived from `metadata.template.json`:
//! - the internal metadata embedded in the release archive, listing only the
//!   version being packaged
//! - the full metadata.json, listing every release newest-first with its
//!   download location and integrity data

use crate::core::error::PackResult;
use crate::release::history::VersionHistory;
use crate::release::version::AddonVersion;
use crate::utils::write_json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Status written for every release
pub const STABLE_STATUS: &str = "stable";

/// Version entry embedded in the release archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalVersionRecord {
  pub version: String,
  pub status: String,
  pub kicad_version: String,
}

impl InternalVersionRecord {
  pub fn new(version: &AddonVersion, kicad_version: &str) -> Self {
    Self {
      version: version.to_string(),
      status: STABLE_STATUS.to_string(),
      kicad_version: kicad_version.to_string(),
    }
  }
}

/// Version entry published in metadata.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
  pub version: String,
  pub status: String,
  pub kicad_version: String,
  pub download_sha256: String,
  pub download_size: u64,
  pub download_url: String,
  pub install_size: u64,
}

/// Measurements of a built release archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveStats {
  /// SHA-256 of the archive file
  pub sha256: String,
  /// Size of the archive file on disk
  pub download_size: u64,
  /// Sum of uncompressed member sizes
  pub install_size: u64,
}

impl VersionRecord {
  /// Build a record for a freshly packaged archive
  pub fn new(version: &AddonVersion, kicad_version: &str, download_url: String, stats: &ArchiveStats) -> Self {
    Self {
      version: version.to_string(),
      status: STABLE_STATUS.to_string(),
      kicad_version: kicad_version.to_string(),
      download_sha256: stats.sha256.clone(),
      download_size: stats.download_size,
      download_url,
      install_size: stats.install_size,
    }
  }
}

/// Metadata document: the template plus a `versions` list
#[derive(Debug, Clone, PartialEq)]
pub struct AddonMetadata(Map<String, Value>);

impl AddonMetadata {
  /// Metadata embedded in the archive, listing only the packaged version
  pub fn internal(template: &Map<String, Value>, record: &InternalVersionRecord) -> PackResult<Self> {
    let mut document = template.clone();
    document.insert("versions".to_string(), Value::Array(vec![serde_json::to_value(record)?]));
    Ok(Self(document))
  }

  /// Full metadata with `record` prepended to the prior history
  pub fn release(template: &Map<String, Value>, history: VersionHistory, record: &VersionRecord) -> PackResult<Self> {
    let history = history.prepend(serde_json::to_value(record)?);
    let mut document = template.clone();
    document.insert("versions".to_string(), Value::Array(history.into_entries()));
    Ok(Self(document))
  }

  /// Wrap an already assembled document
  #[cfg(test)]
  pub fn from_map(document: Map<String, Value>) -> Self {
    Self(document)
  }

  #[cfg(test)]
  pub fn as_map(&self) -> &Map<String, Value> {
    &self.0
  }

  /// Write with 4-space indentation
  pub fn write(&self, path: &Path) -> PackResult<()> {
    write_json(path, &self.0)
  }
}

impl Serialize for AddonMetadata {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.0.serialize(serializer)
  }
}
