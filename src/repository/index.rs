use crate::core::error::PackResult;
use crate::release::AddonMetadata;
use crate::utils::sha256_file;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Format of `update_time_utc`
pub const UPDATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One instant, rendered both ways the repository schema wants it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStamp {
  pub time_utc: String,
  pub timestamp: i64,
}

impl UpdateStamp {
  pub fn now() -> Self {
    Self::at(Utc::now())
  }

  pub fn at(instant: DateTime<Utc>) -> Self {
    Self {
      time_utc: instant.format(UPDATE_TIME_FORMAT).to_string(),
      timestamp: instant.timestamp(),
    }
  }
}

/// Integrity and location of a generated artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
  pub sha256: String,
  pub update_time_utc: String,
  pub update_timestamp: i64,
  pub url: String,
}

impl ArtifactRef {
  /// Hash a file already written to disk
  pub fn for_file(path: &Path, stamp: &UpdateStamp, url: String) -> PackResult<Self> {
    Ok(Self {
      sha256: sha256_file(path)?,
      update_time_utc: stamp.time_utc.clone(),
      update_timestamp: stamp.timestamp,
      url,
    })
  }
}

/// packages.json: the list of packages served by the repository
#[derive(Debug, Clone, Serialize)]
pub struct PackageIndex<'a> {
  pub packages: Vec<&'a AddonMetadata>,
}

impl<'a> PackageIndex<'a> {
  /// Index with a single package
  pub fn single(metadata: &'a AddonMetadata) -> Self {
    Self {
      packages: vec![metadata],
    }
  }
}

/// repository.json: the template with `packages` and `resources` set
pub fn repository_index(
  template: &Map<String, Value>,
  packages: &ArtifactRef,
  resources: &ArtifactRef,
) -> PackResult<Map<String, Value>> {
  let mut document = template.clone();
  document.insert("packages".to_string(), serde_json::to_value(packages)?);
  document.insert("resources".to_string(), serde_json::to_value(resources)?);
  Ok(document)
}
