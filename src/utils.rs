//! Hashing, JSON and path helpers shared by the writers

use crate::core::error::{PackError, PackResult, ResultExt};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Lowercase hex SHA-256 of a byte slice
#[cfg(test)]
pub fn sha256_bytes(data: &[u8]) -> String {
  format!("{:x}", Sha256::digest(data))
}

/// Lowercase hex SHA-256 of a file, streamed in 64 KiB chunks
pub fn sha256_file(path: &Path) -> PackResult<String> {
  let mut file = File::open(path).with_context(|| format!("Failed to open {} for hashing", path.display()))?;
  let mut hasher = Sha256::new();
  let mut buffer = vec![0u8; 64 * 1024];

  loop {
    let bytes_read = file
      .read(&mut buffer)
      .with_context(|| format!("Failed to read {} for hashing", path.display()))?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(format!("{:x}", hasher.finalize()))
}

/// Serialize with 4-space indentation, no trailing newline
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> PackResult<String> {
  let mut out = Vec::new();
  let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
  let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
  value.serialize(&mut serializer)?;
  String::from_utf8(out).map_err(|e| PackError::message(format!("UTF-8 conversion error: {}", e)))
}

/// Write a JSON document with 4-space indentation
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> PackResult<()> {
  let content = to_json_string(value)?;
  std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Read a JSON file that must contain a top-level object
pub fn read_json_object(path: &Path) -> PackResult<Map<String, Value>> {
  let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  let value: Value =
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {} as JSON", path.display()))?;

  match value {
    Value::Object(map) => Ok(map),
    other => Err(PackError::message(format!(
      "Expected a JSON object in {}, found {}",
      path.display(),
      json_type_name(&other)
    ))),
  }
}

fn json_type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// Convert a relative path to a ZIP member name (always forward slashes)
pub fn path_to_archive_name(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}
