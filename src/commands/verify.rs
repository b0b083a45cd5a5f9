//! Verify command implementation
//!
//! Recomputes hashes and sizes of the generated artifacts and compares them
//! with what metadata.json and repository.json recorded. Nothing is written.

use crate::archive::content_size;
use crate::commands::package::{METADATA_FILE, PACKAGES_FILE, REPOSITORY_FILE, RESOURCES_ZIP_FILE};
use crate::core::context::PackContext;
use crate::core::error::{PackError, PackResult, ValidationError};
use crate::utils::{read_json_object, sha256_file, to_json_string};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Result of one comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyCheck {
  pub name: String,
  pub expected: String,
  pub actual: String,
  pub ok: bool,
}

impl VerifyCheck {
  fn compare(name: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
    let expected = expected.into();
    let actual = actual.into();
    Self {
      name: name.into(),
      ok: expected == actual,
      expected,
      actual,
    }
  }
}

/// Run the verify command
pub fn run_verify(ctx: &PackContext, json: bool) -> PackResult<()> {
  let checks = verify_release(ctx)?;
  let failures = checks.iter().filter(|c| !c.ok).count();

  if json {
    println!("{}", to_json_string(&checks)?);
  } else {
    print_checks(&checks);
  }

  if failures > 0 {
    return Err(ValidationError::VerifyFailed { failures }.into());
  }

  Ok(())
}

/// Compare every recorded hash and size against the files on disk
pub fn verify_release(ctx: &PackContext) -> PackResult<Vec<VerifyCheck>> {
  let metadata = load_required(&ctx.path(METADATA_FILE))?;
  let repository = load_required(&ctx.path(REPOSITORY_FILE))?;

  let newest = metadata
    .get("versions")
    .and_then(Value::as_array)
    .and_then(|versions| versions.first())
    .ok_or_else(|| {
      PackError::with_help(
        format!("{} lists no released versions", METADATA_FILE),
        "Package a release first: kicad-pcm-pack <VERSION>",
      )
    })?;

  let mut checks = Vec::new();

  let zip_path = ctx.build_dir().join(&ctx.config.zip_file_name);
  let zip_label = ctx.config.zip_file_name.as_str();
  checks.push(VerifyCheck::compare(
    format!("{} sha256", zip_label),
    recorded(newest, "download_sha256"),
    actual_hash(&zip_path),
  ));
  checks.push(VerifyCheck::compare(
    format!("{} download_size", zip_label),
    recorded(newest, "download_size"),
    actual_len(&zip_path),
  ));
  checks.push(VerifyCheck::compare(
    format!("{} install_size", zip_label),
    recorded(newest, "install_size"),
    match content_size(&zip_path) {
      Ok(size) => size.to_string(),
      Err(_) => "unreadable".to_string(),
    },
  ));

  let packages_path = ctx.path(PACKAGES_FILE);
  checks.push(VerifyCheck::compare(
    format!("{} sha256", PACKAGES_FILE),
    repository.get("packages").map(|p| recorded(p, "sha256")).unwrap_or_default(),
    actual_hash(&packages_path),
  ));

  let resources_path = ctx.build_dir().join(RESOURCES_ZIP_FILE);
  checks.push(VerifyCheck::compare(
    format!("{} sha256", RESOURCES_ZIP_FILE),
    repository.get("resources").map(|r| recorded(r, "sha256")).unwrap_or_default(),
    actual_hash(&resources_path),
  ));

  Ok(checks)
}

fn load_required(path: &Path) -> PackResult<Map<String, Value>> {
  if !path.is_file() {
    return Err(PackError::with_help(
      format!("Release file not found: {}", path.display()),
      "Package a release first: kicad-pcm-pack <VERSION>",
    ));
  }
  read_json_object(path)
}

/// Recorded value as text; strings unquoted, numbers as digits
fn recorded(object: &Value, key: &str) -> String {
  match object.get(key) {
    Some(Value::String(s)) => s.clone(),
    Some(Value::Number(n)) => n.to_string(),
    Some(other) => other.to_string(),
    None => String::new(),
  }
}

fn actual_hash(path: &Path) -> String {
  if !path.is_file() {
    return "missing".to_string();
  }
  sha256_file(path).unwrap_or_else(|_| "unreadable".to_string())
}

fn actual_len(path: &Path) -> String {
  std::fs::metadata(path)
    .map(|m| m.len().to_string())
    .unwrap_or_else(|_| "missing".to_string())
}

fn print_checks(checks: &[VerifyCheck]) {
  println!("🔍 Verifying release artifacts");
  println!();

  for check in checks {
    if check.ok {
      println!("✅ {}", check.name);
    } else {
      println!("❌ {}", check.name);
      println!("   Recorded: {}", check.expected);
      println!("   Actual:   {}", check.actual);
    }
  }

  println!();
  let failures = checks.iter().filter(|c| !c.ok).count();
  if failures == 0 {
    println!("✅ All {} checks passed", checks.len());
  }
}
