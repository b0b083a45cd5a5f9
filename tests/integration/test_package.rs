//! Integration tests for packaging a release

use crate::helpers::{IDENTIFIER, TestLibrary, run_pack, run_pack_raw};
use anyhow::Result;
use serde_json::json;
use std::io::Read;

const ALL_DIRS: [&str; 4] = ["3dmodels", "footprints", "symbols", "resources"];

fn archive_member(lib: &TestLibrary, archive: &str, member: &str) -> Result<Vec<u8>> {
  let file = std::fs::File::open(lib.path.join(archive))?;
  let mut zip = zip::ZipArchive::new(file)?;
  let mut bytes = Vec::new();
  zip.by_name(member)?.read_to_end(&mut bytes)?;
  Ok(bytes)
}

#[test]
fn test_first_release_writes_all_artifacts() -> Result<()> {
  let lib = TestLibrary::new()?;
  run_pack(&lib.path, &["1.0.0", "--quiet"])?;

  for file in [
    "build/package.zip",
    "build/resources.zip",
    "metadata.json",
    "packages.json",
    "repository.json",
  ] {
    assert!(lib.file_exists(file), "{} should be written", file);
  }

  let metadata = lib.read_json("metadata.json")?;
  let versions = metadata["versions"].as_array().expect("versions array");
  assert_eq!(versions.len(), 1);

  let record = &versions[0];
  assert_eq!(record["version"], "1.0.0");
  assert_eq!(record["status"], "stable");
  assert_eq!(record["kicad_version"], "8.0.0");
  assert_eq!(
    record["download_url"],
    "https://github.com/Luro02/kicad-library/releases/download/1.0.0/package.zip"
  );
  assert_eq!(metadata["identifier"], IDENTIFIER);

  Ok(())
}

#[test]
fn test_recorded_hashes_and_sizes_match_files() -> Result<()> {
  let lib = TestLibrary::new()?;
  run_pack(&lib.path, &["1.0", "--quiet"])?;

  let metadata = lib.read_json("metadata.json")?;
  let record = &metadata["versions"][0];

  assert_eq!(record["download_sha256"], lib.sha256("build/package.zip")?.as_str());
  let zip_len = std::fs::metadata(lib.path.join("build/package.zip"))?.len();
  assert_eq!(record["download_size"], zip_len);

  let internal = archive_member(&lib, "build/package.zip", "metadata.json")?;
  let expected_install = lib.content_bytes(&ALL_DIRS)? + internal.len() as u64;
  assert_eq!(record["install_size"], expected_install);

  let repository = lib.read_json("repository.json")?;
  assert_eq!(repository["packages"]["sha256"], lib.sha256("packages.json")?.as_str());
  assert_eq!(repository["resources"]["sha256"], lib.sha256("build/resources.zip")?.as_str());
  assert_eq!(
    repository["packages"]["update_timestamp"],
    repository["resources"]["update_timestamp"]
  );
  assert_eq!(
    repository["packages"]["url"],
    "https://raw.githubusercontent.com/Luro02/kicad-library/main/packages.json"
  );
  assert_eq!(repository["name"], "Test repository");

  Ok(())
}

#[test]
fn test_internal_metadata_lists_only_new_version() -> Result<()> {
  let lib = TestLibrary::new()?;
  run_pack(&lib.path, &["1.0", "--quiet"])?;
  run_pack(&lib.path, &["1.1", "--quiet"])?;

  let internal: serde_json::Value = serde_json::from_slice(&archive_member(&lib, "build/package.zip", "metadata.json")?)?;
  assert_eq!(
    internal["versions"],
    json!([{"version": "1.1", "status": "stable", "kicad_version": "8.0.0"}])
  );

  let icon = archive_member(&lib, "build/resources.zip", &format!("{}/icon.png", IDENTIFIER))?;
  assert_eq!(icon, std::fs::read(lib.path.join("resources/icon.png"))?);

  Ok(())
}

#[test]
fn test_second_release_prepends_history() -> Result<()> {
  let lib = TestLibrary::new()?;
  run_pack(&lib.path, &["1.0", "--quiet"])?;
  let first = lib.read_json("metadata.json")?["versions"][0].clone();

  lib.write_file("symbols/Extra.kicad_sym", "(kicad_symbol_lib)")?;
  run_pack(&lib.path, &["1.1", "--quiet"])?;

  let versions = lib.read_json("metadata.json")?["versions"].clone();
  let versions = versions.as_array().expect("versions array");
  assert_eq!(versions.len(), 2);
  assert_eq!(versions[0]["version"], "1.1");
  assert_eq!(versions[1], first);

  let packages = lib.read_json("packages.json")?;
  assert_eq!(packages, json!({"packages": [lib.read_json("metadata.json")?]}));

  Ok(())
}

#[test]
fn test_unknown_fields_in_history_survive() -> Result<()> {
  let lib = TestLibrary::new()?;
  lib.write_file(
    "metadata.json",
    r#"{"name": "old", "versions": [{"version": "0.9", "status": "deprecated", "platforms": ["linux"]}]}"#,
  )?;

  run_pack(&lib.path, &["1.0", "--quiet"])?;

  let metadata = lib.read_json("metadata.json")?;
  assert_eq!(metadata["name"], "Test Library");
  assert_eq!(
    metadata["versions"][1],
    json!({"version": "0.9", "status": "deprecated", "platforms": ["linux"]})
  );

  Ok(())
}

#[test]
fn test_duplicate_version_is_rejected() -> Result<()> {
  let lib = TestLibrary::new()?;
  run_pack(&lib.path, &["1.0", "--quiet"])?;
  let before = lib.read_file("metadata.json")?;

  let output = run_pack_raw(&lib.path, &["1.0", "--quiet"], None)?;
  assert_eq!(output.status.code(), Some(3));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("The specified version 1.0 already exists"), "stderr: {}", stderr);

  assert_eq!(lib.read_file("metadata.json")?, before);
  Ok(())
}

#[test]
fn test_invalid_version_is_rejected_before_writing() -> Result<()> {
  let lib = TestLibrary::new()?;

  for bad in ["1.2.3.4", "v1", "12345", "1.0-rc1"] {
    let output = run_pack_raw(&lib.path, &[bad, "--quiet"], None)?;
    assert_eq!(output.status.code(), Some(3), "{} should be rejected", bad);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("major[.minor[.patch]]"), "stderr: {}", stderr);
  }

  assert!(!lib.file_exists("build"));
  assert!(!lib.file_exists("metadata.json"));
  Ok(())
}

#[test]
fn test_version_argument_is_not_trimmed() -> Result<()> {
  let lib = TestLibrary::new()?;

  let output = run_pack_raw(&lib.path, &[" 1.0 ", "--quiet"], None)?;
  assert_eq!(output.status.code(), Some(3));
  assert!(!lib.file_exists("metadata.json"));
  Ok(())
}

#[test]
fn test_non_ascii_digits_are_accepted() -> Result<()> {
  let lib = TestLibrary::new()?;
  run_pack(&lib.path, &["١.٢", "--quiet"])?;

  let metadata = lib.read_json("metadata.json")?;
  assert_eq!(metadata["versions"][0]["version"], "١.٢");
  Ok(())
}

#[test]
fn test_version_from_stdin() -> Result<()> {
  let lib = TestLibrary::new()?;
  let output = run_pack_raw(&lib.path, &["--quiet"], Some("  2.1 \n"))?;
  assert!(
    output.status.success(),
    "stderr: {}",
    String::from_utf8_lossy(&output.stderr)
  );

  let metadata = lib.read_json("metadata.json")?;
  assert_eq!(metadata["versions"][0]["version"], "2.1");
  Ok(())
}

#[test]
fn test_missing_template_fails() -> Result<()> {
  let lib = TestLibrary::new()?;
  std::fs::remove_file(lib.path.join("repository.template.json"))?;

  let output = run_pack_raw(&lib.path, &["1.0", "--quiet"], None)?;
  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("repository.template.json"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_missing_icon_fails() -> Result<()> {
  let lib = TestLibrary::new()?;
  std::fs::remove_file(lib.path.join("resources/icon.png"))?;

  let output = run_pack_raw(&lib.path, &["1.0", "--quiet"], None)?;
  assert_eq!(output.status.code(), Some(2));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("resources/icon.png"), "stderr: {}", stderr);
  assert!(stderr.contains("I/O error"), "stderr: {}", stderr);
  assert!(!stderr.contains("/./"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_json_summary() -> Result<()> {
  let lib = TestLibrary::new()?;
  let output = run_pack(&lib.path, &["3", "--json"])?;

  let summary: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(summary["version"], "3");
  assert_eq!(summary["download_sha256"], lib.sha256("build/package.zip")?.as_str());
  assert_eq!(summary["previous_versions"], 0);
  let files = summary["files"].as_array().expect("files array");
  assert_eq!(files.len(), 5);
  for file in files {
    let file = file.as_str().expect("file path");
    assert!(!file.contains("/./"), "unnormalized path: {}", file);
  }
  Ok(())
}

#[test]
fn test_output_uses_four_space_indent() -> Result<()> {
  let lib = TestLibrary::new()?;
  run_pack(&lib.path, &["1", "--quiet"])?;

  let text = lib.read_file("metadata.json")?;
  assert!(text.starts_with("{\n    \"$schema\""), "got: {}", text);
  assert!(text.contains("\n    \"versions\": [\n        {\n            \"version\": \"1\","));
  assert!(!text.ends_with('\n'));
  Ok(())
}

#[test]
fn test_config_overrides_defaults() -> Result<()> {
  let lib = TestLibrary::new()?;
  lib.write_file(
    "pcm.toml",
    r#"
kicad_version = "9.0.0"
directories = ["symbols", "resources"]
zip_file_name = "library.zip"
download_url = "https://example.com/{VERSION}/{ZIP_FILE_NAME}"
main_url = "https://example.com/main/{FILE_NAME}"
"#,
  )?;

  run_pack(&lib.path, &["1.0", "--quiet"])?;

  assert!(lib.file_exists("build/library.zip"));
  assert!(!lib.file_exists("build/package.zip"));

  let record = lib.read_json("metadata.json")?["versions"][0].clone();
  assert_eq!(record["kicad_version"], "9.0.0");
  assert_eq!(record["download_url"], "https://example.com/1.0/library.zip");

  let internal = archive_member(&lib, "build/library.zip", "metadata.json")?;
  let expected_install = lib.content_bytes(&["symbols", "resources"])? + internal.len() as u64;
  assert_eq!(record["install_size"], expected_install);

  let repository = lib.read_json("repository.json")?;
  assert_eq!(repository["resources"]["url"], "https://example.com/1.0/resources.zip");
  Ok(())
}

#[test]
fn test_root_option() -> Result<()> {
  let lib = TestLibrary::new()?;
  let elsewhere = tempfile::TempDir::new()?;
  let root = lib.path.to_string_lossy().to_string();

  run_pack(elsewhere.path(), &["--root", &root, "1.0", "--quiet"])?;

  assert!(lib.file_exists("metadata.json"));
  assert!(!elsewhere.path().join("metadata.json").exists());
  Ok(())
}
