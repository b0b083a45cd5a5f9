//! Test helpers for integration tests

use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

pub const IDENTIFIER: &str = "com.github.luro02.kicad-library";

/// A KiCad library checkout with templates and some content
pub struct TestLibrary {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestLibrary {
  /// Create a library with symbols, footprints, 3D models and an icon
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    std::fs::write(
      path.join("metadata.template.json"),
      format!(
        r#"{{
    "$schema": "https://go.kicad.org/pcm/schemas/v1",
    "name": "Test Library",
    "description": "Symbols and footprints",
    "identifier": "{}",
    "type": "library",
    "author": {{"name": "Tester"}},
    "license": "MIT"
}}"#,
        IDENTIFIER
      ),
    )?;

    std::fs::write(
      path.join("repository.template.json"),
      r#"{
    "$schema": "https://go.kicad.org/pcm/schemas/v1#/definitions/Repository",
    "name": "Test repository",
    "maintainer": {"name": "Tester"}
}"#,
    )?;

    let lib = Self { _root: root, path };
    lib.write_file("symbols/Test.kicad_sym", "(kicad_symbol_lib (version 20231120))")?;
    lib.write_file("footprints/Test.pretty/R_0603.kicad_mod", "(footprint \"R_0603\")")?;
    lib.write_file("footprints/Test.pretty/C_0603.kicad_mod", "(footprint \"C_0603\")")?;
    lib.write_file("3dmodels/Test.3dshapes/R_0603.step", "ISO-10303-21;")?;
    lib.write_bytes("resources/icon.png", &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a])?;
    Ok(lib)
  }

  /// Write a text file, creating parent directories
  pub fn write_file(&self, relative: &str, content: &str) -> Result<()> {
    self.write_bytes(relative, content.as_bytes())
  }

  /// Write a binary file, creating parent directories
  pub fn write_bytes(&self, relative: &str, content: &[u8]) -> Result<()> {
    let full = self.path.join(relative);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(full, content)?;
    Ok(())
  }

  /// Check if a file exists
  pub fn file_exists(&self, relative: &str) -> bool {
    self.path.join(relative).exists()
  }

  /// Read and parse a JSON file
  pub fn read_json(&self, relative: &str) -> Result<Value> {
    let content = std::fs::read_to_string(self.path.join(relative)).with_context(|| format!("reading {}", relative))?;
    Ok(serde_json::from_str(&content)?)
  }

  /// Read a file as text
  pub fn read_file(&self, relative: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(relative))?)
  }

  /// SHA-256 of a file, computed independently of the tool
  pub fn sha256(&self, relative: &str) -> Result<String> {
    let bytes = std::fs::read(self.path.join(relative))?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
  }

  /// Sum of the sizes of all regular files under the given directories
  pub fn content_bytes(&self, directories: &[&str]) -> Result<u64> {
    let mut total = 0;
    for dir in directories {
      total += dir_size(&self.path.join(dir))?;
    }
    Ok(total)
  }
}

fn dir_size(path: &Path) -> Result<u64> {
  let mut total = 0;
  if !path.is_dir() {
    return Ok(0);
  }
  for entry in std::fs::read_dir(path)? {
    let entry = entry?;
    let meta = entry.metadata()?;
    if meta.is_dir() {
      total += dir_size(&entry.path())?;
    } else {
      total += meta.len();
    }
  }
  Ok(total)
}

/// Run kicad-pcm-pack and return its output whatever the exit status
pub fn run_pack_raw(cwd: &Path, args: &[&str], stdin: Option<&str>) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_kicad-pcm-pack");

  let mut child = Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .context("Failed to run kicad-pcm-pack")?;

  {
    let mut pipe = child.stdin.take().context("stdin not captured")?;
    if let Some(input) = stdin {
      pipe.write_all(input.as_bytes())?;
    }
  }

  Ok(child.wait_with_output()?)
}

/// Run kicad-pcm-pack and require success
pub fn run_pack(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_pack_raw(cwd, args, None)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "kicad-pcm-pack command failed: kicad-pcm-pack {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
