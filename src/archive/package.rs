//! Release archive (build/package.zip)
//!
//! Layout mirrors the library checkout:
//! ```text
//! 3dmodels/...
//! footprints/...
//! symbols/...
//! resources/...
//! metadata.json        <- generated, lists only the packaged version
//! ```

use crate::core::error::{PackResult, ResultExt};
use crate::ui::progress::ArchiveProgress;
use crate::utils::path_to_archive_name;
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Name of the generated metadata member
pub const INTERNAL_METADATA_NAME: &str = "metadata.json";

/// A filesystem entry destined for the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
  /// Absolute source path
  pub source: PathBuf,
  /// Member name, relative to the project root with forward slashes
  pub name: String,
  pub is_dir: bool,
}

impl ArchiveEntry {
  /// Member options carrying the source's modification time
  fn options(&self) -> SimpleFileOptions {
    deflated().last_modified_time(modified_time(&self.source))
  }
}

/// Collect every directory and file below the content directories
///
/// Entries are sorted by name within each directory so repeated runs produce
/// archives with identical member order. The content directories themselves
/// are not entries. Missing content directories are skipped.
pub fn collect_entries(root: &Path, directories: &[PathBuf]) -> PackResult<Vec<ArchiveEntry>> {
  let mut entries = Vec::new();

  for directory in directories {
    let start = root.join(directory);
    if !start.is_dir() {
      tracing::warn!("content directory {} does not exist, skipping", start.display());
      continue;
    }

    for entry in WalkDir::new(&start).min_depth(1).sort_by_file_name() {
      let entry = entry.with_context(|| format!("Failed to walk {}", start.display()))?;
      let relative = entry.path().strip_prefix(root)?;
      entries.push(ArchiveEntry {
        source: entry.path().to_path_buf(),
        name: path_to_archive_name(relative),
        is_dir: entry.path().is_dir(),
      });
    }
  }

  Ok(entries)
}

/// Builder for the release archive
pub struct PackageArchive<'a> {
  root: &'a Path,
  directories: &'a [PathBuf],
  show_progress: bool,
}

impl<'a> PackageArchive<'a> {
  pub fn new(root: &'a Path, directories: &'a [PathBuf]) -> Self {
    Self {
      root,
      directories,
      show_progress: false,
    }
  }

  /// Draw a progress bar while writing members
  pub fn with_progress(mut self, show_progress: bool) -> Self {
    self.show_progress = show_progress;
    self
  }

  /// Write the archive to `out_path` and return its content size
  ///
  /// Any existing file at `out_path` is replaced. The content size is the sum
  /// of uncompressed sizes of all non-directory members, including the
  /// generated metadata member.
  pub fn build(&self, internal_metadata: &[u8], out_path: &Path) -> PackResult<u64> {
    let entries = collect_entries(self.root, self.directories)?;
    prepare_output(out_path)?;

    let file = File::create(out_path).with_context(|| format!("Failed to create archive {}", out_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let mut progress = ArchiveProgress::maybe(self.show_progress, entries.len() + 1, "Packaging library");

    for entry in &entries {
      if entry.is_dir {
        zip
          .add_directory(entry.name.as_str(), entry.options())
          .with_context(|| format!("Failed to add directory {}", entry.name))?;
      } else {
        add_file(&mut zip, &entry.source, &entry.name, entry.options())?;
      }
      tracing::debug!("added {}", entry.name);

      if let Some(ref mut p) = progress {
        p.inc();
      }
    }

    zip
      .start_file(
        INTERNAL_METADATA_NAME,
        deflated().last_modified_time(zip_time(chrono::Local::now().naive_local())),
      )
      .context("Failed to add internal metadata")?;
    zip.write_all(internal_metadata)?;
    if let Some(ref mut p) = progress {
      p.inc();
    }

    zip
      .finish()
      .with_context(|| format!("Failed to finalize archive {}", out_path.display()))?;

    content_size(out_path)
  }
}

/// Sum of uncompressed sizes of all non-directory members of an archive
pub fn content_size(path: &Path) -> PackResult<u64> {
  let file = File::open(path).with_context(|| format!("Failed to open archive {}", path.display()))?;
  let mut archive = zip::ZipArchive::new(file).with_context(|| format!("Failed to read archive {}", path.display()))?;

  let mut total = 0u64;
  for index in 0..archive.len() {
    let member = archive.by_index(index)?;
    if !member.is_dir() {
      total += member.size();
    }
  }

  Ok(total)
}

pub(crate) fn deflated() -> SimpleFileOptions {
  SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated)
}

/// Local modification time of a file as a ZIP timestamp
///
/// Falls back to the ZIP epoch (1980-01-01) when the time is unavailable.
pub(crate) fn modified_time(source: &Path) -> zip::DateTime {
  match fs::metadata(source).and_then(|m| m.modified()) {
    Ok(time) => zip_time(chrono::DateTime::<chrono::Local>::from(time).naive_local()),
    Err(e) => {
      tracing::debug!("no modification time for {}: {}", source.display(), e);
      zip::DateTime::default()
    }
  }
}

/// ZIP timestamps cover 1980..=2107 with 2-second resolution
pub(crate) fn zip_time(stamp: NaiveDateTime) -> zip::DateTime {
  let year = u16::try_from(stamp.year()).unwrap_or(0);
  zip::DateTime::from_date_and_time(
    year,
    stamp.month() as u8,
    stamp.day() as u8,
    stamp.hour() as u8,
    stamp.minute() as u8,
    stamp.second() as u8,
  )
  .unwrap_or_default()
}

/// Create the parent directory and remove a stale archive
pub(crate) fn prepare_output(out_path: &Path) -> PackResult<()> {
  if let Some(parent) = out_path.parent() {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }

  match fs::remove_file(out_path) {
    Ok(()) => {
      tracing::debug!("removed previous {}", out_path.display());
      Ok(())
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e).with_context(|| format!("Failed to remove old {}", out_path.display())),
  }
}

/// Stream a file into the archive under `name`
pub(crate) fn add_file(
  zip: &mut ZipWriter<File>,
  source: &Path,
  name: &str,
  options: SimpleFileOptions,
) -> PackResult<()> {
  let mut input = File::open(source).with_context(|| format!("Failed to open {}", source.display()))?;
  let large = input.metadata()?.len() >= u32::MAX as u64;

  zip
    .start_file(name, options.large_file(large))
    .with_context(|| format!("Failed to add {}", name))?;
  io::copy(&mut input, zip).with_context(|| format!("Failed to compress {}", source.display()))?;
  Ok(())
}
