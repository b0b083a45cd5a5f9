//! Package command implementation
//!
//! Produces one release of the add-on:
//! 1. validate the version and check it against metadata.json history
//! 2. zip the library content plus internal metadata into build/package.zip
//! 3. hash and measure the archive
//! 4. prepend the new record and rewrite metadata.json
//! 5. write packages.json, build/resources.zip and repository.json
//!
//! Any error aborts the run; files already written are left as they are.

use crate::archive::{ICON_FILE_NAME, PackageArchive, build_resources_archive};
use crate::core::context::{PackContext, Templates};
use crate::core::error::{PackResult, ResultExt};
use crate::release::{AddonMetadata, AddonVersion, ArchiveStats, InternalVersionRecord, VersionHistory, VersionRecord};
use crate::repository::{ArtifactRef, PackageIndex, UpdateStamp, repository_index};
use crate::utils::{sha256_file, to_json_string, write_json};
use serde::Serialize;
use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;

/// Published metadata file
pub const METADATA_FILE: &str = "metadata.json";
/// Package index file
pub const PACKAGES_FILE: &str = "packages.json";
/// Repository index file
pub const REPOSITORY_FILE: &str = "repository.json";
/// Resources archive file name inside the build directory
pub const RESOURCES_ZIP_FILE: &str = "resources.zip";
/// Directory holding the add-on icon
pub const RESOURCES_DIR: &str = "resources";

const VERSION_PROMPT: &str = "Enter the new addon version (required format: major[.minor[.patch]])";

/// Output options for the package command
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageOptions {
  /// Print a JSON summary instead of status lines
  pub json: bool,
  /// Suppress banner and progress bar
  pub quiet: bool,
}

/// Everything a finished release produced
#[derive(Debug, Clone, Serialize)]
pub struct PackageSummary {
  pub version: String,
  pub download_sha256: String,
  pub download_size: u64,
  pub install_size: u64,
  pub download_url: String,
  pub update_time_utc: String,
  pub update_timestamp: i64,
  pub previous_versions: usize,
  pub files: Vec<PathBuf>,
}

/// Run the package command
pub fn run_package(ctx: &PackContext, version: Option<String>, options: PackageOptions) -> PackResult<()> {
  let chatty = !options.json && !options.quiet;

  if chatty {
    println!("This tool generates a new KiCad add-on release.");
    println!("It writes the release zip file, metadata.json and the repository index.");
    println!();
  }

  let version = match version {
    Some(input) => AddonVersion::parse(&input)?,
    None => AddonVersion::parse_prompt(&prompt_version()?)?,
  };

  let history = VersionHistory::load(&ctx.path(METADATA_FILE))?;
  history.ensure_unique(&version)?;

  let templates = Templates::load(ctx)?;

  if chatty {
    println!("📦 Packaging version {}", version);
  }

  let summary = package_release(ctx, &templates, &version, history, UpdateStamp::now(), chatty)?;

  if options.json {
    println!("{}", to_json_string(&summary)?);
  } else {
    print_summary(&summary);
  }

  Ok(())
}

/// Build every release artifact for `version`
///
/// `history` must already be checked for duplicates. `stamp` is shared by the
/// `packages` and `resources` entries of repository.json.
pub fn package_release(
  ctx: &PackContext,
  templates: &Templates,
  version: &AddonVersion,
  history: VersionHistory,
  stamp: UpdateStamp,
  show_progress: bool,
) -> PackResult<PackageSummary> {
  let config = &ctx.config;
  let identifier = templates.identifier()?.to_string();
  let previous_versions = history.len();

  // Release archive
  let internal = AddonMetadata::internal(
    &templates.metadata,
    &InternalVersionRecord::new(version, &config.kicad_version),
  )?;
  let internal_json = to_json_string(&internal)?;

  let zip_path = ctx.build_dir().join(&config.zip_file_name);
  let install_size = PackageArchive::new(&ctx.root, &config.directories)
    .with_progress(show_progress)
    .build(internal_json.as_bytes(), &zip_path)?;

  let stats = ArchiveStats {
    sha256: sha256_file(&zip_path)?,
    download_size: std::fs::metadata(&zip_path)
      .with_context(|| format!("Failed to stat {}", zip_path.display()))?
      .len(),
    install_size,
  };
  tracing::info!(
    "built {} ({} bytes, {} bytes installed)",
    zip_path.display(),
    stats.download_size,
    stats.install_size
  );

  // metadata.json
  let download_url = config.download_url_for(version.as_str(), &config.zip_file_name);
  let record = VersionRecord::new(version, &config.kicad_version, download_url.clone(), &stats);
  let metadata = AddonMetadata::release(&templates.metadata, history, &record)?;
  let metadata_path = ctx.path(METADATA_FILE);
  metadata.write(&metadata_path)?;

  // packages.json
  let packages_path = ctx.path(PACKAGES_FILE);
  write_json(&packages_path, &PackageIndex::single(&metadata))?;
  let packages_ref = ArtifactRef::for_file(&packages_path, &stamp, config.main_url_for(PACKAGES_FILE))?;

  // resources.zip
  let resources_path = ctx.build_dir().join(RESOURCES_ZIP_FILE);
  let icon_path = ctx.path(RESOURCES_DIR).join(ICON_FILE_NAME);
  build_resources_archive(&icon_path, &identifier, &resources_path)?;
  let resources_ref = ArtifactRef::for_file(
    &resources_path,
    &stamp,
    config.download_url_for(version.as_str(), RESOURCES_ZIP_FILE),
  )?;

  // repository.json
  let repository_path = ctx.path(REPOSITORY_FILE);
  let repository = repository_index(&templates.repository, &packages_ref, &resources_ref)?;
  write_json(&repository_path, &repository)?;

  Ok(PackageSummary {
    version: version.to_string(),
    download_sha256: stats.sha256,
    download_size: stats.download_size,
    install_size: stats.install_size,
    download_url,
    update_time_utc: stamp.time_utc,
    update_timestamp: stamp.timestamp,
    previous_versions,
    files: vec![zip_path, metadata_path, packages_path, resources_path, repository_path],
  })
}

/// Ask for the version on the terminal, or read one line from piped stdin
fn prompt_version() -> PackResult<String> {
  let stdin = io::stdin();

  if stdin.is_terminal() {
    let input = dialoguer::Input::<String>::new()
      .with_prompt(VERSION_PROMPT)
      .allow_empty(true)
      .interact_text()?;
    return Ok(input);
  }

  let mut line = String::new();
  stdin
    .lock()
    .read_line(&mut line)
    .context("Failed to read version from stdin")?;
  Ok(line)
}

fn print_summary(summary: &PackageSummary) {
  println!();
  println!("✅ Release {} generated", summary.version);
  println!();
  println!("  Archive:   {} bytes ({} bytes installed)", summary.download_size, summary.install_size);
  println!("  SHA-256:   {}", summary.download_sha256);
  println!("  Download:  {}", summary.download_url);
  println!("  Updated:   {} UTC", summary.update_time_utc);
  if summary.previous_versions > 0 {
    println!("  History:   {} earlier version(s) kept", summary.previous_versions);
  }
  println!();
  println!("Files written:");
  for file in &summary.files {
    println!("  {}", file.display());
  }
  println!();
  println!("Next steps:");
  println!(
    "  Upload {} and {} to the {} release",
    summary.files[0].display(),
    summary.files[3].display(),
    summary.version
  );
  println!("  Commit metadata.json, packages.json and repository.json");
}
