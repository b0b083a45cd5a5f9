use crate::core::error::{ConfigError, PackResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Placeholder for the release version in `download_url`
pub const VERSION_PLACEHOLDER: &str = "{VERSION}";
/// Placeholder for the archive file name in `download_url`
pub const ZIP_FILE_NAME_PLACEHOLDER: &str = "{ZIP_FILE_NAME}";
/// Placeholder for the repository file name in `main_url`
pub const FILE_NAME_PLACEHOLDER: &str = "{FILE_NAME}";

/// Configuration for kicad-pcm-pack
/// Searched in order: pcm.toml, .pcm.toml, .config/pcm.toml
///
/// Every field has a default, so a project without a config file packages
/// the standard KiCad library layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackConfig {
  /// KiCad version written into every version record
  #[serde(default = "default_kicad_version")]
  pub kicad_version: String,

  /// Content directories zipped into the release archive, relative to the root
  #[serde(default = "default_directories")]
  pub directories: Vec<PathBuf>,

  /// Output directory for generated archives
  #[serde(default = "default_build_dir")]
  pub build_dir: PathBuf,

  /// File name of the release archive inside `build_dir`
  #[serde(default = "default_zip_file_name")]
  pub zip_file_name: String,

  /// Download URL template (`{VERSION}`, `{ZIP_FILE_NAME}`)
  #[serde(default = "default_download_url")]
  pub download_url: String,

  /// Raw file URL template for repository files (`{FILE_NAME}`)
  #[serde(default = "default_main_url")]
  pub main_url: String,
}

fn default_kicad_version() -> String {
  "8.0.0".to_string()
}

fn default_directories() -> Vec<PathBuf> {
  ["3dmodels", "footprints", "symbols", "resources"]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

fn default_build_dir() -> PathBuf {
  PathBuf::from("build")
}

fn default_zip_file_name() -> String {
  "package.zip".to_string()
}

fn default_download_url() -> String {
  "https://github.com/Luro02/kicad-library/releases/download/{VERSION}/{ZIP_FILE_NAME}".to_string()
}

fn default_main_url() -> String {
  "https://raw.githubusercontent.com/Luro02/kicad-library/main/{FILE_NAME}".to_string()
}

impl Default for PackConfig {
  fn default() -> Self {
    Self {
      kicad_version: default_kicad_version(),
      directories: default_directories(),
      build_dir: default_build_dir(),
      zip_file_name: default_zip_file_name(),
      download_url: default_download_url(),
      main_url: default_main_url(),
    }
  }
}

impl PackConfig {
  /// Find config file in search order: pcm.toml, .pcm.toml, .config/pcm.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("pcm.toml"),
      path.join(".pcm.toml"),
      path.join(".config").join("pcm.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from pcm.toml, falling back to defaults when no file exists
  pub fn load(path: &Path) -> PackResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      tracing::debug!("no pcm.toml found under {}, using defaults", path.display());
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: PackConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config
      .validate()
      .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    tracing::debug!("loaded config from {}", config_path.display());
    Ok(config)
  }

  /// Validate configuration values
  pub fn validate(&self) -> PackResult<()> {
    if self.directories.is_empty() {
      return Err(invalid("directories", "at least one content directory is required").into());
    }

    if self.zip_file_name.trim().is_empty() {
      return Err(invalid("zip_file_name", "must not be empty").into());
    }

    if self.kicad_version.trim().is_empty() {
      return Err(invalid("kicad_version", "must not be empty").into());
    }

    if !self.download_url.contains(VERSION_PLACEHOLDER) || !self.download_url.contains(ZIP_FILE_NAME_PLACEHOLDER) {
      return Err(
        invalid(
          "download_url",
          format!("must contain both {} and {}", VERSION_PLACEHOLDER, ZIP_FILE_NAME_PLACEHOLDER),
        )
        .into(),
      );
    }

    if !self.main_url.contains(FILE_NAME_PLACEHOLDER) {
      return Err(invalid("main_url", format!("must contain {}", FILE_NAME_PLACEHOLDER)).into());
    }

    Ok(())
  }

  /// Download URL of a release asset (`zip_file_name` or `resources.zip`)
  pub fn download_url_for(&self, version: &str, file_name: &str) -> String {
    self
      .download_url
      .replace(VERSION_PLACEHOLDER, version)
      .replace(ZIP_FILE_NAME_PLACEHOLDER, file_name)
  }

  /// Raw URL of a repository file such as `packages.json`
  pub fn main_url_for(&self, file_name: &str) -> String {
    self.main_url.replace(FILE_NAME_PLACEHOLDER, file_name)
  }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
  ConfigError::InvalidValue {
    field: field.to_string(),
    reason: reason.into(),
  }
}
