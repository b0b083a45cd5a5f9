//! Project context - load once, pass everywhere
//!
//! `PackContext` holds the project root and its configuration. `Templates`
//! holds the two JSON templates. Both are loaded once by the command and
//! handed by reference to the archive, metadata and repository writers, so
//! nothing below the command layer reads templates from the working directory.

use crate::core::config::PackConfig;
use crate::core::error::{ConfigError, PackResult};
use crate::utils::read_json_object;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Metadata template file name
pub const METADATA_TEMPLATE_FILE: &str = "metadata.template.json";
/// Repository template file name
pub const REPOSITORY_TEMPLATE_FILE: &str = "repository.template.json";

/// Shared project state for a single run
#[derive(Debug, Clone)]
pub struct PackContext {
  /// Project root directory; all configured paths are relative to it
  pub root: PathBuf,

  /// Effective configuration (pcm.toml or defaults)
  pub config: PackConfig,
}

impl PackContext {
  /// Build context from a project root
  pub fn build(root: &Path) -> PackResult<Self> {
    let config = PackConfig::load(root)?;
    Ok(Self {
      root: root.to_path_buf(),
      config,
    })
  }

  /// Absolute path of a file relative to the project root
  pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
    self.root.join(relative)
  }

  /// Absolute path of the build directory
  pub fn build_dir(&self) -> PathBuf {
    self.root.join(&self.config.build_dir)
  }
}

/// The metadata and repository templates of a project
#[derive(Debug, Clone)]
pub struct Templates {
  pub metadata: Map<String, Value>,
  pub repository: Map<String, Value>,
}

impl Templates {
  /// Load both templates from the project root
  pub fn load(ctx: &PackContext) -> PackResult<Self> {
    let metadata = load_template(&ctx.path(METADATA_TEMPLATE_FILE))?;
    let repository = load_template(&ctx.path(REPOSITORY_TEMPLATE_FILE))?;
    Ok(Self { metadata, repository })
  }

  /// The add-on identifier, used as folder name in the resources archive
  pub fn identifier(&self) -> PackResult<&str> {
    self
      .metadata
      .get("identifier")
      .and_then(Value::as_str)
      .filter(|id| !id.is_empty())
      .ok_or_else(|| {
        ConfigError::InvalidTemplate {
          path: PathBuf::from(METADATA_TEMPLATE_FILE),
          reason: "missing string field 'identifier'".to_string(),
        }
        .into()
      })
  }
}

fn load_template(path: &Path) -> PackResult<Map<String, Value>> {
  if !path.is_file() {
    return Err(
      ConfigError::TemplateNotFound {
        path: path.to_path_buf(),
      }
      .into(),
    );
  }
  read_json_object(path)
}
