//! Error types for kicad-pcm-pack with contextual messages and exit codes
//!
//! Every run either completes or aborts with one of these errors. Errors are
//! categorized so `main` can pick an exit code and show a help line.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for kicad-pcm-pack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, missing templates, invalid args)
  User = 1,
  /// System error (I/O, archive)
  System = 2,
  /// Validation failure (bad version, duplicate version, verify mismatch)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for kicad-pcm-pack
#[derive(Debug)]
pub enum PackError {
  /// Configuration and template errors
  Config(ConfigError),

  /// Validation errors (version string, history, verify)
  Validation(ValidationError),

  /// I/O errors
  Io {
    source: io::Error,
    context: Option<String>,
  },

  /// ZIP archive errors
  Archive {
    source: zip::result::ZipError,
    context: Option<String>,
  },

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl PackError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    PackError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    PackError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// The error keeps its category, so the exit code does not change.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      PackError::Message { message, context, help } => PackError::Message {
        message,
        context: Some(stack_context(ctx_str, context)),
        help,
      },
      PackError::Io { source, context } => PackError::Io {
        source,
        context: Some(stack_context(ctx_str, context)),
      },
      PackError::Archive { source, context } => PackError::Archive {
        source,
        context: Some(stack_context(ctx_str, context)),
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      PackError::Config(_) => ExitCode::User,
      PackError::Validation(_) => ExitCode::Validation,
      PackError::Io { .. } => ExitCode::System,
      PackError::Archive { .. } => ExitCode::System,
      PackError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      PackError::Config(e) => e.help_message(),
      PackError::Validation(e) => e.help_message(),
      PackError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for PackError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PackError::Config(e) => write!(f, "{}", e),
      PackError::Validation(e) => write!(f, "{}", e),
      PackError::Io { source, context } => {
        if let Some(ctx) = context {
          writeln!(f, "{}", ctx)?;
        }
        write!(f, "I/O error: {}", source)
      }
      PackError::Archive { source, context } => {
        if let Some(ctx) = context {
          writeln!(f, "{}", ctx)?;
        }
        write!(f, "Archive error: {}", source)
      }
      PackError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for PackError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      PackError::Io { source, .. } => Some(source),
      PackError::Archive { source, .. } => Some(source),
      _ => None,
    }
  }
}

impl From<io::Error> for PackError {
  fn from(err: io::Error) -> Self {
    PackError::Io {
      source: err,
      context: None,
    }
  }
}

impl From<zip::result::ZipError> for PackError {
  fn from(err: zip::result::ZipError) -> Self {
    PackError::Archive {
      source: err,
      context: None,
    }
  }
}

impl From<ConfigError> for PackError {
  fn from(err: ConfigError) -> Self {
    PackError::Config(err)
  }
}

impl From<ValidationError> for PackError {
  fn from(err: ValidationError) -> Self {
    PackError::Validation(err)
  }
}

impl From<String> for PackError {
  fn from(msg: String) -> Self {
    PackError::message(msg)
  }
}

impl From<&str> for PackError {
  fn from(msg: &str) -> Self {
    PackError::message(msg)
  }
}

impl From<serde_json::Error> for PackError {
  fn from(err: serde_json::Error) -> Self {
    PackError::message(format!("JSON error: {}", err))
  }
}

impl From<toml_edit::de::Error> for PackError {
  fn from(err: toml_edit::de::Error) -> Self {
    PackError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<walkdir::Error> for PackError {
  fn from(err: walkdir::Error) -> Self {
    match err.into_io_error() {
      Some(io_err) => PackError::from(io_err),
      None => PackError::message("Directory walk failed: filesystem loop detected"),
    }
  }
}

impl From<std::path::StripPrefixError> for PackError {
  fn from(err: std::path::StripPrefixError) -> Self {
    PackError::message(format!("Path strip prefix error: {}", err))
  }
}

impl From<dialoguer::Error> for PackError {
  fn from(err: dialoguer::Error) -> Self {
    PackError::message(format!("Interactive prompt failed: {}", err))
  }
}

/// Newest context first, older context below it
fn stack_context(ctx: String, older: Option<String>) -> String {
  match older {
    Some(older) => format!("{}\n{}", ctx, older),
    None => ctx,
  }
}

/// Configuration and template errors
#[derive(Debug)]
pub enum ConfigError {
  /// A required template file is missing
  TemplateNotFound { path: PathBuf },

  /// Template is valid JSON but has the wrong shape
  InvalidTemplate { path: PathBuf, reason: String },

  /// pcm.toml has an invalid value
  InvalidValue { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::TemplateNotFound { path } => Some(format!(
        "Run kicad-pcm-pack from the library root, or pass --root. Expected {} to exist.",
        path.display()
      )),
      ConfigError::InvalidTemplate { .. } => {
        Some("Templates must be JSON objects as described by the KiCad PCM schema.".to_string())
      }
      ConfigError::InvalidValue { .. } => Some("Fix the value in pcm.toml or remove it to use the default.".to_string()),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::TemplateNotFound { path } => {
        write!(f, "Template not found: {}", path.display())
      }
      ConfigError::InvalidTemplate { path, reason } => {
        write!(f, "Invalid template {}: {}", path.display(), reason)
      }
      ConfigError::InvalidValue { field, reason } => {
        write!(f, "Invalid config value for '{}': {}", field, reason)
      }
    }
  }
}

/// Validation errors
#[derive(Debug)]
pub enum ValidationError {
  /// Version string does not match major[.minor[.patch]]
  InvalidVersion { input: String },

  /// Version already present in metadata.json
  DuplicateVersion { version: String },

  /// Recorded hashes or sizes do not match the artifacts on disk
  VerifyFailed { failures: usize },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::InvalidVersion { .. } => {
        Some("Use 1-3 dot-separated numbers, e.g. 1, 1.2 or 1.2.3".to_string())
      }
      ValidationError::DuplicateVersion { .. } => {
        Some("Pick a new version number. Existing entries in metadata.json are never replaced.".to_string())
      }
      ValidationError::VerifyFailed { .. } => {
        Some("Re-run the packaging step to regenerate the release artifacts.".to_string())
      }
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::InvalidVersion { input } => write!(
        f,
        "Version string '{}' is invalid. Required format: major[.minor[.patch]] (major, minor, patch are numbers)",
        input
      ),
      ValidationError::DuplicateVersion { version } => {
        write!(f, "The specified version {} already exists", version)
      }
      ValidationError::VerifyFailed { failures } => {
        write!(f, "Verification failed: {} check(s) did not match", failures)
      }
    }
  }
}

/// Result type alias for kicad-pcm-pack
pub type PackResult<T> = Result<T, PackError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> PackResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> PackResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<PackError>,
{
  fn context(self, ctx: impl Into<String>) -> PackResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> PackResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &PackError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
