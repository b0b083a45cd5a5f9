//! CLI commands for kicad-pcm-pack
//!
//! - **package**: build a release (archive, metadata.json, repository index)
//! - **verify**: recheck recorded hashes and sizes against the artifacts
//!
//! All commands accept `&PackContext` so configuration is loaded once.

pub mod package;
pub mod verify;

pub use package::{PackageOptions, run_package};
pub use verify::run_verify;
