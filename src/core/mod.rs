//! Core building blocks shared by all commands
//!
//! - **config**: pcm.toml parsing, defaults and URL templates
//! - **context**: project root, configuration and loaded templates
//! - **error**: error types with contextual help messages and exit codes

pub mod config;
pub mod context;
pub mod error;
