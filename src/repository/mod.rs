//! KiCad PCM repository files
//!
//! `packages.json` lists the packages; `repository.json` points at
//! `packages.json` and the resources archive, each with a SHA-256 and the
//! update time of the run.

pub mod index;

pub use index::{ArtifactRef, PackageIndex, UpdateStamp, repository_index};
