//! Release versioning and add-on metadata
//!
//! # Invariants
//!
//! 1. **Version strings are `major[.minor[.patch]]`**
//!    - 1-4, 1-4 and 1-6 digits per group
//!    - anything else aborts the run before any file is touched
//!
//! 2. **History is append-only, newest first**
//!    - a version already in metadata.json is rejected
//!    - the new record goes to index 0
//!    - prior records are written back unchanged
//!
//! # Example metadata.json entry
//!
//! ```json
//! {
//!     "version": "1.0.0",
//!     "status": "stable",
//!     "kicad_version": "8.0.0",
//!     "download_sha256": "9f86d0...",
//!     "download_size": 52311,
//!     "download_url": "https://github.com/.../releases/download/1.0.0/package.zip",
//!     "install_size": 190442
//! }
//! ```

pub mod history;
pub mod metadata;
pub mod version;

pub use history::VersionHistory;
pub use metadata::{AddonMetadata, ArchiveStats, InternalVersionRecord, VersionRecord};
pub use version::AddonVersion;
