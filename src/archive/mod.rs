//! ZIP archives produced by a release
//!
//! - **package**: the add-on archive with library content and internal metadata
//! - **resources**: the repository resources archive with the add-on icon

pub mod package;
pub mod resources;

pub use package::{PackageArchive, content_size};
pub use resources::{ICON_FILE_NAME, build_resources_archive};
