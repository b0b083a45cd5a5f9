//! Repository resources archive (build/resources.zip)
//!
//! ```text
//! <identifier>/
//!   icon.png
//! ```

use crate::archive::package::{add_file, deflated, modified_time, prepare_output};
use crate::core::error::{PackResult, ResultExt};
use std::fs::File;
use std::path::Path;
use zip::ZipWriter;

/// Icon file name, both on disk (under `resources/`) and in the archive
pub const ICON_FILE_NAME: &str = "icon.png";

/// Write the resources archive holding the add-on icon
pub fn build_resources_archive(icon_path: &Path, identifier: &str, out_path: &Path) -> PackResult<()> {
  prepare_output(out_path)?;

  let file = File::create(out_path).with_context(|| format!("Failed to create archive {}", out_path.display()))?;
  let mut zip = ZipWriter::new(file);
  add_file(
    &mut zip,
    icon_path,
    &format!("{}/{}", identifier, ICON_FILE_NAME),
    deflated().last_modified_time(modified_time(icon_path)),
  )?;
  zip
    .finish()
    .with_context(|| format!("Failed to finalize archive {}", out_path.display()))?;

  Ok(())
}
