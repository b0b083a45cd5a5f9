//! Progress indicator for archive creation
//!
//! Uses `linya`, drawing to stderr so stdout stays clean for `--json`.

use linya::{Bar, Progress};

/// Progress bar counting archive members as they are written
pub struct ArchiveProgress {
  progress: Progress,
  bar: Bar,
}

impl ArchiveProgress {
  /// Create a progress bar for `total` archive members
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self { progress, bar }
  }

  /// Create a bar only when enabled and there is something to count
  pub fn maybe(enabled: bool, total: usize, label: impl Into<String>) -> Option<Self> {
    (enabled && total > 0).then(|| Self::new(total, label))
  }

  /// Increment progress by 1
  pub fn inc(&mut self) {
    self.progress.inc_and_draw(&self.bar, 1);
  }
}
