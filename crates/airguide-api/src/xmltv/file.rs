//! `FileSource` - reads the schedule from a local XMLTV file.

use std::path::{Path, PathBuf};

use tracing::instrument;

use super::api::GuideSource;
use super::error::GuideError;

/// Local-file schedule source.
///
/// Re-reads the file on every fetch so an externally refreshed guide is
/// picked up on the next refill.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GuideSource for FileSource {
    #[instrument(skip_all, fields(path = %self.path.display()))]
    async fn fetch_document(&self) -> Result<String, GuideError> {
        let body = std::fs::read_to_string(&self.path).map_err(|e| {
            GuideError::FetchFailure(format!("failed to read {}: {e}", self.path.display()))
        })?;
        tracing::debug!(body_len = body.len(), "Schedule document read");
        Ok(body)
    }
}
