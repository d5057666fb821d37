//! Publishing rendered feeds to disk.

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Feed path {0} has no parent directory")]
    NoParent(PathBuf),

    #[error("Failed to stage feed in {dir}: {source}")]
    Stage {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to publish feed at {path}: {source}")]
    Publish {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Replaces `path` with `content` in one step.
///
/// The feed is staged in a temporary file next to `path`, flushed to disk and
/// then persisted over the old feed. Readers see either the previous feed or
/// the complete new one. The staged file is removed if anything fails.
pub fn write_feed_file(path: &Path, content: &str) -> Result<(), OutputError> {
    let dir = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => return Err(OutputError::NoParent(path.to_path_buf())),
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(|source| OutputError::Stage {
        dir: dir.to_path_buf(),
        source,
    })?;

    staged
        .write_all(content.as_bytes())
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|source| OutputError::Stage {
            dir: dir.to_path_buf(),
            source,
        })?;

    staged.persist(path).map_err(|e| OutputError::Publish {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "Feed file replaced");
    Ok(())
}
