//! Uploaded file storage on the local filesystem.
//!
//! Files are addressed by paths relative to the media root, e.g.
//! `uploads/recipe/<uuid>.jpg`, which is also what the database stores.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Media root directory.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    /// Use `root` as the media root. The directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The media root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `relative` is absolute or contains `..`.
    pub fn resolve(&self, relative: &str) -> io::Result<PathBuf> {
        let path = Path::new(relative);
        if !path.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("media path escapes the media root: {relative}"),
            ));
        }
        Ok(self.root.join(path))
    }

    /// Write `bytes` to `relative`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from creating directories or writing the file.
    pub async fn save(&self, relative: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored media file");
        Ok(())
    }

    /// Delete `relative`. A file that is already gone is not an error.
    ///
    /// # Errors
    ///
    /// Returns any other I/O error.
    pub async fn remove(&self, relative: &str) -> io::Result<()> {
        let path = self.resolve(relative)?;
        match tokio::fs::remove_file(&path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
