//! Saved drawings: PNG files with a sequential numeric suffix.
//!
//! The next number is one more than the count of entries already in
//! the directory, so deleting files out of band can make a later save
//! overwrite an existing one.

use std::path::PathBuf;

use image::RgbImage;

use crate::error::SketchError;

#[derive(Debug, Clone)]
pub struct DrawingStore {
    directory: PathBuf,
    prefix: String,
}

impl DrawingStore {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
        }
    }

    /// Path the next save will write to. Creates the directory if needed.
    pub fn next_path(&self) -> Result<PathBuf, SketchError> {
        std::fs::create_dir_all(&self.directory)?;
        let existing = std::fs::read_dir(&self.directory)?.count();
        Ok(self
            .directory
            .join(format!("{}{}.png", self.prefix, existing + 1)))
    }

    /// Write `image` as the next numbered PNG and return its path.
    pub fn save(&self, image: &RgbImage) -> Result<PathBuf, SketchError> {
        let path = self.next_path()?;
        image.save(&path).map_err(|source| SketchError::Save {
            path: path.clone(),
            source,
        })?;
        log::info!("saved drawing to {}", path.display());
        Ok(path)
    }
}
