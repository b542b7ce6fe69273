//! Saving and loading result payloads.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::Result;

/// A JSON file holding an arbitrary serialisable payload
///
/// Used to checkpoint long experiment batches so that results can be
/// re-plotted in a later process without re-running them.
#[derive(Clone, Debug)]
pub struct ResultFile {
    path: PathBuf,
}

impl ResultFile {
    /// Creates a handle for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Gets the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialises `payload` to the file, creating parent directories
    pub fn save<T: Serialize + ?Sized>(&self, payload: &T) -> Result<()> {
        info!(path = %self.path.display(), "saving results data");
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut writer = BufWriter::new(fs::File::create(&self.path)?);
        serde_json::to_writer(&mut writer, payload)?;
        writer.flush()?;
        Ok(())
    }

    /// Deserialises the payload stored in the file
    pub fn load<T: DeserializeOwned>(&self) -> Result<T> {
        info!(path = %self.path.display(), "loading results data");
        let reader = BufReader::new(fs::File::open(&self.path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
