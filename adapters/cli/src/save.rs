use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tile_lands_core::ProgressRecord;

/// Version written into every progress file.
const SAVE_VERSION: u32 = 1;

/// On-disk layout of the progress file.
#[derive(Debug, Serialize, Deserialize)]
struct SaveFile {
    version: u32,
    progress: ProgressRecord,
}

/// JSON-backed persistence for the player's progress record.
#[derive(Clone, Debug)]
pub(crate) struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored record. A missing file yields a fresh record.
    pub(crate) fn load(&self) -> Result<ProgressRecord, SaveError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(ProgressRecord::default());
            }
            Err(source) => {
                return Err(SaveError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let file: SaveFile =
            serde_json::from_slice(&bytes).map_err(|source| SaveError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        if file.version != SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion(file.version));
        }
        Ok(file.progress)
    }

    /// Writes the record, replacing any previous contents.
    pub(crate) fn save(&self, record: &ProgressRecord) -> Result<(), SaveError> {
        let file = SaveFile {
            version: SAVE_VERSION,
            progress: record.clone(),
        };
        let json = serde_json::to_vec_pretty(&file).map_err(|source| SaveError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| SaveError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Errors raised while reading or writing the progress file.
#[derive(Debug, Error)]
pub(crate) enum SaveError {
    /// The file exists but could not be read.
    #[error("failed to read progress from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file could not be written.
    #[error("failed to write progress to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file does not hold a valid progress record.
    #[error("progress file {path} is malformed")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The file was written by an incompatible version.
    #[error("unsupported progress file version {0}; expected {SAVE_VERSION}")]
    UnsupportedVersion(u32),
}
