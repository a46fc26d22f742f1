//! On-disk persistence for [`MemoryStore`](super::MemoryStore).
//!
//! One JSON file per collection:
//! ```text
//! <DATA_DIR>/
//!   content.json
//!   categories.json
//!   gallery.json
//!   ...
//! ```
//!
//! Files are replaced atomically (temp file + rename).

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{validate_collection, Document, StoreError};

#[derive(Debug, Error)]
pub enum DiskError {
    #[error("I/O error for {}: {1}", .0.display())]
    Io(PathBuf, #[source] io::Error),
    #[error("Failed to parse {}: {1}", .0.display())]
    Parse(PathBuf, #[source] serde_json::Error),
    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),
}

impl From<DiskError> for StoreError {
    fn from(e: DiskError) -> Self {
        match e {
            DiskError::InvalidCollection(name) => StoreError::InvalidCollection(name),
            other => StoreError::Storage(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiskStorage {
    data_dir: PathBuf,
}

impl DiskStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn check(collection: &str) -> Result<(), DiskError> {
        validate_collection(collection)
            .map_err(|_| DiskError::InvalidCollection(collection.to_string()))
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", collection))
    }

    /// Loads one collection. Returns `Ok(None)` if it was never saved.
    pub fn load(&self, collection: &str) -> Result<Option<Vec<Document>>, DiskError> {
        Self::check(collection)?;
        let path = self.collection_path(collection);

        match fs::read(&path) {
            Ok(bytes) => {
                let docs = serde_json::from_slice(&bytes).map_err(|e| DiskError::Parse(path, e))?;
                Ok(Some(docs))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DiskError::Io(path, e)),
        }
    }

    /// Loads every `*.json` collection in the data directory.
    ///
    /// A missing data directory is treated as empty.
    pub fn load_all(&self) -> Result<HashMap<String, Vec<Document>>, DiskError> {
        let mut collections = HashMap::new();

        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(collections),
            Err(e) => return Err(DiskError::Io(self.data_dir.clone(), e)),
        };

        for entry in entries {
            let entry = entry.map_err(|e| DiskError::Io(self.data_dir.clone(), e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if Self::check(name).is_err() {
                tracing::warn!("Skipping unexpected file {}", path.display());
                continue;
            }
            if let Some(docs) = self.load(name)? {
                collections.insert(name.to_string(), docs);
            }
        }

        Ok(collections)
    }

    /// Saves one collection, replacing the previous file atomically.
    pub fn save(&self, collection: &str, documents: &[Document]) -> Result<(), DiskError> {
        Self::check(collection)?;

        fs::create_dir_all(&self.data_dir)
            .map_err(|e| DiskError::Io(self.data_dir.clone(), e))?;

        let path = self.collection_path(collection);
        let temp_path = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(documents)
            .map_err(|e| DiskError::Parse(path.clone(), e))?;

        let mut file =
            File::create(&temp_path).map_err(|e| DiskError::Io(temp_path.clone(), e))?;
        file.write_all(&bytes)
            .map_err(|e| DiskError::Io(temp_path.clone(), e))?;
        file.sync_all()
            .map_err(|e| DiskError::Io(temp_path.clone(), e))?;

        fs::rename(&temp_path, &path).map_err(|e| DiskError::Io(path, e))?;

        Ok(())
    }
}
