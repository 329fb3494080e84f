//! On-disk Q-table: gzip-compressed JSON, replaced atomically on save

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::action_space::ActionCatalog;
use super::policy::QTable;

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("q-table I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("q-table at {} is not valid: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("q-table format version {found} is not supported")]
    Version { found: u32 },
    #[error("q-table was written for a different action catalog")]
    CatalogMismatch,
    #[error("q-table row {key} has the wrong number of values")]
    RowWidth { key: String },
}

#[derive(Debug, Serialize, Deserialize)]
struct TableDocument {
    version: u32,
    actions: Vec<String>,
    states: BTreeMap<String, Vec<f64>>,
}

/// A single persisted Q-table file
#[derive(Debug, Clone)]
pub struct TableStore {
    path: PathBuf,
}

impl TableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole table, or None when no file exists yet
    pub fn load(&self, catalog: &ActionCatalog) -> Result<Option<QTable>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };

        let reader = BufReader::new(GzDecoder::new(file));
        let document: TableDocument =
            serde_json::from_reader(reader).map_err(|source| StoreError::Format {
                path: self.path.clone(),
                source,
            })?;

        if document.version != FORMAT_VERSION {
            return Err(StoreError::Version {
                found: document.version,
            });
        }
        if document.actions != catalog.names() {
            return Err(StoreError::CatalogMismatch);
        }

        let table = QTable::from_rows(catalog.len(), document.states)
            .map_err(|key| StoreError::RowWidth { key })?;
        tracing::info!("Loaded q-table with {} states from {}", table.len(), self.path.display());
        Ok(Some(table))
    }

    /// Write the whole table to a sibling temp file, then rename it over the target
    pub fn save(&self, table: &QTable, catalog: &ActionCatalog) -> Result<(), StoreError> {
        let document = TableDocument {
            version: FORMAT_VERSION,
            actions: catalog.names(),
            states: table
                .iter()
                .map(|(key, values)| (key.clone(), values.clone()))
                .collect(),
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let temp_path = self.temp_path();
        let file = File::create(&temp_path).map_err(|e| self.io_error(e))?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(&mut encoder, &document).map_err(|source| StoreError::Format {
            path: temp_path.clone(),
            source,
        })?;
        let mut writer = encoder.finish().map_err(|e| self.io_error(e))?;
        writer.flush().map_err(|e| self.io_error(e))?;
        let file = writer
            .into_inner()
            .map_err(|e| self.io_error(e.into_error()))?;
        file.sync_all().map_err(|e| self.io_error(e))?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(e))?;
        tracing::debug!("Saved q-table with {} states to {}", table.len(), self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planners::rl::policy::{NextState, QLearningConfig, QLearningTable};

    fn temp_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("scbot-store-{}-{}", std::process::id(), name));
        let _ = fs::remove_dir_all(&dir);
        dir.join("table.json.gz")
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let store = TableStore::new(temp_file("missing"));
        assert!(store.load(&ActionCatalog::standard()).unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_restores_values() {
        let catalog = ActionCatalog::standard();
        let mut q = QLearningTable::new(catalog.len(), QLearningConfig::default());
        q.update("[1,0,0,0,0,0,0,0]", 3, 1.0, NextState::Terminal);
        q.update("[0,0,0,0,0,0,0,0]", 0, -1.0, NextState::State("[1,0,0,0,0,0,0,0]"));

        let path = temp_file("roundtrip");
        let store = TableStore::new(&path);
        store.save(q.table(), &catalog).unwrap();

        assert!(path.exists());
        assert!(!store.temp_path().exists());
        let loaded = store.load(&catalog).unwrap().unwrap();
        assert_eq!(&loaded, q.table());
    }

    #[test]
    fn test_catalog_mismatch_is_rejected() {
        let catalog = ActionCatalog::standard();
        let path = temp_file("mismatch");
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        let document = TableDocument {
            version: FORMAT_VERSION,
            actions: vec!["donothing".to_string()],
            states: BTreeMap::new(),
        };
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        serde_json::to_writer(&mut encoder, &document).unwrap();
        encoder.finish().unwrap();

        let err = TableStore::new(&path).load(&catalog).unwrap_err();
        assert!(matches!(err, StoreError::CatalogMismatch));
    }

    #[test]
    fn test_corrupt_file_is_a_format_error() {
        let path = temp_file("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"not gzip at all").unwrap();

        let err = TableStore::new(&path)
            .load(&ActionCatalog::standard())
            .unwrap_err();
        assert!(matches!(err, StoreError::Format { .. }));
    }
}
