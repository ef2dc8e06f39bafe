//! # File Transfer
//!
//! Where imported entities come from and where exported entities go.
//!
//! The controller only sees the [`ImportSource`] and [`ExportSink`] traits;
//! [`JsonFile`] is the implementation the CLI uses. Files hold a
//! pretty-printed JSON array of entities.

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{SettingsError, SettingsResult};

/// Supplies entities parsed from an external file.
pub trait ImportSource<E>: Send + Sync {
    /// Reads and parses every entity.
    fn load(&self) -> impl Future<Output = SettingsResult<Vec<E>>> + Send;
}

/// Accepts entities for serialization to an external destination.
pub trait ExportSink<E>: Send + Sync {
    /// Writes `items`, replacing any previous contents.
    fn save(&self, items: &[E]) -> impl Future<Output = SettingsResult<()>> + Send;
}

/// Entities already in memory, e.g. handed over by a file picker.
impl<E: Clone + Send + Sync> ImportSource<E> for Vec<E> {
    async fn load(&self) -> SettingsResult<Vec<E>> {
        Ok(self.clone())
    }
}

// =============================================================================
// JSON File
// =============================================================================

/// A JSON file on the local file system.
///
/// ## Usage
/// ```rust,ignore
/// let file = JsonFile::new("charges.json");
/// controller.export_items(&file).await;
/// controller.import_from_source(&file).await;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<E: DeserializeOwned + Send + Sync> ImportSource<E> for JsonFile {
    async fn load(&self) -> SettingsResult<Vec<E>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SettingsError::ReadFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        // A file holding `null` is an empty import, not a failure
        let items: Option<Vec<E>> = serde_json::from_str(&contents)?;
        let items = items.unwrap_or_default();

        debug!(path = %self.path.display(), count = items.len(), "Parsed import file");
        Ok(items)
    }
}

impl<E: Serialize + Send + Sync> ExportSink<E> for JsonFile {
    async fn save(&self, items: &[E]) -> SettingsResult<()> {
        let write_failed = |e: std::io::Error| SettingsError::WriteFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        };

        let contents = serde_json::to_string_pretty(items)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
        }
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(write_failed)?;

        debug!(path = %self.path.display(), count = items.len(), "Wrote export file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tavola_core::Charges;

    #[tokio::test]
    async fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("out").join("charges.json"));

        let items = vec![Charges::new(1, "Packing", 2000), Charges::new(2, "Delivery", 4000)];
        file.save(&items).await.unwrap();

        let loaded: Vec<Charges> = file.load().await.unwrap();
        assert_eq!(loaded, items);
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("nope.json"));

        let result: SettingsResult<Vec<Charges>> = file.load().await;
        assert!(matches!(result, Err(SettingsError::ReadFailed { .. })));
    }

    #[tokio::test]
    async fn test_null_and_malformed_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charges.json");

        tokio::fs::write(&path, "null").await.unwrap();
        let loaded: Vec<Charges> = JsonFile::new(&path).load().await.unwrap();
        assert!(loaded.is_empty());

        tokio::fs::write(&path, "[{\"charges_id\": 1").await.unwrap();
        let result: SettingsResult<Vec<Charges>> = JsonFile::new(&path).load().await;
        assert!(matches!(result, Err(SettingsError::SerializationFailed(_))));
    }
}
