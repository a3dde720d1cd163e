//! JSON table dump backed [`RowStore`].
//!
//! The dump holds one array per table:
//!
//! ```json
//! { "folders": [ { "id": "...", "name": "...", "icon": "..." } ],
//!   "bookmarks": [ { "id": "...", "url": "...", "title": "..." } ] }
//! ```
//!
//! Columns and top-level keys the codec does not own are written back
//! verbatim. Saving goes through a sibling temporary file and a rename, so an
//! interrupted job never leaves a half-written dump behind.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use common::{BookmarkRow, FolderRow, Row, StoreError};
use field_crypt::migrate::{MemoryStore, RowStore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

/// On-disk layout of a table dump.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Dump {
    #[serde(default)]
    folders: Vec<FolderRow>,
    #[serde(default)]
    bookmarks: Vec<BookmarkRow>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// A table dump loaded into memory.
#[derive(Debug)]
pub struct JsonDumpStore {
    rows: MemoryStore,
    extra: Map<String, Value>,
}

impl JsonDumpStore {
    /// Parse a dump from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Malformed`] if the bytes are not a valid dump.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, StoreError> {
        let dump: Dump =
            serde_json::from_slice(bytes).map_err(|e| StoreError::Malformed(e.to_string()))?;
        let rows = dump
            .folders
            .into_iter()
            .map(Row::Folder)
            .chain(dump.bookmarks.into_iter().map(Row::Bookmark));
        Ok(Self {
            rows: MemoryStore::new(rows),
            extra: dump.extra,
        })
    }

    /// Read and parse the dump at `path`.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read dump {}", path.display()))?;
        let store = Self::from_slice(&bytes)
            .with_context(|| format!("failed to parse dump {}", path.display()))?;
        info!(path = %path.display(), "dump loaded");
        Ok(store)
    }

    /// Serialise the dump as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Malformed`] if serialisation fails.
    pub fn to_vec(&self) -> Result<Vec<u8>, StoreError> {
        let mut dump = Dump {
            extra: self.extra.clone(),
            ..Default::default()
        };
        for row in self.rows.rows()? {
            match row {
                Row::Folder(f) => dump.folders.push(f),
                Row::Bookmark(b) => dump.bookmarks.push(b),
            }
        }
        serde_json::to_vec_pretty(&dump).map_err(|e| StoreError::Malformed(e.to_string()))
    }

    /// Write the dump to `path` atomically.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_vec()?;
        let tmp = temp_path(path);
        tokio::fs::write(&tmp, &bytes)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .with_context(|| format!("failed to move dump into place at {}", path.display()))?;
        info!(path = %path.display(), bytes = bytes.len(), "dump written");
        Ok(())
    }
}

impl RowStore for JsonDumpStore {
    fn rows(&self) -> Result<Vec<Row>, StoreError> {
        self.rows.rows()
    }

    fn update(&mut self, row: &Row) -> Result<(), StoreError> {
        self.rows.update(row)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_crypt::{migrate, EncryptionKey, FieldCodec};
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "exported_at": "2025-01-01T00:00:00Z",
            "folders": [
                { "id": "f_1", "name": "Reading", "icon": "📚", "user_id": "u_1" }
            ],
            "bookmarks": [
                {
                    "id": "bm_1",
                    "url": "https://example.com/path?q=1",
                    "title": "Example Domain",
                    "description": null,
                    "folder_id": "f_1",
                    "is_pinned": false,
                    "tags": ["demo"]
                }
            ]
        })
    }

    fn codec() -> FieldCodec {
        FieldCodec::new(&EncryptionKey::from_bytes(&[0x11u8; 32]).unwrap())
    }

    #[test]
    fn rejects_malformed_dump() {
        let err = JsonDumpStore::from_slice(b"{ not json").unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[test]
    fn round_trips_unknown_columns() {
        let bytes = serde_json::to_vec(&sample()).unwrap();
        let store = JsonDumpStore::from_slice(&bytes).unwrap();
        assert_eq!(store.rows().unwrap().len(), 2);

        let back: Value = serde_json::from_slice(&store.to_vec().unwrap()).unwrap();
        assert_eq!(back["exported_at"], "2025-01-01T00:00:00Z");
        assert_eq!(back["folders"][0]["user_id"], "u_1");
        assert_eq!(back["bookmarks"][0]["tags"], json!(["demo"]));
    }

    #[test]
    fn temp_path_is_a_sibling() {
        assert_eq!(
            temp_path(Path::new("/data/rows.json")),
            PathBuf::from("/data/rows.json.tmp")
        );
    }

    #[tokio::test]
    async fn migrate_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        tokio::fs::write(&path, serde_json::to_vec(&sample()).unwrap())
            .await
            .unwrap();

        let c = codec();
        let mut store = JsonDumpStore::load(&path).await.unwrap();
        let report = migrate::run(&c, &mut store, Default::default()).unwrap();
        assert_eq!(report.rows_updated, 2);
        store.save(&path).await.unwrap();
        assert!(!temp_path(&path).exists());

        let reloaded = JsonDumpStore::load(&path).await.unwrap();
        let back: Value = serde_json::from_slice(&reloaded.to_vec().unwrap()).unwrap();
        let url = back["bookmarks"][0]["url"].as_str().unwrap();
        assert_ne!(url, "https://example.com/path?q=1");
        assert_eq!(c.decrypt(url), "https://example.com/path?q=1");
        assert_eq!(c.decrypt(back["folders"][0]["icon"].as_str().unwrap()), "📚");
        assert_eq!(back["bookmarks"][0]["is_pinned"], false);

        let mut reloaded = reloaded;
        let again = migrate::run(&c, &mut reloaded, Default::default()).unwrap();
        assert_eq!(again.rows_updated, 0);
    }
}
