// # File Document Store
//
// File-based implementation of DocumentStore with crash recovery.
//
// ## Purpose
//
// Persists documents and their publication histories across daemon
// restarts. Standalone deployments use this in place of a host CMS
// database.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Automatic backup: Keeps .backup of last known good state
// - Recovery: Falls back to backup if corruption detected
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "documents": {
//     "doc-1": {
//       "id": "doc-1",
//       "title": "Hello",
//       "content": [],
//       "external_publications": []
//     }
//   }
// }
// ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

use crate::context::RequestContext;
use crate::traits::document_store::{Document, DocumentStore, PublicationRecord};
use crate::Error;

/// Document file format version
/// Used for future migration if format changes
const DOC_FILE_VERSION: &str = "1.0";

/// File-based document store with crash recovery
///
/// Appends are performed in place under the write lock and then written
/// atomically, so concurrent publishes to the same document never lose a
/// record to a lost update.
///
/// # Example
///
/// ```rust,no_run
/// use extpub_core::store::FileDocumentStore;
/// use extpub_core::traits::{Document, DocumentStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileDocumentStore::new("/var/lib/extpub/documents.json").await?;
///     store.insert(Document::new("doc-1", "Hello")).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileDocumentStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,

    /// Serializes writers: all writes share one temp path, and the rename
    /// must land snapshots in mutation order
    write_lock: Arc<Mutex<()>>,
}

/// Internal state for the file-based store
#[derive(Debug)]
struct FileState {
    documents: HashMap<String, Document>,
    dirty: bool,
}

/// Serializable document file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct DocFileFormat {
    version: String,
    documents: HashMap<String, Document>,
}

impl FileDocumentStore {
    /// Create or load a file document store
    ///
    /// This will:
    /// 1. Try to load the existing document file
    /// 2. If corruption detected, try to load from backup
    /// 3. If both fail, start with an empty store
    /// 4. Create parent directories if needed
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config(format!(
                        "Failed to create document directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let documents = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                documents,
                dirty: false,
            })),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Load documents from file with automatic recovery
    ///
    /// Recovery strategy:
    /// 1. Try to load main document file
    /// 2. If JSON parse error, try loading backup
    /// 3. If backup also fails, start with an empty store
    async fn load_with_recovery(path: &Path) -> Result<HashMap<String, Document>, Error> {
        match Self::load(path).await {
            Ok(documents) => {
                tracing::debug!("Loaded document file: {} documents", documents.len());
                Ok(documents)
            }
            Err(e) => {
                let error_str = e.to_string().to_lowercase();
                let looks_corrupted = error_str.contains("json")
                    || error_str.contains("parse")
                    || error_str.contains("expected value")
                    || error_str.contains("serde");

                if !looks_corrupted {
                    return Err(e);
                }

                tracing::warn!(
                    "Document file appears corrupted: {}. Attempting recovery from backup.",
                    e
                );

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("No backup file found. Starting with empty store.");
                    return Ok(HashMap::new());
                }

                match Self::load(&backup_path).await {
                    Ok(documents) => {
                        tracing::info!("Recovered documents from backup: {}", documents.len());
                        if let Err(restore_err) = fs::copy(&backup_path, path).await {
                            tracing::error!(
                                "Failed to restore document file from backup: {}",
                                restore_err
                            );
                        }
                        Ok(documents)
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "Backup also corrupted: {}. Starting with empty store.",
                            backup_err
                        );
                        Ok(HashMap::new())
                    }
                }
            }
        }
    }

    /// Load documents from a file
    async fn load(path: &Path) -> Result<HashMap<String, Document>, Error> {
        if !path.exists() {
            tracing::debug!("Document file does not exist: {}", path.display());
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::persistence(format!(
                "Failed to read document file {}: {}",
                path.display(),
                e
            ))
        })?;

        let doc_file: DocFileFormat = serde_json::from_str(&content).map_err(|e| {
            Error::persistence(format!(
                "Failed to parse document file {}: {}. \
                File may be corrupted. Try restoring from backup.",
                path.display(),
                e
            ))
        })?;

        if doc_file.version != DOC_FILE_VERSION {
            tracing::warn!(
                "Document file version mismatch: expected {}, got {}. \
                Attempting to load anyway.",
                DOC_FILE_VERSION,
                doc_file.version
            );
        }

        Ok(doc_file.documents)
    }

    /// Write documents to file atomically
    ///
    /// One writer at a time: the snapshot is taken while holding the write
    /// lock, so a writer that enters after a concurrent mutation always
    /// renames a snapshot containing it and never clobbers it with a stale
    /// one.
    async fn write(&self) -> Result<(), Error> {
        let _write_guard = self.write_lock.lock().await;

        let doc_file = {
            let mut state_guard = self.state.write().await;
            state_guard.dirty = false;
            DocFileFormat {
                version: DOC_FILE_VERSION.to_string(),
                documents: state_guard.documents.clone(),
            }
        };

        let json = serde_json::to_string_pretty(&doc_file)
            .map_err(|e| Error::persistence(format!("Failed to serialize documents: {}", e)))?;

        // Write to temporary file first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Create backup of current file (if it exists)
        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::persistence(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Documents written to file: {}", self.path.display());
        Ok(())
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    /// Get path to backup file
    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn find(&self, _ctx: &RequestContext, doc_id: &str) -> Result<Option<Document>, Error> {
        let state_guard = self.state.read().await;
        Ok(state_guard.documents.get(doc_id).cloned())
    }

    async fn append_publication(
        &self,
        _ctx: &RequestContext,
        doc_id: &str,
        record: PublicationRecord,
    ) -> Result<(), Error> {
        {
            let mut state_guard = self.state.write().await;
            let doc = state_guard
                .documents
                .get_mut(doc_id)
                .ok_or_else(|| Error::persistence(format!("No such document: {}", doc_id)))?;
            doc.external_publications.push(record);
            state_guard.dirty = true;
        }

        // Immediate write for durability
        self.write().await
    }

    async fn insert(&self, doc: Document) -> Result<(), Error> {
        {
            let mut state_guard = self.state.write().await;
            state_guard.documents.insert(doc.id.clone(), doc);
            state_guard.dirty = true;
        }

        self.write().await
    }

    async fn list_documents(&self) -> Result<Vec<String>, Error> {
        let state_guard = self.state.read().await;
        Ok(state_guard.documents.keys().cloned().collect())
    }

    async fn flush(&self) -> Result<(), Error> {
        let state_guard = self.state.read().await;
        if state_guard.dirty {
            drop(state_guard);
            self.write().await
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::PublicationStatus;
    use tempfile::tempdir;

    fn record() -> PublicationRecord {
        PublicationRecord {
            provider: "devto".to_string(),
            published_at: chrono::Utc::now(),
            external_id: Some("42".to_string()),
            external_url: Some("https://dev.to/u/p".to_string()),
            status: PublicationStatus::Draft,
        }
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("documents.json");
        let ctx = RequestContext::new("req");

        {
            let store = FileDocumentStore::new(&path).await.unwrap();
            store.insert(Document::new("doc-1", "Hello")).await.unwrap();
            store
                .append_publication(&ctx, "doc-1", record())
                .await
                .unwrap();
        }

        // Reload from disk
        let store = FileDocumentStore::new(&path).await.unwrap();
        let doc = store.find(&ctx, "doc-1").await.unwrap().unwrap();
        assert_eq!(doc.title, "Hello");
        assert_eq!(doc.external_publications.len(), 1);
        assert_eq!(doc.external_publications[0].status, PublicationStatus::Draft);
    }

    #[tokio::test]
    async fn test_corrupted_file_falls_back_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("documents.json");

        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = FileDocumentStore::new(&path).await.unwrap();
        assert!(store.list_documents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupted_file_recovers_from_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("documents.json");
        let ctx = RequestContext::new("req");

        {
            let store = FileDocumentStore::new(&path).await.unwrap();
            store.insert(Document::new("doc-1", "Hello")).await.unwrap();
            // Second write creates a backup of the first
            store.insert(Document::new("doc-2", "World")).await.unwrap();
        }

        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = FileDocumentStore::new(&path).await.unwrap();
        assert!(store.find(&ctx, "doc-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_appends_lose_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("documents.json");

        let store = Arc::new(FileDocumentStore::new(&path).await.unwrap());
        store.insert(Document::new("doc-1", "Title")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let ctx = RequestContext::new(format!("req-{}", i));
                store.append_publication(&ctx, "doc-1", record()).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let ctx = RequestContext::new("check");
        let doc = store.find(&ctx, "doc-1").await.unwrap().unwrap();
        assert_eq!(doc.external_publications.len(), 32);

        // The on-disk state has every record too
        let reloaded = FileDocumentStore::new(&path).await.unwrap();
        let doc = reloaded.find(&ctx, "doc-1").await.unwrap().unwrap();
        assert_eq!(doc.external_publications.len(), 32);
    }

    #[tokio::test]
    async fn test_append_to_missing_document_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("documents.json");
        let ctx = RequestContext::new("req");

        let store = FileDocumentStore::new(&path).await.unwrap();
        let err = store
            .append_publication(&ctx, "missing", record())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }
}
