// # Memory Document Store
//
// In-memory implementation of DocumentStore.
//
// ## Purpose
//
// Provides a simple, fast document store that doesn't persist across
// restarts. Useful for testing, demos, and embedded deployments where the
// host CMS supplies documents at startup.
//
// ## Atomic Appends
//
// `append_publication` pushes onto the record sequence in place while
// holding the write lock, so concurrent appends to the same document are
// serialized and never lose a record.

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::context::RequestContext;
use crate::traits::document_store::{Document, DocumentStore, PublicationRecord};
use crate::Error;

/// In-memory document store implementation
///
/// # Example
///
/// ```rust,no_run
/// use extpub_core::store::MemoryDocumentStore;
/// use extpub_core::traits::{Document, DocumentStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryDocumentStore::new();
///     store.insert(Document::new("doc-1", "Hello")).await?;
///
///     let ctx = extpub_core::RequestContext::new("req-1");
///     let doc = store.find(&ctx, "doc-1").await?;
///     assert!(doc.is_some());
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<RwLock<HashMap<String, Document>>>,
}

impl MemoryDocumentStore {
    /// Create a new empty memory document store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of documents in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(&self, _ctx: &RequestContext, doc_id: &str) -> Result<Option<Document>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(doc_id).cloned())
    }

    async fn append_publication(
        &self,
        _ctx: &RequestContext,
        doc_id: &str,
        record: PublicationRecord,
    ) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        let doc = guard
            .get_mut(doc_id)
            .ok_or_else(|| Error::persistence(format!("No such document: {}", doc_id)))?;

        doc.external_publications.push(record);
        Ok(())
    }

    async fn insert(&self, doc: Document) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(doc.id.clone(), doc);
        Ok(())
    }

    async fn list_documents(&self) -> Result<Vec<String>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.keys().cloned().collect())
    }

    async fn flush(&self) -> Result<(), Error> {
        // Nothing buffered
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::PublicationStatus;

    fn record(provider: &str) -> PublicationRecord {
        PublicationRecord {
            provider: provider.to_string(),
            published_at: chrono::Utc::now(),
            external_id: Some("ext-1".to_string()),
            external_url: Some("https://example.com/p/1".to_string()),
            status: PublicationStatus::Published,
        }
    }

    #[tokio::test]
    async fn test_find_missing_document() {
        let store = MemoryDocumentStore::new();
        let ctx = RequestContext::new("req");
        assert!(store.find(&ctx, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_publication() {
        let store = MemoryDocumentStore::new();
        let ctx = RequestContext::new("req");

        store.insert(Document::new("doc-1", "Title")).await.unwrap();
        store
            .append_publication(&ctx, "doc-1", record("devto"))
            .await
            .unwrap();

        let doc = store.find(&ctx, "doc-1").await.unwrap().unwrap();
        assert_eq!(doc.external_publications.len(), 1);
        assert_eq!(doc.external_publications[0].provider, "devto");
    }

    #[tokio::test]
    async fn test_append_to_missing_document_fails() {
        let store = MemoryDocumentStore::new();
        let ctx = RequestContext::new("req");

        let err = store
            .append_publication(&ctx, "missing", record("devto"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }

    #[tokio::test]
    async fn test_concurrent_appends_lose_nothing() {
        let store = MemoryDocumentStore::new();
        store.insert(Document::new("doc-1", "Title")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let ctx = RequestContext::new(format!("req-{}", i));
                store
                    .append_publication(&ctx, "doc-1", record("devto"))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let ctx = RequestContext::new("check");
        let doc = store.find(&ctx, "doc-1").await.unwrap().unwrap();
        assert_eq!(doc.external_publications.len(), 16);
    }
}
