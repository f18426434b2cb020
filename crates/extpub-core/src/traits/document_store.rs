// # Document Store Trait
//
// Defines the interface to the host CMS's document storage.
//
// ## Purpose
//
// The document store resolves document ids and durably records publication
// outcomes:
// - `find` resolves a document id, honoring the store's own access rules
// - `append_publication` appends one PublicationRecord to a document's
//   history as a targeted atomic append
//
// The core adds no authorization layer of its own; a document the store
// refuses to return is simply "not found".
//
// ## Implementations
//
// - Memory: `store::MemoryDocumentStore` (testing, embedded)
// - File: `store::FileDocumentStore` (JSON with crash recovery)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::RequestContext;
use crate::traits::provider::PublicationStatus;

/// One block of the CMS's structured rich content
///
/// Providers flatten these into whatever body shape their platform expects;
/// the core never renders content itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Rich text, stored as HTML
    RichText {
        /// The HTML fragment
        html: String,
    },
    /// An image with optional alt text
    Image {
        /// Image URL
        url: String,
        /// Alt text
        #[serde(default)]
        alt: String,
    },
}

/// Durable evidence that a document was sent to a provider
///
/// A document owns an append-only ordered sequence of these; each publish
/// attempt appends one, none are overwritten or deduplicated. A record is
/// appended **only** after the provider's publish call returned
/// successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationRecord {
    /// Provider name
    pub provider: String,

    /// Timestamp of the attempt's completion
    pub published_at: chrono::DateTime<chrono::Utc>,

    /// Identifier assigned by the external platform
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    /// Canonical URL on the external platform
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,

    /// Publication status reported by the provider
    pub status: PublicationStatus,
}

/// A document as seen by the publishing core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable document id
    pub id: String,

    /// Document title
    pub title: String,

    /// URL slug within the CMS
    #[serde(default)]
    pub slug: String,

    /// Structured rich content
    #[serde(default)]
    pub content: Vec<ContentBlock>,

    /// Append-only publication history
    #[serde(default)]
    pub external_publications: Vec<PublicationRecord>,
}

impl Document {
    /// Create a document with the given id and title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            slug: String::new(),
            content: Vec::new(),
            external_publications: Vec::new(),
        }
    }

    /// Append a content block
    pub fn with_block(mut self, block: ContentBlock) -> Self {
        self.content.push(block);
        self
    }
}

/// Trait for document store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
///
/// # Concurrency
///
/// `append_publication` must be atomic at the storage layer: two concurrent
/// successful publishes to the same document must never lose a record to a
/// lost update. It must not read-modify-write the full document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Resolve a document id
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Document))`: The document, visible to this caller
    /// - `Ok(None)`: No such document (or not visible per the store's rules)
    /// - `Err(Error)`: Storage error
    async fn find(
        &self,
        ctx: &RequestContext,
        doc_id: &str,
    ) -> Result<Option<Document>, crate::Error>;

    /// Append one publication record to a document's history
    ///
    /// Targeted atomic append; fails if the document does not exist.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Record durably appended
    /// - `Err(Error)`: Storage error; no partial write
    async fn append_publication(
        &self,
        ctx: &RequestContext,
        doc_id: &str,
        record: PublicationRecord,
    ) -> Result<(), crate::Error>;

    /// Insert or replace a document (wiring and tests)
    async fn insert(&self, doc: Document) -> Result<(), crate::Error>;

    /// List all document ids in the store
    async fn list_documents(&self) -> Result<Vec<String>, crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}
