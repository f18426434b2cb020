//! Test doubles and common utilities for workflow contract tests
//!
//! This module provides minimal test doubles that verify workflow
//! constraints without talking to any real platform.

use async_trait::async_trait;
use extpub_core::error::Result;
use extpub_core::schema::{FieldKind, FieldSpec, OptionsSchema};
use extpub_core::traits::{
    Document, DocumentStore, PublicationRecord, PublicationStatus, PublishOutcome, PublishProvider,
};
use extpub_core::{Error, RequestContext};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A provider double that counts publish calls and can be told to fail
pub struct MockProvider {
    name: &'static str,
    label: String,
    outcome: PublishOutcome,
    fail_with: Option<String>,
    publish_call_count: Arc<AtomicUsize>,
}

impl MockProvider {
    /// A provider that succeeds with the given outcome
    pub fn succeeding(name: &'static str, outcome: PublishOutcome) -> Self {
        Self {
            name,
            label: name.to_string(),
            outcome,
            fail_with: None,
            publish_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A provider whose publish call always fails
    pub fn failing(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            label: name.to_string(),
            outcome: PublishOutcome::default(),
            fail_with: Some(message.into()),
            publish_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Override the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Handle to the publish call counter
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.publish_call_count)
    }
}

#[async_trait]
impl PublishProvider for MockProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn publish_options(&self) -> OptionsSchema {
        OptionsSchema::new()
            .with_field(FieldSpec::new("title", "Title", FieldKind::String).required())
            .with_field(FieldSpec::new("published", "Publish immediately", FieldKind::Boolean))
    }

    async fn publish(
        &self,
        _ctx: &RequestContext,
        _doc: &Document,
        _options: &serde_json::Value,
    ) -> Result<PublishOutcome> {
        self.publish_call_count.fetch_add(1, Ordering::SeqCst);

        match &self.fail_with {
            Some(message) => Err(Error::provider(self.name, message.clone())),
            None => Ok(self.outcome.clone()),
        }
    }
}

/// A document store whose appends always fail, layered over real lookups
///
/// Used to exercise the persistence-failure-after-successful-publish path.
pub struct FailingAppendStore {
    inner: extpub_core::MemoryDocumentStore,
}

impl FailingAppendStore {
    pub fn new(inner: extpub_core::MemoryDocumentStore) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl DocumentStore for FailingAppendStore {
    async fn find(&self, ctx: &RequestContext, doc_id: &str) -> Result<Option<Document>> {
        self.inner.find(ctx, doc_id).await
    }

    async fn append_publication(
        &self,
        _ctx: &RequestContext,
        _doc_id: &str,
        _record: PublicationRecord,
    ) -> Result<()> {
        Err(Error::persistence("disk full"))
    }

    async fn insert(&self, doc: Document) -> Result<()> {
        self.inner.insert(doc).await
    }

    async fn list_documents(&self) -> Result<Vec<String>> {
        self.inner.list_documents().await
    }

    async fn flush(&self) -> Result<()> {
        self.inner.flush().await
    }
}

/// A draft outcome with id and url, like the DEV.to adapter returns
pub fn draft_outcome() -> PublishOutcome {
    PublishOutcome {
        id: Some("ext-42".to_string()),
        url: Some("https://platform.example/p/42".to_string()),
        status: Some(PublicationStatus::Draft),
        extra: serde_json::Map::new(),
    }
}

/// An outcome with no status, to exercise the published default
pub fn statusless_outcome() -> PublishOutcome {
    PublishOutcome {
        id: Some("ext-43".to_string()),
        url: None,
        status: None,
        extra: serde_json::Map::new(),
    }
}
