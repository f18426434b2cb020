//! Publication coordinator
//!
//! The PublishCoordinator orchestrates one publish attempt end-to-end:
//! - Resolving the named provider via the ProviderRegistry
//! - Resolving the document via the DocumentStore
//! - Delegating the platform call to the provider
//! - Appending a PublicationRecord to the document's history on success
//!
//! ## Control Flow
//!
//! ```text
//! ┌─────────────┐      ┌──────────────────┐      ┌─────────────────┐
//! │   Caller    │─────▶│PublishCoordinator│─────▶│ProviderRegistry │
//! └─────────────┘      └──────────────────┘      └─────────────────┘
//!                               │
//!                ┌──────────────┼──────────────┐
//!                ▼              ▼              ▼
//!        ┌──────────────┐ ┌───────────┐ ┌──────────────┐
//!        │DocumentStore │ │ Provider  │ │DocumentStore │
//!        │ (find)       │ │ (publish) │ │ (append)     │
//!        └──────────────┘ └───────────┘ └──────────────┘
//! ```
//!
//! ## Failure Semantics
//!
//! Every step is fail-fast with no retry. A provider failure leaves no
//! trace in the document. A persistence failure after a successful provider
//! call means the platform has the content but the CMS has no record of it;
//! this inconsistency window is acknowledged and not resolved by a
//! compensating call.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::registry::ProviderRegistry;
use crate::traits::{DocumentStore, PublicationRecord, PublicationStatus, PublishOutcome};

/// Coordinates one publish attempt end-to-end
///
/// ## Lifecycle
///
/// Created once at startup, after the registry has been populated, and
/// shared by reference with the HTTP layer. Cheap to clone.
#[derive(Clone)]
pub struct PublishCoordinator {
    registry: Arc<ProviderRegistry>,
    documents: Arc<dyn DocumentStore>,
}

impl PublishCoordinator {
    /// Create a new coordinator
    ///
    /// # Parameters
    ///
    /// - `registry`: The populated provider registry
    /// - `documents`: The host's document store
    pub fn new(registry: Arc<ProviderRegistry>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { registry, documents }
    }

    /// The registry this coordinator resolves providers from
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Publish a document to an external platform
    ///
    /// Options are passed through to the provider untouched; the core does
    /// not inspect or transform them.
    ///
    /// # Parameters
    ///
    /// - `ctx`: The request context
    /// - `provider_name`: Name of the registered provider
    /// - `doc_id`: Id of the document to publish
    /// - `options`: Caller-supplied publish options
    ///
    /// # Returns
    ///
    /// - `Ok(PublishOutcome)`: The provider's result, unchanged
    /// - `Err(Error)`: Any step failed; no record was written unless the
    ///   provider call itself had already succeeded (`Error::Persistence`)
    pub async fn publish(
        &self,
        ctx: &RequestContext,
        provider_name: &str,
        doc_id: &str,
        options: &Value,
    ) -> Result<PublishOutcome> {
        let descriptor = self
            .registry
            .get(provider_name)
            .ok_or_else(|| Error::unknown_provider(provider_name))?;

        let doc = self
            .documents
            .find(ctx, doc_id)
            .await?
            .ok_or_else(|| Error::document_not_found(doc_id))?;

        debug!(
            request_id = %ctx.request_id,
            provider = %provider_name,
            doc_id = %doc_id,
            "Delegating publish to provider"
        );

        let outcome = match descriptor.provider().publish(ctx, &doc, options).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    request_id = %ctx.request_id,
                    provider = %provider_name,
                    doc_id = %doc_id,
                    error = %e,
                    "Publication failed"
                );
                return Err(e);
            }
        };

        self.record_publication(ctx, doc_id, provider_name, &outcome)
            .await?;

        info!(
            request_id = %ctx.request_id,
            provider = %provider_name,
            doc_id = %doc_id,
            external_id = outcome.id.as_deref().unwrap_or("-"),
            "Document published"
        );

        Ok(outcome)
    }

    /// Derive a PublicationRecord from the outcome and append it
    ///
    /// Status defaults to `Published` when the provider omits it.
    async fn record_publication(
        &self,
        ctx: &RequestContext,
        doc_id: &str,
        provider_name: &str,
        outcome: &PublishOutcome,
    ) -> Result<()> {
        let record = PublicationRecord {
            provider: provider_name.to_string(),
            published_at: chrono::Utc::now(),
            external_id: outcome.id.clone(),
            external_url: outcome.url.clone(),
            status: outcome.status.unwrap_or(PublicationStatus::Published),
        };

        self.documents
            .append_publication(ctx, doc_id, record)
            .await
            .map_err(|e| {
                // The platform has the content; the CMS has no record of it.
                error!(
                    request_id = %ctx.request_id,
                    provider = %provider_name,
                    doc_id = %doc_id,
                    error = %e,
                    "Failed to record publication after successful external publish"
                );
                match e {
                    Error::Persistence(_) => e,
                    other => Error::persistence(other.to_string()),
                }
            })
    }
}
