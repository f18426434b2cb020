// # Publish Provider Trait
//
// Defines the capability contract for external-platform publishing adapters.
//
// ## Implementations
//
// - DEV.to: `extpub-provider-devto` crate
// - Future: Medium, Hashnode, Ghost, etc.
//
// ## Usage
//
// ```rust,ignore
// use extpub_core::PublishProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* PublishProvider implementation */;
//
//     let outcome = provider
//         .publish(&ctx, &doc, &serde_json::json!({ "title": "T" }))
//         .await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::RequestContext;
use crate::schema::OptionsSchema;
use crate::traits::document_store::Document;

/// Outcome status of a publish attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    /// Content is live on the external platform
    Published,
    /// Content was accepted but left unpublished
    Draft,
}

/// The provider's raw result, returned to the caller unchanged
///
/// The coordinator derives a [`PublicationRecord`](crate::traits::document_store::PublicationRecord)
/// from this but never rewrites it: whatever the provider returned is what
/// the API caller sees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishOutcome {
    /// Identifier assigned by the external platform
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Canonical URL on the external platform
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Publication status; the coordinator defaults a missing status to
    /// `Published` when recording
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PublicationStatus>,

    /// Any additional platform-specific fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Trait for external publishing provider implementations
///
/// This is the two-operation capability contract behind the registry:
/// a provider must describe its publish options and perform the
/// platform-specific publish call. New platforms are added by implementing
/// this trait, never by modifying the coordinator.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Trust Level: Untrusted
///
/// Providers are **untrusted** plug-ins with strict limitations:
///
/// ## Allowed Capabilities
/// - Perform HTTP/HTTPS API calls to their own platform endpoints
/// - Transform the document's structured content into the platform's
///   payload shape (markdown flattening, tag mapping)
/// - Resolve their own credential (config value, env var, settings store)
/// - Return success or failure
///
/// ## Forbidden Capabilities
/// - Spawn tasks or threads
/// - Implement retry or backoff (nothing in this system retries)
/// - Write to the document store (owned by `PublishCoordinator`)
/// - Access other providers (must be isolated)
/// - Cache state beyond a single request
///
/// A failed call must simply return an error; the coordinator propagates it
/// to the caller and writes no record.
#[async_trait]
pub trait PublishProvider: Send + Sync {
    /// Unique provider name (e.g., "devto")
    ///
    /// Immutable once registered; used as the registry key.
    fn name(&self) -> &'static str;

    /// Human-readable display name (e.g., "DEV.to")
    ///
    /// Defaults to the provider name.
    fn label(&self) -> &str {
        self.name()
    }

    /// Describe the fields an operator fills in to publish
    ///
    /// The schema is validated once at registration time; a malformed
    /// schema blocks registration entirely.
    fn publish_options(&self) -> OptionsSchema;

    /// Publish a document to the external platform
    ///
    /// The `options` value is passed through from the caller untouched;
    /// any platform-specific interpretation (tag objects vs. strings,
    /// publish-immediately flags) is the provider's responsibility.
    ///
    /// # Parameters
    ///
    /// - `ctx`: The request context
    /// - `doc`: The resolved document
    /// - `options`: Caller-supplied options, uninterpreted by the core
    ///
    /// # Returns
    ///
    /// - `Ok(PublishOutcome)`: The platform accepted the content
    /// - `Err(Error)`: The call failed; no record will be written
    async fn publish(
        &self,
        ctx: &RequestContext,
        doc: &Document,
        options: &Value,
    ) -> Result<PublishOutcome, crate::Error>;
}
