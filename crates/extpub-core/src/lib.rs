// # extpub-core
//
// Core library for the external publishing system.
//
// ## Architecture Overview
//
// This library provides the core workflow for publishing CMS documents to
// third-party platforms:
// - **PublishProvider**: Trait for platform-specific publishing adapters
// - **DocumentStore**: Trait for resolving documents and recording outcomes
// - **SettingsStore**: Trait for last-resort credential lookup
// - **ProviderRegistry**: Named registry of providers with an enabled order
// - **PublishCoordinator**: Orchestrates lookup → delegate → record for one
//   publish request
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core workflow is separate from platform adapters
// 2. **Plugin-Based**: Providers are registered by name, no hard-coded if-else
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Fail-Fast**: Nothing retries; every failure is logged and propagated
// 5. **Append-Only History**: Publication records are only ever appended,
//    and only after a successful platform call

pub mod admin;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod registry;
pub mod schema;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use context::RequestContext;
pub use coordinator::PublishCoordinator;
pub use error::{Error, Result};
pub use registry::{ProviderDescriptor, ProviderRegistry, RegisterOutcome};
pub use schema::{FieldKind, FieldSpec, OptionsSchema};
pub use store::{FileDocumentStore, MemoryDocumentStore};
pub use traits::{
    ContentBlock, Document, DocumentStore, PublicationRecord, PublicationStatus, PublishOutcome,
    PublishProvider, SettingsStore,
};
