//! Core traits for the external publishing system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`PublishProvider`]: Publish documents to one external platform
//! - [`DocumentStore`]: Resolve documents and append publication records
//! - [`SettingsStore`]: Last-resort credential lookup

pub mod provider;
pub mod document_store;
pub mod settings_store;

pub use provider::{PublishProvider, PublishOutcome, PublicationStatus};
pub use document_store::{DocumentStore, Document, ContentBlock, PublicationRecord};
pub use settings_store::{SettingsStore, MemorySettingsStore};
