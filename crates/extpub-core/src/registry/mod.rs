//! Provider registry
//!
//! The registry maps provider names to descriptors and keeps the ordered
//! list of enabled providers, avoiding hardcoded if-else chains in the
//! coordinator and HTTP layer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use extpub_core::registry::{ProviderRegistry, ProviderDescriptor};
//!
//! let registry = ProviderRegistry::new();
//! registry.register(ProviderDescriptor::new(Arc::new(DevtoProvider::new(config))));
//!
//! let descriptor = registry.get("devto").unwrap();
//! ```
//!
//! ## Registration semantics
//!
//! Registration is permissive at the wiring stage and strict at the
//! capability contract:
//! - a duplicate name is a logged warning, not an error; the first
//!   registration wins and the second is ignored
//! - a descriptor that fails the contract check (empty name, malformed
//!   options schema) is logged as an error and never enters the registry
//!   or the enabled list
//!
//! Registration happens during single-threaded startup wiring; afterwards
//! the registry is read-only and safe for unsynchronized concurrent reads.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::schema::OptionsSchema;
use crate::traits::PublishProvider;

/// The registered record describing one provider
///
/// Immutable once registered. The label defaults to the provider's own
/// label (which itself defaults to the provider name); `with_label` lets
/// install-time wiring override it.
#[derive(Clone)]
pub struct ProviderDescriptor {
    name: String,
    label: String,
    provider: Arc<dyn PublishProvider>,
}

impl std::fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.name)
            .field("label", &self.label)
            .finish()
    }
}

impl ProviderDescriptor {
    /// Create a descriptor from a provider implementation
    pub fn new(provider: Arc<dyn PublishProvider>) -> Self {
        Self {
            name: provider.name().to_string(),
            label: provider.label().to_string(),
            provider,
        }
    }

    /// Override the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// The unique provider name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The human-readable display name
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The underlying provider implementation
    pub fn provider(&self) -> &Arc<dyn PublishProvider> {
        &self.provider
    }

    /// Check the capability contract
    ///
    /// The trait guarantees `publish` and `publish_options` exist; what
    /// remains dynamic is the name and the declared schema.
    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::provider_validation(
                "<unnamed>",
                "provider name cannot be empty",
            ));
        }

        if let Err(e) = self.provider.publish_options().validate() {
            return Err(Error::provider_validation(
                &self.name,
                format!("publish options schema is malformed: {}", e),
            ));
        }

        Ok(())
    }
}

/// Outcome of one registration call
#[derive(Debug)]
pub enum RegisterOutcome {
    /// Provider stored and appended to the enabled list
    Registered,
    /// Name already registered; first registration kept, this one ignored
    Duplicate,
    /// Capability contract failed; provider absent from the registry
    Rejected(Error),
}

impl RegisterOutcome {
    /// Whether the provider is now (or already was) in the registry
    pub fn is_registered(&self) -> bool {
        !matches!(self, RegisterOutcome::Rejected(_))
    }
}

/// Registry of external publishing providers
///
/// ## Thread Safety
///
/// Interior mutability with RwLock, allowing concurrent reads and exclusive
/// writes. Concurrent registration is not a supported scenario; writes only
/// happen during startup wiring.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<ProviderDescriptor>>>,

    /// Names in successful-registration order
    enabled: RwLock<Vec<String>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider
    ///
    /// Duplicate names warn and keep the original descriptor; contract
    /// failures are reported as errors and skipped. Neither crashes
    /// startup.
    pub fn register(&self, descriptor: ProviderDescriptor) -> RegisterOutcome {
        let name = descriptor.name().to_string();

        {
            let providers = self.providers.read().unwrap();
            if providers.contains_key(&name) {
                tracing::warn!(provider = %name, "Provider is already registered");
                return RegisterOutcome::Duplicate;
            }
        }

        if let Err(e) = descriptor.validate() {
            tracing::error!(provider = %name, error = %e, "Invalid provider, skipping registration");
            return RegisterOutcome::Rejected(e);
        }

        let mut providers = self.providers.write().unwrap();
        let mut enabled = self.enabled.write().unwrap();
        providers.insert(name.clone(), Arc::new(descriptor));
        enabled.push(name.clone());

        tracing::info!(provider = %name, "Registered publishing provider");
        RegisterOutcome::Registered
    }

    /// Look up a provider by name
    pub fn get(&self, name: &str) -> Option<Arc<ProviderDescriptor>> {
        self.providers.read().unwrap().get(name).cloned()
    }

    /// Full read-only view of registered descriptors, in enabled order
    pub fn providers(&self) -> Vec<Arc<ProviderDescriptor>> {
        let providers = self.providers.read().unwrap();
        self.enabled
            .read()
            .unwrap()
            .iter()
            .filter_map(|name| providers.get(name).cloned())
            .collect()
    }

    /// Names of enabled providers, in successful-registration order
    pub fn enabled_providers(&self) -> Vec<String> {
        self.enabled.read().unwrap().clone()
    }

    /// A provider's publish-options schema
    ///
    /// # Returns
    ///
    /// - `Ok(OptionsSchema)`: The provider's declared schema
    /// - `Err(Error::UnknownProvider)`: Name is not registered
    pub fn publish_options(&self, name: &str) -> Result<OptionsSchema> {
        let descriptor = self
            .get(name)
            .ok_or_else(|| Error::unknown_provider(name))?;
        Ok(descriptor.provider().publish_options())
    }

    /// Check if a provider name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.providers.read().unwrap().contains_key(name)
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        self.providers.read().unwrap().len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.providers.read().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::schema::{FieldKind, FieldSpec};
    use crate::traits::{Document, PublishOutcome, PublishProvider};
    use async_trait::async_trait;

    struct StubProvider {
        name: &'static str,
        schema: OptionsSchema,
    }

    impl StubProvider {
        fn valid(name: &'static str) -> Self {
            Self {
                name,
                schema: OptionsSchema::new()
                    .with_field(FieldSpec::new("title", "Title", FieldKind::String)),
            }
        }
    }

    #[async_trait]
    impl PublishProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn publish_options(&self) -> OptionsSchema {
            self.schema.clone()
        }

        async fn publish(
            &self,
            _ctx: &RequestContext,
            _doc: &Document,
            _options: &serde_json::Value,
        ) -> Result<PublishOutcome> {
            Ok(PublishOutcome::default())
        }
    }

    #[test]
    fn test_registry_registration() {
        let registry = ProviderRegistry::new();
        assert!(!registry.contains("stub"));

        let outcome = registry.register(ProviderDescriptor::new(Arc::new(StubProvider::valid("stub"))));
        assert!(matches!(outcome, RegisterOutcome::Registered));

        assert!(registry.contains("stub"));
        assert_eq!(registry.enabled_providers(), vec!["stub".to_string()]);
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let registry = ProviderRegistry::new();

        let first = ProviderDescriptor::new(Arc::new(StubProvider::valid("stub")))
            .with_label("First");
        let second = ProviderDescriptor::new(Arc::new(StubProvider::valid("stub")))
            .with_label("Second");

        assert!(matches!(registry.register(first), RegisterOutcome::Registered));
        assert!(matches!(registry.register(second), RegisterOutcome::Duplicate));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("stub").unwrap().label(), "First");
    }

    #[test]
    fn test_malformed_schema_rejected() {
        let registry = ProviderRegistry::new();

        let broken = StubProvider {
            name: "broken",
            schema: OptionsSchema::new()
                .with_field(FieldSpec::new("", "No name", FieldKind::String)),
        };

        let outcome = registry.register(ProviderDescriptor::new(Arc::new(broken)));
        assert!(matches!(outcome, RegisterOutcome::Rejected(Error::ProviderValidation { .. })));
        assert_eq!(registry.len(), 0);
        assert!(registry.enabled_providers().is_empty());
    }

    #[test]
    fn test_label_defaults_to_name() {
        let descriptor = ProviderDescriptor::new(Arc::new(StubProvider::valid("stub")));
        assert_eq!(descriptor.label(), "stub");
    }

    #[test]
    fn test_publish_options_unknown_provider() {
        let registry = ProviderRegistry::new();
        let err = registry.publish_options("nope").unwrap_err();
        assert!(matches!(err, Error::UnknownProvider(_)));
    }
}
