// # DEV.to Publishing Provider
//
// This crate provides a DEV.to provider implementation for the external
// publishing system.
//
// ## Behavior
//
// - Makes one HTTP request per publish call (POST /api/articles)
// - Full error propagation to the coordinator (nothing here retries)
// - HTTP timeout configured (30 seconds)
// - Specific error handling for HTTP status codes (401/403, 422, 429, 5xx)
// - Dry-run mode for safe testing
// - NO retry logic (nothing in this system retries)
// - NO document store access (owned by PublishCoordinator)
// - NO background tasks
//
// ## Credential Resolution
//
// Fixed precedence, first hit wins:
// 1. Explicit per-install configuration value
// 2. `DEVTO_API_KEY` environment variable
// 3. Settings store key `devto_api_key`
//
// All three missing resolves to "no credential"; the publish call then
// fails with a provider error rather than the resolution itself failing.
//
// ## Security Requirements
//
// - The API key NEVER appears in logs
// - The Debug implementation redacts the API key
//
// ## API Reference
//
// - DEV.to API v1: https://developers.forem.com/api
// - Create article: POST `/api/articles` with an `api-key` header

use async_trait::async_trait;
use extpub_core::config::ProviderConfig;
use extpub_core::schema::{FieldKind, FieldSpec, OptionsSchema};
use extpub_core::traits::{ContentBlock, Document, PublicationStatus, PublishOutcome, PublishProvider, SettingsStore};
use extpub_core::{Error, ProviderDescriptor, ProviderRegistry, RequestContext, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// DEV.to API base URL
const DEVTO_API_BASE: &str = "https://dev.to/api";

/// Environment variable consulted for the API key
const DEVTO_API_KEY_ENV: &str = "DEVTO_API_KEY";

/// Settings store key consulted as the last-resort credential source
const DEVTO_API_KEY_SETTING: &str = "devto_api_key";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// DEV.to publishing provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Resolve the credential and format the article payload as usual
/// - Log the intended POST payload
/// - **NOT** actually call the DEV.to API, fabricating a plausible outcome
///
/// This allows safe testing without creating articles.
pub struct DevtoProvider {
    /// Explicit API key from configuration
    /// ⚠️ NEVER log this value
    api_key: Option<String>,

    /// Settings store for last-resort credential lookup
    settings: Option<Arc<dyn SettingsStore>>,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, skip the POST and fabricate an outcome
    dry_run: bool,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for DevtoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevtoProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "<REDACTED>"))
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl DevtoProvider {
    /// Create a new DEV.to provider
    ///
    /// # Parameters
    ///
    /// - `api_key`: Optional explicit API key (highest-precedence source)
    /// - `settings`: Optional settings store (lowest-precedence source)
    /// - `dry_run`: If true, skip the POST and fabricate outcomes
    ///
    /// # Security
    ///
    /// The API key will NEVER be logged or displayed in error messages.
    pub fn new(
        api_key: Option<String>,
        settings: Option<Arc<dyn SettingsStore>>,
        dry_run: bool,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            api_key,
            settings,
            client,
            dry_run,
        }
    }

    /// Create a provider in live mode
    pub fn new_live(api_key: Option<String>, settings: Option<Arc<dyn SettingsStore>>) -> Self {
        Self::new(api_key, settings, false)
    }

    /// Create a provider in dry-run mode
    pub fn new_dry_run(api_key: Option<String>, settings: Option<Arc<dyn SettingsStore>>) -> Self {
        Self::new(api_key, settings, true)
    }

    /// Resolve the API key
    ///
    /// Precedence: explicit configuration value, then the `DEVTO_API_KEY`
    /// environment variable, then the settings store. All three missing
    /// resolves to `None` rather than an error.
    async fn resolve_api_key(&self, ctx: &RequestContext) -> Option<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }

        if let Ok(key) = std::env::var(DEVTO_API_KEY_ENV) {
            if !key.is_empty() {
                return Some(key);
            }
        }

        if let Some(settings) = &self.settings {
            match settings.get(ctx, DEVTO_API_KEY_SETTING).await {
                Ok(value) => return value.filter(|v| !v.is_empty()),
                Err(e) => {
                    tracing::debug!(error = %e, "Settings lookup for DEV.to API key failed");
                }
            }
        }

        None
    }

    /// Build the DEV.to article payload from a document and options
    ///
    /// Flattens the CMS's structured rich content into `body_markdown`:
    /// rich-text blocks pass through, image blocks become markdown image
    /// syntax. Tags accept either plain strings or `{ "value": .. }`
    /// objects, as the admin UI sends them.
    fn format_article(doc: &Document, options: &Value) -> Value {
        let mut body_markdown = String::new();
        for block in &doc.content {
            match block {
                ContentBlock::RichText { html } => {
                    body_markdown.push_str(html);
                }
                ContentBlock::Image { url, alt } => {
                    body_markdown.push_str(&format!("\n\n![{}]({})\n\n", alt, url));
                }
            }
        }

        let tags: Vec<String> = options
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(|tag| {
                        tag.as_str()
                            .map(str::to_string)
                            .or_else(|| tag.get("value").and_then(Value::as_str).map(str::to_string))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let title = options
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(&doc.title);

        let published = options
            .get("published")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let mut article = serde_json::Map::new();
        article.insert("title".to_string(), Value::String(title.to_string()));
        article.insert("body_markdown".to_string(), Value::String(body_markdown));
        article.insert("published".to_string(), Value::Bool(published));
        article.insert("tags".to_string(), serde_json::json!(tags));

        if let Some(series) = options.get("series").and_then(Value::as_str) {
            article.insert("series".to_string(), Value::String(series.to_string()));
        }
        if let Some(canonical) = options.get("canonical_url").and_then(Value::as_str) {
            article.insert(
                "canonical_url".to_string(),
                Value::String(canonical.to_string()),
            );
        }

        serde_json::json!({ "article": article })
    }

    /// Send the article to the DEV.to API
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /api/articles
    /// api-key: <key>
    /// Content-Type: application/json
    /// ```
    async fn send_article(&self, api_key: &str, payload: &Value) -> Result<Value> {
        let url = format!("{}/articles", DEVTO_API_BASE);

        let response = self
            .client
            .post(&url)
            .header("api-key", api_key)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::provider("devto", format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            // Map HTTP status codes to specific errors
            return match status.as_u16() {
                401 | 403 => Err(Error::provider(
                    "devto",
                    format!(
                        "Authentication failed: invalid API key or insufficient permissions. Status: {}",
                        status
                    ),
                )),
                422 => Err(Error::provider(
                    "devto",
                    format!("Article rejected: {} - {}", status, error_text),
                )),
                429 => Err(Error::provider(
                    "devto",
                    format!("Rate limit exceeded. Status: {}", status),
                )),
                500..=599 => Err(Error::provider(
                    "devto",
                    format!("DEV.to server error (transient): {} - {}", status, error_text),
                )),
                _ => Err(Error::provider(
                    "devto",
                    format!("Publish failed: {} - {}", status, error_text),
                )),
            };
        }

        response
            .json()
            .await
            .map_err(|e| Error::provider("devto", format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl PublishProvider for DevtoProvider {
    fn name(&self) -> &'static str {
        "devto"
    }

    fn label(&self) -> &str {
        "DEV.to"
    }

    fn publish_options(&self) -> OptionsSchema {
        OptionsSchema::new()
            .with_field(FieldSpec::new("title", "Title", FieldKind::String).required())
            .with_field(
                FieldSpec::new("tags", "Tags (up to 4)", FieldKind::StringArray).with_max(4),
            )
            .with_field(
                FieldSpec::new("series", "Series", FieldKind::String)
                    .with_help("Group with other posts in a named collection"),
            )
            .with_field(
                FieldSpec::new("canonical_url", "Canonical URL", FieldKind::Url)
                    .with_help("Original URL if this is a cross-post"),
            )
            .with_field(
                FieldSpec::new("published", "Publish immediately", FieldKind::Boolean)
                    .with_default(serde_json::json!(false)),
            )
    }

    /// Publish a document to DEV.to
    ///
    /// This implementation:
    /// - Resolves the credential (config → env → settings), failing the
    ///   call if none is found
    /// - Flattens the document into the DEV.to article payload
    /// - Makes ONE POST per publish call
    /// - Never logs the API key
    /// - In dry-run mode, logs the intended payload without sending it
    async fn publish(
        &self,
        ctx: &RequestContext,
        doc: &Document,
        options: &Value,
    ) -> Result<PublishOutcome> {
        let api_key = self
            .resolve_api_key(ctx)
            .await
            .ok_or_else(|| Error::provider("devto", "DEV.to API key not configured"))?;

        let payload = Self::format_article(doc, options);

        let requested_publish = options
            .get("published")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        tracing::info!(
            request_id = %ctx.request_id,
            doc_id = %doc.id,
            mode = if self.dry_run { "DRY-RUN" } else { "LIVE" },
            "Publishing document to DEV.to"
        );

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send POST request to {}/articles with payload: {}",
                DEVTO_API_BASE,
                payload
            );
            let fake_id = format!("devto-dry-{}", doc.id);
            return Ok(PublishOutcome {
                id: Some(fake_id.clone()),
                url: Some(format!("https://dev.to/drafts/{}", fake_id)),
                status: Some(if requested_publish {
                    PublicationStatus::Published
                } else {
                    PublicationStatus::Draft
                }),
                extra: serde_json::Map::new(),
            });
        }

        let result = self.send_article(&api_key, &payload).await?;

        let id = result
            .get("id")
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        let url = result
            .get("url")
            .and_then(Value::as_str)
            .map(str::to_string);

        tracing::info!(
            request_id = %ctx.request_id,
            doc_id = %doc.id,
            external_id = id.as_deref().unwrap_or("-"),
            "DEV.to accepted article"
        );

        Ok(PublishOutcome {
            id,
            url,
            status: Some(if requested_publish {
                PublicationStatus::Published
            } else {
                PublicationStatus::Draft
            }),
            extra: serde_json::Map::new(),
        })
    }
}

/// Register the DEV.to provider with a registry
///
/// This function should be called during startup wiring to make the
/// DEV.to provider available.
///
/// # Example
///
/// ```rust,ignore
/// use extpub_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// extpub_provider_devto::register(&registry, &config, None);
/// ```
pub fn register(
    registry: &ProviderRegistry,
    config: &ProviderConfig,
    settings: Option<Arc<dyn SettingsStore>>,
) {
    let ProviderConfig::Devto { api_key, dry_run } = config;

    let dry_run = *dry_run
        || std::env::var("EXTPUB_MODE")
            .unwrap_or_default()
            .to_lowercase()
            == "dry-run";

    if dry_run {
        tracing::warn!("DEV.to provider running in DRY-RUN mode - no articles will be created");
    }

    let provider = DevtoProvider::new(api_key.clone(), settings, dry_run);
    registry.register(ProviderDescriptor::new(Arc::new(provider)));
}
