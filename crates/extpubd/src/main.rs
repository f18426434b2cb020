// # extpubd - External Publishing Daemon
//
// The extpubd daemon is a thin integration layer:
// 1. Reading configuration from environment variables
// 2. Initializing the runtime
// 3. Registering providers and wiring the document store
// 4. Serving the HTTP API
//
// All publishing logic lives in extpub-core; the daemon adds none.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Server
// - `EXTPUB_LISTEN_ADDR`: HTTP listen address (default: 127.0.0.1:8080)
//
// ### Document Store
// - `EXTPUB_DOC_STORE_TYPE`: Type of document store (memory, file)
// - `EXTPUB_DOC_STORE_PATH`: Path to document file (for file store)
// - `EXTPUB_SEED_DOCS`: Optional path to a JSON array of documents to
//   insert at startup (demos and testing)
//
// ### Providers
// - `EXTPUB_DEVTO_API_KEY`: Explicit DEV.to API key (optional; the
//   provider falls back to DEVTO_API_KEY and the settings store)
// - `EXTPUB_MODE`: "live" or "dry-run" (dry-run skips platform calls)
//
// ### Logging
// - `EXTPUB_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export EXTPUB_LISTEN_ADDR=127.0.0.1:8080
// export EXTPUB_DOC_STORE_TYPE=file
// export EXTPUB_DOC_STORE_PATH=/var/lib/extpub/documents.json
// export EXTPUB_DEVTO_API_KEY=your_key
//
// extpubd
// ```

mod http;

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use extpub_core::traits::DocumentStore;
use extpub_core::{Document, ProviderRegistry, PublishCoordinator};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum ExtpubExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<ExtpubExitCode> for ExitCode {
    fn from(code: ExtpubExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    listen_addr: String,
    doc_store_type: String,
    doc_store_path: Option<String>,
    seed_docs: Option<String>,
    devto_api_key: Option<String>,
    mode: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            listen_addr: env::var("EXTPUB_LISTEN_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            doc_store_type: env::var("EXTPUB_DOC_STORE_TYPE")
                .unwrap_or_else(|_| "memory".to_string()),
            doc_store_path: env::var("EXTPUB_DOC_STORE_PATH").ok(),
            seed_docs: env::var("EXTPUB_SEED_DOCS").ok(),
            devto_api_key: env::var("EXTPUB_DEVTO_API_KEY").ok(),
            mode: env::var("EXTPUB_MODE").unwrap_or_else(|_| "live".to_string()),
            log_level: env::var("EXTPUB_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.listen_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|e| {
                anyhow::anyhow!(
                    "EXTPUB_LISTEN_ADDR '{}' is not a valid socket address: {}",
                    self.listen_addr,
                    e
                )
            })?;

        match self.doc_store_type.as_str() {
            "memory" => {}
            "file" => {
                let path_ok = self
                    .doc_store_path
                    .as_ref()
                    .is_some_and(|p| !p.is_empty());
                if !path_ok {
                    anyhow::bail!(
                        "EXTPUB_DOC_STORE_PATH is required when EXTPUB_DOC_STORE_TYPE=file. \
                        Set it via: export EXTPUB_DOC_STORE_PATH=/var/lib/extpub/documents.json"
                    );
                }
            }
            other => anyhow::bail!(
                "EXTPUB_DOC_STORE_TYPE '{}' is not supported. Supported types: memory, file",
                other
            ),
        }

        match self.mode.to_lowercase().as_str() {
            "live" | "dry-run" => {}
            other => anyhow::bail!(
                "EXTPUB_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!(
                "EXTPUB_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        }

        Ok(())
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExtpubExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return ExtpubExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExtpubExitCode::ConfigError.into();
    }

    info!("Starting extpubd daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ExtpubExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            ExtpubExitCode::RuntimeError
        } else {
            ExtpubExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    // Create the document store
    let documents: Arc<dyn DocumentStore> = match config.doc_store_type.as_str() {
        "file" => {
            let path = config
                .doc_store_path
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("EXTPUB_DOC_STORE_PATH is not set"))?;
            info!("Using file document store: {}", path);
            Arc::new(extpub_core::FileDocumentStore::new(path).await?)
        }
        _ => {
            info!("Using in-memory document store");
            Arc::new(extpub_core::MemoryDocumentStore::new())
        }
    };

    if let Some(seed_path) = &config.seed_docs {
        seed_documents(documents.as_ref(), seed_path).await?;
    }

    // Populate the registry during single-threaded startup wiring;
    // it is read-only afterwards
    let registry = Arc::new(ProviderRegistry::new());

    #[cfg(feature = "devto")]
    {
        use extpub_core::config::ProviderConfig;

        info!("Registering DEV.to provider");
        let provider_config = ProviderConfig::Devto {
            api_key: config.devto_api_key.clone(),
            dry_run: config.mode.to_lowercase() == "dry-run",
        };
        extpub_provider_devto::register(&registry, &provider_config, None);
    }

    let enabled = registry.enabled_providers();
    info!("Enabled providers: {}", enabled.join(", "));

    let coordinator = PublishCoordinator::new(Arc::clone(&registry), Arc::clone(&documents));

    let addr: std::net::SocketAddr = config.listen_addr.parse()?;
    let server = http::HttpServer::new(coordinator);

    server
        .run(addr, async {
            match wait_for_shutdown().await {
                Ok(sig) => info!("Received shutdown signal: {}", sig),
                Err(e) => error!("Shutdown error: {}", e),
            }
        })
        .await?;

    documents.flush().await?;
    info!("Documents flushed, daemon stopped");

    Ok(())
}

/// Insert documents from a JSON seed file
async fn seed_documents(documents: &dyn DocumentStore, path: &str) -> Result<()> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        anyhow::anyhow!("Failed to read seed file {}: {}", path, e)
    })?;

    let docs: Vec<Document> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse seed file {}: {}", path, e))?;

    let count = docs.len();
    for doc in docs {
        documents.insert(doc).await?;
    }

    info!("Seeded {} document(s) from {}", count, path);
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let sig = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };

    Ok(sig)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
