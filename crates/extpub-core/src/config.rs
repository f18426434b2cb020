//! Configuration types for the external publishing system
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtpubConfig {
    /// Providers to register at startup, in registration order
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,

    /// Document store configuration
    #[serde(default)]
    pub document_store: DocumentStoreConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl ExtpubConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            document_store: DocumentStoreConfig::default(),
            server: ServerConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.document_store.validate()?;
        self.server.validate()?;
        Ok(())
    }
}

impl Default for ExtpubConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// DEV.to provider
    Devto {
        /// Explicit API key; highest-precedence credential source
        api_key: Option<String>,
        /// Skip the platform call and fabricate outcomes
        #[serde(default)]
        dry_run: bool,
    },
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentStoreConfig {
    /// In-memory store (no persistence)
    Memory,

    /// JSON file store with crash recovery
    File {
        /// Path to the document file
        path: String,
    },
}

impl DocumentStoreConfig {
    /// Validate the document store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            DocumentStoreConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("Document store path cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        DocumentStoreConfig::Memory
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address, e.g. "127.0.0.1:8080"
    pub listen_addr: String,
}

impl ServerConfig {
    /// Validate the server configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.listen_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|e| crate::Error::config(format!("Invalid listen address: {}", e)))?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = ExtpubConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_store_path_rejected() {
        let config = DocumentStoreConfig::File {
            path: String::new(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_listen_addr_rejected() {
        let config = ServerConfig {
            listen_addr: "not-an-addr".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_provider_config_serde() {
        let json = r#"{ "type": "devto", "api_key": "k-1" }"#;
        let config: ProviderConfig = serde_json::from_str(json).unwrap();
        let ProviderConfig::Devto { api_key, dry_run } = config;
        assert_eq!(api_key.as_deref(), Some("k-1"));
        assert!(!dry_run);
    }
}
