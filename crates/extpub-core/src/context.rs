//! Request context threaded through publish operations
//!
//! The context identifies one caller-initiated request. The core never
//! interprets it; it is passed through to providers and stores so they can
//! scope lookups (settings, access rules) and correlate log lines.

use serde::{Deserialize, Serialize};

/// Opaque per-request context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    /// Correlation id for this request
    pub request_id: String,

    /// Authenticated user, if the host supplied one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl RequestContext {
    /// Create a context with the given request id
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            user: None,
        }
    }

    /// Attach a user to the context
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}
