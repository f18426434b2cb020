//! Admin UI affordance
//!
//! The core registers exactly one navigation/action affordance with the
//! host UI shell: the "Publish Externally" button. This is a static
//! declaration the HTTP layer serves verbatim; there is no runtime logic
//! behind it.

use serde::{Deserialize, Serialize};

/// A declarative admin-bar action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAction {
    /// Stable action name
    pub name: String,
    /// Icon identifier understood by the host shell
    pub icon: String,
    /// Tooltip text
    pub tooltip: String,
    /// Context in which the action applies
    pub when: String,
    /// Action identifier dispatched by the shell
    pub action: String,
    /// Placement hint
    pub position: String,
    /// Required permission
    pub permission: String,
}

/// The "Publish Externally" admin-bar button
pub fn publish_action() -> AdminAction {
    AdminAction {
        name: "externalPublish".to_string(),
        icon: "external-link".to_string(),
        tooltip: "Publish Externally".to_string(),
        when: "page".to_string(),
        action: "external-publish".to_string(),
        position: "right".to_string(),
        permission: "edit".to_string(),
    }
}
