//! Canonical domain records.
//!
//! These are the shapes the navigation layer sees. Raw backend payloads
//! vary across deployed versions; `portero-backend` normalizes them into
//! these structs once, at the client boundary.

use serde::{Deserialize, Serialize};

/// A top-level feature area shown at HOME (e.g. `gates`, `crops`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Stable key used in action tokens.
    pub key: String,
    /// Human-readable button label.
    pub label: String,
    /// Disabled modules are hidden from the menu.
    pub enabled: bool,
}

/// A named collection of gates presented together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Backend group id.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// A remote-controlled physical actuator exposed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    /// Backend gate id.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// Profile data the backend attaches to the menu response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Full name for the HOME greeting.
    pub full_name: Option<String>,
    /// Name of the active account.
    pub account_name: Option<String>,
    /// Id of the active account, when the backend reports one.
    pub account_id: Option<i64>,
}

/// Canonical shape of the menu operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    /// Modules the user may enter.
    pub modules: Vec<Module>,
    /// Resolved user profile, when present.
    pub user: Option<UserProfile>,
    /// The user has several accounts and must pick one first.
    pub requires_account_selection: bool,
}

impl Menu {
    /// Modules that should actually be rendered.
    #[must_use]
    pub fn enabled_modules(&self) -> Vec<&Module> {
        self.modules.iter().filter(|m| m.enabled).collect()
    }
}

/// Canonical shape of the list-gates operation: the resolved group plus
/// its visible gates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateList {
    /// The group the gates belong to.
    pub group: Group,
    /// Gates visible to the requesting user.
    pub gates: Vec<Gate>,
}
