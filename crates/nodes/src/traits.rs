//! The `IntegrationStatus` trait: how the editor learns which external
//! accounts are connected.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An external system a node needs an authorised connection to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integration {
    /// Google OAuth (Sheets, Docs, Gmail).
    Google,
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google => write!(f, "Google"),
        }
    }
}

/// Answers whether an integration is currently connected for the user.
///
/// The editor only uses the answer for advisories: a missing connection
/// never blocks adding or running a node.
pub trait IntegrationStatus: Send + Sync {
    fn is_connected(&self, integration: Integration) -> bool;
}

impl IntegrationStatus for HashSet<Integration> {
    fn is_connected(&self, integration: Integration) -> bool {
        self.contains(&integration)
    }
}

/// Status source for sessions where nothing has been connected yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIntegrations;

impl IntegrationStatus for NoIntegrations {
    fn is_connected(&self, _integration: Integration) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_set_reports_membership() {
        let mut set = HashSet::new();
        assert!(!set.is_connected(Integration::Google));
        set.insert(Integration::Google);
        assert!(set.is_connected(Integration::Google));
    }

    #[test]
    fn no_integrations_is_always_disconnected() {
        assert!(!NoIntegrations.is_connected(Integration::Google));
    }
}
