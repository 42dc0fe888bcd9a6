//! `MockIntegrations`: a test double for `IntegrationStatus`.
//!
//! Records every integration it is asked about so tests can assert that the
//! editor consulted it (or didn't).

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::{Integration, IntegrationStatus};

/// A mock status source with a fixed set of connected integrations.
#[derive(Debug, Clone, Default)]
pub struct MockIntegrations {
    /// Integrations reported as connected.
    pub connected: HashSet<Integration>,
    /// Every integration queried, in call order.
    pub queries: Arc<Mutex<Vec<Integration>>>,
}

impl MockIntegrations {
    /// Create a mock where the given integrations are connected.
    pub fn connected(integrations: impl IntoIterator<Item = Integration>) -> Self {
        Self {
            connected: integrations.into_iter().collect(),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock where nothing is connected.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Number of times the status was queried.
    pub fn query_count(&self) -> usize {
        self.queries.lock().map(|q| q.len()).unwrap_or(0)
    }
}

impl IntegrationStatus for MockIntegrations {
    fn is_connected(&self, integration: Integration) -> bool {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(integration);
        }
        self.connected.contains(&integration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_queries_and_answers_from_set() {
        let mock = MockIntegrations::connected([Integration::Google]);
        let handle = mock.clone();
        assert!(mock.is_connected(Integration::Google));
        assert!(mock.is_connected(Integration::Google));
        assert_eq!(handle.query_count(), 2);

        let none = MockIntegrations::disconnected();
        assert!(!none.is_connected(Integration::Google));
        assert_eq!(none.query_count(), 1);
    }
}
