use std::collections::HashMap;

use tokio::sync::RwLock;

use snuffy_core::ServiceKind;

/// Candidate still waiting behind the current offer.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub provider_id: String,
    pub score: f64,
}

/// Ranked lists retained per request between offers.
///
/// Only the order lives here. Whether an entry is still eligible is decided
/// against a fresh pool scan when the list is consumed.
#[derive(Debug, Default)]
pub struct RankedListRegistry {
    lists: RwLock<HashMap<(ServiceKind, String), Vec<RankedEntry>>>,
}

impl RankedListRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the list retained for the request.
    pub async fn retain(&self, kind: ServiceKind, request_id: &str, remaining: Vec<RankedEntry>) {
        self.lists
            .write()
            .await
            .insert((kind, request_id.to_string()), remaining);
    }

    pub async fn get(&self, kind: ServiceKind, request_id: &str) -> Option<Vec<RankedEntry>> {
        self.lists
            .read()
            .await
            .get(&(kind, request_id.to_string()))
            .cloned()
    }

    pub async fn forget(&self, kind: ServiceKind, request_id: &str) {
        self.lists
            .write()
            .await
            .remove(&(kind, request_id.to_string()));
    }

    /// Number of requests with a retained list.
    pub async fn len(&self) -> usize {
        self.lists.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
