//! Assignment metrics
//!
//! Counters are registered through the `metrics` facade; without an installed
//! recorder every call is a no-op.

use metrics::{counter, histogram};
use snuffy_core::ServiceKind;

#[derive(Debug, Clone, Copy)]
pub struct MetricsCollector {
    enabled: bool,
}

impl MetricsCollector {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record_offer(&self, kind: ServiceKind) {
        if self.enabled {
            counter!("snuffy_offers_total", "kind" => kind.as_str()).increment(1);
        }
    }

    pub fn record_accepted(&self, kind: ServiceKind) {
        if self.enabled {
            counter!("snuffy_offers_accepted_total", "kind" => kind.as_str()).increment(1);
        }
    }

    pub fn record_rejected(&self, kind: ServiceKind) {
        if self.enabled {
            counter!("snuffy_offers_rejected_total", "kind" => kind.as_str()).increment(1);
        }
    }

    pub fn record_chain_exhausted(&self, kind: ServiceKind) {
        if self.enabled {
            counter!("snuffy_chains_exhausted_total", "kind" => kind.as_str()).increment(1);
        }
    }

    pub fn record_partial_failure(&self, kind: ServiceKind) {
        if self.enabled {
            counter!("snuffy_partial_failures_total", "kind" => kind.as_str()).increment(1);
        }
    }

    pub fn record_conflict(&self, kind: ServiceKind) {
        if self.enabled {
            counter!("snuffy_offer_conflicts_total", "kind" => kind.as_str()).increment(1);
        }
    }

    pub fn record_skipped_provider(&self, kind: ServiceKind) {
        if self.enabled {
            counter!("snuffy_providers_skipped_total", "kind" => kind.as_str()).increment(1);
        }
    }

    pub fn record_pool_size(&self, kind: ServiceKind, candidates: usize) {
        if self.enabled {
            histogram!("snuffy_candidate_pool_size", "kind" => kind.as_str())
                .record(candidates as f64);
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new(true)
    }
}
