//! Structured logging utilities
//!
//! One function per assignment event so that field names stay consistent
//! across the engine, the pool and the store.

use snuffy_core::{AssignmentError, ServiceKind};
use tracing::{debug, info, warn};

pub struct StructuredLogger;

impl StructuredLogger {
    pub fn log_offer_made(
        kind: ServiceKind,
        request_id: &str,
        provider_id: &str,
        rank: usize,
        score: f64,
    ) {
        info!(
            event = "offer_made",
            kind = kind.as_str(),
            request.id = request_id,
            provider.id = provider_id,
            candidate.rank = rank,
            candidate.score = score,
            "Offer sent to provider"
        );
    }

    pub fn log_offer_accepted(kind: ServiceKind, request_id: &str, provider_id: &str) {
        info!(
            event = "offer_accepted",
            kind = kind.as_str(),
            request.id = request_id,
            provider.id = provider_id,
            "Provider accepted request"
        );
    }

    pub fn log_offer_rejected(
        kind: ServiceKind,
        request_id: &str,
        provider_id: &str,
        remaining: usize,
    ) {
        info!(
            event = "offer_rejected",
            kind = kind.as_str(),
            request.id = request_id,
            provider.id = provider_id,
            candidates.remaining = remaining,
            "Provider rejected request"
        );
    }

    pub fn log_chain_exhausted(kind: ServiceKind, request_id: &str) {
        warn!(
            event = "chain_exhausted",
            kind = kind.as_str(),
            request.id = request_id,
            "No candidates left for request"
        );
    }

    pub fn log_provider_skipped(kind: ServiceKind, provider_id: &str, reason: &str) {
        warn!(
            event = "provider_skipped",
            kind = kind.as_str(),
            provider.id = provider_id,
            reason = reason,
            "Provider excluded from candidacy"
        );
    }

    pub fn log_race_lost(kind: ServiceKind, request_id: &str, provider_id: &str) {
        debug!(
            event = "offer_race_lost",
            kind = kind.as_str(),
            request.id = request_id,
            provider.id = provider_id,
            "Provider claimed by another request, trying next candidate"
        );
    }

    pub fn log_partial_failure(
        kind: ServiceKind,
        request_id: &str,
        provider_id: &str,
        error: &dyn std::error::Error,
    ) {
        warn!(
            event = "partial_failure",
            kind = kind.as_str(),
            request.id = request_id,
            provider.id = provider_id,
            error = %error,
            "Request written but provider update failed"
        );
    }

    pub fn log_assignment_error(operation: &str, request_id: &str, error: &AssignmentError) {
        warn!(
            event = "assignment_error",
            operation = operation,
            request.id = request_id,
            error = %error,
            retryable = error.is_retryable(),
            "Assignment operation failed"
        );
    }
}
