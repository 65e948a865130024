//! Provider selection and the offer/rejection chain.
//!
//! `AssignmentEngine` ranks the provider pool with a per-kind
//! `ScoringStrategy`, offers the request to one candidate at a time and
//! advances through the retained ranked list on rejection.

pub mod engine;
pub mod pool;
pub mod ranked_list;
pub mod strategies;
pub mod two_phase;

#[cfg(test)]
mod strategies_test;

pub use engine::*;
pub use pool::{rank, Candidate, ProviderPool};
pub use ranked_list::{RankedEntry, RankedListRegistry};
pub use strategies::*;
pub use two_phase::{PhaseFailure, TwoPhaseWrite};
