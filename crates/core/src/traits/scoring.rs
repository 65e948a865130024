use crate::models::{Coordinate, Provider, ServiceKind};

/// Per-kind scoring function; higher scores rank first.
pub trait ScoringStrategy: Send + Sync {
    /// Kind of request this strategy ranks providers for.
    fn kind(&self) -> ServiceKind;

    /// Score of `provider` for a request located at `origin`.
    fn score(&self, provider: &Provider, origin: Coordinate) -> f64;

    /// Strategy name, for logs
    fn name(&self) -> &str;
}
