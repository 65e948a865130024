use std::sync::Arc;

use snuffy_core::{
    geo::{distance_km, distance_meters},
    AssignmentConfig, Coordinate, Provider, ScoringStrategy, ServiceKind,
};

/// Experience per kilometre, with the distance floored so colocated
/// providers do not divide by zero.
pub struct CaretakerScore {
    min_distance_km: f64,
}

/// Weighted blend of proximity and rating.
pub struct WalkerScore {
    proximity_weight: f64,
    rating_weight: f64,
    default_rating: f64,
    max_rating: f64,
}

impl CaretakerScore {
    pub fn new() -> Self {
        Self::from_config(&AssignmentConfig::default())
    }

    pub fn from_config(config: &AssignmentConfig) -> Self {
        Self {
            min_distance_km: config.caretaker_min_distance_km,
        }
    }
}

impl Default for CaretakerScore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringStrategy for CaretakerScore {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Caretaker
    }

    fn score(&self, provider: &Provider, origin: Coordinate) -> f64 {
        let km = distance_km(provider.coordinate, origin);
        provider.experience as f64 / km.max(self.min_distance_km)
    }

    fn name(&self) -> &str {
        "CaretakerScore"
    }
}

impl WalkerScore {
    pub fn new() -> Self {
        Self::from_config(&AssignmentConfig::default())
    }

    pub fn from_config(config: &AssignmentConfig) -> Self {
        Self {
            proximity_weight: config.walker_proximity_weight,
            rating_weight: config.walker_rating_weight,
            default_rating: config.default_walker_rating,
            max_rating: config.max_rating,
        }
    }

    /// Rating used for ranking; missing or unparseable ratings fall back to the default.
    pub fn effective_rating(&self, provider: &Provider) -> f64 {
        provider.rating.unwrap_or(self.default_rating)
    }
}

impl Default for WalkerScore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringStrategy for WalkerScore {
    fn kind(&self) -> ServiceKind {
        ServiceKind::DogWalker
    }

    fn score(&self, provider: &Provider, origin: Coordinate) -> f64 {
        let meters = distance_meters(provider.coordinate, origin);
        let proximity = 1.0 / (meters + 1.0);
        let rating = self.effective_rating(provider) / self.max_rating;
        self.proximity_weight * proximity + self.rating_weight * rating
    }

    fn name(&self) -> &str {
        "WalkerScore"
    }
}

/// Built-in strategy for `kind`, tuned by `config`.
pub fn strategy_for(kind: ServiceKind, config: &AssignmentConfig) -> Arc<dyn ScoringStrategy> {
    match kind {
        ServiceKind::Caretaker => Arc::new(CaretakerScore::from_config(config)),
        ServiceKind::DogWalker => Arc::new(WalkerScore::from_config(config)),
    }
}
