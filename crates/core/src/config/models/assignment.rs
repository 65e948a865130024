use serde::{Deserialize, Serialize};

/// Scoring and offer tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Distance floor for the caretaker score, in kilometers.
    pub caretaker_min_distance_km: f64,
    pub walker_proximity_weight: f64,
    pub walker_rating_weight: f64,
    /// Used when a walker's rating is missing or unparseable.
    pub default_walker_rating: f64,
    pub max_rating: f64,
    /// Upper bound on conditional provider writes per offer cycle.
    pub max_offer_attempts: usize,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            caretaker_min_distance_km: 0.001,
            walker_proximity_weight: 0.7,
            walker_rating_weight: 0.3,
            default_walker_rating: 4.0,
            max_rating: 5.0,
            max_offer_attempts: 16,
        }
    }
}

impl AssignmentConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.caretaker_min_distance_km > 0.0) {
            return Err(anyhow::anyhow!(
                "caretaker_min_distance_km must be greater than 0, got {}",
                self.caretaker_min_distance_km
            ));
        }

        if self.walker_proximity_weight < 0.0 || self.walker_rating_weight < 0.0 {
            return Err(anyhow::anyhow!("walker weights must not be negative"));
        }

        let weight_sum = self.walker_proximity_weight + self.walker_rating_weight;
        if (weight_sum - 1.0).abs() > 1e-9 {
            return Err(anyhow::anyhow!(
                "walker weights must sum to 1.0, got {weight_sum}"
            ));
        }

        if !(self.max_rating > 0.0) {
            return Err(anyhow::anyhow!("max_rating must be greater than 0"));
        }

        if !(0.0..=self.max_rating).contains(&self.default_walker_rating) {
            return Err(anyhow::anyhow!(
                "default_walker_rating {} outside [0, {}]",
                self.default_walker_rating,
                self.max_rating
            ));
        }

        if self.max_offer_attempts == 0 {
            return Err(anyhow::anyhow!("max_offer_attempts must be greater than 0"));
        }

        Ok(())
    }
}
