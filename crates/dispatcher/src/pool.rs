use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use snuffy_core::{
    AssignmentResult, AssignmentStore, Coordinate, Provider, ScoringStrategy, ServiceKind,
};
use snuffy_infrastructure::{MetricsCollector, StructuredLogger};

/// A provider scored for one request.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub provider: Provider,
    pub score: f64,
}

/// Fresh view of the providers that can take an offer.
///
/// Every call re-queries the store; nothing is cached between cycles.
pub struct ProviderPool {
    store: Arc<dyn AssignmentStore>,
    metrics: Arc<MetricsCollector>,
}

impl ProviderPool {
    pub fn new(store: Arc<dyn AssignmentStore>, metrics: Arc<MetricsCollector>) -> Self {
        Self { store, metrics }
    }

    /// Available providers of `kind` that are not holding a live offer.
    ///
    /// Documents that fail to decode or carry no usable location are logged
    /// and skipped; they never fail the query.
    pub async fn available_providers(&self, kind: ServiceKind) -> AssignmentResult<Vec<Provider>> {
        let documents = self.store.query_available_providers(kind).await?;
        let mut providers = Vec::with_capacity(documents.len());

        for document in &documents {
            match Provider::from_document(kind, document) {
                Ok(provider) if provider.is_open_for_offers() => providers.push(provider),
                Ok(provider) => {
                    debug!(
                        provider.id = %provider.id,
                        active_offer = ?provider.active_offer_id,
                        "Provider busy with another offer"
                    );
                }
                Err(rejection) => {
                    StructuredLogger::log_provider_skipped(
                        kind,
                        &document.id,
                        &rejection.to_string(),
                    );
                    self.metrics.record_skipped_provider(kind);
                }
            }
        }

        debug!(
            kind = kind.as_str(),
            queried = documents.len(),
            admitted = providers.len(),
            "Provider pool loaded"
        );
        Ok(providers)
    }
}

/// Scores `providers` and orders them best first, ties by ascending provider ID.
pub fn rank(
    strategy: &dyn ScoringStrategy,
    providers: Vec<Provider>,
    origin: Coordinate,
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = providers
        .into_iter()
        .map(|provider| {
            let score = strategy.score(&provider, origin);
            Candidate { provider, score }
        })
        .collect();

    candidates.sort_by(compare_candidates);
    candidates
}

fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.provider.id.cmp(&b.provider.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::{CaretakerScore, WalkerScore};
    use serde_json::json;
    use snuffy_core::ProviderStore;
    use snuffy_infrastructure::InMemoryStore;
    use snuffy_testing_utils::{ProviderDocBuilder, TestGeo};

    fn pool(store: &InMemoryStore) -> ProviderPool {
        ProviderPool::new(
            Arc::new(store.clone()),
            Arc::new(MetricsCollector::disabled()),
        )
    }

    #[tokio::test]
    async fn test_accepts_all_location_shapes() {
        let store = InMemoryStore::new();
        let here = TestGeo::km_north(1.0);
        store
            .insert_provider(
                ServiceKind::DogWalker,
                "geo",
                ProviderDocBuilder::new().at_geo_point(here).build(),
            )
            .await;
        store
            .insert_provider(
                ServiceKind::DogWalker,
                "map",
                ProviderDocBuilder::new().at_lat_lon_map(here).build(),
            )
            .await;
        store
            .insert_provider(
                ServiceKind::DogWalker,
                "pair",
                ProviderDocBuilder::new().at(here).build(),
            )
            .await;

        let providers = pool(&store)
            .available_providers(ServiceKind::DogWalker)
            .await
            .unwrap();
        assert_eq!(providers.len(), 3);
        assert!(providers.iter().all(|p| p.coordinate == here));
    }

    #[tokio::test]
    async fn test_skips_malformed_documents() {
        let store = InMemoryStore::new();
        store
            .insert_provider(
                ServiceKind::DogWalker,
                "ok",
                ProviderDocBuilder::new().at(TestGeo::origin()).build(),
            )
            .await;
        store
            .insert_provider(
                ServiceKind::DogWalker,
                "no-location",
                ProviderDocBuilder::new().without_location().build(),
            )
            .await;
        store
            .insert_provider(
                ServiceKind::DogWalker,
                "short-pair",
                ProviderDocBuilder::new()
                    .with_raw_location(json!([12.0]))
                    .build(),
            )
            .await;
        store
            .insert_provider(
                ServiceKind::DogWalker,
                "text-location",
                ProviderDocBuilder::new()
                    .with_raw_location(json!("Bengaluru"))
                    .build(),
            )
            .await;
        store
            .insert_provider(
                ServiceKind::DogWalker,
                "no-email",
                json!({ "name": "x", "status": "available", "location": [1.0, 2.0] }),
            )
            .await;

        let providers = pool(&store)
            .available_providers(ServiceKind::DogWalker)
            .await
            .unwrap();
        let ids: Vec<&str> = providers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
    }

    #[tokio::test]
    async fn test_skips_caretaker_without_experience() {
        let store = InMemoryStore::new();
        store
            .insert_provider(
                ServiceKind::Caretaker,
                "seasoned",
                ProviderDocBuilder::new().with_experience(4).build(),
            )
            .await;
        store
            .insert_provider(
                ServiceKind::Caretaker,
                "unknown",
                ProviderDocBuilder::new().without_experience().build(),
            )
            .await;

        let providers = pool(&store)
            .available_providers(ServiceKind::Caretaker)
            .await
            .unwrap();
        let ids: Vec<&str> = providers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["seasoned"]);
    }

    #[tokio::test]
    async fn test_excludes_assigned_and_busy_providers() {
        let store = InMemoryStore::new();
        store
            .insert_provider(
                ServiceKind::Caretaker,
                "free",
                ProviderDocBuilder::new().build(),
            )
            .await;
        store
            .insert_provider(
                ServiceKind::Caretaker,
                "assigned",
                ProviderDocBuilder::new().assigned().build(),
            )
            .await;
        store
            .insert_provider(
                ServiceKind::Caretaker,
                "busy",
                ProviderDocBuilder::new().with_active_offer("other").build(),
            )
            .await;

        let providers = pool(&store)
            .available_providers(ServiceKind::Caretaker)
            .await
            .unwrap();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].id, "free");
        let stored = store
            .query_available_providers(ServiceKind::Caretaker)
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn test_rank_picks_max_score() {
        let store = InMemoryStore::new();
        store
            .insert_provider(
                ServiceKind::Caretaker,
                "A",
                ProviderDocBuilder::new()
                    .with_experience(5)
                    .at(TestGeo::km_north(2.0))
                    .build(),
            )
            .await;
        store
            .insert_provider(
                ServiceKind::Caretaker,
                "B",
                ProviderDocBuilder::new()
                    .with_experience(10)
                    .at(TestGeo::km_north(1.0))
                    .build(),
            )
            .await;

        let providers = pool(&store)
            .available_providers(ServiceKind::Caretaker)
            .await
            .unwrap();
        let ranked = rank(&CaretakerScore::new(), providers, TestGeo::origin());

        assert_eq!(ranked[0].provider.id, "B");
        assert!((ranked[0].score - 10.0).abs() < 1e-3);
        assert_eq!(ranked[1].provider.id, "A");
        assert!((ranked[1].score - 2.5).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_rank_ties_break_by_id() {
        let store = InMemoryStore::new();
        for id in ["w3", "w1", "w2"] {
            store
                .insert_provider(
                    ServiceKind::DogWalker,
                    id,
                    ProviderDocBuilder::new()
                        .with_rating(4.5)
                        .at(TestGeo::km_north(1.0))
                        .build(),
                )
                .await;
        }

        let providers = pool(&store)
            .available_providers(ServiceKind::DogWalker)
            .await
            .unwrap();
        let ranked = rank(&WalkerScore::new(), providers, TestGeo::origin());
        let ids: Vec<&str> = ranked.iter().map(|c| c.provider.id.as_str()).collect();
        assert_eq!(ids, vec!["w1", "w2", "w3"]);
    }
}
