//! Test helper utilities and common testing patterns

use serde_json::json;
use snuffy_core::geo::offset_north;
use snuffy_core::{Coordinate, ServiceKind, ServiceRequest};
use snuffy_infrastructure::InMemoryStore;

/// Test environment setup utilities
pub struct TestEnv;

impl TestEnv {
    /// Set up logging for tests (call once per test binary)
    pub fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("debug")
            .try_init();
    }
}

/// Fixed points used across scenarios
pub struct TestGeo;

impl TestGeo {
    pub fn origin() -> Coordinate {
        Coordinate::new(12.9716, 77.5946)
    }

    /// A point `km` kilometres due north of [`TestGeo::origin`].
    pub fn km_north(km: f64) -> Coordinate {
        offset_north(Self::origin(), km * 1000.0)
    }

    pub fn meters_north(meters: f64) -> Coordinate {
        offset_north(Self::origin(), meters)
    }
}

/// Seeds a store with the owner, their pet and the request itself.
pub async fn seed_request(store: &InMemoryStore, request: &ServiceRequest) {
    store
        .insert_pet(request.pet_name.clone(), request.user_id.clone())
        .await;
    store.insert_request(request.clone()).await;
}

/// Seeds a user profile with a `{latitude, longitude}` location.
pub async fn seed_user_at(store: &InMemoryStore, user_id: &str, location: Coordinate) {
    store
        .insert_user(
            user_id,
            json!({
                "name": "Test Owner",
                "location": { "latitude": location.latitude, "longitude": location.longitude }
            }),
        )
        .await;
}

/// Seeds `count` providers named `{prefix}-{i}`, each `i + 1` km north of the origin.
pub async fn seed_provider_ring(
    store: &InMemoryStore,
    kind: ServiceKind,
    prefix: &str,
    count: usize,
) -> Vec<String> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let id = format!("{prefix}-{i}");
        let doc = crate::builders::ProviderDocBuilder::new()
            .with_name(&id)
            .with_experience(5)
            .with_rating(4.0)
            .at(TestGeo::km_north((i + 1) as f64))
            .build();
        store.insert_provider(kind, id.clone(), doc).await;
        ids.push(id);
    }
    ids
}
