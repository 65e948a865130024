use std::io::Write;
use std::sync::Arc;

use serde_json::json;
use snuffy_core::{RequestStatus, ServiceKind};
use snuffy_dispatch::{load_config, AppConfig, Application, AssignmentError};
use snuffy_infrastructure::InMemoryStore;
use snuffy_testing_utils::{
    seed_request, seed_user_at, CaretakerRequestBuilder, ProviderDocBuilder, TestEnv, TestGeo,
    WalkRequestBuilder,
};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_load_config_from_file() {
    let file = write_config(
        r#"
        [assignment]
        max_offer_attempts = 3

        [observability]
        log_format = "json"
        metrics_enabled = false
        "#,
    );

    let config = load_config(file.path().to_str()).unwrap();
    assert_eq!(config.assignment.max_offer_attempts, 3);
    assert_eq!(config.observability.log_format, "json");
    assert!(!config.observability.metrics_enabled);
}

#[test]
fn test_load_config_missing_file() {
    let err = load_config(Some("/does/not/exist.toml")).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_application_rejects_invalid_config() {
    let mut config = AppConfig::default();
    config.assignment.max_offer_attempts = 0;
    assert!(Application::new(config).is_err());
}

#[test]
fn test_application_metrics_follow_config() {
    let mut config = AppConfig::default();
    config.observability.metrics_enabled = false;
    let app = Application::new(config).unwrap();
    assert!(!app.metrics().is_enabled());
}

#[tokio::test]
async fn test_caretaker_flow_through_application() {
    TestEnv::init_logging();

    let store = InMemoryStore::new();
    let app = Application::with_store(AppConfig::default(), Arc::new(store.clone())).unwrap();
    let engine = app.engine();

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
                .at_geo_point(TestGeo::km_north(1.0))
                .build(),
        )
        .await;

    // Origin comes from the owner's profile.
    let request = CaretakerRequestBuilder::new().with_user("owner-1").build();
    store.insert_pet("Rex", "owner-1").await;
    seed_user_at(&store, "owner-1", TestGeo::origin()).await;
    engine.submit(&request).await.unwrap();
    let id = request.request_id.as_str();

    let offer = engine
        .auto_assign(ServiceKind::Caretaker, id)
        .await
        .unwrap();
    assert_eq!(offer.provider_id, "B");

    let offer = engine
        .reject(ServiceKind::Caretaker, id, "B")
        .await
        .unwrap();
    assert_eq!(offer.provider_id, "A");

    engine
        .accept(ServiceKind::Caretaker, id, "A")
        .await
        .unwrap();
    let stored = store.request(ServiceKind::Caretaker, id).await.unwrap();
    assert_eq!(stored.status, RequestStatus::Accepted);
    let provider = store
        .provider_data(ServiceKind::Caretaker, "A")
        .await
        .unwrap();
    assert_eq!(provider["status"], json!("assigned"));

    let bookings = engine
        .bookings_for_user(ServiceKind::Caretaker, "owner-1")
        .await
        .unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(
        bookings[0].duration(),
        "May 4, 2026 at 9:00 AM - May 6, 2026 at 9:00 AM"
    );
}

#[tokio::test]
async fn test_walk_request_without_walkers() {
    let store = InMemoryStore::new();
    let app = Application::with_store(AppConfig::default(), Arc::new(store.clone())).unwrap();
    let engine = app.engine();

    let request = WalkRequestBuilder::new()
        .with_origin(TestGeo::origin())
        .build();
    seed_request(&store, &request).await;
    assert_eq!(request.duration(), "1h 30m");

    let err = engine
        .auto_assign(ServiceKind::DogWalker, &request.request_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AssignmentError::NoCandidates { .. }));
    assert_eq!(err.user_message(), "No provider available");
}
