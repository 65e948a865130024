//! Request-then-provider write unit.
//!
//! The store offers no transaction across two documents, so every state
//! transition is written as two sequential updates. A failure of the second
//! write after the first landed is reported as a partial failure carrying
//! everything needed to resume or roll back.

use snuffy_core::{
    AssignmentError, AssignmentStore, PendingProviderWrite, ProviderUpdate, RequestUpdate,
    ServiceKind, StoreError,
};

/// One state transition spanning a request document and a provider document.
#[derive(Debug, Clone)]
pub struct TwoPhaseWrite {
    pub kind: ServiceKind,
    pub request_id: String,
    pub provider_id: String,
    pub request: RequestUpdate,
    pub provider: ProviderUpdate,
    /// Restores the request if the provider write cannot be completed.
    pub rollback: RequestUpdate,
}

/// How a two-phase write fell short.
#[derive(Debug)]
pub enum PhaseFailure {
    /// The request write failed; nothing was changed.
    Request(StoreError),
    /// The provider guard did not hold; the request write already landed.
    Guard(StoreError),
    /// The provider write failed after the request write landed.
    Partial(AssignmentError),
}

impl TwoPhaseWrite {
    pub fn pending(&self) -> PendingProviderWrite {
        PendingProviderWrite {
            kind: self.kind,
            request_id: self.request_id.clone(),
            provider_id: self.provider_id.clone(),
            update: self.provider.clone(),
            rollback: self.rollback.clone(),
        }
    }

    pub async fn commit(&self, store: &dyn AssignmentStore) -> Result<(), PhaseFailure> {
        store
            .update_request(self.kind, &self.request_id, &self.request)
            .await
            .map_err(PhaseFailure::Request)?;

        match store
            .update_provider(self.kind, &self.provider_id, &self.provider)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_conflict() && self.provider.guard.is_some() => {
                Err(PhaseFailure::Guard(e))
            }
            Err(source) => Err(PhaseFailure::Partial(AssignmentError::PartialFailure {
                request_id: self.request_id.clone(),
                provider_id: self.provider_id.clone(),
                source,
                pending: Box::new(self.pending()),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snuffy_core::{RequestStatus, RequestStore};
    use snuffy_infrastructure::InMemoryStore;
    use snuffy_testing_utils::{FaultyStore, ProviderDocBuilder, WalkRequestBuilder};

    async fn seeded() -> (FaultyStore<InMemoryStore>, String) {
        let store = InMemoryStore::new();
        let request = WalkRequestBuilder::new().build();
        let id = request.request_id.clone();
        store.insert_request(request).await;
        store
            .insert_provider(
                ServiceKind::DogWalker,
                "w1",
                ProviderDocBuilder::new().build(),
            )
            .await;
        (FaultyStore::new(store), id)
    }

    fn offer(request_id: &str) -> TwoPhaseWrite {
        TwoPhaseWrite {
            kind: ServiceKind::DogWalker,
            request_id: request_id.to_string(),
            provider_id: "w1".to_string(),
            request: RequestUpdate::offer("w1"),
            provider: ProviderUpdate::claim_offer(request_id),
            rollback: RequestUpdate::restore(RequestStatus::Available, None),
        }
    }

    #[tokio::test]
    async fn test_commit_writes_both_documents() {
        let (store, id) = seeded().await;
        offer(&id).commit(&store).await.unwrap();

        let request = store
            .inner()
            .request(ServiceKind::DogWalker, &id)
            .await
            .unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        let provider = store
            .inner()
            .provider_data(ServiceKind::DogWalker, "w1")
            .await
            .unwrap();
        assert_eq!(provider["activeOfferId"], serde_json::json!(id));
    }

    #[tokio::test]
    async fn test_request_failure_changes_nothing() {
        let (store, id) = seeded().await;
        store.fail_next_request_writes(1);

        let result = offer(&id).commit(&store).await;
        assert!(matches!(result, Err(PhaseFailure::Request(_))));
        assert_eq!(store.provider_write_calls(), 0);

        let request = store
            .get_request(ServiceKind::DogWalker, &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.status, RequestStatus::Available);
    }

    #[tokio::test]
    async fn test_provider_failure_is_partial() {
        let (store, id) = seeded().await;
        store.fail_next_provider_writes(1);

        match offer(&id).commit(&store).await {
            Err(PhaseFailure::Partial(AssignmentError::PartialFailure { pending, .. })) => {
                assert_eq!(pending.provider_id, "w1");
                assert_eq!(pending.update, ProviderUpdate::claim_offer(id.as_str()));
            }
            other => panic!("expected partial failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_guard_failure_is_reported_separately() {
        let (store, id) = seeded().await;
        store
            .inner()
            .insert_provider(
                ServiceKind::DogWalker,
                "w1",
                ProviderDocBuilder::new()
                    .with_active_offer("someone-else")
                    .build(),
            )
            .await;

        let result = offer(&id).commit(&store).await;
        assert!(matches!(result, Err(PhaseFailure::Guard(_))));
    }
}
