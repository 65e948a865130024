use async_trait::async_trait;
use serde_json::{json, Value};
use snuffy_core::models::{OfferChange, ProviderGuard};
use snuffy_core::{
    Coordinate, Location, ProviderDocument, ProviderStatus, ProviderStore, ProviderUpdate,
    RequestStatus, RequestStore, RequestUpdate, ServiceKind, ServiceRequest, StoreError,
    StoreResult, UserDirectory,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

type DocumentKey = (ServiceKind, String);

/// Document store held in process memory.
///
/// Providers and users are kept as raw JSON so that malformed documents
/// reach the engine the same way they would from a remote database. Each
/// write takes the collection lock once, which makes guarded provider
/// updates atomic with respect to each other.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    providers: Arc<RwLock<HashMap<DocumentKey, Value>>>,
    requests: Arc<RwLock<HashMap<DocumentKey, ServiceRequest>>>,
    users: Arc<RwLock<HashMap<String, Value>>>,
    pets: Arc<RwLock<Vec<(String, String)>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_provider(&self, kind: ServiceKind, id: impl Into<String>, data: Value) {
        self.providers.write().await.insert((kind, id.into()), data);
    }

    pub async fn insert_request(&self, request: ServiceRequest) {
        self.requests
            .write()
            .await
            .insert((request.kind(), request.request_id.clone()), request);
    }

    pub async fn insert_user(&self, user_id: impl Into<String>, data: Value) {
        self.users.write().await.insert(user_id.into(), data);
    }

    pub async fn insert_pet(&self, pet_name: impl Into<String>, owner_id: impl Into<String>) {
        self.pets
            .write()
            .await
            .push((pet_name.into(), owner_id.into()));
    }

    /// Raw provider document, for inspection.
    pub async fn provider_data(&self, kind: ServiceKind, id: &str) -> Option<Value> {
        self.providers
            .read()
            .await
            .get(&(kind, id.to_string()))
            .cloned()
    }

    pub async fn request(&self, kind: ServiceKind, id: &str) -> Option<ServiceRequest> {
        self.requests
            .read()
            .await
            .get(&(kind, id.to_string()))
            .cloned()
    }
}

fn guard_holds(data: &Value, guard: &ProviderGuard) -> Result<(), String> {
    match guard {
        ProviderGuard::AvailableFor(request_id) => {
            let status = data.get("status").and_then(Value::as_str);
            if status != Some(ProviderStatus::Available.as_str()) {
                let status = status.unwrap_or("missing");
                return Err(format!("provider status is {status}"));
            }
            match data.get("activeOfferId").and_then(Value::as_str) {
                Some(active) if !active.is_empty() && active != request_id => {
                    Err(format!("provider holds offer {active}"))
                }
                _ => Ok(()),
            }
        }
    }
}

fn apply_provider_update(data: &mut Value, update: &ProviderUpdate) -> StoreResult<()> {
    let fields = data
        .as_object_mut()
        .ok_or_else(|| StoreError::Serialization("provider document is not an object".into()))?;

    if let Some(status) = update.status {
        fields.insert("status".into(), json!(status.as_str()));
    }

    if let Some(request_id) = &update.append_pending_request {
        let pending = fields
            .entry("pendingRequests")
            .or_insert_with(|| Value::Array(Vec::new()));
        if !pending.is_array() {
            *pending = Value::Array(Vec::new());
        }
        if let Some(entries) = pending.as_array_mut() {
            if !entries.iter().any(|e| e == request_id.as_str()) {
                entries.push(json!(request_id));
            }
        }
    }

    match &update.active_offer {
        Some(OfferChange::Claim(request_id)) => {
            fields.insert("activeOfferId".into(), json!(request_id));
        }
        Some(OfferChange::Release(request_id)) => {
            let holds = fields.get("activeOfferId").and_then(Value::as_str)
                == Some(request_id.as_str());
            if holds {
                fields.insert("activeOfferId".into(), Value::Null);
            }
        }
        None => {}
    }

    Ok(())
}

#[async_trait]
impl ProviderStore for InMemoryStore {
    async fn query_available_providers(
        &self,
        kind: ServiceKind,
    ) -> StoreResult<Vec<ProviderDocument>> {
        let providers = self.providers.read().await;
        let mut documents: Vec<ProviderDocument> = providers
            .iter()
            .filter(|((k, _), data)| {
                *k == kind
                    && data.get("status").and_then(Value::as_str)
                        == Some(ProviderStatus::Available.as_str())
            })
            .map(|((_, id), data)| ProviderDocument::new(id.clone(), data.clone()))
            .collect();
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(documents)
    }

    async fn get_provider(
        &self,
        kind: ServiceKind,
        provider_id: &str,
    ) -> StoreResult<Option<ProviderDocument>> {
        Ok(self
            .providers
            .read()
            .await
            .get(&(kind, provider_id.to_string()))
            .map(|data| ProviderDocument::new(provider_id, data.clone())))
    }

    async fn update_provider(
        &self,
        kind: ServiceKind,
        provider_id: &str,
        update: &ProviderUpdate,
    ) -> StoreResult<()> {
        let mut providers = self.providers.write().await;
        let data = providers
            .get_mut(&(kind, provider_id.to_string()))
            .ok_or_else(|| StoreError::NotFound {
                collection: kind.providers_collection().to_string(),
                id: provider_id.to_string(),
            })?;

        if let Some(guard) = &update.guard {
            if let Err(reason) = guard_holds(data, guard) {
                debug!(provider.id = provider_id, reason = %reason, "Provider guard failed");
                return Err(StoreError::Conflict {
                    collection: kind.providers_collection().to_string(),
                    id: provider_id.to_string(),
                    reason,
                });
            }
        }

        apply_provider_update(data, update)
    }
}

#[async_trait]
impl RequestStore for InMemoryStore {
    async fn create_request(&self, request: &ServiceRequest) -> StoreResult<()> {
        let kind = request.kind();
        let mut requests = self.requests.write().await;
        let key = (kind, request.request_id.clone());
        if requests.contains_key(&key) {
            return Err(StoreError::Conflict {
                collection: kind.requests_collection().to_string(),
                id: request.request_id.clone(),
                reason: "request already exists".to_string(),
            });
        }
        requests.insert(key, request.clone());
        Ok(())
    }

    async fn get_request(
        &self,
        kind: ServiceKind,
        request_id: &str,
    ) -> StoreResult<Option<ServiceRequest>> {
        Ok(self
            .requests
            .read()
            .await
            .get(&(kind, request_id.to_string()))
            .cloned())
    }

    async fn update_request(
        &self,
        kind: ServiceKind,
        request_id: &str,
        update: &RequestUpdate,
    ) -> StoreResult<()> {
        let mut requests = self.requests.write().await;
        let request = requests
            .get_mut(&(kind, request_id.to_string()))
            .ok_or_else(|| StoreError::NotFound {
                collection: kind.requests_collection().to_string(),
                id: request_id.to_string(),
            })?;

        if let Some(status) = update.status {
            request.status = status;
        }
        if let Some(assigned) = &update.assigned_provider_id {
            request.assigned_provider_id = assigned.clone();
        }
        Ok(())
    }

    async fn list_requests_for_provider(
        &self,
        kind: ServiceKind,
        provider_id: &str,
        status: RequestStatus,
    ) -> StoreResult<Vec<ServiceRequest>> {
        Ok(self
            .requests
            .read()
            .await
            .iter()
            .filter(|((k, _), request)| {
                *k == kind
                    && request.status == status
                    && request.assigned_provider_id.as_deref() == Some(provider_id)
            })
            .map(|(_, request)| request.clone())
            .collect())
    }

    async fn list_requests_for_user(
        &self,
        kind: ServiceKind,
        user_id: &str,
    ) -> StoreResult<Vec<ServiceRequest>> {
        Ok(self
            .requests
            .read()
            .await
            .iter()
            .filter(|((k, _), request)| *k == kind && request.user_id == user_id)
            .map(|(_, request)| request.clone())
            .collect())
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn get_user_location(&self, user_id: &str) -> StoreResult<Option<Coordinate>> {
        Ok(self
            .users
            .read()
            .await
            .get(user_id)
            .and_then(|data| data.get("location"))
            .and_then(Location::resolve))
    }

    async fn find_pet_owners(&self, pet_name: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .pets
            .read()
            .await
            .iter()
            .filter(|(name, _)| name == pet_name)
            .map(|(_, owner)| owner.clone())
            .collect())
    }
}
