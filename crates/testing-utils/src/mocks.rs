//! Fault-injecting store wrapper
//!
//! `FaultyStore` forwards every call to an inner store and fails selected
//! writes with `StoreError::Unavailable`, which is how tests drive the
//! partial-failure and outage paths of the engine.

use async_trait::async_trait;
use snuffy_core::{
    Coordinate, ProviderDocument, ProviderStore, ProviderUpdate, RequestStatus, RequestStore,
    RequestUpdate, ServiceKind, ServiceRequest, StoreError, StoreResult, UserDirectory,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default, Clone, Copy)]
struct FaultPlan {
    skip: usize,
    fail: usize,
    calls: usize,
}

impl FaultPlan {
    /// Records a call and reports whether it should fail.
    fn tick(&mut self) -> bool {
        self.calls += 1;
        if self.skip > 0 {
            self.skip -= 1;
            return false;
        }
        if self.fail > 0 {
            self.fail -= 1;
            return true;
        }
        false
    }
}

#[derive(Debug, Default)]
struct Faults {
    provider_writes: FaultPlan,
    request_writes: FaultPlan,
    queries_down: bool,
}

#[derive(Debug, Clone)]
pub struct FaultyStore<S> {
    inner: S,
    faults: Arc<Mutex<Faults>>,
}

impl<S> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            faults: Arc::new(Mutex::new(Faults::default())),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Lets `skip` provider writes through, then fails the next `count`.
    pub fn fail_provider_writes_after(&self, skip: usize, count: usize) {
        let mut faults = self.faults.lock().unwrap();
        faults.provider_writes.skip = skip;
        faults.provider_writes.fail = count;
    }

    pub fn fail_next_provider_writes(&self, count: usize) {
        self.fail_provider_writes_after(0, count);
    }

    /// Lets `skip` request writes through, then fails the next `count`.
    pub fn fail_request_writes_after(&self, skip: usize, count: usize) {
        let mut faults = self.faults.lock().unwrap();
        faults.request_writes.skip = skip;
        faults.request_writes.fail = count;
    }

    pub fn fail_next_request_writes(&self, count: usize) {
        self.fail_request_writes_after(0, count);
    }

    pub fn set_queries_down(&self, down: bool) {
        self.faults.lock().unwrap().queries_down = down;
    }

    pub fn provider_write_calls(&self) -> usize {
        self.faults.lock().unwrap().provider_writes.calls
    }

    pub fn request_write_calls(&self) -> usize {
        self.faults.lock().unwrap().request_writes.calls
    }

    pub fn heal(&self) {
        *self.faults.lock().unwrap() = Faults::default();
    }

    fn provider_write_fails(&self) -> bool {
        self.faults.lock().unwrap().provider_writes.tick()
    }

    fn request_write_fails(&self) -> bool {
        self.faults.lock().unwrap().request_writes.tick()
    }

    fn queries_down(&self) -> bool {
        self.faults.lock().unwrap().queries_down
    }
}

fn injected(operation: &str) -> StoreError {
    StoreError::unavailable(format!("injected failure in {operation}"))
}

#[async_trait]
impl<S: ProviderStore> ProviderStore for FaultyStore<S> {
    async fn query_available_providers(
        &self,
        kind: ServiceKind,
    ) -> StoreResult<Vec<ProviderDocument>> {
        if self.queries_down() {
            return Err(injected("query_available_providers"));
        }
        self.inner.query_available_providers(kind).await
    }

    async fn get_provider(
        &self,
        kind: ServiceKind,
        provider_id: &str,
    ) -> StoreResult<Option<ProviderDocument>> {
        if self.queries_down() {
            return Err(injected("get_provider"));
        }
        self.inner.get_provider(kind, provider_id).await
    }

    async fn update_provider(
        &self,
        kind: ServiceKind,
        provider_id: &str,
        update: &ProviderUpdate,
    ) -> StoreResult<()> {
        if self.provider_write_fails() {
            return Err(injected("update_provider"));
        }
        self.inner.update_provider(kind, provider_id, update).await
    }
}

#[async_trait]
impl<S: RequestStore> RequestStore for FaultyStore<S> {
    async fn create_request(&self, request: &ServiceRequest) -> StoreResult<()> {
        if self.request_write_fails() {
            return Err(injected("create_request"));
        }
        self.inner.create_request(request).await
    }

    async fn get_request(
        &self,
        kind: ServiceKind,
        request_id: &str,
    ) -> StoreResult<Option<ServiceRequest>> {
        if self.queries_down() {
            return Err(injected("get_request"));
        }
        self.inner.get_request(kind, request_id).await
    }

    async fn update_request(
        &self,
        kind: ServiceKind,
        request_id: &str,
        update: &RequestUpdate,
    ) -> StoreResult<()> {
        if self.request_write_fails() {
            return Err(injected("update_request"));
        }
        self.inner.update_request(kind, request_id, update).await
    }

    async fn list_requests_for_provider(
        &self,
        kind: ServiceKind,
        provider_id: &str,
        status: RequestStatus,
    ) -> StoreResult<Vec<ServiceRequest>> {
        if self.queries_down() {
            return Err(injected("list_requests_for_provider"));
        }
        self.inner
            .list_requests_for_provider(kind, provider_id, status)
            .await
    }

    async fn list_requests_for_user(
        &self,
        kind: ServiceKind,
        user_id: &str,
    ) -> StoreResult<Vec<ServiceRequest>> {
        if self.queries_down() {
            return Err(injected("list_requests_for_user"));
        }
        self.inner.list_requests_for_user(kind, user_id).await
    }
}

#[async_trait]
impl<S: UserDirectory> UserDirectory for FaultyStore<S> {
    async fn get_user_location(&self, user_id: &str) -> StoreResult<Option<Coordinate>> {
        if self.queries_down() {
            return Err(injected("get_user_location"));
        }
        self.inner.get_user_location(user_id).await
    }

    async fn find_pet_owners(&self, pet_name: &str) -> StoreResult<Vec<String>> {
        if self.queries_down() {
            return Err(injected("find_pet_owners"));
        }
        self.inner.find_pet_owners(pet_name).await
    }
}
