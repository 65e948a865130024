use std::sync::Arc;

use tracing::{debug, info, warn, Instrument};

use snuffy_core::{
    AssignmentConfig, AssignmentError, AssignmentResult, AssignmentStore, Coordinate,
    PendingProviderWrite, Provider, ProviderUpdate, RequestStatus, RequestUpdate, ScoringStrategy,
    ServiceKind, ServiceRequest,
};
use snuffy_infrastructure::{MetricsCollector, StructuredLogger};

use crate::pool::{rank, ProviderPool};
use crate::ranked_list::{RankedEntry, RankedListRegistry};
use crate::strategies::strategy_for;
use crate::two_phase::{PhaseFailure, TwoPhaseWrite};

/// A live offer: the request is `pending` on this provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub kind: ServiceKind,
    pub request_id: String,
    pub provider_id: String,
    pub score: f64,
    /// Candidates still queued behind this one.
    pub remaining: usize,
}

/// Selects providers for requests and walks the rejection chain.
///
/// Offers go to exactly one candidate at a time. The order of candidates is
/// fixed when a request is first assigned; later offers re-check each
/// candidate against a fresh pool scan.
pub struct AssignmentEngine {
    store: Arc<dyn AssignmentStore>,
    pool: ProviderPool,
    caretaker_strategy: Arc<dyn ScoringStrategy>,
    walker_strategy: Arc<dyn ScoringStrategy>,
    ranked_lists: RankedListRegistry,
    config: AssignmentConfig,
    metrics: Arc<MetricsCollector>,
}

impl AssignmentEngine {
    pub fn new(
        store: Arc<dyn AssignmentStore>,
        config: AssignmentConfig,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            pool: ProviderPool::new(store.clone(), metrics.clone()),
            caretaker_strategy: strategy_for(ServiceKind::Caretaker, &config),
            walker_strategy: strategy_for(ServiceKind::DogWalker, &config),
            ranked_lists: RankedListRegistry::new(),
            store,
            config,
            metrics,
        }
    }

    /// Replaces the scoring strategy for the strategy's own kind.
    pub fn with_strategy(mut self, strategy: Arc<dyn ScoringStrategy>) -> Self {
        match strategy.kind() {
            ServiceKind::Caretaker => self.caretaker_strategy = strategy,
            ServiceKind::DogWalker => self.walker_strategy = strategy,
        }
        self
    }

    pub fn strategy(&self, kind: ServiceKind) -> &dyn ScoringStrategy {
        match kind {
            ServiceKind::Caretaker => self.caretaker_strategy.as_ref(),
            ServiceKind::DogWalker => self.walker_strategy.as_ref(),
        }
    }

    pub fn ranked_lists(&self) -> &RankedListRegistry {
        &self.ranked_lists
    }

    /// Persists a new request in the `available` state and returns its ID.
    pub async fn submit(&self, request: &ServiceRequest) -> AssignmentResult<String> {
        if request.status != RequestStatus::Available || request.assigned_provider_id.is_some() {
            return Err(AssignmentError::validation(
                "new requests must be available and unassigned",
            ));
        }
        self.store.create_request(request).await?;
        info!(
            event = "request_created",
            kind = request.kind().as_str(),
            request.id = %request.request_id,
            "Request created"
        );
        Ok(request.request_id.clone())
    }

    /// Offers an `available` request to its best-ranked provider.
    ///
    /// Calling it again on a request left `pending` by a partial failure
    /// completes the interrupted offer instead of ranking anew.
    pub async fn auto_assign(
        &self,
        kind: ServiceKind,
        request_id: &str,
    ) -> AssignmentResult<Offer> {
        let span = tracing::info_span!(
            "auto_assign",
            kind = kind.as_str(),
            request.id = request_id
        );
        async {
            let request = self.load_request(kind, request_id).await?;
            match request.status {
                RequestStatus::Available => {}
                RequestStatus::Pending => {
                    return self.complete_interrupted_offer(kind, &request).await;
                }
                status => {
                    return Err(AssignmentError::invalid_state(
                        request_id,
                        request.assigned_provider_id.clone().unwrap_or_default(),
                        status,
                    ));
                }
            }

            self.verify_owner(&request).await?;
            let origin = self.resolve_origin(&request).await?;
            let ranked = self.fresh_ranking(kind, request_id, origin).await?;
            self.metrics.record_pool_size(kind, ranked.len());

            if ranked.is_empty() {
                warn!(
                    event = "no_candidates",
                    kind = kind.as_str(),
                    request.id = request_id,
                    "No provider available"
                );
                return Err(AssignmentError::NoCandidates {
                    kind,
                    request_id: request_id.to_string(),
                });
            }

            let restore = RequestUpdate::restore(RequestStatus::Available, None);
            self.offer_in_order(kind, request_id, ranked, restore).await
        }
        .instrument(span)
        .await
        .inspect_err(|e| StructuredLogger::log_assignment_error("auto_assign", request_id, e))
    }

    /// Provider takes the offer: request `accepted`, provider `assigned`.
    pub async fn accept(
        &self,
        kind: ServiceKind,
        request_id: &str,
        provider_id: &str,
    ) -> AssignmentResult<()> {
        let span = tracing::info_span!(
            "accept",
            kind = kind.as_str(),
            request.id = request_id,
            provider.id = provider_id
        );
        async {
            let request = self.load_request(kind, request_id).await?;
            self.check_offer_holder(&request, provider_id)?;

            let write = TwoPhaseWrite {
                kind,
                request_id: request_id.to_string(),
                provider_id: provider_id.to_string(),
                request: RequestUpdate::status(RequestStatus::Accepted),
                provider: ProviderUpdate::accept(request_id),
                rollback: RequestUpdate::restore(
                    RequestStatus::Pending,
                    Some(provider_id.to_string()),
                ),
            };
            self.commit_transition(&write).await?;

            self.ranked_lists.forget(kind, request_id).await;
            StructuredLogger::log_offer_accepted(kind, request_id, provider_id);
            self.metrics.record_accepted(kind);
            Ok(())
        }
        .instrument(span)
        .await
        .inspect_err(|e| StructuredLogger::log_assignment_error("accept", request_id, e))
    }

    /// Provider declines the offer; the next retained candidate gets it.
    ///
    /// Returns the new offer, or `NoMoreCandidates` when the chain is
    /// exhausted. An exhausted request stays `rejected` on its last provider.
    pub async fn reject(
        &self,
        kind: ServiceKind,
        request_id: &str,
        provider_id: &str,
    ) -> AssignmentResult<Offer> {
        let span = tracing::info_span!(
            "reject",
            kind = kind.as_str(),
            request.id = request_id,
            provider.id = provider_id
        );
        async {
            let request = self.load_request(kind, request_id).await?;
            self.check_offer_holder(&request, provider_id)?;

            let write = TwoPhaseWrite {
                kind,
                request_id: request_id.to_string(),
                provider_id: provider_id.to_string(),
                request: RequestUpdate::status(RequestStatus::Rejected),
                provider: ProviderUpdate::release(request_id),
                rollback: RequestUpdate::restore(
                    RequestStatus::Pending,
                    Some(provider_id.to_string()),
                ),
            };
            self.commit_transition(&write).await?;
            self.metrics.record_rejected(kind);

            let offer = self.reassign(kind, request_id).await;
            let remaining = offer.as_ref().map(|o| o.remaining + 1).unwrap_or(0);
            StructuredLogger::log_offer_rejected(kind, request_id, provider_id, remaining);
            offer
        }
        .instrument(span)
        .await
        .inspect_err(|e| StructuredLogger::log_assignment_error("reject", request_id, e))
    }

    /// Advances a `rejected` request to its next eligible candidate.
    ///
    /// `reject` calls this itself; callers only need it to retry after a
    /// store failure interrupted a rejection. When every candidate is lost to
    /// a concurrent claim, the request stays `rejected` on its last provider.
    pub async fn reassign(&self, kind: ServiceKind, request_id: &str) -> AssignmentResult<Offer> {
        let request = self.load_request(kind, request_id).await?;
        if request.status != RequestStatus::Rejected {
            return Err(AssignmentError::invalid_state(
                request_id,
                request.assigned_provider_id.clone().unwrap_or_default(),
                request.status,
            ));
        }

        let candidates = match self.ranked_lists.get(kind, request_id).await {
            Some(retained) => self.still_eligible(kind, request_id, retained).await?,
            None => {
                debug!(
                    request.id = request_id,
                    "No retained ranked list, rebuilding from offer log"
                );
                let origin = self.resolve_origin(&request).await?;
                self.fresh_ranking(kind, request_id, origin).await?
            }
        };

        if candidates.is_empty() {
            self.ranked_lists.forget(kind, request_id).await;
            StructuredLogger::log_chain_exhausted(kind, request_id);
            self.metrics.record_chain_exhausted(kind);
            return Err(AssignmentError::NoMoreCandidates {
                request_id: request_id.to_string(),
            });
        }

        let restore = RequestUpdate::restore(RequestStatus::Rejected, request.assigned_provider_id);
        self.offer_in_order(kind, request_id, candidates, restore)
            .await
    }

    /// Re-runs the provider write left behind by a `PartialFailure`.
    ///
    /// If the interrupted operation was a rejection, the chain continues and
    /// the new offer is returned.
    pub async fn resume(&self, pending: &PendingProviderWrite) -> AssignmentResult<Option<Offer>> {
        let kind = pending.kind;
        match self
            .store
            .update_provider(kind, &pending.provider_id, &pending.update)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_conflict() => {
                StructuredLogger::log_race_lost(kind, &pending.request_id, &pending.provider_id);
                self.metrics.record_conflict(kind);
                self.roll_back(pending).await?;
                return Err(AssignmentError::Contended {
                    request_id: pending.request_id.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            event = "provider_write_resumed",
            kind = kind.as_str(),
            request.id = %pending.request_id,
            provider.id = %pending.provider_id,
            "Pending provider write completed"
        );

        let request = self.load_request(kind, &pending.request_id).await?;
        match request.status {
            RequestStatus::Rejected => self.reassign(kind, &pending.request_id).await.map(Some),
            RequestStatus::Accepted => {
                self.ranked_lists.forget(kind, &pending.request_id).await;
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Restores the request fields captured before a `PartialFailure`.
    pub async fn roll_back(&self, pending: &PendingProviderWrite) -> AssignmentResult<()> {
        self.store
            .update_request(pending.kind, &pending.request_id, &pending.rollback)
            .await?;
        if pending.rollback.status == Some(RequestStatus::Available) {
            self.ranked_lists
                .forget(pending.kind, &pending.request_id)
                .await;
        }
        info!(
            event = "request_rolled_back",
            kind = pending.kind.as_str(),
            request.id = %pending.request_id,
            "Request restored after partial failure"
        );
        Ok(())
    }

    /// Requests currently offered to the provider.
    pub async fn pending_offers(
        &self,
        kind: ServiceKind,
        provider_id: &str,
    ) -> AssignmentResult<Vec<ServiceRequest>> {
        Ok(self
            .store
            .list_requests_for_provider(kind, provider_id, RequestStatus::Pending)
            .await?)
    }

    /// Every request the user created, newest first.
    pub async fn bookings_for_user(
        &self,
        kind: ServiceKind,
        user_id: &str,
    ) -> AssignmentResult<Vec<ServiceRequest>> {
        let mut bookings = self.store.list_requests_for_user(kind, user_id).await?;
        bookings.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.request_id.cmp(&b.request_id))
        });
        Ok(bookings)
    }

    async fn load_request(
        &self,
        kind: ServiceKind,
        request_id: &str,
    ) -> AssignmentResult<ServiceRequest> {
        self.store
            .get_request(kind, request_id)
            .await?
            .ok_or_else(|| AssignmentError::RequestNotFound {
                kind,
                request_id: request_id.to_string(),
            })
    }

    /// The pet must resolve to exactly one owner, and that owner must be the requester.
    async fn verify_owner(&self, request: &ServiceRequest) -> AssignmentResult<()> {
        let mut owners = self.store.find_pet_owners(&request.pet_name).await?;
        owners.sort();
        owners.dedup();

        match owners.as_slice() {
            [] => Err(AssignmentError::LookupMissing {
                pet_name: request.pet_name.clone(),
            }),
            [owner] if *owner == request.user_id => Ok(()),
            [_] => Err(AssignmentError::OwnerMismatch {
                user_id: request.user_id.clone(),
                pet_name: request.pet_name.clone(),
            }),
            _ => Err(AssignmentError::LookupAmbiguous {
                pet_name: request.pet_name.clone(),
                matches: owners.len(),
            }),
        }
    }

    /// Request coordinates first, then the requester's profile location.
    async fn resolve_origin(&self, request: &ServiceRequest) -> AssignmentResult<Coordinate> {
        if let Some(origin) = request.origin() {
            return Ok(origin);
        }
        self.store
            .get_user_location(&request.user_id)
            .await?
            .filter(Coordinate::is_finite)
            .ok_or_else(|| AssignmentError::OriginUnavailable {
                request_id: request.request_id.clone(),
            })
    }

    /// Pending on this provider; `rejected` requests have no live offer left.
    fn check_offer_holder(
        &self,
        request: &ServiceRequest,
        provider_id: &str,
    ) -> AssignmentResult<()> {
        match request.status {
            RequestStatus::Rejected => Err(AssignmentError::NoMoreCandidates {
                request_id: request.request_id.clone(),
            }),
            RequestStatus::Pending
                if request.assigned_provider_id.as_deref() == Some(provider_id) =>
            {
                Ok(())
            }
            status => Err(AssignmentError::invalid_state(
                &request.request_id,
                provider_id,
                status,
            )),
        }
    }

    /// Finishes an offer whose provider write never landed.
    ///
    /// A `pending` request whose provider has no record of it in the offer
    /// log was interrupted between its two writes; the claim is written
    /// again. A provider claimed in the meantime sends the request back to
    /// `available` with `Contended`.
    async fn complete_interrupted_offer(
        &self,
        kind: ServiceKind,
        request: &ServiceRequest,
    ) -> AssignmentResult<Offer> {
        let request_id = request.request_id.as_str();
        let live_offer = || {
            AssignmentError::invalid_state(
                request_id,
                request.assigned_provider_id.clone().unwrap_or_default(),
                request.status,
            )
        };
        let Some(provider_id) = request.assigned_provider_id.clone() else {
            return Err(live_offer());
        };

        let document = self
            .store
            .get_provider(kind, &provider_id)
            .await?
            .ok_or_else(|| AssignmentError::ProviderNotFound {
                kind,
                provider_id: provider_id.clone(),
            })?;
        if document.offer_log_contains(request_id) {
            return Err(live_offer());
        }

        let provider = Provider::from_document(kind, &document)
            .map_err(|rejection| AssignmentError::Serialization(rejection.to_string()))?;
        let origin = self.resolve_origin(request).await?;
        let score = self.strategy(kind).score(&provider, origin);

        let pending = PendingProviderWrite {
            kind,
            request_id: request_id.to_string(),
            provider_id: provider_id.clone(),
            update: ProviderUpdate::claim_offer(request_id),
            rollback: RequestUpdate::restore(RequestStatus::Available, None),
        };
        self.resume(&pending).await?;

        let remaining: Vec<RankedEntry> = self
            .ranked_lists
            .get(kind, request_id)
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|entry| entry.provider_id != provider_id)
            .collect();
        let offer = Offer {
            kind,
            request_id: request_id.to_string(),
            provider_id: provider_id.clone(),
            score,
            remaining: remaining.len(),
        };
        self.ranked_lists.retain(kind, request_id, remaining).await;
        StructuredLogger::log_offer_made(kind, request_id, &provider_id, 0, score);
        self.metrics.record_offer(kind);
        Ok(offer)
    }

    /// Ranks every open provider never offered this request.
    async fn fresh_ranking(
        &self,
        kind: ServiceKind,
        request_id: &str,
        origin: Coordinate,
    ) -> AssignmentResult<Vec<RankedEntry>> {
        let providers: Vec<Provider> = self
            .pool
            .available_providers(kind)
            .await?
            .into_iter()
            .filter(|p| !p.has_been_offered(request_id))
            .collect();

        let strategy = self.strategy(kind);
        let ranked = rank(strategy, providers, origin);
        debug!(
            strategy = strategy.name(),
            candidates = ranked.len(),
            "Candidates ranked"
        );

        Ok(ranked
            .into_iter()
            .map(|c| RankedEntry {
                provider_id: c.provider.id,
                score: c.score,
            })
            .collect())
    }

    /// Retained order, minus providers that left the pool or saw this request already.
    async fn still_eligible(
        &self,
        kind: ServiceKind,
        request_id: &str,
        retained: Vec<RankedEntry>,
    ) -> AssignmentResult<Vec<RankedEntry>> {
        let open = self.pool.available_providers(kind).await?;
        Ok(retained
            .into_iter()
            .filter(|entry| {
                let eligible = open
                    .iter()
                    .any(|p| p.id == entry.provider_id && !p.has_been_offered(request_id));
                if !eligible {
                    debug!(
                        request.id = request_id,
                        provider.id = %entry.provider_id,
                        "Retained candidate no longer eligible"
                    );
                }
                eligible
            })
            .collect())
    }

    /// Offers to each candidate in turn until one provider write sticks.
    ///
    /// A provider claimed concurrently fails its guard and the next candidate
    /// is tried. If none stick, `restore` puts the request back the way it
    /// was before the first offer write.
    async fn offer_in_order(
        &self,
        kind: ServiceKind,
        request_id: &str,
        candidates: Vec<RankedEntry>,
        restore: RequestUpdate,
    ) -> AssignmentResult<Offer> {
        let mut request_touched = false;

        for (rank, candidate) in candidates
            .iter()
            .enumerate()
            .take(self.config.max_offer_attempts)
        {
            let write = TwoPhaseWrite {
                kind,
                request_id: request_id.to_string(),
                provider_id: candidate.provider_id.clone(),
                request: RequestUpdate::offer(&candidate.provider_id),
                provider: ProviderUpdate::claim_offer(request_id),
                rollback: restore.clone(),
            };

            match write.commit(self.store.as_ref()).await {
                Ok(()) => {
                    let remaining = candidates[rank + 1..].to_vec();
                    let offer = Offer {
                        kind,
                        request_id: request_id.to_string(),
                        provider_id: candidate.provider_id.clone(),
                        score: candidate.score,
                        remaining: remaining.len(),
                    };
                    self.ranked_lists.retain(kind, request_id, remaining).await;
                    StructuredLogger::log_offer_made(
                        kind,
                        request_id,
                        &candidate.provider_id,
                        rank,
                        candidate.score,
                    );
                    self.metrics.record_offer(kind);
                    return Ok(offer);
                }
                Err(PhaseFailure::Guard(_)) => {
                    request_touched = true;
                    StructuredLogger::log_race_lost(kind, request_id, &candidate.provider_id);
                    self.metrics.record_conflict(kind);
                }
                Err(PhaseFailure::Request(e)) => {
                    if request_touched {
                        self.restore_quietly(kind, request_id, &restore).await;
                    }
                    return Err(e.into());
                }
                Err(PhaseFailure::Partial(err)) => {
                    // The interrupted candidate stays at the head so a rollback retries it.
                    let retained = candidates[rank..].to_vec();
                    self.ranked_lists.retain(kind, request_id, retained).await;
                    if let AssignmentError::PartialFailure { source, .. } = &err {
                        StructuredLogger::log_partial_failure(
                            kind,
                            request_id,
                            &candidate.provider_id,
                            source,
                        );
                    }
                    self.metrics.record_partial_failure(kind);
                    return Err(err);
                }
            }
        }

        self.store.update_request(kind, request_id, &restore).await?;
        self.ranked_lists.forget(kind, request_id).await;
        warn!(
            event = "offer_contended",
            kind = kind.as_str(),
            request.id = request_id,
            attempts = candidates.len().min(self.config.max_offer_attempts),
            "Every candidate was claimed concurrently"
        );
        Err(AssignmentError::Contended {
            request_id: request_id.to_string(),
        })
    }

    /// Non-offer transitions (accept, reject); the provider write carries no guard.
    async fn commit_transition(&self, write: &TwoPhaseWrite) -> AssignmentResult<()> {
        match write.commit(self.store.as_ref()).await {
            Ok(()) => Ok(()),
            Err(PhaseFailure::Request(e)) | Err(PhaseFailure::Guard(e)) => Err(e.into()),
            Err(PhaseFailure::Partial(err)) => {
                if let AssignmentError::PartialFailure { source, .. } = &err {
                    StructuredLogger::log_partial_failure(
                        write.kind,
                        &write.request_id,
                        &write.provider_id,
                        source,
                    );
                }
                self.metrics.record_partial_failure(write.kind);
                Err(err)
            }
        }
    }

    async fn restore_quietly(&self, kind: ServiceKind, request_id: &str, restore: &RequestUpdate) {
        if let Err(e) = self.store.update_request(kind, request_id, restore).await {
            warn!(
                request.id = request_id,
                error = %e,
                "Failed to restore request after aborted offer"
            );
        }
    }
}
