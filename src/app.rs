use std::sync::Arc;

use anyhow::{Context, Result};
use snuffy_core::{AppConfig, AssignmentStore, LogConfig};
use snuffy_dispatcher::AssignmentEngine;
use snuffy_infrastructure::{InMemoryStore, MetricsCollector};
use tracing::info;

use crate::common::init_logging_from;

/// Assembled assignment service.
pub struct Application {
    config: AppConfig,
    store: Arc<dyn AssignmentStore>,
    engine: Arc<AssignmentEngine>,
    metrics: Arc<MetricsCollector>,
}

impl Application {
    /// Application backed by a fresh in-memory store.
    pub fn new(config: AppConfig) -> Result<Self> {
        Self::with_store(config, Arc::new(InMemoryStore::new()))
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn AssignmentStore>) -> Result<Self> {
        config.validate().context("invalid configuration")?;

        let metrics = Arc::new(MetricsCollector::new(config.observability.metrics_enabled));
        let engine = Arc::new(AssignmentEngine::new(
            store.clone(),
            config.assignment.clone(),
            metrics.clone(),
        ));

        info!(
            metrics_enabled = metrics.is_enabled(),
            max_offer_attempts = config.assignment.max_offer_attempts,
            "Assignment service initialised"
        );

        Ok(Self {
            config,
            store,
            engine,
            metrics,
        })
    }

    /// Install the global subscriber described by the `observability` section.
    pub fn init_logging(&self) -> Result<()> {
        let log_config = LogConfig::from_observability(&self.config.observability)
            .context("invalid observability settings")?;
        init_logging_from(&log_config)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn engine(&self) -> Arc<AssignmentEngine> {
        Arc::clone(&self.engine)
    }

    pub fn store(&self) -> Arc<dyn AssignmentStore> {
        Arc::clone(&self.store)
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        Arc::clone(&self.metrics)
    }
}
