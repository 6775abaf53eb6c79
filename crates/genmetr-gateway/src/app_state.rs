//! Shared application state for the GenMetr gateway.
//!
//! The metrics registry lives here as an explicit object built once at
//! startup; handlers and middleware reach it through `AppState`.

use std::sync::Arc;

use genmetr_core::error::Result;
use genmetr_core::{HttpMetrics, Registry};

use crate::config::GatewayConfig;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    registry: Arc<Registry>,
    http_metrics: HttpMetrics,
}

struct AppStateInner {
    cfg: GatewayConfig,
}

impl AppState {
    /// Build application state with a fresh registry.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        Self::with_registry(cfg, Arc::new(Registry::new()))
    }

    /// Build application state on an existing registry. A registration
    /// conflict is returned so startup can abort.
    pub fn with_registry(cfg: GatewayConfig, registry: Arc<Registry>) -> Result<Self> {
        let http_metrics = HttpMetrics::register(&registry, &cfg.metrics.http_options())?;

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg }),
            registry,
            http_metrics,
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    pub fn http_metrics(&self) -> &HttpMetrics {
        &self.http_metrics
    }
}
