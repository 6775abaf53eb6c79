use serde::Deserialize;

use genmetr_core::error::{GenMetrError, Result};
use genmetr_core::instrument::UNMATCHED_ROUTE;
use genmetr_core::metrics::descriptor::validate_buckets;
use genmetr_core::metrics::DEFAULT_BUCKETS;
use genmetr_core::HttpMetricsOptions;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub generator: GeneratorSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            metrics: MetricsSection::default(),
            generator: GeneratorSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GenMetrError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.metrics.validate()?;
        self.generator.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_path: default_metrics_path(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !self.metrics_path.starts_with('/') || self.metrics_path.contains([':', '*']) {
            return Err(GenMetrError::BadRequest(
                "gateway.metrics_path must be a static path starting with '/'".into(),
            ));
        }
        if RESERVED_PATHS.contains(&self.metrics_path.as_str()) {
            return Err(GenMetrError::BadRequest(format!(
                "gateway.metrics_path {} collides with a built-in route",
                self.metrics_path
            )));
        }
        Ok(())
    }
}

const RESERVED_PATHS: [&str; 2] = ["/healthz", "/generate"];

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_metrics_path() -> String {
    "/metrics".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Upper bounds for `http_request_duration_seconds`, in seconds.
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,

    /// Route label for requests that matched no route template.
    #[serde(default = "default_unmatched_route")]
    pub unmatched_route: String,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            duration_buckets: default_duration_buckets(),
            unmatched_route: default_unmatched_route(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        validate_buckets(&self.duration_buckets)
            .map_err(|e| GenMetrError::BadRequest(format!("metrics.duration_buckets: {e}")))?;
        if self.unmatched_route.trim().is_empty() {
            return Err(GenMetrError::BadRequest(
                "metrics.unmatched_route must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn http_options(&self) -> HttpMetricsOptions {
        HttpMetricsOptions {
            duration_buckets: self.duration_buckets.clone(),
            unmatched_route: self.unmatched_route.clone(),
        }
    }
}

fn default_duration_buckets() -> Vec<f64> {
    DEFAULT_BUCKETS.to_vec()
}
fn default_unmatched_route() -> String {
    UNMATCHED_ROUTE.into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorSection {
    /// Status codes `/generate` picks from uniformly. Informational (1xx)
    /// codes are not valid final responses and are rejected.
    #[serde(default = "default_statuses")]
    pub statuses: Vec<u16>,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            statuses: default_statuses(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl GeneratorSection {
    pub fn validate(&self) -> Result<()> {
        if self.statuses.is_empty() {
            return Err(GenMetrError::BadRequest(
                "generator.statuses must not be empty".into(),
            ));
        }
        if let Some(s) = self.statuses.iter().find(|s| !(200..=599).contains(*s)) {
            return Err(GenMetrError::BadRequest(format!(
                "generator.statuses: {s} is not a valid final HTTP status (200..=599)"
            )));
        }
        if self.max_delay_ms > 60_000 {
            return Err(GenMetrError::BadRequest(
                "generator.max_delay_ms must be at most 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_statuses() -> Vec<u16> {
    vec![200, 201, 400, 401, 403, 404, 500, 502, 503]
}
fn default_max_delay_ms() -> u64 {
    500
}
