//! Request instrumentation.
//!
//! [`HttpMetrics`] owns the three request families. A [`RequestGuard`] is
//! taken when a request starts and records exactly once: either through
//! [`RequestGuard::finish`] with the final status, or on drop with
//! [`FALLBACK_STATUS`] when the handler panicked or its future was dropped.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::StatusCode;

use crate::error::Result;
use crate::metrics::descriptor::DEFAULT_BUCKETS;
use crate::metrics::registry::{CounterVec, HistogramVec, Registry};

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const ERRORS_TOTAL: &str = "http_errors_total";

/// Status recorded when a handler never produced one.
pub const FALLBACK_STATUS: u16 = 500;

/// Route label for requests the router could not match to a template.
pub const UNMATCHED_ROUTE: &str = "unmatched";

#[derive(Debug, Clone)]
pub struct HttpMetricsOptions {
    pub duration_buckets: Vec<f64>,
    pub unmatched_route: String,
}

impl Default for HttpMetricsOptions {
    fn default() -> Self {
        Self {
            duration_buckets: DEFAULT_BUCKETS.to_vec(),
            unmatched_route: UNMATCHED_ROUTE.to_string(),
        }
    }
}

/// Anything a handler can return that carries an HTTP status.
pub trait ResponseStatus {
    fn status_code(&self) -> u16;
}

impl ResponseStatus for u16 {
    fn status_code(&self) -> u16 {
        *self
    }
}

impl ResponseStatus for StatusCode {
    fn status_code(&self) -> u16 {
        self.as_u16()
    }
}

impl<B> ResponseStatus for http::Response<B> {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

/// `Err` counts as a server error.
impl<T: ResponseStatus, E> ResponseStatus for std::result::Result<T, E> {
    fn status_code(&self) -> u16 {
        match self {
            Ok(v) => v.status_code(),
            Err(_) => FALLBACK_STATUS,
        }
    }
}

/// Status label value: the canonical reason phrase, or the bare code when the
/// code has none.
pub fn status_label(code: u16) -> Cow<'static, str> {
    StatusCode::from_u16(code)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(Cow::Borrowed)
        .unwrap_or_else(|| Cow::Owned(code.to_string()))
}

struct Families {
    requests_total: CounterVec,
    duration: HistogramVec,
    errors_total: CounterVec,
    unmatched_route: String,
}

#[derive(Clone)]
pub struct HttpMetrics {
    inner: Arc<Families>,
}

impl HttpMetrics {
    pub fn register(registry: &Registry, opts: &HttpMetricsOptions) -> Result<Self> {
        let requests_total = registry.register_counter(
            REQUESTS_TOTAL,
            "Total number of HTTP requests",
            &["method", "route", "status"],
        )?;
        let duration = registry.register_histogram(
            REQUEST_DURATION_SECONDS,
            "Histogram of response time for handler in seconds",
            &["method", "route"],
            &opts.duration_buckets,
        )?;
        let errors_total = registry.register_counter(
            ERRORS_TOTAL,
            "Total number of HTTP errors",
            &["method", "route", "status"],
        )?;

        Ok(Self {
            inner: Arc::new(Families {
                requests_total,
                duration,
                errors_total,
                unmatched_route: opts.unmatched_route.clone(),
            }),
        })
    }

    pub fn unmatched_route(&self) -> &str {
        &self.inner.unmatched_route
    }

    /// Begin measuring a request. `route` must be a template such as
    /// `/users/:id`, never the concrete path; an empty route is recorded as
    /// the unmatched label.
    pub fn start(&self, method: &str, route: &str) -> RequestGuard {
        let route = if route.is_empty() {
            self.inner.unmatched_route.clone()
        } else {
            route.to_string()
        };
        RequestGuard {
            metrics: self.clone(),
            method: method.to_string(),
            route,
            started_at: Instant::now(),
            finished: false,
        }
    }

    /// Record one completed request.
    pub fn record(&self, method: &str, route: &str, status: u16, elapsed: Duration) -> Result<()> {
        let status_text = status_label(status);
        let labels = [method, route, &*status_text];

        self.inner.requests_total.inc(&labels)?;
        self.inner.duration.observe_duration(&[method, route], elapsed)?;
        if status >= 400 {
            self.inner.errors_total.inc(&labels)?;
        }
        Ok(())
    }

    /// Run `handler` and record its outcome. The result is handed back
    /// untouched; a panic is recorded as [`FALLBACK_STATUS`] and resumes.
    pub fn instrument<F, R>(&self, method: &str, route: &str, handler: F) -> R
    where
        F: FnOnce() -> R,
        R: ResponseStatus,
    {
        let guard = self.start(method, route);
        let out = handler();
        guard.finish(out.status_code());
        out
    }

    /// Async counterpart of [`HttpMetrics::instrument`]. The clock starts
    /// when this is called; if the returned future is dropped before it
    /// completes, even unpolled, the request is recorded with
    /// [`FALLBACK_STATUS`].
    pub fn instrument_async<F, R>(
        &self,
        method: &str,
        route: &str,
        handler: F,
    ) -> impl Future<Output = R>
    where
        F: Future<Output = R>,
        R: ResponseStatus,
    {
        let guard = self.start(method, route);
        async move {
            let out = handler.await;
            guard.finish(out.status_code());
            out
        }
    }
}

/// Records its request exactly once, on `finish` or on drop.
#[must_use = "dropping the guard immediately records a fallback status"]
pub struct RequestGuard {
    metrics: HttpMetrics,
    method: String,
    route: String,
    started_at: Instant,
    finished: bool,
}

impl RequestGuard {
    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn finish(mut self, status: u16) {
        self.complete(status);
    }

    fn complete(&mut self, status: u16) {
        if self.finished {
            return;
        }
        self.finished = true;

        let elapsed = self.started_at.elapsed();
        if let Err(e) = self
            .metrics
            .record(&self.method, &self.route, status, elapsed)
        {
            tracing::warn!(
                method = %self.method,
                route = %self.route,
                status,
                error = %e,
                "request metrics not recorded"
            );
        }
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(
                method = %self.method,
                route = %self.route,
                "request ended without a status"
            );
            self.complete(FALLBACK_STATUS);
        }
    }
}
