//! Prometheus metrics for the vocabulary service.
//!
//! Conversions, HTTP traffic and the render cache are counted here and
//! exposed in text format at `GET /metrics`.
use crate::negotiate::{Format, Scope};
use crate::vocabulary::TermKind;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Global metrics registry instance
pub static METRICS: Lazy<Arc<MetricsCollector>> = Lazy::new(|| Arc::new(MetricsCollector::new()));

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ConversionLabels {
    pub scope: String,
    pub format: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct FormatLabels {
    pub format: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    /// Route template, e.g. `/api/schema/class/{name}`
    pub route: String,
    pub status: u16,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RouteLabels {
    pub route: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct KindLabels {
    pub kind: String,
}

pub struct MetricsCollector {
    registry: RwLock<Registry>,

    pub conversions_total: Family<ConversionLabels, Counter>,
    pub conversion_duration_seconds: Family<FormatLabels, Histogram>,

    pub http_requests_total: Family<RequestLabels, Counter>,
    pub http_request_duration_seconds: Family<RouteLabels, Histogram>,

    /// Lookups of unknown class or property names
    pub not_found_total: Family<KindLabels, Counter>,

    pub render_cache_hits_total: Counter,
    pub render_cache_misses_total: Counter,
    pub render_cache_entries: Gauge,
}

impl MetricsCollector {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("oer");

        let conversions_total = Family::<ConversionLabels, Counter>::default();
        registry.register(
            "conversions",
            "Documents converted, by scope and format",
            conversions_total.clone(),
        );

        let conversion_duration_seconds =
            Family::<FormatLabels, Histogram>::new_with_constructor(|| {
                // 0.1ms up to ~0.5s
                Histogram::new(exponential_buckets(0.0001, 3.0, 8))
            });
        registry.register(
            "conversion_duration_seconds",
            "Conversion latency in seconds",
            conversion_duration_seconds.clone(),
        );

        let http_requests_total = Family::<RequestLabels, Counter>::default();
        registry.register(
            "http_requests",
            "HTTP requests served, by route and status",
            http_requests_total.clone(),
        );

        let http_request_duration_seconds =
            Family::<RouteLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.0005, 2.5, 10))
            });
        registry.register(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
            http_request_duration_seconds.clone(),
        );

        let not_found_total = Family::<KindLabels, Counter>::default();
        registry.register(
            "not_found",
            "Requests for terms missing from the vocabulary",
            not_found_total.clone(),
        );

        let render_cache_hits_total = Counter::default();
        registry.register(
            "render_cache_hits",
            "Rendered documents served from cache",
            render_cache_hits_total.clone(),
        );

        let render_cache_misses_total = Counter::default();
        registry.register(
            "render_cache_misses",
            "Rendered documents that had to be converted",
            render_cache_misses_total.clone(),
        );

        let render_cache_entries = Gauge::default();
        registry.register(
            "render_cache_entries",
            "Documents currently held in the render cache",
            render_cache_entries.clone(),
        );

        Self {
            registry: RwLock::new(registry),
            conversions_total,
            conversion_duration_seconds,
            http_requests_total,
            http_request_duration_seconds,
            not_found_total,
            render_cache_hits_total,
            render_cache_misses_total,
            render_cache_entries,
        }
    }

    /// Encode metrics in Prometheus text format
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        let registry = self.registry.read();
        if let Err(err) = encode(&mut buffer, &registry) {
            tracing::warn!(error = %err, "failed to encode metrics");
        }
        buffer
    }

    pub fn record_conversion(&self, scope: Scope, format: Format, duration: Duration) {
        self.conversions_total
            .get_or_create(&ConversionLabels {
                scope: scope.as_str().to_string(),
                format: format.to_string(),
            })
            .inc();
        self.conversion_duration_seconds
            .get_or_create(&FormatLabels {
                format: format.to_string(),
            })
            .observe(duration.as_secs_f64());
    }

    pub fn record_request(&self, route: &str, status: u16, duration: Duration) {
        self.http_requests_total
            .get_or_create(&RequestLabels {
                route: route.to_string(),
                status,
            })
            .inc();
        self.http_request_duration_seconds
            .get_or_create(&RouteLabels {
                route: route.to_string(),
            })
            .observe(duration.as_secs_f64());
    }

    pub fn record_not_found(&self, kind: TermKind) {
        self.not_found_total
            .get_or_create(&KindLabels {
                kind: kind.as_str().to_string(),
            })
            .inc();
    }

    pub fn record_cache_hit(&self) {
        self.render_cache_hits_total.inc();
    }

    pub fn record_cache_miss(&self) {
        self.render_cache_misses_total.inc();
    }

    pub fn update_cache_entries(&self, entries: usize) {
        self.render_cache_entries.set(entries as i64);
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Times one HTTP request; the outcome is recorded by [`RequestTimer::finish`].
pub struct RequestTimer {
    route: &'static str,
    start: Instant,
}

impl RequestTimer {
    pub fn start(route: &'static str) -> Self {
        Self {
            route,
            start: Instant::now(),
        }
    }

    pub fn finish(self, status: u16) {
        let elapsed = self.start.elapsed();
        METRICS.record_request(self.route, status, elapsed);
        crate::log_slow_operation!(elapsed, 250, route = self.route, status = status, "request served");
    }
}
