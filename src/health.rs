use crate::error::ERROR_METRICS;
use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Health status for a component or the overall system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Serving, but something deserves attention
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// The worse of the two
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (HealthStatus::Unhealthy, _) | (_, HealthStatus::Unhealthy) => HealthStatus::Unhealthy,
            (HealthStatus::Degraded, _) | (_, HealthStatus::Degraded) => HealthStatus::Degraded,
            _ => HealthStatus::Healthy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub component: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ComponentHealth {
    fn new(
        component: &str,
        status: HealthStatus,
        error: Option<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            component: component.to_string(),
            status,
            error,
            timestamp: now(),
            details: Some(details),
        }
    }

    pub fn healthy_with_details(component: &str, details: serde_json::Value) -> Self {
        Self::new(component, HealthStatus::Healthy, None, details)
    }

    pub fn degraded_with_details(
        component: &str,
        error: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::new(component, HealthStatus::Degraded, Some(error.into()), details)
    }

    pub fn unhealthy_with_details(
        component: &str,
        error: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::new(component, HealthStatus::Unhealthy, Some(error.into()), details)
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: i64,
    pub version: String,
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        let status = self.status.status_code();
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub status: HealthStatus,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_ready: Vec<String>,
}

impl IntoResponse for ReadinessResponse {
    fn into_response(self) -> Response {
        let status = if self.ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealthResponse {
    pub status: HealthStatus,
    pub timestamp: i64,
    pub components: BTreeMap<String, ComponentHealth>,
}

impl IntoResponse for ComponentHealthResponse {
    fn into_response(self) -> Response {
        let status = self.status.status_code();
        (status, Json(self)).into_response()
    }
}

#[derive(Clone)]
pub struct HealthChecker {
    state: Arc<AppState>,
}

impl HealthChecker {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// The process is up; nothing else is checked.
    pub fn liveness(&self) -> HealthResponse {
        HealthResponse {
            status: HealthStatus::Healthy,
            timestamp: now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Ready unless a component is unhealthy; degraded still serves.
    pub fn readiness(&self) -> ReadinessResponse {
        let components = self.check_all_components();
        let status = overall(&components);
        let not_ready = components
            .iter()
            .filter(|(_, health)| health.status == HealthStatus::Unhealthy)
            .map(|(name, _)| name.clone())
            .collect();

        ReadinessResponse {
            ready: status != HealthStatus::Unhealthy,
            status,
            timestamp: now(),
            not_ready,
        }
    }

    pub fn components(&self) -> ComponentHealthResponse {
        let components = self.check_all_components();
        ComponentHealthResponse {
            status: overall(&components),
            timestamp: now(),
            components,
        }
    }

    fn check_all_components(&self) -> BTreeMap<String, ComponentHealth> {
        [
            self.check_vocabulary(),
            self.check_render_cache(),
            self.check_errors(),
        ]
            .into_iter()
            .map(|health| (health.component.clone(), health))
            .collect()
    }

    fn check_vocabulary(&self) -> ComponentHealth {
        let vocabulary = self.state.vocabulary();
        let dangling = vocabulary.dangling_references();
        let details = json!({
            "version": vocabulary.version,
            "classes": vocabulary.classes.len(),
            "properties": vocabulary.properties.len(),
            "dangling_references": dangling,
        });

        if vocabulary.classes.is_empty() && vocabulary.properties.is_empty() {
            ComponentHealth::unhealthy_with_details("vocabulary", "vocabulary has no terms", details)
        } else if !dangling.is_empty() {
            ComponentHealth::degraded_with_details(
                "vocabulary",
                format!("{} reference(s) name no class", dangling.len()),
                details,
            )
        } else {
            ComponentHealth::healthy_with_details("vocabulary", details)
        }
    }

    fn check_render_cache(&self) -> ComponentHealth {
        let stats = self.state.cache_stats();
        ComponentHealth::healthy_with_details(
            "render_cache",
            json!({
                "size": stats.size,
                "capacity": stats.capacity,
                "hits": stats.hits,
                "misses": stats.misses,
                "hit_rate": stats.hit_rate(),
            }),
        )
    }

    /// Failed requests never affect readiness; the counts are informational.
    fn check_errors(&self) -> ComponentHealth {
        let stats = ERROR_METRICS.get_stats();
        ComponentHealth::healthy_with_details(
            "errors",
            json!({
                "total": ERROR_METRICS.total(),
                "by_code": stats.error_counts,
                "by_operation": stats.operation_errors,
                "by_category": stats.category_counts,
            }),
        )
    }
}

fn overall(components: &BTreeMap<String, ComponentHealth>) -> HealthStatus {
    components
        .values()
        .fold(HealthStatus::Healthy, |acc, health| acc.combine(health.status))
}

pub async fn health_handler(State(checker): State<HealthChecker>) -> HealthResponse {
    checker.liveness()
}

pub async fn readiness_handler(State(checker): State<HealthChecker>) -> ReadinessResponse {
    checker.readiness()
}

pub async fn components_handler(State(checker): State<HealthChecker>) -> ComponentHealthResponse {
    checker.components()
}
