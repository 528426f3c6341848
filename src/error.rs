//! Error taxonomy for the HTTP surface.
//!
//! This module provides:
//! - Error codes with categories and HTTP status mapping
//! - An `ApiError` type serialized as the JSON body of failed requests
//! - A builder for attaching context and suggestions
//! - Process-wide error counters

use crate::convert::ConvertError;
use crate::vocabulary::TermKind;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// ERROR CODES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Requested class or property is not in the vocabulary
    EntityNotFound,
    /// No endpoint at the requested path
    RouteNotFound,
    /// Output document could not be serialized
    Serialization,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EntityNotFound => "entity_not_found",
            ErrorCode::RouteNotFound => "route_not_found",
            ErrorCode::Serialization => "serialization",
        }
    }

    /// Get the error category for metrics
    pub fn category(&self) -> &'static str {
        match self {
            ErrorCode::EntityNotFound | ErrorCode::RouteNotFound => "resource_not_found",
            ErrorCode::Serialization => "server_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::EntityNotFound | ErrorCode::RouteNotFound => StatusCode::NOT_FOUND,
            ErrorCode::Serialization => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ERROR CONTEXT
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Operation that was being performed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<TermKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

// =============================================================================
// API ERROR
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    /// Unique error ID for correlating logs with responses
    pub error_id: String,
    pub context: ErrorContext,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            error_id: Self::generate_error_id(),
            context: ErrorContext::default(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn builder(code: ErrorCode) -> ErrorBuilder {
        ErrorBuilder::new(code)
    }

    pub fn not_found(kind: TermKind, name: impl Into<String>) -> ErrorBuilder {
        let name = name.into();
        ErrorBuilder::new(ErrorCode::EntityNotFound)
            .message(format!("{kind} '{name}' not found"))
            .kind(kind)
            .name(name)
            .suggestion(format!("GET /api/schema/{kind} lists every {kind}"))
            .suggestion("Term names are case-sensitive")
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }

    pub fn track(&self) {
        ERROR_METRICS.record_error(&self.code, self.context.operation.as_deref());
    }

    fn generate_error_id() -> String {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let count = COUNTER.fetch_add(1, Ordering::Relaxed);
        let timestamp = chrono::Utc::now().timestamp_millis();
        format!("err_{:x}_{:x}", timestamp, count)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a ApiError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error_id = %self.error_id, code = %self.code, "{}", self.message);
        } else {
            tracing::debug!(error_id = %self.error_id, code = %self.code, "{}", self.message);
        }
        (status, Json(ErrorBody { error: &self })).into_response()
    }
}

impl From<ConvertError> for ApiError {
    fn from(error: ConvertError) -> Self {
        match error {
            ConvertError::EntityNotFound { kind, name } => ApiError::not_found(kind, name)
                .operation("convert")
                .build_and_track(),
            ConvertError::Serialization(err) => ApiError::builder(ErrorCode::Serialization)
                .message(err.to_string())
                .operation("convert")
                .build_and_track(),
        }
    }
}

// =============================================================================
// ERROR BUILDER
// =============================================================================

pub struct ErrorBuilder {
    error: ApiError,
}

impl ErrorBuilder {
    fn new(code: ErrorCode) -> Self {
        Self {
            error: ApiError::new(code, ""),
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.error.message = message.into();
        self
    }

    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.error.context.operation = Some(operation.into());
        self
    }

    pub fn kind(mut self, kind: TermKind) -> Self {
        self.error.context.kind = Some(kind);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.error.context.name = Some(name.into());
        self
    }

    pub fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.error.context.suggestions.push(suggestion.into());
        self
    }

    pub fn build(self) -> ApiError {
        self.error
    }

    pub fn build_and_track(self) -> ApiError {
        let error = self.error;
        error.track();
        error
    }
}

// =============================================================================
// ERROR TELEMETRY
// =============================================================================

#[derive(Debug, Default)]
pub struct ErrorMetrics {
    error_counts: RwLock<HashMap<ErrorCode, AtomicU64>>,
    operation_errors: RwLock<HashMap<String, AtomicU64>>,
    category_counts: RwLock<HashMap<&'static str, AtomicU64>>,
}

fn increment<K>(map: &RwLock<HashMap<K, AtomicU64>>, key: K)
where
    K: std::hash::Hash + Eq,
{
    {
        let read = map.read();
        if let Some(counter) = read.get(&key) {
            counter.fetch_add(1, Ordering::Relaxed);
            return;
        }
    }
    map.write()
        .entry(key)
        .or_insert_with(|| AtomicU64::new(0))
        .fetch_add(1, Ordering::Relaxed);
}

impl ErrorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_error(&self, code: &ErrorCode, operation: Option<&str>) {
        increment(&self.error_counts, *code);
        if let Some(operation) = operation {
            increment(&self.operation_errors, operation.to_string());
        }
        let category = code.category();
        increment(&self.category_counts, category);

        tracing::debug!(
            error_code = %code,
            operation = operation,
            category = category,
            "error recorded"
        );
    }

    /// Snapshot of every counter, keyed by code, operation and category.
    pub fn get_stats(&self) -> ErrorStats {
        ErrorStats {
            error_counts: snapshot(&self.error_counts, |code| code.as_str().to_string()),
            operation_errors: snapshot(&self.operation_errors, String::clone),
            category_counts: snapshot(&self.category_counts, |category| category.to_string()),
        }
    }

    pub fn total(&self) -> u64 {
        self.error_counts
            .read()
            .values()
            .map(|counter| counter.load(Ordering::Relaxed))
            .sum()
    }
}

fn snapshot<K>(
    map: &RwLock<HashMap<K, AtomicU64>>,
    key: impl Fn(&K) -> String,
) -> BTreeMap<String, u64> {
    map.read()
        .iter()
        .map(|(k, counter)| (key(k), counter.load(Ordering::Relaxed)))
        .collect()
}

/// Error statistics snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ErrorStats {
    pub error_counts: BTreeMap<String, u64>,
    pub operation_errors: BTreeMap<String, u64>,
    pub category_counts: BTreeMap<String, u64>,
}

/// Global error metrics instance
pub static ERROR_METRICS: once_cell::sync::Lazy<ErrorMetrics> =
    once_cell::sync::Lazy::new(ErrorMetrics::new);
