//! HTTP surface: the vocabulary API plus health and metrics endpoints.

use crate::convert::{ConvertError, Target};
use crate::error::{ApiError, ErrorCode};
use crate::health::{self, HealthChecker};
use crate::metrics::{METRICS, RequestTimer};
use crate::negotiate::Format;
use crate::shutdown::ShutdownCoordinator;
use crate::state::AppState;
use crate::vocabulary::TermKind;
use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const ROUTE_VOCABULARY: &str = "/api/schema";
pub const ROUTE_CLASS_INDEX: &str = "/api/schema/class";
pub const ROUTE_PROPERTY_INDEX: &str = "/api/schema/property";
pub const ROUTE_CLASS: &str = "/api/schema/class/{name}";
pub const ROUTE_PROPERTY: &str = "/api/schema/property/{name}";

#[derive(Clone)]
pub struct ApiState {
    app: Arc<AppState>,
    shutdown: Arc<ShutdownCoordinator>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormatQuery {
    pub format: Option<String>,
}

impl ApiState {
    pub fn new(app: Arc<AppState>, shutdown: Arc<ShutdownCoordinator>) -> Self {
        Self { app, shutdown }
    }

    fn serve(
        &self,
        route: &'static str,
        target: Target<'_>,
        query: &FormatQuery,
        headers: &HeaderMap,
    ) -> Response {
        let _in_flight = self.shutdown.track_request();
        let _span = crate::logging::request_span(route, target.name()).entered();
        let timer = RequestTimer::start(route);

        let accept = headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok());
        let requested = Format::negotiate(query.format.as_deref(), accept);

        let response = match self.app.render(target, requested) {
            Ok(rendered) => document_response(rendered.content_type, rendered.body.clone()),
            Err(err) => {
                if let ConvertError::EntityNotFound { kind, .. } = &err {
                    METRICS.record_not_found(*kind);
                }
                ApiError::from(err).into_response()
            }
        };
        timer.finish(response.status().as_u16());
        response
    }

    fn index(&self, route: &'static str, kind: TermKind) -> Response {
        let _in_flight = self.shutdown.track_request();
        let timer = RequestTimer::start(route);
        let summaries = self.app.vocabulary().summaries(kind);
        let response = json_response(&summaries, self.app.convert_options().pretty);
        timer.finish(response.status().as_u16());
        response
    }
}

fn document_response(content_type: &'static str, body: String) -> Response {
    let mut response = body.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(header::VARY, HeaderValue::from_static("Accept"));
    response
}

fn json_response<T: Serialize>(value: &T, pretty: bool) -> Response {
    let body = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match body {
        Ok(body) => document_response(Format::Json.content_type(), body),
        Err(err) => ApiError::builder(ErrorCode::Serialization)
            .message(err.to_string())
            .operation("index")
            .build_and_track()
            .into_response(),
    }
}

async fn vocabulary_handler(
    State(api): State<ApiState>,
    Query(query): Query<FormatQuery>,
    headers: HeaderMap,
) -> Response {
    api.serve(ROUTE_VOCABULARY, Target::Vocabulary, &query, &headers)
}

async fn class_handler(
    State(api): State<ApiState>,
    Path(name): Path<String>,
    Query(query): Query<FormatQuery>,
    headers: HeaderMap,
) -> Response {
    api.serve(ROUTE_CLASS, Target::Class(&name), &query, &headers)
}

async fn property_handler(
    State(api): State<ApiState>,
    Path(name): Path<String>,
    Query(query): Query<FormatQuery>,
    headers: HeaderMap,
) -> Response {
    api.serve(ROUTE_PROPERTY, Target::Property(&name), &query, &headers)
}

async fn class_index_handler(State(api): State<ApiState>) -> Response {
    api.index(ROUTE_CLASS_INDEX, TermKind::Class)
}

async fn property_index_handler(State(api): State<ApiState>) -> Response {
    api.index(ROUTE_PROPERTY_INDEX, TermKind::Property)
}

async fn metrics_handler() -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        METRICS.encode(),
    )
}

async fn fallback_handler(uri: axum::http::Uri) -> ApiError {
    ApiError::builder(ErrorCode::RouteNotFound)
        .message(format!("no endpoint at {}", uri.path()))
        .operation("route")
        .suggestion(format!("GET {ROUTE_VOCABULARY} serves the whole vocabulary"))
        .build_and_track()
}

/// Builds the application router.
pub fn router(app: Arc<AppState>, shutdown: Arc<ShutdownCoordinator>) -> Router {
    let checker = HealthChecker::new(app.clone());

    let api = Router::new()
        .route(ROUTE_VOCABULARY, get(vocabulary_handler))
        .route(ROUTE_CLASS_INDEX, get(class_index_handler))
        .route(ROUTE_PROPERTY_INDEX, get(property_index_handler))
        .route(ROUTE_CLASS, get(class_handler))
        .route(ROUTE_PROPERTY, get(property_handler))
        .with_state(ApiState::new(app, shutdown));

    let ops = Router::new()
        .route("/health", get(health::health_handler))
        .route("/ready", get(health::readiness_handler))
        .route("/health/components", get(health::components_handler))
        .with_state(checker);

    api.merge(ops)
        .route("/metrics", get(metrics_handler))
        .fallback(fallback_handler)
}
