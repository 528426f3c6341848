use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use oerschema::config::ServerConfig;
use oerschema::server;
use oerschema::shutdown::{ShutdownConfig, ShutdownCoordinator};
use oerschema::state::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> (Router, Arc<ShutdownCoordinator>) {
    let state = AppState::load(Arc::new(ServerConfig::default())).expect("bundled vocabulary loads");
    let coordinator = Arc::new(ShutdownCoordinator::new(ShutdownConfig::default()));
    (server::router(Arc::new(state), coordinator.clone()), coordinator)
}

struct Reply {
    status: StatusCode,
    content_type: String,
    vary: Option<String>,
    body: String,
}

async fn get(uri: &str, accept: Option<&str>) -> Reply {
    let (router, _) = app();
    let mut request = Request::builder().uri(uri);
    if let Some(accept) = accept {
        request = request.header(header::ACCEPT, accept);
    }
    let response = router
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let header_value = |name: header::HeaderName| {
        response
            .headers()
            .get(name)
            .map(|value| value.to_str().unwrap().to_string())
    };
    let content_type = header_value(header::CONTENT_TYPE).unwrap_or_default();
    let vary = header_value(header::VARY);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    Reply {
        status,
        content_type,
        vary,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

fn json(reply: &Reply) -> Value {
    serde_json::from_str(&reply.body).expect("body is JSON")
}

#[tokio::test]
async fn class_defaults_to_raw_json() {
    let reply = get("/api/schema/class/Course", None).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.content_type, "application/json");
    assert_eq!(reply.vary.as_deref(), Some("Accept"));
    let body = json(&reply);
    assert_eq!(body["className"], "Course");
    assert_eq!(body["subClassOf"][0], "Resource");
}

#[tokio::test]
async fn query_token_selects_turtle() {
    let reply = get("/api/schema/class/Course?format=turtle", None).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.content_type, "text/turtle");
    assert!(reply.body.contains("oer:Course a rdfs:Class ;"));
    assert!(reply.body.contains("rdfs:subClassOf <http://schema.org/Course>"));
}

#[tokio::test]
async fn query_token_wins_over_accept() {
    let reply = get(
        "/api/schema/property/courseIdentifier?format=ntriples",
        Some("application/ld+json"),
    )
    .await;
    assert_eq!(reply.content_type, "application/n-triples");
    assert!(reply.body.contains(
        "<http://oerschema.org/courseIdentifier> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/1999/02/22-rdf-syntax-ns#Property> ."
    ));
}

#[tokio::test]
async fn accept_header_negotiates_jsonld() {
    let reply = get("/api/schema/property/forCourse", Some("application/ld+json")).await;

    assert_eq!(reply.content_type, "application/ld+json");
    let body = json(&reply);
    assert_eq!(body["@id"], "oer:forCourse");
    assert_eq!(body["@type"], "Property");
    assert_eq!(body["domain"], serde_json::json!(["oer:Resource"]));
    assert_eq!(body["@context"]["oer"], "http://oerschema.org/");
}

#[tokio::test]
async fn unknown_accept_falls_back_to_json() {
    let reply = get("/api/schema/class/Course", Some("image/png")).await;
    assert_eq!(reply.content_type, "application/json");
    assert_eq!(json(&reply)["className"], "Course");
}

#[tokio::test]
async fn json_schema_maps_property_ranges() {
    let reply = get("/api/schema/class/Course?format=schema", None).await;

    assert_eq!(reply.content_type, "application/schema+json");
    let body = json(&reply);
    assert_eq!(body["title"], "Course");
    assert_eq!(body["type"], "object");
    assert_eq!(body["properties"]["courseIdentifier"]["type"], "string");
}

#[tokio::test]
async fn whole_vocabulary_in_rdf_xml() {
    let reply = get("/api/schema", Some("application/rdf+xml")).await;

    assert_eq!(reply.content_type, "application/xml");
    assert!(reply.body.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(reply.body.ends_with("</rdf:RDF>"));
    assert!(reply.body.contains("<rdfs:Class rdf:about=\"http://oerschema.org/Course\">"));
}

#[tokio::test]
async fn whole_vocabulary_without_rdfa_falls_back_to_json() {
    let reply = get("/api/schema?format=rdfa", None).await;

    assert_eq!(reply.content_type, "application/json");
    let body = json(&reply);
    assert_eq!(body["version"], "1.0.0");
    assert!(body["classes"]["Course"].is_object());
}

#[tokio::test]
async fn unknown_class_is_a_404_with_error_body() {
    let reply = get("/api/schema/class/Nope?format=turtle", None).await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    let body = json(&reply);
    assert_eq!(body["error"]["code"], "entity_not_found");
    assert_eq!(body["error"]["message"], "class 'Nope' not found");
}

#[tokio::test]
async fn names_are_case_sensitive() {
    let reply = get("/api/schema/property/CourseIdentifier", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn class_index_lists_summaries_in_declaration_order() {
    let reply = get("/api/schema/class", None).await;

    assert_eq!(reply.status, StatusCode::OK);
    let body = json(&reply);
    let first = &body[0];
    assert_eq!(first["name"], "Resource");
    assert_eq!(first["label"], "Resource");
    assert_eq!(first["url"], "/schema/class/Resource");
}

#[tokio::test]
async fn property_index_links_each_property() {
    let body = json(&get("/api/schema/property", None).await);
    let entries = body.as_array().unwrap();
    assert!(
        entries
            .iter()
            .any(|entry| entry["url"] == "/schema/property/courseIdentifier")
    );
}

#[tokio::test]
async fn health_endpoints_respond() {
    let liveness = get("/health", None).await;
    assert_eq!(liveness.status, StatusCode::OK);
    assert_eq!(json(&liveness)["status"], "healthy");

    let readiness = get("/ready", None).await;
    assert_eq!(readiness.status, StatusCode::OK);
    assert_eq!(json(&readiness)["ready"], true);

    let components = json(&get("/health/components", None).await);
    assert!(components["components"]["vocabulary"]["details"]["classes"].as_u64() > Some(0));
    assert!(components["components"]["render_cache"].is_object());
}

#[tokio::test]
async fn metrics_endpoint_exposes_counters() {
    get("/api/schema/class/Course?format=turtle", None).await;
    let reply = get("/metrics", None).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("oer_conversions_total"));
    assert!(reply.body.contains("oer_http_requests_total"));
}

#[tokio::test]
async fn unknown_route_is_a_404() {
    let reply = get("/api/nothing", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    let body = json(&reply);
    assert_eq!(body["error"]["code"], "route_not_found");
    assert_eq!(body["error"]["message"], "no endpoint at /api/nothing");
}

#[tokio::test]
async fn requests_are_not_left_in_flight() {
    let (router, coordinator) = app();
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/schema/class/Course")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(coordinator.active_request_count(), 0);
}
