//! End-to-end router tests: requests go through the axum router and the
//! response documents are checked on the wire.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use jsonapi_sdk::{
    common_routes, resource_routes, AppState, DefaultController, DocumentBuilder, InMemoryStore,
    JsonApiController, Registry, ResourceDescriptor, ResourceStore, Rule, RuleSet, RuleValidator,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

fn users_app() -> Router {
    let store = Arc::new(InMemoryStore::new());
    let engine = Arc::new(RuleValidator::new(store.clone() as Arc<dyn ResourceStore>));

    let mut registry = Registry::new();
    let users = registry.register(
        ResourceDescriptor::new("user", "users").with_fields(&["name", "email", "settings_json"]),
    );

    let mut rules = RuleSet::new();
    rules.insert("name".into(), vec![Rule::Required]);
    rules.insert(
        "email".into(),
        vec![Rule::Required, Rule::Email, Rule::Unique { ignore_id: None }],
    );

    let builder = DocumentBuilder::new(
        users,
        Arc::new(registry),
        store as Arc<dyn ResourceStore>,
        engine,
    )
    .with_rules(rules);

    let mut controllers: HashMap<String, Arc<dyn JsonApiController>> = HashMap::new();
    controllers.insert("users".into(), Arc::new(DefaultController::new(builder)));

    Router::new()
        .merge(common_routes())
        .merge(resource_routes(AppState::new(controllers)))
}

/// A controller that overrides nothing, so every route answers the 501
/// fallback document.
struct Unimplemented;

#[async_trait::async_trait]
impl JsonApiController for Unimplemented {}

fn stub_app() -> Router {
    let mut controllers: HashMap<String, Arc<dyn JsonApiController>> = HashMap::new();
    controllers.insert("gadgets".into(), Arc::new(Unimplemented));
    resource_routes(AppState::new(controllers))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_body(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_and_version_respond() {
    let app = users_app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));

    let (status, body) = send(&app, get("/version")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("jsonapi-sdk"));
}

#[tokio::test]
async fn unknown_type_answers_a_404_error_document() {
    let app = users_app();
    let (status, body) = send(&app, get("/gadgets")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"][0]["status"], json!("404"));
    assert_eq!(body["meta"]["status"], json!("404"));
    assert!(body.as_object().unwrap().get("data").is_none());
}

#[tokio::test]
async fn create_then_fetch_round_trip() {
    let app = users_app();

    let (status, body) = send(
        &app,
        with_body(
            "POST",
            "/users",
            json!({"data": {"type": "user", "attributes": {"name": "Rick", "email": "rick@x.com"}}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], json!("1"));
    assert_eq!(body["meta"]["detail"], json!("The user was created."));

    let (status, body) = send(&app, get("/users/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["type"], json!("user"));
    assert_eq!(body["data"]["attributes"]["name"], json!("Rick"));
    assert_eq!(body["data"]["links"]["self"], json!("/user/1"));
    assert_eq!(body["links"]["collection"], json!("/users"));

    let (status, body) = send(&app, get("/users")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], json!(1));
    assert_eq!(body["links"]["self"], json!("/users?page=1"));
    assert_eq!(body["links"]["prev"], Value::Null);
}

#[tokio::test]
async fn blob_fields_decode_on_the_way_out() {
    let app = users_app();

    send(
        &app,
        with_body(
            "POST",
            "/users",
            json!({"data": {"attributes": {
                "name": "Rick",
                "email": "rick@x.com",
                "settings_json": {"theme": "dark"}
            }}}),
        ),
    )
    .await;

    let (_, body) = send(&app, get("/users/1")).await;
    // Stored as an encoded blob, exposed as the structured value again.
    assert_eq!(
        body["data"]["attributes"]["settings_json"],
        json!({"theme": "dark"})
    );
}

#[tokio::test]
async fn invalid_create_answers_422_without_data() {
    let app = users_app();
    let (status, body) = send(
        &app,
        with_body(
            "POST",
            "/users",
            json!({"data": {"attributes": {"name": "Rick", "email": "nope"}}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["title"], json!("Input validation has failed"));
    assert_eq!(
        body["errors"][0]["detail"],
        json!("The email must be a valid email address.")
    );
    assert!(body.as_object().unwrap().get("data").is_none());
}

#[tokio::test]
async fn malformed_element_ids_take_the_not_found_path() {
    let app = users_app();
    let (status, body) = send(&app, get("/users/not-a-number")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["errors"][0]["detail"],
        json!("The user could not be found.")
    );
}

#[tokio::test]
async fn bulk_replace_swaps_the_collection_over_http() {
    let app = users_app();
    send(
        &app,
        with_body(
            "POST",
            "/users",
            json!({"data": {"attributes": {"name": "Old", "email": "old@x.com"}}}),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        with_body(
            "PUT",
            "/users",
            json!({"data": [
                {"attributes": {"name": "A", "email": "a@x.com"}},
                {"attributes": {"name": "B", "email": "b@x.com"}}
            ]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["meta"]["count"], json!(2));
    assert_eq!(body["data"], json!([]));

    let (_, body) = send(&app, get("/users")).await;
    assert_eq!(body["meta"]["count"], json!(2));
}

#[tokio::test]
async fn element_delete_then_fetch_is_gone() {
    let app = users_app();
    send(
        &app,
        with_body(
            "POST",
            "/users",
            json!({"data": {"attributes": {"name": "Rick", "email": "rick@x.com"}}}),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri("/users/1")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["detail"], json!("The user was deleted."));

    let (status, _) = send(&app, get("/users/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unoverridden_operations_answer_the_501_document() {
    let app = stub_app();

    let (status, body) = send(&app, get("/gadgets")).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["errors"][0]["status"], json!("501"));
    assert_eq!(
        body["errors"][0]["detail"],
        json!("This feature is not yet implemented.")
    );
    assert_eq!(body["meta"]["title"], json!("Not Implemented"));
    assert!(body.as_object().unwrap().get("data").is_none());

    let (status, _) = send(
        &app,
        with_body(
            "POST",
            "/gadgets",
            json!({"data": {"attributes": {"name": "x"}}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
}
