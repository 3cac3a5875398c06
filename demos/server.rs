//! Demo server: registers a `users` resource over the in-memory store and
//! mounts the common and resource routes.

use jsonapi_sdk::{
    common_routes, resource_routes, AppState, DefaultController, DocumentBuilder, InMemoryStore,
    Registry, ResourceDescriptor, Rule, RuleSet, RuleValidator,
};
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jsonapi_sdk=info".parse()?))
        .init();

    let store = Arc::new(InMemoryStore::new());
    let engine = Arc::new(RuleValidator::new(store.clone()));

    let mut registry = Registry::new();
    let users = registry.register(
        ResourceDescriptor::new("user", "users").with_fields(&["name", "email", "settings_json"]),
    );
    let registry = Arc::new(registry);

    let mut rules = RuleSet::new();
    rules.insert("name".into(), vec![Rule::Required, Rule::MaxLength(255)]);
    rules.insert(
        "email".into(),
        vec![Rule::Required, Rule::Email, Rule::Unique { ignore_id: None }],
    );

    let builder = DocumentBuilder::new(users, registry, store, engine).with_rules(rules);
    let mut controllers: HashMap<String, Arc<dyn jsonapi_sdk::JsonApiController>> = HashMap::new();
    controllers.insert("users".into(), Arc::new(DefaultController::new(builder)));
    let state = AppState::new(controllers);

    let app = Router::new()
        .merge(common_routes())
        .merge(resource_routes(state));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
