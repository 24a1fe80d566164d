//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage and domain service wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request bodies and response envelopes
//! - `errors.rs`: shared response helpers

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(router(Arc::new(services)))
}

/// Assemble routes and layers around already-built services.
pub fn router(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        tokens: services.tokens.clone(),
    };

    // Admin-only routes: the role gate runs inside the auth layer below.
    let admin = Router::new()
        .merge(routes::collaborators::router())
        .merge(routes::posts::admin_router())
        .route_layer(axum::middleware::from_fn(middleware::admin_only));

    // Protected routes: any verified session.
    let protected = Router::new()
        .merge(routes::posts::router())
        .merge(admin)
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/pingoflife", get(routes::system::heartbeat))
        .merge(routes::auth::router())
        .nest("/reblog", protected)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_trace))
                .layer(Extension(services)),
        )
}
