//! HTTP API application wiring (Axum router + service wiring).
//!
//! This folder is structured like:
//! - `services.rs`: infrastructure wiring (store, directory, engine, catalog)
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use toolcrib_auth::InMemoryUserDirectory;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// The directory doubles as the identity source for the middleware and
/// the username resolver for views, so the caller seeds it before or
/// after building; lookups go through the shared handle either way.
pub fn build_app(directory: Arc<InMemoryUserDirectory>) -> Router {
    let auth_state = middleware::AuthState {
        directory: directory.clone(),
    };

    let services = Arc::new(services::build_services(directory));

    // Protected routes: require a resolved actor identity.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::identity_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", protected)
        .layer(ServiceBuilder::new())
}
