//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: backing services (store selection, token codec, chat client)
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;

use supplyline_auth::TokenCodec;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(jwt_secret: String) -> Router {
    let tokens = Arc::new(TokenCodec::new(&jwt_secret));
    let services = Arc::new(services::build_services(tokens.clone()).await);
    build_router(services, tokens)
}

/// Wire the router around prebuilt services. Split from [`build_app`] so
/// tests can inject their own store and chat endpoint.
pub fn build_router(services: Arc<services::AppServices>, tokens: Arc<TokenCodec>) -> Router {
    let auth_state = middleware::AuthState { tokens };

    // Protected routes: require a bearer token.
    let protected = routes::router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .layer(Extension(services))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
