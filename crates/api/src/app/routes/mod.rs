use axum::{routing::get, Router};

pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod inventory;
pub mod movements;
pub mod orders;
pub mod products;
pub mod suppliers;
pub mod system;
pub mod warehouses;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/auth/profile", get(auth::profile))
        .nest("/products", products::router())
        .nest("/suppliers", suppliers::router())
        .nest("/warehouses", warehouses::router())
        .nest("/inventory", inventory::router())
        .nest("/inventory-movements", movements::router())
        .nest("/purchase-orders", orders::router())
        .nest("/statistics", dashboard::router())
        .nest("/api/ai", chat::router())
}
