use std::sync::Arc;

use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};

use supplyline_ai::{APOLOGY, ContextSnapshot, RECENT_MOVEMENTS, RECENT_ORDERS};
use supplyline_core::{DomainResult, PageQuery};
use supplyline_store::Store;

use crate::app::dto;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/chat", post(chat))
}

/// Always answers 200. Failures while snapshotting the store or talking to
/// the model collapse into the canned apology so the main workflows never
/// depend on this endpoint working.
pub async fn chat(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ChatRequest>,
) -> axum::response::Response {
    let response = match snapshot(services.store.as_ref()).await {
        Ok(snapshot) => services.chat.ask(&snapshot, &body.message).await,
        Err(err) => {
            tracing::error!(error = %err, "failed to snapshot store for chat");
            APOLOGY.to_string()
        }
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({ "response": response })),
    )
        .into_response()
}

async fn snapshot(store: &dyn Store) -> DomainResult<ContextSnapshot> {
    let everything = PageQuery::new(0, 200);
    Ok(ContextSnapshot {
        products: store.list_products(everything, None).await?.items,
        warehouses: store.list_warehouses(None).await?,
        suppliers: store.list_suppliers(None).await?,
        items: store.list_items(everything, None).await?.items,
        orders: store
            .list_orders(PageQuery::new(0, RECENT_ORDERS as u32))
            .await?
            .items,
        movements: store
            .list_movements(PageQuery::new(0, RECENT_MOVEMENTS as u32))
            .await?
            .items,
    })
}
