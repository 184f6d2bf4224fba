use std::sync::Arc;

use supplyline_ai::ChatClient;
use supplyline_auth::TokenCodec;
use supplyline_store::{MemoryStore, PgStore, Store};

/// Shared backing services, wired once at startup and handed to every
/// handler via an `Extension` layer.
pub struct AppServices {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenCodec>,
    pub chat: ChatClient,
}

/// Assemble the service bundle around the store the environment selects.
pub async fn build_services(tokens: Arc<TokenCodec>) -> AppServices {
    let store = select_store().await;

    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
    let chat = match std::env::var("GEMINI_API_URL") {
        Ok(endpoint) => ChatClient::with_endpoint(endpoint, api_key),
        Err(_) => ChatClient::new(api_key),
    };

    AppServices {
        store,
        tokens,
        chat,
    }
}

/// Select the store backend. `USE_PERSISTENT_STORE=true` switches to
/// Postgres (requires `DATABASE_URL`); anything else runs fully in memory.
/// Also used by the `seed` binary so it writes to the same place.
pub async fn select_store() -> Arc<dyn Store> {
    if persistent_store_requested() {
        let url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set when USE_PERSISTENT_STORE=true");
        let store = PgStore::connect(&url)
            .await
            .expect("failed to connect to Postgres");
        tracing::info!("using Postgres store");
        Arc::new(store)
    } else {
        tracing::info!("using in-memory store");
        Arc::new(MemoryStore::default())
    }
}

fn persistent_store_requested() -> bool {
    std::env::var("USE_PERSISTENT_STORE")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
