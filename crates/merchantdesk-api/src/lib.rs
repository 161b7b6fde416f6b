//! JSON API server for the merchant dashboard
//!
//! Routes are organized into modules:
//! - routes::merchants: Merchant list, detail, create, update, delete
//! - routes::transactions: Transaction history and CSV export

pub mod error;
pub mod routes;

use axum::{
    routing::get,
    Json, Router,
};
use merchantdesk_config::Config;
use merchantdesk_core::{ResilientStore, StatusSummary};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ResilientStore>,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::merchants::{
        api_merchant_create, api_merchant_delete, api_merchant_detail, api_merchant_update,
        api_merchants,
    };
    use routes::transactions::{api_merchant_transactions, api_transactions_export};

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/summary", get(api_summary))
        .route("/api/merchants", get(api_merchants).post(api_merchant_create))
        .route(
            "/api/merchants/:key",
            get(api_merchant_detail)
                .put(api_merchant_update)
                .delete(api_merchant_delete),
        )
        .route("/api/merchants/:key/transactions", get(api_merchant_transactions))
        .route(
            "/api/merchants/:key/transactions/export",
            get(api_transactions_export),
        )
        // the dashboard front end is served from another origin
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Merchant counts per status (JSON API)
async fn api_summary(state: axum::extract::State<AppState>) -> Json<StatusSummary> {
    let merchants = state.store.fetch_all().await;
    Json(StatusSummary::from_records(&merchants))
}

/// Bind the configured address and serve until Ctrl-C
pub async fn start_server(config: Config, store: Arc<ResilientStore>) -> std::io::Result<()> {
    let addr = config.bind_address();
    let state = AppState { store, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting merchantdesk server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - /api/merchants (List, create)");
    log::info!("  - /api/merchants/:key (Detail, update, delete)");
    log::info!("  - /api/merchants/:key/transactions[/export] (History, CSV)");
    log::info!("  - /api/summary (Counts per status)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

// ==================== Tests ====================
