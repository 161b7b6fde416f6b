//! Transactions API endpoints
//!
//! Endpoints:
//! - api_merchant_transactions: Transaction history of a merchant (JSON)
//! - api_transactions_export: Same history as a CSV attachment

use crate::AppState;
use axum::extract::Path;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use merchantdesk_core::export::{attachment_disposition, export_filename, transactions_csv};
use merchantdesk_core::{Merchant, Transaction};

/// Get transactions of a merchant (JSON API). Empty when the merchant
/// service is unreachable.
pub async fn api_merchant_transactions(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> Json<Vec<Transaction>> {
    Json(state.store.transactions(&path.0).await)
}

/// Export transactions of a merchant as `<name>-transactions.csv`
pub async fn api_transactions_export(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> impl IntoResponse {
    let key = path.0;
    let merchant = state.store.fetch_one(&key).await.unwrap_or_else(Merchant::default);
    let transactions = state.store.transactions(&key).await;

    log::info!(
        "Exporting {} transactions of merchant {}",
        transactions.len(),
        key
    );

    let disposition = attachment_disposition(&export_filename(&merchant));
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        transactions_csv(&transactions),
    )
}
