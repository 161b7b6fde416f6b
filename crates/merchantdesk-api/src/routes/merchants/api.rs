//! Merchant API endpoints
//!
//! Endpoints:
//! - api_merchants: Filtered, sorted, paginated merchant list (JSON)
//! - api_merchant_detail: Single merchant by id or merchant id (JSON)
//! - api_merchant_create: Create merchant (JSON)
//! - api_merchant_update: Update merchant (JSON)
//! - api_merchant_delete: Delete merchant, soft delete when offline (JSON)

use crate::{ApiError, AppState};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use merchantdesk_config::Config;
use merchantdesk_core::{
    validate_changes, validate_new, view, CoreError, DeleteOutcome, Merchant, MerchantDraft, SortField,
    SortOrder, StatusFilter, ViewResult, ViewSpec,
};
use merchantdesk_utils::page_range_label;
use serde::Serialize;
use std::collections::HashMap;

/// List response: the view plus the values the pager renders
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantListResponse {
    #[serde(flatten)]
    pub result: ViewResult,
    pub page_size: usize,
    pub range_label: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub outcome: DeleteOutcome,
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

fn parse_param<T: std::str::FromStr>(
    params: &HashMap<String, String>,
    name: &str,
) -> Result<Option<T>, ApiError> {
    match param(params, name) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("Invalid value for '{}': {}", name, raw))),
        None => Ok(None),
    }
}

fn parse_date(params: &HashMap<String, String>, name: &str) -> Result<Option<NaiveDate>, ApiError> {
    match param(params, name) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                ApiError::bad_request(format!("Invalid date for '{}': {} (expected YYYY-MM-DD)", name, raw))
            }),
        None => Ok(None),
    }
}

/// Build a view request from `q`, `status`, `from`, `to`, `sort`, `order`,
/// `page` and `size`, with configured defaults for what is missing.
pub fn view_spec_from_params(
    params: &HashMap<String, String>,
    config: &Config,
) -> Result<ViewSpec, ApiError> {
    Ok(ViewSpec {
        search: param(params, "q").unwrap_or_default().to_string(),
        status: parse_param::<StatusFilter>(params, "status")?.unwrap_or_default(),
        from_date: parse_date(params, "from")?,
        to_date: parse_date(params, "to")?,
        sort_field: parse_param::<SortField>(params, "sort")?
            .unwrap_or(config.view.default_sort_field),
        sort_order: parse_param::<SortOrder>(params, "order")?
            .unwrap_or(config.view.default_sort_order),
        page: parse_param(params, "page")?.unwrap_or(1),
        page_size: parse_param(params, "size")?.unwrap_or(config.pagination.default_page_size),
    })
}

/// Get merchants with filtering, sorting and pagination (JSON API)
pub async fn api_merchants(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<MerchantListResponse>, ApiError> {
    let spec = view_spec_from_params(&params, &state.config)?;
    let collection = state.store.fetch_all().await;
    let result = view(&collection, &spec);

    let page_size = spec.page_size.max(1);
    let range_label = page_range_label(result.current_page, page_size, result.total);
    Ok(Json(MerchantListResponse {
        result,
        page_size,
        range_label,
    }))
}

/// Get single merchant (JSON API)
pub async fn api_merchant_detail(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> Result<Json<Merchant>, ApiError> {
    let key = path.0;
    state
        .store
        .fetch_one(&key)
        .await
        .map(Json)
        .ok_or_else(|| CoreError::not_found(key).into())
}

/// Create merchant (JSON API)
pub async fn api_merchant_create(
    state: axum::extract::State<AppState>,
    body: Json<MerchantDraft>,
) -> Result<(StatusCode, Json<Merchant>), ApiError> {
    let draft = body.0.trimmed();
    validate_new(&draft)?;

    let merchant = state.store.create(draft).await?;
    Ok((StatusCode::CREATED, Json(merchant)))
}

/// Update merchant (JSON API)
pub async fn api_merchant_update(
    state: axum::extract::State<AppState>,
    path: Path<String>,
    body: Json<MerchantDraft>,
) -> Result<Json<Merchant>, ApiError> {
    let key = path.0;
    let patch = body.0.trimmed();
    validate_changes(&patch)?;

    match state.store.update(&key, patch).await? {
        Some(merchant) => Ok(Json(merchant)),
        None => Err(CoreError::not_found(key).into()),
    }
}

/// Delete merchant (JSON API). Always answers 200.
pub async fn api_merchant_delete(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> Json<DeleteResponse> {
    let outcome = state.store.delete(&path.0).await;
    let message = match outcome {
        DeleteOutcome::Remote | DeleteOutcome::SoftDeleted => "Merchant deleted",
        DeleteOutcome::Unsaved => "Merchant delete accepted, local mirror not updated",
        DeleteOutcome::NotFound => "Merchant already removed",
    };
    Json(DeleteResponse {
        message: message.to_string(),
        outcome,
    })
}
