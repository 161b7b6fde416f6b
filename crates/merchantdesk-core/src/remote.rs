//! Remote merchant service client
//!
//! [`MerchantRemote`] is the seam the store talks through. The HTTP
//! implementation normalizes whatever entity shape the backend returns into
//! [`Merchant`]; [`OfflineRemote`] always fails so every call falls back.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::models::{Address, Merchant, MerchantDraft, Transaction};
use super::types::MerchantStatus;

const LIST_PAGE_SIZE: &str = "1000";

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Remote returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("No merchant service configured")]
    Unavailable,

    #[error("Invalid base URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::Status { status: 404, .. })
    }
}

/// Operations the remote merchant service offers
#[async_trait]
pub trait MerchantRemote: Send + Sync {
    async fn list(&self) -> Result<Vec<Merchant>, RemoteError>;

    async fn get(&self, key: &str) -> Result<Merchant, RemoteError>;

    async fn create(&self, draft: &MerchantDraft) -> Result<Merchant, RemoteError>;

    async fn update(&self, key: &str, patch: &MerchantDraft) -> Result<Merchant, RemoteError>;

    async fn delete(&self, key: &str) -> Result<(), RemoteError>;

    async fn transactions(&self, key: &str) -> Result<Vec<Transaction>, RemoteError>;
}

/// Remote that is never reachable
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRemote;

#[async_trait]
impl MerchantRemote for OfflineRemote {
    async fn list(&self) -> Result<Vec<Merchant>, RemoteError> {
        Err(RemoteError::Unavailable)
    }

    async fn get(&self, _key: &str) -> Result<Merchant, RemoteError> {
        Err(RemoteError::Unavailable)
    }

    async fn create(&self, _draft: &MerchantDraft) -> Result<Merchant, RemoteError> {
        Err(RemoteError::Unavailable)
    }

    async fn update(&self, _key: &str, _patch: &MerchantDraft) -> Result<Merchant, RemoteError> {
        Err(RemoteError::Unavailable)
    }

    async fn delete(&self, _key: &str) -> Result<(), RemoteError> {
        Err(RemoteError::Unavailable)
    }

    async fn transactions(&self, _key: &str) -> Result<Vec<Transaction>, RemoteError> {
        Err(RemoteError::Unavailable)
    }
}

/// JSON-over-HTTP client for `{base}/merchants`
#[derive(Debug, Clone)]
pub struct HttpMerchantRemote {
    client: Client,
    base_url: Url,
}

impl HttpMerchantRemote {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let invalid = |message: String| RemoteError::InvalidUrl {
            url: base_url.to_string(),
            message,
        };
        let base_url = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidUrl {
                url: self.base_url.to_string(),
                message: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MerchantRemote for HttpMerchantRemote {
    async fn list(&self) -> Result<Vec<Merchant>, RemoteError> {
        let url = self.endpoint(&["merchants"])?;
        let request = self
            .client
            .get(url)
            .query(&[("page", "1"), ("size", LIST_PAGE_SIZE)]);
        let envelope: ListEnvelope = Self::decode(self.send(request).await?).await?;
        Ok(envelope.into_records())
    }

    async fn get(&self, key: &str) -> Result<Merchant, RemoteError> {
        let url = self.endpoint(&["merchants", key])?;
        let entity: RemoteMerchant = Self::decode(self.send(self.client.get(url)).await?).await?;
        Ok(entity.into())
    }

    async fn create(&self, draft: &MerchantDraft) -> Result<Merchant, RemoteError> {
        let url = self.endpoint(&["merchants"])?;
        let request = self.client.post(url).json(draft);
        let entity: RemoteMerchant = Self::decode(self.send(request).await?).await?;
        Ok(entity.into())
    }

    async fn update(&self, key: &str, patch: &MerchantDraft) -> Result<Merchant, RemoteError> {
        let url = self.endpoint(&["merchants", key])?;
        let request = self.client.put(url).json(patch);
        let entity: RemoteMerchant = Self::decode(self.send(request).await?).await?;
        Ok(entity.into())
    }

    async fn delete(&self, key: &str) -> Result<(), RemoteError> {
        let url = self.endpoint(&["merchants", key])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn transactions(&self, key: &str) -> Result<Vec<Transaction>, RemoteError> {
        let url = self.endpoint(&["merchants", key, "transactions"])?;
        let envelope: TransactionEnvelope = Self::decode(self.send(self.client.get(url)).await?).await?;
        Ok(match envelope {
            TransactionEnvelope::Bare(list) => list,
            TransactionEnvelope::Wrapped { transactions } => transactions,
        })
    }
}

// ==================== Wire shapes ====================

#[derive(Deserialize)]
#[serde(untagged)]
enum ListEnvelope {
    Bare(Vec<RemoteMerchant>),
    Items { items: Vec<RemoteMerchant> },
    Content { content: Vec<RemoteMerchant> },
}

impl ListEnvelope {
    fn into_records(self) -> Vec<Merchant> {
        let entities = match self {
            ListEnvelope::Bare(list) => list,
            ListEnvelope::Items { items } => items,
            ListEnvelope::Content { content } => content,
        };
        entities.into_iter().map(Merchant::from).collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TransactionEnvelope {
    Bare(Vec<Transaction>),
    Wrapped { transactions: Vec<Transaction> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RemoteAddress {
    Structured(Address),
    Line(String),
}

/// Merchant entity as the backend sends it
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RemoteMerchant {
    #[serde(deserialize_with = "lenient_id")]
    id: Option<u64>,
    #[serde(deserialize_with = "lenient_id")]
    internal_id: Option<u64>,
    #[serde(deserialize_with = "lenient_string")]
    merchant_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    phone: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    business_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    category: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    registration_number: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    business_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    registered_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pan_vat_number: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    registration_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    approx_annual_turnover: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    approx_digital_sale: Option<String>,
    address: Option<RemoteAddress>,
    #[serde(deserialize_with = "lenient_string")]
    status: Option<String>,
    #[serde(deserialize_with = "lenient_timestamp")]
    created_at: Option<String>,
    #[serde(deserialize_with = "lenient_timestamp")]
    updated_at: Option<String>,
}

impl From<RemoteMerchant> for Merchant {
    fn from(entity: RemoteMerchant) -> Self {
        let id = entity.id.or(entity.internal_id).unwrap_or(0);
        let merchant_id = entity
            .merchant_id
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| id.to_string());
        let address = entity.address.and_then(|address| match address {
            RemoteAddress::Structured(address) => Some(address),
            RemoteAddress::Line(line) if line.trim().is_empty() => None,
            RemoteAddress::Line(line) => Some(Address {
                street: Some(line),
                ..Default::default()
            }),
        });

        Merchant {
            id,
            merchant_id,
            name: entity.name.unwrap_or_default(),
            email: entity.email.unwrap_or_default(),
            phone: entity.phone,
            business_name: entity.business_name,
            category: entity.category,
            registration_number: entity.registration_number,
            business_type: entity.business_type,
            registered_name: entity.registered_name,
            pan_vat_number: entity.pan_vat_number,
            registration_date: entity.registration_date,
            approx_annual_turnover: entity.approx_annual_turnover,
            approx_digital_sale: entity.approx_digital_sale,
            address,
            status: entity.status.as_deref().and_then(MerchantStatus::normalize),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Timestamps arrive as ISO strings, epoch numbers (seconds with a fraction,
/// or milliseconds) or `[y, m, d, h, min, s, nanos]` arrays.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(Value::String(s)) => return Ok(Some(s)),
        Some(Value::Number(n)) => n.as_f64().and_then(from_epoch),
        Some(Value::Array(parts)) => from_parts(&parts),
        _ => None,
    };
    Ok(parsed.map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true)))
}

fn from_epoch(value: f64) -> Option<DateTime<Utc>> {
    // Anything past the year 5138 in seconds is read as milliseconds
    let millis = if value.abs() < 1e11 { value * 1000.0 } else { value };
    DateTime::from_timestamp_millis(millis.round() as i64)
}

fn from_parts(parts: &[Value]) -> Option<DateTime<Utc>> {
    let part = |i: usize| parts.get(i).and_then(Value::as_u64).unwrap_or(0) as u32;
    let year = parts.first()?.as_i64()? as i32;
    NaiveDate::from_ymd_opt(year, part(1), part(2))?
        .and_hms_nano_opt(part(3), part(4), part(5), part(6))
        .map(|naive| naive.and_utc())
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/v1", addr)
    }

    fn remote(base: &str) -> HttpMerchantRemote {
        HttpMerchantRemote::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_normalizes_backend_entity() {
        let entity: RemoteMerchant = serde_json::from_value(json!({
            "internalId": 12,
            "merchantId": "MRC0000ABCD",
            "name": "Kathmandu Mart",
            "email": "sales@ktm.com.np",
            "address": "Durbar Marg, Kathmandu",
            "status": "SUSPENDED",
            "createdAt": 1763908633.922,
            "updatedAt": [2025, 11, 23, 14, 37, 13, 922000000]
        }))
        .unwrap();
        let merchant = Merchant::from(entity);

        assert_eq!(merchant.id, 12);
        assert_eq!(merchant.merchant_id, "MRC0000ABCD");
        assert_eq!(merchant.status, Some(MerchantStatus::Deactivated));
        assert_eq!(
            merchant.address.unwrap().street.as_deref(),
            Some("Durbar Marg, Kathmandu")
        );
        assert_eq!(merchant.created_at.as_deref(), Some("2025-11-23T14:37:13.922Z"));
        assert_eq!(merchant.updated_at.as_deref(), Some("2025-11-23T14:37:13.922Z"));
    }

    #[test]
    fn test_merchant_id_falls_back_to_id() {
        let entity: RemoteMerchant =
            serde_json::from_value(json!({"id": "7", "name": "X", "status": "Active"})).unwrap();
        let merchant = Merchant::from(entity);
        assert_eq!(merchant.id, 7);
        assert_eq!(merchant.merchant_id, "7");
        assert!(merchant.is_active());

        let bare: RemoteMerchant = serde_json::from_value(json!({})).unwrap();
        let merchant = Merchant::from(bare);
        assert_eq!(merchant.id, 0);
        assert_eq!(merchant.merchant_id, "0");
        assert_eq!(merchant.status, None);
    }

    #[test]
    fn test_list_envelopes() {
        for body in [
            json!([{"id": 1}, {"id": 2}]),
            json!({"items": [{"id": 1}, {"id": 2}], "total": 2}),
            json!({"content": [{"id": 1}, {"id": 2}], "totalElements": 2}),
        ] {
            let envelope: ListEnvelope = serde_json::from_value(body.clone()).unwrap();
            let ids: Vec<u64> = envelope.into_records().iter().map(|m| m.id).collect();
            assert_eq!(ids, vec![1, 2], "{}", body);
        }
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpMerchantRemote::new("not a url", Duration::from_secs(1)),
            Err(RemoteError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let remote = remote("http://localhost:8080/api/v1/");
        let url = remote.endpoint(&["merchants", "a b", "transactions"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/v1/merchants/a%20b/transactions"
        );
    }

    #[tokio::test]
    async fn test_http_list_and_get() {
        let app = Router::new()
            .route(
                "/api/v1/merchants",
                get(|| async { Json(json!({"items": [{"id": 1, "name": "A", "status": "ACTIVE"}]})) }),
            )
            .route(
                "/api/v1/merchants/:id",
                get(|Path(id): Path<String>| async move {
                    if id == "1" {
                        Ok(Json(json!({"id": 1, "name": "A"})))
                    } else {
                        Err((StatusCode::NOT_FOUND, "missing"))
                    }
                }),
            );
        let remote = remote(&serve(app).await);

        let list = remote.list().await.unwrap();
        assert_eq!(list.len(), 1);
        assert!(list[0].is_active());

        assert_eq!(remote.get("1").await.unwrap().name, "A");
        let err = remote.get("2").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_http_create_sends_draft() {
        let app = Router::new().route(
            "/api/v1/merchants",
            axum::routing::post(|Json(body): Json<Value>| async move {
                (
                    StatusCode::CREATED,
                    Json(json!({"id": 44, "merchantId": "MRC00000044", "name": body["name"]})),
                )
            }),
        );
        let remote = remote(&serve(app).await);

        let draft = MerchantDraft {
            name: Some("Created".to_string()),
            ..Default::default()
        };
        let created = remote.create(&draft).await.unwrap();
        assert_eq!(created.id, 44);
        assert_eq!(created.name, "Created");
    }

    #[tokio::test]
    async fn test_http_update_and_delete_target_merchant_path() {
        let app = Router::new().route(
            "/api/v1/merchants/:id",
            axum::routing::put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                Json(json!({"id": id.parse::<i64>().unwrap_or(0), "name": body["name"], "status": "inactive"}))
            })
            .delete(|Path(id): Path<String>| async move {
                if id == "7" {
                    (StatusCode::NO_CONTENT, String::new())
                } else {
                    (StatusCode::CONFLICT, format!("merchant {} has open transactions", id))
                }
            }),
        );
        let remote = remote(&serve(app).await);

        let patch = MerchantDraft {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = remote.update("7", &patch).await.unwrap();
        assert_eq!(updated.id, 7);
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.status, Some(MerchantStatus::Inactive));

        remote.delete("7").await.unwrap();
        match remote.delete("8").await {
            Err(RemoteError::Status { status, body }) => {
                assert_eq!(status, 409);
                assert_eq!(body, "merchant 8 has open transactions");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_server_error_and_bad_body() {
        let app = Router::new()
            .route(
                "/api/v1/merchants",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route(
                "/api/v1/merchants/:id/transactions",
                get(|| async { "not json" }),
            );
        let remote = remote(&serve(app).await);

        match remote.list().await {
            Err(RemoteError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {:?}", other.map(|l| l.len())),
        }
        assert!(matches!(
            remote.transactions("1").await,
            Err(RemoteError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_http_transactions_envelope() {
        let app = Router::new().route(
            "/api/v1/merchants/:id/transactions",
            get(|| async {
                Json(json!({"transactions": [
                    {"txnId": "T-1", "timestamp": "2025-11-23T10:00:00Z", "amount": "10.50",
                     "currency": "USD", "status": "SUCCESS"}
                ]}))
            }),
        );
        let remote = remote(&serve(app).await);
        let txns = remote.transactions("1").await.unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].amount.to_string(), "10.50");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let remote = remote(&format!("http://{}", addr));
        assert!(matches!(remote.list().await, Err(RemoteError::Transport(_))));
    }

    #[tokio::test]
    async fn test_offline_remote_always_fails() {
        let remote = OfflineRemote;
        assert!(matches!(remote.list().await, Err(RemoteError::Unavailable)));
        assert!(remote.delete("1").await.is_err());
    }
}
