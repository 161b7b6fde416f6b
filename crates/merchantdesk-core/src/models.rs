//! Core data models for merchants and their transactions

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::time::parse_timestamp;
use super::types::{deserialize_status, MerchantStatus};

/// Postal address; every part is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
}

impl Address {
    /// Comma-separated non-empty parts, street first
    pub fn one_line(&self) -> String {
        [
            &self.street,
            &self.ward,
            &self.city,
            &self.district,
            &self.province,
            &self.country,
        ]
        .iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Merchant record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    /// Process-local identifier, unique within the store
    #[serde(default)]
    pub id: u64,
    /// Stable external identifier
    #[serde(default)]
    pub merchant_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_vat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approx_annual_turnover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approx_digital_sale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(
        default,
        deserialize_with = "deserialize_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<MerchantStatus>,
    /// ISO-8601 creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// ISO-8601 last-update timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Merchant {
    /// Build a record from a draft. Status defaults to active.
    pub fn from_draft(id: u64, merchant_id: String, draft: MerchantDraft, now: &str) -> Self {
        let mut merchant = Merchant {
            id,
            merchant_id,
            status: Some(MerchantStatus::Active),
            created_at: Some(now.to_string()),
            updated_at: Some(now.to_string()),
            ..Default::default()
        };
        merchant.apply(draft);
        merchant
    }

    /// Shallow merge: every field present in the draft replaces the current one.
    /// `id` and timestamps are never taken from a draft.
    pub fn apply(&mut self, draft: MerchantDraft) {
        let MerchantDraft {
            merchant_id,
            name,
            email,
            phone,
            business_name,
            category,
            registration_number,
            business_type,
            registered_name,
            pan_vat_number,
            registration_date,
            approx_annual_turnover,
            approx_digital_sale,
            address,
            status,
        } = draft;

        if let Some(merchant_id) = merchant_id {
            self.merchant_id = merchant_id;
        }
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(status) = status {
            self.status = Some(status);
        }
        if address.is_some() {
            self.address = address;
        }

        let optional_fields = [
            (&mut self.phone, phone),
            (&mut self.business_name, business_name),
            (&mut self.category, category),
            (&mut self.registration_number, registration_number),
            (&mut self.business_type, business_type),
            (&mut self.registered_name, registered_name),
            (&mut self.pan_vat_number, pan_vat_number),
            (&mut self.registration_date, registration_date),
            (&mut self.approx_annual_turnover, approx_annual_turnover),
            (&mut self.approx_digital_sale, approx_digital_sale),
        ];
        for (slot, value) in optional_fields {
            if value.is_some() {
                *slot = value;
            }
        }
    }

    /// Does this record answer to `key`, either as numeric id or as merchant id
    pub fn matches_key(&self, key: &str) -> bool {
        let key = key.trim();
        if key.is_empty() {
            return false;
        }
        key.parse::<u64>().map_or(false, |id| id == self.id) || self.merchant_id == key
    }

    /// Creation time, when present and parseable
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    pub fn is_active(&self) -> bool {
        self.status == Some(MerchantStatus::Active)
    }

    /// Display name for headers and export file names
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "merchant"
        } else {
            &self.name
        }
    }
}

/// Partial merchant used for create and update. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_vat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approx_annual_turnover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approx_digital_sale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(
        default,
        deserialize_with = "deserialize_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<MerchantStatus>,
}

/// Update payload; same shape as a create draft
pub type MerchantPatch = MerchantDraft;

impl MerchantDraft {
    /// Trim surrounding whitespace from the free-text fields the form submits
    pub fn trimmed(mut self) -> Self {
        for field in [
            &mut self.name,
            &mut self.email,
            &mut self.phone,
            &mut self.business_name,
            &mut self.registration_number,
        ] {
            if let Some(value) = field.as_mut() {
                let trimmed = value.trim();
                if trimmed.len() != value.len() {
                    *value = trimmed.to_string();
                }
            }
        }
        self
    }
}

/// Card transaction of a merchant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub txn_id: String,
    /// ISO-8601 timestamp
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquirer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

/// Merchant counts per status, for the dashboard header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub deactivated: usize,
    pub unknown: usize,
}

impl StatusSummary {
    pub fn from_records(records: &[Merchant]) -> Self {
        records.iter().fold(
            StatusSummary {
                total: records.len(),
                ..Default::default()
            },
            |mut summary, merchant| {
                match merchant.status {
                    Some(MerchantStatus::Active) => summary.active += 1,
                    Some(MerchantStatus::Inactive) => summary.inactive += 1,
                    Some(MerchantStatus::Deactivated) => summary.deactivated += 1,
                    None => summary.unknown += 1,
                }
                summary
            },
        )
    }
}
