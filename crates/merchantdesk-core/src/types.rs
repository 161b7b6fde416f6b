//! Basic types for merchant records

use serde::{Deserialize, Deserializer, Serialize};

/// Merchant lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MerchantStatus {
    /// Merchant can transact
    Active,
    /// Merchant is switched off (also the result of a delete)
    Inactive,
    /// Merchant was deactivated or suspended by the operator
    Deactivated,
}

impl MerchantStatus {
    /// Case-insensitive normalization of a status coming from storage or
    /// the remote service. Unknown values yield `None`.
    pub fn normalize(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MerchantStatus::Active => "active",
            MerchantStatus::Inactive => "inactive",
            MerchantStatus::Deactivated => "deactivated",
        }
    }
}

impl Default for MerchantStatus {
    fn default() -> Self {
        MerchantStatus::Active
    }
}

impl std::str::FromStr for MerchantStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(MerchantStatus::Active),
            "inactive" => Ok(MerchantStatus::Inactive),
            // the merchant service calls this SUSPENDED
            "deactivated" | "suspended" => Ok(MerchantStatus::Deactivated),
            _ => Err(format!("Invalid merchant status: {}", s)),
        }
    }
}

impl std::fmt::Display for MerchantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lenient status reader used by the record's serde impl
pub(crate) fn deserialize_status<'de, D>(deserializer: D) -> Result<Option<MerchantStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(MerchantStatus::normalize))
}

/// Status predicate of a list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Match every record, including ones without a status
    #[default]
    All,
    /// Match records whose status equals this one
    Only(MerchantStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: Option<MerchantStatus>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status == Some(*wanted),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        trimmed.parse::<MerchantStatus>().map(StatusFilter::Only)
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => write!(f, "ALL"),
            StatusFilter::Only(status) => write!(f, "{}", status),
        }
    }
}

impl Serialize for StatusFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for StatusFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_normalization() {
        assert_eq!(MerchantStatus::normalize("ACTIVE"), Some(MerchantStatus::Active));
        assert_eq!(MerchantStatus::normalize(" Inactive "), Some(MerchantStatus::Inactive));
        assert_eq!(MerchantStatus::normalize("SUSPENDED"), Some(MerchantStatus::Deactivated));
        assert_eq!(MerchantStatus::normalize("pending"), None);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(MerchantStatus::Deactivated.to_string(), "deactivated");
        assert_eq!(
            serde_json::to_string(&MerchantStatus::Inactive).unwrap(),
            "\"inactive\""
        );
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("ALL".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "Active".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(MerchantStatus::Active)
        );
        assert!("closed".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_status_filter_matches() {
        let only_active = StatusFilter::Only(MerchantStatus::Active);
        assert!(only_active.matches(Some(MerchantStatus::Active)));
        assert!(!only_active.matches(Some(MerchantStatus::Inactive)));
        assert!(!only_active.matches(None));
        assert!(StatusFilter::All.matches(None));
    }
}
