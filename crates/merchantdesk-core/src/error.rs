//! Error types for merchantdesk-core
//!
//! Error codes and suggestion-carrying details for the store
//! and the API layer, plus the logger the store reports fallbacks through.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No merchant answers to the key
    MerchantNotFound,
    ValidationError,
    /// Both the remote and the local mirror failed
    PersistenceFailed,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::MerchantNotFound => write!(f, "MERCHANT_NOT_FOUND"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::PersistenceFailed => write!(f, "PERSISTENCE_FAILED"),
        }
    }
}

/// Code, message and hints shown to API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    /// Invalid fields keyed by field name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            fields: BTreeMap::new(),
            suggestions: vec![],
        }
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, String>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        for (field, message) in &self.fields {
            write!(f, "\n  {}: {}", field, message)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Errors surfaced by store operations and request validation
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Merchant not found: {key}")]
    MerchantNotFound { key: String },

    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        fields: BTreeMap<String, String>,
    },

    #[error("Could not {operation} merchant: {message}")]
    PersistenceFailed { operation: String, message: String },
}

impl CoreError {
    pub fn not_found(key: impl Into<String>) -> Self {
        CoreError::MerchantNotFound { key: key.into() }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::MerchantNotFound { .. } => ErrorCode::MerchantNotFound,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::PersistenceFailed { .. } => ErrorCode::PersistenceFailed,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::MerchantNotFound { key } => details.with_suggestion(format!(
                "Check that '{}' is a merchant id or merchant code.",
                key
            )),
            CoreError::ValidationError { fields, .. } => details.with_fields(fields.clone()),
            CoreError::PersistenceFailed { .. } => details
                .with_suggestion("Check that the merchant service is reachable.".to_string())
                .with_suggestion("Check that the mirror directory exists and is writable.".to_string()),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Record key the operation targets
    pub key: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            key: None,
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::error!(
            target: "merchantdesk::error",
            "ERROR [{}] {} - Operation: {} - Key: {:?}",
            error.code(),
            error,
            context.operation,
            context.key
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "merchantdesk::error",
            "WARNING: {} - Operation: {} - Key: {:?}",
            message,
            context.operation,
            context.key
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::MerchantNotFound.to_string(), "MERCHANT_NOT_FOUND");
        assert_eq!(ErrorCode::PersistenceFailed.to_string(), "PERSISTENCE_FAILED");
    }

    #[test]
    fn test_persistence_failed_message() {
        let error = CoreError::PersistenceFailed {
            operation: "create".to_string(),
            message: "disk full".to_string(),
        };
        assert_eq!(error.to_string(), "Could not create merchant: disk full");
        assert_eq!(error.to_details().suggestions.len(), 2);
    }

    #[test]
    fn test_validation_details_carry_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("email".to_string(), "Invalid email".to_string());
        let error = CoreError::ValidationError {
            message: "1 invalid field".to_string(),
            fields,
        };
        let details = error.to_details();
        assert_eq!(details.code, ErrorCode::ValidationError);
        assert_eq!(details.fields["email"], "Invalid email");
        assert!(details.to_string().contains("email: Invalid email"));
    }

    #[test]
    fn test_not_found_details() {
        let details = CoreError::not_found("MRC1").to_details();
        assert!(details.message.contains("MRC1"));
        assert_eq!(details.suggestions.len(), 1);
        assert!(details.to_string().starts_with("[MERCHANT_NOT_FOUND]"));
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("update").with_key("7");
        assert_eq!(context.operation, "update");
        assert_eq!(context.key.as_deref(), Some("7"));
    }
}
