//! Field-level validation of merchant drafts, run before any store call

use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::BTreeMap;

use super::error::CoreError;
use super::models::MerchantDraft;

const NAME_MAX: usize = 200;
const BUSINESS_NAME_MAX: usize = 255;

/// Field name -> message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn add(&mut self, field: &str, message: &str) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        let message = match errors.fields.len() {
            1 => "1 invalid field".to_string(),
            n => format!("{} invalid fields", n),
        };
        CoreError::ValidationError {
            message,
            fields: errors.fields,
        }
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceCell<Regex> = OnceCell::new();
    EMAIL.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").unwrap())
}

fn phone_pattern() -> &'static Regex {
    static PHONE: OnceCell<Regex> = OnceCell::new();
    PHONE.get_or_init(|| Regex::new(r"^[\d\s+\-()]{6,30}$").unwrap())
}

/// Validate a draft for create: name and email are required.
pub fn validate_new(draft: &MerchantDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if draft.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
        errors.add("name", "Name is required");
    }
    if draft.email.as_deref().map_or(true, |e| e.trim().is_empty()) {
        errors.add("email", "Email is required");
    }

    check_present_fields(draft, &mut errors);
    errors.into_result()
}

/// Validate a draft for update: only the fields it carries are checked.
pub fn validate_changes(draft: &MerchantDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if draft.name.as_deref().map_or(false, |n| n.trim().is_empty()) {
        errors.add("name", "Name is required");
    }
    if draft.email.as_deref().map_or(false, |e| e.trim().is_empty()) {
        errors.add("email", "Email is required");
    }

    check_present_fields(draft, &mut errors);
    errors.into_result()
}

fn check_present_fields(draft: &MerchantDraft, errors: &mut ValidationErrors) {
    if let Some(name) = draft.name.as_deref() {
        if name.trim().chars().count() > NAME_MAX {
            errors.add("name", "Name must be at most 200 characters");
        }
    }
    if let Some(email) = draft.email.as_deref() {
        let email = email.trim();
        if !email.is_empty() && !email_pattern().is_match(email) {
            errors.add("email", "Invalid email");
        }
    }
    if let Some(phone) = draft.phone.as_deref() {
        let phone = phone.trim();
        if !phone.is_empty() && !phone_pattern().is_match(phone) {
            errors.add("phone", "Invalid phone number");
        }
    }
    if let Some(business_name) = draft.business_name.as_deref() {
        if business_name.trim().chars().count() > BUSINESS_NAME_MAX {
            errors.add("businessName", "Business name must be at most 255 characters");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, email: &str) -> MerchantDraft {
        MerchantDraft {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_new_merchant() {
        assert!(validate_new(&draft("Kathmandu Mart", "sales@ktm.com.np")).is_ok());
    }

    #[test]
    fn test_new_requires_name_and_email() {
        let errors = validate_new(&MerchantDraft::default()).unwrap_err();
        assert_eq!(errors.fields["name"], "Name is required");
        assert_eq!(errors.fields["email"], "Email is required");

        let errors = validate_new(&draft("   ", "a@b.co")).unwrap_err();
        assert_eq!(errors.fields.len(), 1);
    }

    #[test]
    fn test_malformed_email() {
        for bad in ["plainaddress", "a@b", "a b@c.d", "@nope."] {
            let errors = validate_new(&draft("Shop", bad)).unwrap_err();
            assert_eq!(errors.fields["email"], "Invalid email", "{}", bad);
        }
    }

    #[test]
    fn test_phone_pattern() {
        let mut ok = draft("Shop", "a@b.co");
        ok.phone = Some("+44 20 7946 0000".to_string());
        assert!(validate_new(&ok).is_ok());

        let mut bad = draft("Shop", "a@b.co");
        bad.phone = Some("call me".to_string());
        assert_eq!(validate_new(&bad).unwrap_err().fields["phone"], "Invalid phone number");

        let mut blank = draft("Shop", "a@b.co");
        blank.phone = Some(String::new());
        assert!(validate_new(&blank).is_ok());
    }

    #[test]
    fn test_length_limits() {
        let long_name = "x".repeat(201);
        let errors = validate_new(&draft(&long_name, "a@b.co")).unwrap_err();
        assert!(errors.fields.contains_key("name"));

        let mut long_business = draft("Shop", "a@b.co");
        long_business.business_name = Some("y".repeat(256));
        assert!(validate_new(&long_business).unwrap_err().fields.contains_key("businessName"));
    }

    #[test]
    fn test_changes_only_check_present_fields() {
        assert!(validate_changes(&MerchantDraft::default()).is_ok());

        let only_category = MerchantDraft {
            category: Some("retail".to_string()),
            ..Default::default()
        };
        assert!(validate_changes(&only_category).is_ok());

        let blank_name = MerchantDraft {
            name: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(validate_changes(&blank_name).is_err());
    }

    #[test]
    fn test_into_core_error() {
        let errors = validate_new(&MerchantDraft::default()).unwrap_err();
        let error: CoreError = errors.into();
        assert_eq!(error.to_string(), "Validation error: 2 invalid fields");
    }
}
