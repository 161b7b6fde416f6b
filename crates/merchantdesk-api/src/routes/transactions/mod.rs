//! Transaction routes - per-merchant history and CSV export
//!
//! Structure:
//! - api.rs: JSON and CSV endpoints

pub mod api;

pub use api::{api_merchant_transactions, api_transactions_export};
