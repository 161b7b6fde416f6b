//! Merchant routes - list, detail, create, update, delete
//!
//! Structure:
//! - api.rs: JSON API endpoints

pub mod api;

pub use api::{
    api_merchant_create,
    api_merchant_delete,
    api_merchant_detail,
    api_merchant_update,
    api_merchants,
};
