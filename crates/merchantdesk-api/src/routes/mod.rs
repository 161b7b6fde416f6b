//! Route modules for the API server
//!
//! - merchants: Merchant list, detail and mutations
//! - transactions: Transaction history and CSV export
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints

pub mod merchants;
pub mod transactions;
