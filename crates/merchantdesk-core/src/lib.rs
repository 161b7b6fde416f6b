//! Merchant records, list views and the resilient merchant store

pub mod browser;
pub mod error;
pub mod export;
pub mod fixtures;
pub mod mirror;
pub mod models;
pub mod remote;
pub mod store;
pub mod time;
pub mod types;
pub mod validation;
pub mod view;

pub use browser::{FilterCriteria, LoadTicket, MerchantBrowser};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger};
pub use merchantdesk_config::{SortField, SortOrder};
pub use mirror::{FileMirrorStorage, MemoryMirrorStorage, MirrorStorage, StorageError, MIRROR_KEY};
pub use models::{Address, Merchant, MerchantDraft, MerchantPatch, StatusSummary, Transaction};
pub use remote::{HttpMerchantRemote, MerchantRemote, OfflineRemote, RemoteError};
pub use store::{DeleteOutcome, ResilientStore};
pub use time::DateRange;
pub use types::{MerchantStatus, StatusFilter};
pub use validation::{validate_changes, validate_new, ValidationErrors};
pub use view::{view, ViewResult, ViewSpec};
