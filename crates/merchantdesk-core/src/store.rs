//! Resilient merchant store
//!
//! Every operation asks the remote service first. When the remote fails the
//! store answers from the local mirror instead, and mutations are applied to
//! the mirror and persisted. A remote success never touches the mirror.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use merchantdesk_utils::generate_merchant_code;

use super::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use super::mirror::{LocalMirror, MirrorStorage};
use super::models::{Merchant, MerchantDraft, MerchantPatch, Transaction};
use super::remote::{MerchantRemote, RemoteError};
use super::time::now_iso;
use super::types::MerchantStatus;

/// How a delete was carried out. Every outcome counts as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeleteOutcome {
    /// The remote service deleted the merchant
    Remote,
    /// The mirror record was marked inactive and persisted
    SoftDeleted,
    /// The mirror record was marked inactive but could not be persisted;
    /// the mirror keeps its previous state
    Unsaved,
    /// No mirror record answers to the key
    NotFound,
}

/// Record access facade over the remote service and the local mirror
pub struct ResilientStore {
    remote: Arc<dyn MerchantRemote>,
    mirror: LocalMirror,
    records: RwLock<Vec<Merchant>>,
    logger: Box<dyn ErrorLogger>,
}

impl ResilientStore {
    /// Build the store, loading the mirror (or seeding it) once.
    pub async fn open(remote: Arc<dyn MerchantRemote>, storage: Box<dyn MirrorStorage>) -> Self {
        let mirror = LocalMirror::new(storage);
        let records = mirror.load_or_seed().await;
        Self {
            remote,
            mirror,
            records: RwLock::new(records),
            logger: Box::new(DefaultErrorLogger),
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    fn remote_failed(&self, operation: &str, key: Option<&str>, error: &RemoteError) {
        let mut context = ErrorContext::new(operation);
        if let Some(key) = key {
            context = context.with_key(key);
        }
        let message = if error.is_not_found() {
            format!("Merchant service has no such merchant, checking local mirror: {}", error)
        } else {
            format!("Merchant service failed, using local mirror: {}", error)
        };
        self.logger.log_warning(&message, &context);
    }

    /// All merchants
    pub async fn fetch_all(&self) -> Vec<Merchant> {
        match self.remote.list().await {
            Ok(records) => records,
            Err(e) => {
                self.remote_failed("list", None, &e);
                self.records.read().await.clone()
            }
        }
    }

    /// One merchant by numeric id or merchant id
    pub async fn fetch_one(&self, key: &str) -> Option<Merchant> {
        match self.remote.get(key).await {
            Ok(merchant) => Some(merchant),
            Err(e) => {
                self.remote_failed("get", Some(key), &e);
                self.records
                    .read()
                    .await
                    .iter()
                    .find(|m| m.matches_key(key))
                    .cloned()
            }
        }
    }

    /// Create a merchant. Fails only when both the remote and the mirror fail.
    pub async fn create(&self, mut draft: MerchantDraft) -> CoreResult<Merchant> {
        let remote_error = match self.remote.create(&draft).await {
            Ok(merchant) => return Ok(merchant),
            Err(e) => e,
        };
        self.remote_failed("create", None, &remote_error);

        let mut records = self.records.write().await;

        let id = records.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        let merchant_id = draft
            .merchant_id
            .take()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(generate_merchant_code);
        let merchant = Merchant::from_draft(id, merchant_id, draft, &now_iso());

        let mut next = Vec::with_capacity(records.len() + 1);
        next.push(merchant.clone());
        next.extend(records.iter().cloned());

        self.persist("create", None, &next, &remote_error).await?;
        *records = next;

        log::info!("Created merchant {} ({}) in local mirror", merchant.id, merchant.merchant_id);
        Ok(merchant)
    }

    /// Update a merchant. `Ok(None)` when the remote failed and no mirror
    /// record answers to `key`.
    pub async fn update(&self, key: &str, patch: MerchantPatch) -> CoreResult<Option<Merchant>> {
        let remote_error = match self.remote.update(key, &patch).await {
            Ok(merchant) => return Ok(Some(merchant)),
            Err(e) => e,
        };
        self.remote_failed("update", Some(key), &remote_error);

        let mut records = self.records.write().await;

        let Some(index) = records.iter().position(|m| m.matches_key(key)) else {
            log::info!("No merchant '{}' in local mirror to update", key);
            return Ok(None);
        };

        let mut merged = records[index].clone();
        merged.apply(patch);
        merged.updated_at = Some(now_iso());

        let mut next = records.clone();
        next[index] = merged.clone();

        self.persist("update", Some(key), &next, &remote_error).await?;
        *records = next;

        log::info!("Updated merchant {} in local mirror", merged.id);
        Ok(Some(merged))
    }

    /// Delete a merchant. Never fails; see [`DeleteOutcome`].
    pub async fn delete(&self, key: &str) -> DeleteOutcome {
        let remote_error = match self.remote.delete(key).await {
            Ok(()) => return DeleteOutcome::Remote,
            Err(e) => e,
        };
        self.remote_failed("delete", Some(key), &remote_error);

        let mut records = self.records.write().await;

        let Some(index) = records.iter().position(|m| m.matches_key(key)) else {
            self.logger.log_warning(
                "No merchant to delete in local mirror",
                &ErrorContext::new("delete").with_key(key),
            );
            return DeleteOutcome::NotFound;
        };

        let mut next = records.clone();
        next[index].status = Some(MerchantStatus::Inactive);
        next[index].updated_at = Some(now_iso());

        match self.persist("delete", Some(key), &next, &remote_error).await {
            Ok(()) => {
                *records = next;
                log::info!("Marked merchant '{}' inactive in local mirror", key);
                DeleteOutcome::SoftDeleted
            }
            Err(_) => DeleteOutcome::Unsaved,
        }
    }

    /// Transaction history of a merchant; empty when the remote fails
    pub async fn transactions(&self, key: &str) -> Vec<Transaction> {
        match self.remote.transactions(key).await {
            Ok(transactions) => transactions,
            Err(e) => {
                self.logger.log_warning(
                    &format!("Could not load transactions: {}", e),
                    &ErrorContext::new("transactions").with_key(key),
                );
                Vec::new()
            }
        }
    }

    /// Current mirror contents
    pub async fn mirror_snapshot(&self) -> Vec<Merchant> {
        self.records.read().await.clone()
    }

    async fn persist(
        &self,
        operation: &str,
        key: Option<&str>,
        records: &[Merchant],
        remote_error: &RemoteError,
    ) -> CoreResult<()> {
        if let Err(e) = self.mirror.persist(records).await {
            let error = CoreError::PersistenceFailed {
                operation: operation.to_string(),
                message: format!(
                    "merchant service failed ({}) and the local mirror could not be saved ({})",
                    remote_error, e
                ),
            };
            let mut context = ErrorContext::new(operation);
            if let Some(key) = key {
                context = context.with_key(key);
            }
            self.logger.log_error(&error, &context);
            return Err(error);
        }
        Ok(())
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::{MemoryMirrorStorage, MIRROR_KEY};
    use crate::remote::OfflineRemote;
    use async_trait::async_trait;
    use crate::error::ErrorCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Logger that keeps what it was given
    #[derive(Default)]
    struct RecordingLogger {
        entries: Arc<Mutex<Vec<String>>>,
    }

    impl ErrorLogger for RecordingLogger {
        fn log_error(&self, error: &CoreError, context: &ErrorContext) {
            self.entries.lock().unwrap().push(format!(
                "error {} {} {:?}",
                error.code(),
                context.operation,
                context.key
            ));
        }

        fn log_warning(&self, message: &str, context: &ErrorContext) {
            self.entries
                .lock()
                .unwrap()
                .push(format!("warning {} {}", context.operation, message));
        }
    }

    /// Remote that answers everything, or 404s everything
    #[derive(Default)]
    struct ScriptedRemote {
        not_found: bool,
        calls: AtomicUsize,
    }

    impl ScriptedRemote {
        fn answer<T>(&self, value: T) -> Result<T, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.not_found {
                Err(RemoteError::Status {
                    status: 404,
                    body: "Merchant not found".to_string(),
                })
            } else {
                Ok(value)
            }
        }
    }

    fn remote_merchant() -> Merchant {
        Merchant {
            id: 500,
            merchant_id: "MRC000001F4".to_string(),
            name: "Remote Only".to_string(),
            email: "remote@example.com".to_string(),
            status: Some(MerchantStatus::Active),
            ..Default::default()
        }
    }

    #[async_trait]
    impl MerchantRemote for ScriptedRemote {
        async fn list(&self) -> Result<Vec<Merchant>, RemoteError> {
            self.answer(vec![remote_merchant()])
        }

        async fn get(&self, _key: &str) -> Result<Merchant, RemoteError> {
            self.answer(remote_merchant())
        }

        async fn create(&self, _draft: &MerchantDraft) -> Result<Merchant, RemoteError> {
            self.answer(remote_merchant())
        }

        async fn update(&self, _key: &str, _patch: &MerchantDraft) -> Result<Merchant, RemoteError> {
            self.answer(remote_merchant())
        }

        async fn delete(&self, _key: &str) -> Result<(), RemoteError> {
            self.answer(())
        }

        async fn transactions(&self, _key: &str) -> Result<Vec<Transaction>, RemoteError> {
            self.answer(vec![Transaction {
                txn_id: "T-1".to_string(),
                ..Default::default()
            }])
        }
    }

    async fn offline_store() -> (ResilientStore, Arc<MemoryMirrorStorage>) {
        let storage = Arc::new(MemoryMirrorStorage::new());
        let store = ResilientStore::open(Arc::new(OfflineRemote), Box::new(storage.clone())).await;
        (store, storage)
    }

    fn stored(storage: &MemoryMirrorStorage) -> Vec<Merchant> {
        serde_json::from_str(&storage.get(MIRROR_KEY).unwrap()).unwrap()
    }

    fn draft(name: &str) -> MerchantDraft {
        MerchantDraft {
            name: Some(name.to_string()),
            email: Some("new@example.com".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fallback_fetch_all_returns_mirror() {
        let (store, _) = offline_store().await;
        let records = store.fetch_all().await;
        assert_eq!(records.len(), 9);
        assert_eq!(records[0].name, "TechNova USA");
    }

    #[tokio::test]
    async fn test_fallback_fetch_one() {
        let (store, _) = offline_store().await;
        assert_eq!(store.fetch_one("3").await.unwrap().name, "Global Gadgetry");
        assert_eq!(
            store
                .fetch_one("94b219a0-9566-4c59-a8c6-5cf4b1394ccf")
                .await
                .unwrap()
                .id,
            6
        );
        assert!(store.fetch_one("nonexistent-id").await.is_none());
    }

    #[tokio::test]
    async fn test_remote_not_found_falls_back() {
        let remote = Arc::new(ScriptedRemote {
            not_found: true,
            ..Default::default()
        });
        let store = ResilientStore::open(remote, Box::new(MemoryMirrorStorage::new())).await;
        assert_eq!(store.fetch_one("2").await.unwrap().name, "Himalayan Tech Hub");
    }

    #[tokio::test]
    async fn test_fallback_create_prepends_next_id() {
        let (store, storage) = offline_store().await;

        let created = store.create(draft("Kathmandu Mart")).await.unwrap();
        assert_eq!(created.id, 10);
        assert_eq!(created.status, Some(MerchantStatus::Active));
        assert_eq!(created.created_at, created.updated_at);
        assert!(created.merchant_id.starts_with("MRC"));
        assert_eq!(created.merchant_id.len(), 11);

        let snapshot = store.mirror_snapshot().await;
        assert_eq!(snapshot.len(), 10);
        assert_eq!(snapshot[0], created);
        assert_eq!(stored(&storage), snapshot);
    }

    #[tokio::test]
    async fn test_fallback_create_keeps_given_merchant_id_and_status() {
        let (store, _) = offline_store().await;
        let mut new = draft("Given");
        new.merchant_id = Some("EXT-1".to_string());
        new.status = Some(MerchantStatus::Inactive);

        let created = store.create(new).await.unwrap();
        assert_eq!(created.merchant_id, "EXT-1");
        assert_eq!(created.status, Some(MerchantStatus::Inactive));
    }

    #[tokio::test]
    async fn test_fallback_update_merges_and_persists() {
        let (store, storage) = offline_store().await;
        let before = store.fetch_one("4").await.unwrap();

        let patch = MerchantDraft {
            phone: Some("9800000000".to_string()),
            ..Default::default()
        };
        let merged = store.update("4", patch).await.unwrap().unwrap();

        assert_eq!(merged.phone.as_deref(), Some("9800000000"));
        assert_eq!(merged.name, before.name);
        assert_eq!(merged.created_at, before.created_at);
        assert_ne!(merged.updated_at, before.updated_at);
        assert_eq!(stored(&storage)[3], merged);
    }

    #[tokio::test]
    async fn test_fallback_update_unknown_key() {
        let (store, storage) = offline_store().await;
        let before = storage.get(MIRROR_KEY);

        let result = store.update("999", draft("Ghost")).await.unwrap();
        assert!(result.is_none());
        assert_eq!(storage.get(MIRROR_KEY), before);
        assert_eq!(store.mirror_snapshot().await.len(), 9);
    }

    #[tokio::test]
    async fn test_fallback_delete_soft_deletes() {
        let (store, storage) = offline_store().await;
        let before = store.fetch_one("1").await.unwrap();
        assert!(before.is_active());

        assert_eq!(store.delete("1").await, DeleteOutcome::SoftDeleted);

        let after = store.fetch_one("1").await.unwrap();
        assert_eq!(after.status, Some(MerchantStatus::Inactive));
        assert_ne!(after.updated_at, before.updated_at);
        assert_eq!(stored(&storage).len(), 9);
    }

    #[tokio::test]
    async fn test_fallback_delete_unknown_key() {
        let (store, _) = offline_store().await;
        assert_eq!(store.delete("999").await, DeleteOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_persist_failure_leaves_mirror_untouched() {
        let (store, storage) = offline_store().await;
        let before = storage.get(MIRROR_KEY);
        storage.set_writable(false);

        let err = store.create(draft("Unsaved")).await.unwrap_err();
        assert!(matches!(err, CoreError::PersistenceFailed { .. }));

        let err = store.update("2", draft("Unsaved")).await.unwrap_err();
        assert!(err.to_string().starts_with("Could not update merchant"));

        assert_eq!(store.delete("2").await, DeleteOutcome::Unsaved);

        assert_eq!(store.mirror_snapshot().await.len(), 9);
        assert_eq!(store.fetch_one("2").await.unwrap().name, "Himalayan Tech Hub");
        assert!(store.fetch_one("2").await.unwrap().is_active());
        assert_eq!(storage.get(MIRROR_KEY), before);
    }

    #[tokio::test]
    async fn test_remote_success_never_touches_mirror() {
        let storage = Arc::new(MemoryMirrorStorage::new());
        let remote = Arc::new(ScriptedRemote::default());
        let store = ResilientStore::open(remote.clone(), Box::new(storage.clone())).await;
        let before = storage.get(MIRROR_KEY);

        assert_eq!(store.fetch_all().await, vec![remote_merchant()]);
        assert_eq!(store.create(draft("X")).await.unwrap().id, 500);
        assert_eq!(store.update("1", draft("X")).await.unwrap().unwrap().id, 500);
        assert_eq!(store.delete("1").await, DeleteOutcome::Remote);
        assert_eq!(store.transactions("1").await.len(), 1);

        assert_eq!(remote.calls.load(Ordering::SeqCst), 5);
        assert_eq!(storage.get(MIRROR_KEY), before);
        assert_eq!(store.mirror_snapshot().await.len(), 9);
    }

    #[tokio::test]
    async fn test_transactions_empty_when_remote_fails() {
        let (store, _) = offline_store().await;
        assert!(store.transactions("1").await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_serialize() {
        let (store, storage) = offline_store().await;
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.create(draft(&format!("Shop {}", i))).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort_unstable();
        assert_eq!(ids, (10..18).collect::<Vec<_>>());

        let snapshot = store.mirror_snapshot().await;
        assert_eq!(snapshot.len(), 17);
        assert_eq!(stored(&storage), snapshot);
    }

    #[tokio::test]
    async fn test_reopen_reads_persisted_mirror() {
        let storage = Arc::new(MemoryMirrorStorage::new());
        {
            let store = ResilientStore::open(Arc::new(OfflineRemote), Box::new(storage.clone())).await;
            store.create(draft("Persisted")).await.unwrap();
        }
        let reopened = ResilientStore::open(Arc::new(OfflineRemote), Box::new(storage)).await;
        let records = reopened.fetch_all().await;
        assert_eq!(records.len(), 10);
        assert_eq!(records[0].name, "Persisted");
    }

    #[tokio::test]
    async fn test_logger_receives_fallbacks_and_persist_failures() {
        let storage = Arc::new(MemoryMirrorStorage::new());
        let logger = RecordingLogger::default();
        let entries = logger.entries.clone();
        let remote = Arc::new(ScriptedRemote {
            not_found: true,
            ..Default::default()
        });
        let store = ResilientStore::open(remote, Box::new(storage.clone()))
            .await
            .with_logger(Box::new(logger));

        store.fetch_one("2").await;
        storage.set_writable(false);
        store.update("2", draft("Unsaved")).await.unwrap_err();

        let entries = entries.lock().unwrap().clone();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].starts_with("warning get Merchant service has no such merchant"));
        assert!(entries[1].starts_with("warning update"));
        assert_eq!(
            entries[2],
            format!("error {} update Some(\"2\")", ErrorCode::PersistenceFailed)
        );
    }
}
