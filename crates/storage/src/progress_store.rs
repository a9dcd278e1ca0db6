//! Durable progress for one sticker book.
//!
//! Three independent records per namespace: the collected sequence (a JSON
//! array of reward ids), the celebrated flag, and the last-claim instant in
//! epoch milliseconds. Reads never fail: anything missing or malformed comes
//! back as the default value.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sticker_core::model::{ProgressState, RewardId};
use sticker_core::time::{from_epoch_millis, to_epoch_millis};
use tracing::{debug, warn};

use crate::repository::{KeyValueRepository, StorageError};

/// Record keys for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub collected: String,
    pub celebrated: String,
    pub last_claim: String,
}

impl StorageKeys {
    #[must_use]
    pub fn for_namespace(namespace: &str) -> Self {
        Self {
            collected: format!("{namespace}_v1"),
            celebrated: format!("{namespace}_celebrated_v1"),
            last_claim: format!("{namespace}_last_claim_v1"),
        }
    }
}

#[derive(Clone)]
pub struct ProgressStore {
    repo: Arc<dyn KeyValueRepository>,
    keys: StorageKeys,
}

impl ProgressStore {
    #[must_use]
    pub fn new(repo: Arc<dyn KeyValueRepository>, namespace: &str) -> Self {
        Self {
            repo,
            keys: StorageKeys::for_namespace(namespace),
        }
    }

    #[must_use]
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Load the persisted progress, falling back to defaults record by record.
    pub async fn load(&self) -> ProgressState {
        let collected = self.load_collected().await;
        let celebrated = self.read(&self.keys.celebrated).await.is_some_and(|raw| parse_flag(&raw));
        let last_claim = self
            .read(&self.keys.last_claim)
            .await
            .and_then(|raw| parse_instant(&self.keys.last_claim, &raw));

        ProgressState::from_persisted(collected, celebrated, last_claim)
    }

    /// Like [`ProgressStore::load`], but a backend read failure is returned
    /// instead of being treated as an empty book. Malformed records still
    /// recover to defaults.
    ///
    /// Use this before writing, where an empty stand-in would overwrite real
    /// progress.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any record cannot be read.
    pub async fn try_load(&self) -> Result<ProgressState, StorageError> {
        let collected = match self.repo.get(&self.keys.collected).await? {
            Some(raw) => self.collected_or_default(&raw),
            None => Vec::new(),
        };
        let celebrated = self
            .repo
            .get(&self.keys.celebrated)
            .await?
            .is_some_and(|raw| parse_flag(&raw));
        let last_claim = self
            .repo
            .get(&self.keys.last_claim)
            .await?
            .and_then(|raw| parse_instant(&self.keys.last_claim, &raw));

        Ok(ProgressState::from_persisted(collected, celebrated, last_claim))
    }

    /// Persist `prior` followed by `id` as the collected sequence and stamp
    /// `at` as the last claim.
    ///
    /// `prior` is the sequence the caller validated `id` against; the stored
    /// record is not re-read here.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either record cannot be written.
    pub async fn commit_claim(
        &self,
        prior: &[RewardId],
        id: &RewardId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut collected = prior.to_vec();
        collected.push(id.clone());
        self.write_collected(&collected).await?;
        self.repo
            .set(&self.keys.last_claim, &to_epoch_millis(at).to_string())
            .await?;
        debug!(reward = %id, count = collected.len(), "claim committed");
        Ok(())
    }

    /// Persist the completion edge marker.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    pub async fn mark_celebrated(&self) -> Result<(), StorageError> {
        self.repo.set(&self.keys.celebrated, "true").await
    }

    /// Replace the collected sequence wholesale. Used to repair corrupted
    /// records; claims go through [`ProgressStore::commit_claim`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    pub async fn rewrite_collected(&self, collected: &[RewardId]) -> Result<(), StorageError> {
        self.write_collected(collected).await
    }

    /// Clear all three records.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any record cannot be removed.
    pub async fn reset(&self) -> Result<(), StorageError> {
        self.repo.remove(&self.keys.collected).await?;
        self.repo.remove(&self.keys.celebrated).await?;
        self.repo.remove(&self.keys.last_claim).await?;
        Ok(())
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.repo.get(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "progress record unreadable; using default");
                None
            }
        }
    }

    async fn load_collected(&self) -> Vec<RewardId> {
        match self.read(&self.keys.collected).await {
            Some(raw) => self.collected_or_default(&raw),
            None => Vec::new(),
        }
    }

    fn collected_or_default(&self, raw: &str) -> Vec<RewardId> {
        match parse_collected(raw) {
            Ok(ids) => ids,
            Err(err) => {
                warn!(key = %self.keys.collected, error = %err, "collected record malformed; starting empty");
                Vec::new()
            }
        }
    }

    async fn write_collected(&self, collected: &[RewardId]) -> Result<(), StorageError> {
        let json = serde_json::to_string(collected)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.repo.set(&self.keys.collected, &json).await
    }
}

fn parse_collected(raw: &str) -> Result<Vec<RewardId>, StorageError> {
    let items: Vec<String> =
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))?;
    items
        .into_iter()
        .map(|item| RewardId::new(item).map_err(|e| StorageError::Serialization(e.to_string())))
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    !matches!(raw.trim(), "" | "false" | "0")
}

fn parse_instant(key: &str, raw: &str) -> Option<DateTime<Utc>> {
    match raw.trim().parse::<i64>() {
        Ok(millis) => from_epoch_millis(millis),
        Err(_) => {
            warn!(key, raw, "last-claim record malformed; ignoring cooldown");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use sticker_core::time::fixed_now;

    fn id(raw: &str) -> RewardId {
        RewardId::new(raw).unwrap()
    }

    fn store(repo: &InMemoryRepository, namespace: &str) -> ProgressStore {
        ProgressStore::new(Arc::new(repo.clone()), namespace)
    }

    #[test]
    fn keys_follow_namespace() {
        let keys = StorageKeys::for_namespace("sticker_book");
        assert_eq!(keys.collected, "sticker_book_v1");
        assert_eq!(keys.celebrated, "sticker_book_celebrated_v1");
        assert_eq!(keys.last_claim, "sticker_book_last_claim_v1");
    }

    #[tokio::test]
    async fn empty_repository_loads_defaults() {
        let repo = InMemoryRepository::new();
        assert_eq!(store(&repo, "book").load().await, ProgressState::default());
    }

    #[tokio::test]
    async fn commit_claim_appends_and_stamps() {
        let repo = InMemoryRepository::new();
        let store = store(&repo, "book");
        store.commit_claim(&[], &id("r0"), fixed_now()).await.unwrap();
        store.commit_claim(&[id("r0")], &id("r1"), fixed_now()).await.unwrap();

        let state = store.load().await;
        assert_eq!(state.collected(), &[id("r0"), id("r1")]);
        assert_eq!(state.last_claim(), Some(fixed_now()));
        assert!(!state.celebrated());
        assert_eq!(
            repo.get("book_v1").await.unwrap().as_deref(),
            Some(r#"["r0","r1"]"#)
        );
    }

    #[tokio::test]
    async fn malformed_records_fall_back_to_defaults() {
        let repo = InMemoryRepository::new();
        repo.set("book_v1", "{not json").await.unwrap();
        repo.set("book_last_claim_v1", "yesterday").await.unwrap();

        let state = store(&repo, "book").load().await;
        assert_eq!(state, ProgressState::default());
    }

    #[tokio::test]
    async fn blank_ids_make_the_sequence_unusable() {
        let repo = InMemoryRepository::new();
        repo.set("book_v1", r#"["r0",""]"#).await.unwrap();
        assert_eq!(store(&repo, "book").load().await.collected_count(), 0);
    }

    #[tokio::test]
    async fn celebrated_flag_is_truthy_unless_falsey() {
        let repo = InMemoryRepository::new();
        let store = store(&repo, "book");
        for (raw, expected) in [("true", true), ("1", true), ("yes", true), ("false", false), ("0", false), ("", false)] {
            repo.set("book_celebrated_v1", raw).await.unwrap();
            assert_eq!(store.load().await.celebrated(), expected, "raw={raw:?}");
        }
    }

    #[tokio::test]
    async fn zero_last_claim_means_no_claim() {
        let repo = InMemoryRepository::new();
        repo.set("book_last_claim_v1", "0").await.unwrap();
        assert_eq!(store(&repo, "book").load().await.last_claim(), None);
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let repo = InMemoryRepository::new();
        let store = store(&repo, "book");
        store.commit_claim(&[], &id("r0"), fixed_now()).await.unwrap();
        store.mark_celebrated().await.unwrap();

        store.reset().await.unwrap();
        assert_eq!(store.load().await, ProgressState::default());
        assert_eq!(repo.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn namespaces_are_independent() {
        let repo = InMemoryRepository::new();
        let first = store(&repo, "course_a");
        let second = store(&repo, "course_b");
        first.commit_claim(&[], &id("r0"), fixed_now()).await.unwrap();

        assert_eq!(first.load().await.collected_count(), 1);
        assert_eq!(second.load().await.collected_count(), 0);

        second.reset().await.unwrap();
        assert_eq!(first.load().await.collected_count(), 1);
    }

    /// Fails every read of one key; writes go through.
    struct FailingReads {
        inner: InMemoryRepository,
        key: &'static str,
    }

    #[async_trait::async_trait]
    impl KeyValueRepository for FailingReads {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if key == self.key {
                return Err(StorageError::Connection("read timed out".into()));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn try_load_surfaces_read_failures_that_load_hides() {
        let repo = InMemoryRepository::new();
        repo.set("book_v1", r#"["r0"]"#).await.unwrap();
        let store = ProgressStore::new(
            Arc::new(FailingReads {
                inner: repo.clone(),
                key: "book_v1",
            }),
            "book",
        );

        assert_eq!(store.load().await.collected_count(), 0);
        assert!(matches!(store.try_load().await, Err(StorageError::Connection(_))));
    }

    #[tokio::test]
    async fn commit_claim_writes_the_given_prefix_without_rereading() {
        let repo = InMemoryRepository::new();
        repo.set("book_v1", r#"["r0"]"#).await.unwrap();
        let store = ProgressStore::new(
            Arc::new(FailingReads {
                inner: repo.clone(),
                key: "book_v1",
            }),
            "book",
        );

        store.commit_claim(&[id("r0")], &id("r1"), fixed_now()).await.unwrap();
        assert_eq!(
            repo.get("book_v1").await.unwrap().as_deref(),
            Some(r#"["r0","r1"]"#)
        );
    }

    #[tokio::test]
    async fn try_load_still_recovers_malformed_records() {
        let repo = InMemoryRepository::new();
        repo.set("book_v1", "{not json").await.unwrap();
        repo.set("book_celebrated_v1", "true").await.unwrap();

        let state = store(&repo, "book").try_load().await.unwrap();
        assert_eq!(state.collected_count(), 0);
        assert!(state.celebrated());
    }
}
