use std::sync::Arc;

use chrono::Duration;
use sticker_core::Clock;
use sticker_core::cooldown;
use sticker_core::model::{
    BookSettings, ProgressState, RewardCatalog, RewardDefinition, RewardId, Slot, SlotStatus,
    derive_slots,
};
use storage::{ProgressStore, StorageError};
use tracing::{debug, info, warn};

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// Derived view of the book at one instant, handed to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub slots: Vec<Slot>,
    pub collected: usize,
    pub total: usize,
    pub cooldown_remaining: Duration,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.collected == self.total
    }

    #[must_use]
    pub fn cooldown_active(&self) -> bool {
        cooldown::is_active(self.collected, self.total, self.cooldown_remaining)
    }

    #[must_use]
    pub fn claimable(&self) -> Option<&Slot> {
        self.slots.iter().find(|s| s.status == SlotStatus::Claimable)
    }

    /// `m:ss` countdown while the cooldown is active.
    #[must_use]
    pub fn countdown(&self) -> Option<String> {
        self.cooldown_active()
            .then(|| cooldown::format_countdown(self.cooldown_remaining))
    }

    /// Short progress label: `c/N`, or a check mark once complete.
    #[must_use]
    pub fn badge(&self) -> String {
        if self.is_complete() {
            "✓".to_owned()
        } else {
            format!("{}/{}", self.collected, self.total)
        }
    }
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Sole owner and mutator of `ProgressState`.
///
/// Admission is strictly sequential: only the reward at index
/// `collected_count` can be attempted or recorded, which keeps the collected
/// sequence a prefix of the catalog.
pub struct ProgressionController {
    catalog: Arc<RewardCatalog>,
    settings: BookSettings,
    store: ProgressStore,
    clock: Clock,
    state: ProgressState,
}

impl ProgressionController {
    /// Build a controller and load persisted progress.
    pub async fn load(
        catalog: Arc<RewardCatalog>,
        settings: BookSettings,
        store: ProgressStore,
        clock: Clock,
    ) -> Self {
        let mut controller = Self {
            catalog,
            settings,
            store,
            clock,
            state: ProgressState::default(),
        };
        controller.refresh().await;
        controller
    }

    /// Re-read persisted progress, repairing a sequence that is not a catalog prefix.
    pub async fn refresh(&mut self) {
        let state = self.store.load().await;
        self.adopt(state).await;
    }

    async fn adopt(&mut self, mut state: ProgressState) {
        if state.truncate_to_catalog(&self.catalog) {
            warn!(
                kept = state.collected_count(),
                "collected sequence did not match the catalog; truncated"
            );
            if let Err(err) = self.store.rewrite_collected(state.collected()).await {
                warn!(error = %err, "could not persist repaired sequence");
            }
        }
        self.state = state;
    }

    #[must_use]
    pub fn catalog(&self) -> &RewardCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn settings(&self) -> &BookSettings {
        &self.settings
    }

    #[must_use]
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn collected_count(&self) -> usize {
        self.state.collected_count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.is_complete(&self.catalog)
    }

    #[must_use]
    pub fn cooldown_remaining(&self) -> Duration {
        cooldown::remaining(
            self.clock.now(),
            self.state.last_claim(),
            self.settings.cooldown(),
        )
    }

    #[must_use]
    pub fn cooldown_active(&self) -> bool {
        cooldown::is_active(
            self.collected_count(),
            self.catalog.len(),
            self.cooldown_remaining(),
        )
    }

    #[must_use]
    pub fn slots(&self) -> Vec<Slot> {
        derive_slots(&self.catalog, self.collected_count(), self.cooldown_active())
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        let cooldown_remaining = self.cooldown_remaining();
        let collected = self.collected_count();
        let total = self.catalog.len();
        ProgressSnapshot {
            slots: derive_slots(
                &self.catalog,
                collected,
                cooldown::is_active(collected, total, cooldown_remaining),
            ),
            collected,
            total,
            cooldown_remaining,
        }
    }

    /// The next reward in sequence, regardless of cooldown.
    #[must_use]
    pub fn frontier(&self) -> Option<&RewardDefinition> {
        self.catalog.get(self.collected_count())
    }

    /// The reward that may be attempted right now, if any.
    #[must_use]
    pub fn claimable(&self) -> Option<&RewardDefinition> {
        if self.cooldown_active() {
            return None;
        }
        self.frontier()
    }

    /// Validate an attempt request against the current state.
    ///
    /// Returns the reward only if `id` is the claimable frontier; anything
    /// else is a stale request.
    #[must_use]
    pub fn admit_attempt(&self, id: &RewardId) -> Option<&RewardDefinition> {
        match self.claimable() {
            Some(reward) if reward.id() == id => Some(reward),
            _ => {
                debug!(reward = %id, collected = self.collected_count(), "attempt ignored");
                None
            }
        }
    }

    /// Record a correct answer for `id`.
    ///
    /// Progress is re-read first, so a session opened against an older state
    /// (a reset, another tab) cannot append out of order. Returns `Ok(false)`
    /// when `id` is no longer the frontier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if progress cannot be read back or the claim
    /// cannot be persisted. Nothing is written after a failed read.
    pub async fn record_success(&mut self, id: &RewardId) -> Result<bool, StorageError> {
        let state = self.store.try_load().await?;
        self.adopt(state).await;
        let Some(frontier) = self.frontier() else {
            debug!(reward = %id, "success ignored; book already complete");
            return Ok(false);
        };
        if frontier.id() != id {
            debug!(reward = %id, frontier = %frontier.id(), "success ignored; stale reward");
            return Ok(false);
        }

        let at = self.clock.now();
        self.store.commit_claim(self.state.collected(), id, at).await?;
        self.state.record_claim(id.clone(), at);
        info!(
            reward = %id,
            collected = self.collected_count(),
            total = self.catalog.len(),
            "reward claimed"
        );
        Ok(true)
    }

    /// Persist the celebrated flag.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be written.
    pub async fn mark_celebrated(&mut self) -> Result<(), StorageError> {
        self.store.mark_celebrated().await?;
        self.state.mark_celebrated();
        Ok(())
    }

    /// Clear all progress.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be removed.
    pub async fn reset(&mut self) -> Result<(), StorageError> {
        self.store.reset().await?;
        self.state = ProgressState::default();
        info!(namespace = self.settings.namespace(), "progress reset");
        Ok(())
    }
}
