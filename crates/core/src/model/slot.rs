use crate::model::catalog::RewardCatalog;
use crate::model::ids::RewardId;

/// Derived status of one position in the book. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotStatus {
    /// Already earned.
    Collected,
    /// The next reward in sequence, open for a quiz attempt.
    Claimable,
    /// Waiting on an earlier reward.
    LockedBySequence,
    /// Next in sequence, but the cooldown since the last claim is running.
    LockedByCooldown,
}

impl SlotStatus {
    /// Status of slot `index` given `collected` earned rewards.
    #[must_use]
    pub fn derive(index: usize, collected: usize, cooldown_active: bool) -> Self {
        use std::cmp::Ordering;
        match index.cmp(&collected) {
            Ordering::Less => Self::Collected,
            Ordering::Equal if cooldown_active => Self::LockedByCooldown,
            Ordering::Equal => Self::Claimable,
            Ordering::Greater => Self::LockedBySequence,
        }
    }

    #[must_use]
    pub fn is_locked(self) -> bool {
        matches!(self, Self::LockedBySequence | Self::LockedByCooldown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub index: usize,
    pub reward_id: RewardId,
    pub status: SlotStatus,
}

/// Derive the status of every slot in catalog order.
#[must_use]
pub fn derive_slots(catalog: &RewardCatalog, collected: usize, cooldown_active: bool) -> Vec<Slot> {
    catalog
        .iter()
        .enumerate()
        .map(|(index, reward)| Slot {
            index,
            reward_id: reward.id().clone(),
            status: SlotStatus::derive(index, collected, cooldown_active),
        })
        .collect()
}
