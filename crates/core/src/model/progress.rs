use chrono::{DateTime, Utc};

use crate::model::catalog::RewardCatalog;
use crate::model::ids::RewardId;

/// Durable progress of one sticker book.
///
/// `collected` is in unlock order. Keeping it a prefix of the catalog is the
/// progression controller's job; this type only records what it is given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    collected: Vec<RewardId>,
    celebrated: bool,
    last_claim: Option<DateTime<Utc>>,
}

impl ProgressState {
    /// Rehydrate progress from persisted storage.
    #[must_use]
    pub fn from_persisted(
        collected: Vec<RewardId>,
        celebrated: bool,
        last_claim: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            collected,
            celebrated,
            last_claim,
        }
    }

    #[must_use]
    pub fn collected(&self) -> &[RewardId] {
        &self.collected
    }

    #[must_use]
    pub fn collected_count(&self) -> usize {
        self.collected.len()
    }

    #[must_use]
    pub fn celebrated(&self) -> bool {
        self.celebrated
    }

    #[must_use]
    pub fn last_claim(&self) -> Option<DateTime<Utc>> {
        self.last_claim
    }

    #[must_use]
    pub fn has_collected(&self, id: &RewardId) -> bool {
        self.collected.contains(id)
    }

    #[must_use]
    pub fn is_complete(&self, catalog: &RewardCatalog) -> bool {
        self.collected.len() == catalog.len()
    }

    /// Append a claim and stamp its instant.
    pub fn record_claim(&mut self, id: RewardId, at: DateTime<Utc>) {
        self.collected.push(id);
        self.last_claim = Some(at);
    }

    pub fn mark_celebrated(&mut self) {
        self.celebrated = true;
    }

    /// Drop everything past the longest catalog-matching prefix.
    ///
    /// Returns `true` if anything was removed.
    pub fn truncate_to_catalog(&mut self, catalog: &RewardCatalog) -> bool {
        let keep = catalog.matching_prefix_len(&self.collected);
        if keep == self.collected.len() {
            return false;
        }
        self.collected.truncate(keep);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reward::{QuestionDraft, RewardDraft};
    use crate::time::fixed_now;

    fn catalog(ids: &[&str]) -> RewardCatalog {
        RewardCatalog::from_drafts(
            ids.iter()
                .map(|id| RewardDraft {
                    id: (*id).into(),
                    name: (*id).into(),
                    image: "art.png".into(),
                    quiz: QuestionDraft {
                        question: "?".into(),
                        answers: [("a".to_owned(), "x".to_owned()), ("b".to_owned(), "y".to_owned())]
                            .into_iter()
                            .collect(),
                        correct: "b".into(),
                    },
                })
                .collect(),
        )
        .unwrap()
    }

    fn id(raw: &str) -> RewardId {
        RewardId::new(raw).unwrap()
    }

    #[test]
    fn default_is_empty_uncelebrated_and_unclaimed() {
        let state = ProgressState::default();
        assert_eq!(state.collected_count(), 0);
        assert!(!state.celebrated());
        assert_eq!(state.last_claim(), None);
    }

    #[test]
    fn record_claim_appends_and_stamps() {
        let mut state = ProgressState::default();
        state.record_claim(id("r0"), fixed_now());
        assert_eq!(state.collected(), &[id("r0")]);
        assert_eq!(state.last_claim(), Some(fixed_now()));
        assert!(state.has_collected(&id("r0")));
    }

    #[test]
    fn truncate_keeps_longest_valid_prefix() {
        let catalog = catalog(&["r0", "r1", "r2"]);
        let mut state =
            ProgressState::from_persisted(vec![id("r0"), id("r2"), id("r1")], false, None);
        assert!(state.truncate_to_catalog(&catalog));
        assert_eq!(state.collected(), &[id("r0")]);

        let mut clean = ProgressState::from_persisted(vec![id("r0"), id("r1")], false, None);
        assert!(!clean.truncate_to_catalog(&catalog));
        assert_eq!(clean.collected_count(), 2);
    }

    #[test]
    fn completion_compares_against_catalog_length() {
        let catalog = catalog(&["r0", "r1"]);
        let state = ProgressState::from_persisted(vec![id("r0"), id("r1")], false, None);
        assert!(state.is_complete(&catalog));
        assert!(!ProgressState::default().is_complete(&catalog));
    }
}
