use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::RewardId;
use crate::model::reward::{RewardDefinition, RewardDraft, RewardError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("a sticker book needs at least one reward")]
    Empty,

    #[error("duplicate reward id: {0}")]
    DuplicateId(RewardId),

    #[error("reward #{index} ({id:?}) is invalid: {source}")]
    InvalidReward {
        index: usize,
        id: String,
        #[source]
        source: RewardError,
    },
}

/// The ordered, immutable sequence of rewards a book unlocks.
///
/// Position in the catalog is unlock order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardCatalog {
    rewards: Vec<RewardDefinition>,
}

impl RewardCatalog {
    /// Build a catalog from already-validated rewards.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for no rewards or `DuplicateId` if two
    /// rewards share an id.
    pub fn new(rewards: Vec<RewardDefinition>) -> Result<Self, CatalogError> {
        if rewards.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(rewards.len());
        for reward in &rewards {
            if !seen.insert(reward.id()) {
                return Err(CatalogError::DuplicateId(reward.id().clone()));
            }
        }
        Ok(Self { rewards })
    }

    /// Validate every draft, reporting the first invalid one by position.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidReward` for the first draft that fails
    /// validation, or any error from [`RewardCatalog::new`].
    pub fn from_drafts(drafts: Vec<RewardDraft>) -> Result<Self, CatalogError> {
        let rewards = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                let id = draft.id.clone();
                draft
                    .validate()
                    .map_err(|source| CatalogError::InvalidReward { index, id, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rewards)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// Always false for a constructed catalog; kept for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RewardDefinition> {
        self.rewards.get(index)
    }

    #[must_use]
    pub fn find(&self, id: &RewardId) -> Option<&RewardDefinition> {
        self.rewards.iter().find(|r| r.id() == id)
    }

    #[must_use]
    pub fn position(&self, id: &RewardId) -> Option<usize> {
        self.rewards.iter().position(|r| r.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RewardDefinition> {
        self.rewards.iter()
    }

    /// Length of the longest prefix of `collected` that matches the catalog
    /// position by position.
    #[must_use]
    pub fn matching_prefix_len(&self, collected: &[RewardId]) -> usize {
        collected
            .iter()
            .zip(self.rewards.iter())
            .take_while(|(held, reward)| *held == reward.id())
            .count()
    }

    /// True when `collected` is exactly the first `collected.len()` rewards.
    #[must_use]
    pub fn is_prefix(&self, collected: &[RewardId]) -> bool {
        collected.len() <= self.len() && self.matching_prefix_len(collected) == collected.len()
    }
}

impl<'a> IntoIterator for &'a RewardCatalog {
    type Item = &'a RewardDefinition;
    type IntoIter = std::slice::Iter<'a, RewardDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.rewards.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reward::QuestionDraft;

    fn draft(id: &str) -> RewardDraft {
        RewardDraft {
            id: id.into(),
            name: format!("Sticker {id}"),
            image: format!("https://example.com/{id}.png"),
            quiz: QuestionDraft {
                question: "Pick a".into(),
                answers: [("a".to_owned(), "yes".to_owned()), ("b".to_owned(), "no".to_owned())]
                    .into_iter()
                    .collect(),
                correct: "a".into(),
            },
        }
    }

    fn ids(raw: &[&str]) -> Vec<RewardId> {
        raw.iter().map(|s| RewardId::new(*s).unwrap()).collect()
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert_eq!(RewardCatalog::from_drafts(Vec::new()), Err(CatalogError::Empty));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = RewardCatalog::from_drafts(vec![draft("r0"), draft("r0")]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId(RewardId::new("r0").unwrap()));
    }

    #[test]
    fn invalid_reward_reports_its_position() {
        let mut bad = draft("r1");
        bad.quiz.correct = "c".into();
        let err = RewardCatalog::from_drafts(vec![draft("r0"), bad]).unwrap_err();
        match err {
            CatalogError::InvalidReward { index, id, source } => {
                assert_eq!(index, 1);
                assert_eq!(id, "r1");
                assert!(matches!(source, RewardError::CorrectNotInOptions(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn prefix_checks_follow_catalog_order() {
        let catalog =
            RewardCatalog::from_drafts(vec![draft("r0"), draft("r1"), draft("r2")]).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.position(&RewardId::new("r2").unwrap()), Some(2));

        assert!(catalog.is_prefix(&[]));
        assert!(catalog.is_prefix(&ids(&["r0", "r1"])));
        assert!(!catalog.is_prefix(&ids(&["r1"])));
        assert!(!catalog.is_prefix(&ids(&["r0", "r0"])));
        assert!(!catalog.is_prefix(&ids(&["r0", "r1", "r2", "r3"])));

        assert_eq!(catalog.matching_prefix_len(&ids(&["r0", "x", "r2"])), 1);
        assert_eq!(catalog.matching_prefix_len(&ids(&["r0", "r1", "r2", "r3"])), 3);
    }
}
