use crate::model::ids::RewardId;
use crate::model::reward::{OptionLetter, RewardDefinition};

/// Feedback state of the live question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuizOutcome {
    Pending,
    JustCorrect,
    JustIncorrect,
}

/// A single live attempt at a reward's question. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    reward: RewardDefinition,
    outcome: QuizOutcome,
}

impl QuizSession {
    #[must_use]
    pub fn new(reward: RewardDefinition) -> Self {
        Self {
            reward,
            outcome: QuizOutcome::Pending,
        }
    }

    #[must_use]
    pub fn reward(&self) -> &RewardDefinition {
        &self.reward
    }

    #[must_use]
    pub fn reward_id(&self) -> &RewardId {
        self.reward.id()
    }

    #[must_use]
    pub fn outcome(&self) -> QuizOutcome {
        self.outcome
    }

    /// Judge a submitted letter.
    ///
    /// Returns `None` once the session has been answered correctly: a
    /// correct answer is final and must be acknowledged, not re-judged.
    pub fn judge(&mut self, letter: OptionLetter) -> Option<QuizOutcome> {
        if self.outcome == QuizOutcome::JustCorrect {
            return None;
        }
        self.outcome = if self.reward.question().is_correct(letter) {
            QuizOutcome::JustCorrect
        } else {
            QuizOutcome::JustIncorrect
        };
        Some(self.outcome)
    }

    /// Clear wrong-answer feedback so another attempt can be made.
    pub fn settle(&mut self) {
        if self.outcome == QuizOutcome::JustIncorrect {
            self.outcome = QuizOutcome::Pending;
        }
    }

    #[must_use]
    pub fn view(&self) -> QuizView {
        let question = self.reward.question();
        QuizView {
            reward_id: self.reward.id().clone(),
            reward_name: self.reward.name().to_owned(),
            prompt: question.prompt().to_owned(),
            options: question
                .options()
                .map(|(letter, text)| (letter, text.to_owned()))
                .collect(),
            outcome: self.outcome,
        }
    }
}

/// What a host needs to draw the open question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizView {
    pub reward_id: RewardId,
    pub reward_name: String,
    pub prompt: String,
    pub options: Vec<(OptionLetter, String)>,
    pub outcome: QuizOutcome,
}
