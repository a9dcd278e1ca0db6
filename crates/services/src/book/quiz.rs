use sticker_core::model::{OptionLetter, QuizOutcome, QuizSession, QuizView, RewardDefinition, RewardId};
use tracing::debug;

/// How a submitted letter was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizVerdict {
    /// No question is open.
    NoSession,
    /// The question was already answered correctly; nothing changes.
    AlreadyCorrect,
    Incorrect,
    Correct(RewardId),
}

/// Owns the single live question, if any.
///
/// Wrong answers are free and unlimited; the session stays open until it is
/// answered correctly and acknowledged, or closed by the host.
#[derive(Debug, Default)]
pub struct QuizEvaluator {
    session: Option<QuizSession>,
}

impl QuizEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a question for `reward`.
    ///
    /// Returns `false` without touching the live session if one is already
    /// open for a different reward. Re-opening the same reward keeps its state.
    pub fn open(&mut self, reward: &RewardDefinition) -> bool {
        if let Some(session) = &self.session {
            if session.reward_id() != reward.id() {
                debug!(open = %session.reward_id(), requested = %reward.id(), "quiz already open");
                return false;
            }
            return true;
        }
        self.session = Some(QuizSession::new(reward.clone()));
        true
    }

    pub fn answer(&mut self, letter: OptionLetter) -> QuizVerdict {
        let Some(session) = self.session.as_mut() else {
            return QuizVerdict::NoSession;
        };
        match session.judge(letter) {
            None => QuizVerdict::AlreadyCorrect,
            Some(QuizOutcome::JustCorrect) => QuizVerdict::Correct(session.reward_id().clone()),
            Some(_) => QuizVerdict::Incorrect,
        }
    }

    /// Close a correctly answered session once its feedback has been shown.
    ///
    /// Returns `true` if a session was closed.
    pub fn acknowledge(&mut self) -> bool {
        if self.outcome() == Some(QuizOutcome::JustCorrect) {
            self.session = None;
            return true;
        }
        false
    }

    /// Revert wrong-answer feedback to pending.
    ///
    /// Returns `true` if the outcome changed.
    pub fn clear_feedback(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) if session.outcome() == QuizOutcome::JustIncorrect => {
                session.settle();
                true
            }
            _ => false,
        }
    }

    /// Discard the session unconditionally.
    pub fn close(&mut self) {
        self.session = None;
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<QuizOutcome> {
        self.session.as_ref().map(QuizSession::outcome)
    }

    #[must_use]
    pub fn view(&self) -> Option<QuizView> {
        self.session.as_ref().map(QuizSession::view)
    }
}
