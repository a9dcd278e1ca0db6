use std::fmt;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, NaiveDate, Utc};
use sticker_core::Clock;
use sticker_core::model::{
    ArtworkRef, BookSettings, OptionLetter, QuizOutcome, QuizView, RewardCatalog, RewardId, Slot,
};
use storage::ProgressStore;
use storage::repository::KeyValueRepository;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::completion::CompletionTrigger;
use super::lesson::{AlwaysVisible, LessonContext};
use super::observer::ProgressObserver;
use super::progression::{ProgressSnapshot, ProgressionController};
use super::quiz::{QuizEvaluator, QuizVerdict};
use super::ticker::CooldownTicker;
use crate::error::EngineError;

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// What happened to a submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerResult {
    /// No question was open.
    NoQuiz,
    /// The open question was already answered correctly.
    Ignored,
    /// Wrong letter; the question stays open.
    Incorrect,
    /// Right letter and the reward was added to the collection.
    Claimed,
    /// Right letter, but the reward is no longer next in line.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateEntry {
    pub name: String,
    pub artwork: ArtworkRef,
}

/// Printable proof of a finished book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub awarded_on: NaiveDate,
    pub rewards: Vec<CertificateEntry>,
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// One sticker book: progression, the live quiz, completion, and cooldown ticks.
///
/// Each instance owns its own state; independent books need independent
/// engines with distinct namespaces.
pub struct StickerBook {
    controller: ProgressionController,
    quiz: QuizEvaluator,
    completion: CompletionTrigger,
    observers: Vec<Arc<dyn ProgressObserver>>,
    lesson: Arc<dyn LessonContext>,
    visible: bool,
    tick_period: Option<StdDuration>,
    ticker: Option<CooldownTicker>,
}

impl StickerBook {
    /// Open a book over `records`, loading any saved progress.
    ///
    /// Nothing is published until [`StickerBook::refresh`] is called, so
    /// observers can be attached first.
    pub async fn open(
        catalog: Arc<RewardCatalog>,
        settings: BookSettings,
        records: Arc<dyn KeyValueRepository>,
        clock: Clock,
    ) -> Self {
        let store = ProgressStore::new(records, settings.namespace());
        let controller = ProgressionController::load(catalog, settings, store, clock).await;
        Self {
            controller,
            quiz: QuizEvaluator::new(),
            completion: CompletionTrigger::new(),
            observers: Vec::new(),
            lesson: Arc::new(AlwaysVisible),
            visible: true,
            tick_period: None,
            ticker: None,
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    #[must_use]
    pub fn with_lesson_context(mut self, lesson: Arc<dyn LessonContext>) -> Self {
        self.visible = lesson.is_target_lesson();
        self.lesson = lesson;
        self
    }

    /// Publish cooldown countdowns every `period` while a cooldown runs.
    #[must_use]
    pub fn with_cooldown_ticks(mut self, period: StdDuration) -> Self {
        self.tick_period = Some(period);
        self
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn catalog(&self) -> &RewardCatalog {
        self.controller.catalog()
    }

    #[must_use]
    pub fn settings(&self) -> &BookSettings {
        self.controller.settings()
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.controller.snapshot()
    }

    #[must_use]
    pub fn slots(&self) -> Vec<Slot> {
        self.controller.slots()
    }

    #[must_use]
    pub fn collected(&self) -> &[RewardId] {
        self.controller.state().collected()
    }

    #[must_use]
    pub fn celebrated(&self) -> bool {
        self.controller.state().celebrated()
    }

    #[must_use]
    pub fn cooldown_remaining(&self) -> chrono::Duration {
        self.controller.cooldown_remaining()
    }

    #[must_use]
    pub fn quiz(&self) -> Option<QuizView> {
        self.quiz.view()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Countdown updates for the running cooldown, if ticks are enabled and one is running.
    #[must_use]
    pub fn cooldown_ticks(&self) -> Option<watch::Receiver<StdDuration>> {
        self.ticker
            .as_ref()
            .filter(|t| !t.is_finished())
            .map(CooldownTicker::subscribe)
    }

    /// Certificate data once every reward is collected.
    #[must_use]
    pub fn certificate(&self, now: DateTime<Utc>) -> Option<Certificate> {
        if !self.controller.is_complete() {
            return None;
        }
        Some(Certificate {
            awarded_on: now.date_naive(),
            rewards: self
                .catalog()
                .iter()
                .map(|r| CertificateEntry {
                    name: r.name().to_owned(),
                    artwork: r.artwork().clone(),
                })
                .collect(),
        })
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        self.controller.clock_mut()
    }

    //
    // ─── INBOUND CALLS ─────────────────────────────────────────────────────────
    //

    /// Re-read progress, notify observers, and run the completion check.
    ///
    /// Call after construction and whenever time may have moved a cooldown
    /// (for example when the ticker reports zero).
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the completion flag cannot be persisted.
    pub async fn refresh(&mut self) -> Result<ProgressSnapshot, EngineError> {
        self.controller.refresh().await;
        self.publish().await
    }

    /// Open the question for `id` if it is the claimable reward.
    ///
    /// Anything else (collected, locked, unknown, hidden book, another quiz
    /// open) is a silent no-op returning `None`.
    pub async fn request_attempt(&mut self, id: &RewardId) -> Option<QuizView> {
        if !self.visible {
            debug!(reward = %id, "attempt ignored; book hidden");
            return None;
        }
        self.controller.refresh().await;
        let reward = self.controller.admit_attempt(id)?.clone();
        if !self.quiz.open(&reward) {
            return None;
        }
        self.quiz.view()
    }

    /// Judge `letter` against the open question.
    ///
    /// A persisted claim is reported as `Claimed` even if the completion flag
    /// write that follows it fails; that failure is logged and the completion
    /// check runs again on the next refresh.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if a correct answer cannot be persisted.
    pub async fn submit_answer(&mut self, letter: OptionLetter) -> Result<AnswerResult, EngineError> {
        match self.quiz.answer(letter) {
            QuizVerdict::NoSession => Ok(AnswerResult::NoQuiz),
            QuizVerdict::AlreadyCorrect => Ok(AnswerResult::Ignored),
            QuizVerdict::Incorrect => {
                self.emit_feedback(QuizOutcome::JustIncorrect);
                Ok(AnswerResult::Incorrect)
            }
            QuizVerdict::Correct(id) => {
                self.emit_feedback(QuizOutcome::JustCorrect);
                if !self.controller.record_success(&id).await? {
                    // storage was re-read; show whatever another instance left there
                    self.publish().await?;
                    return Ok(AnswerResult::Stale);
                }
                self.ticker = None;
                if let Err(err) = self.publish().await {
                    warn!(reward = %id, error = %err, "claim saved but completion flag was not");
                }
                Ok(AnswerResult::Claimed)
            }
        }
    }

    /// Close a correctly answered question once its feedback has been shown.
    pub fn acknowledge_correct(&mut self) -> bool {
        self.quiz.acknowledge()
    }

    /// Return a wrong-answer question to pending.
    pub fn clear_feedback(&mut self) {
        if self.quiz.clear_feedback() {
            self.emit_feedback(QuizOutcome::Pending);
        }
    }

    pub fn cancel_quiz(&mut self) {
        self.quiz.close();
    }

    /// Wipe all progress and start a new completion episode.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the records cannot be cleared.
    pub async fn reset(&mut self) -> Result<ProgressSnapshot, EngineError> {
        self.quiz.close();
        self.ticker = None;
        self.controller.reset().await?;
        self.publish().await
    }

    /// Re-evaluate the lesson predicate after the host's page changed.
    ///
    /// Hiding the book closes any open question. Returns the new visibility.
    pub fn context_changed(&mut self) -> bool {
        self.visible = self.lesson.is_target_lesson();
        if !self.visible {
            self.quiz.close();
        }
        self.visible
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    async fn publish(&mut self) -> Result<ProgressSnapshot, EngineError> {
        let snapshot = self.controller.snapshot();
        for observer in &self.observers {
            observer.on_progress_changed(&snapshot);
        }
        self.sync_ticker(&snapshot);
        if self.completion.check(&mut self.controller).await? {
            for observer in &self.observers {
                observer.on_completed_once();
            }
        }
        Ok(snapshot)
    }

    fn sync_ticker(&mut self, snapshot: &ProgressSnapshot) {
        let Some(period) = self.tick_period else {
            return;
        };
        if !snapshot.cooldown_active() {
            self.ticker = None;
            return;
        }
        if self.ticker.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }
        let remaining = snapshot.cooldown_remaining.to_std().unwrap_or_default();
        self.ticker = Some(CooldownTicker::start(remaining, period));
    }

    fn emit_feedback(&self, outcome: QuizOutcome) {
        for observer in &self.observers {
            observer.on_quiz_feedback(outcome);
        }
    }
}

impl fmt::Debug for StickerBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StickerBook")
            .field("namespace", &self.controller.settings().namespace())
            .field("collected", &self.controller.collected_count())
            .field("total", &self.controller.catalog().len())
            .field("quiz", &self.quiz.outcome())
            .field("visible", &self.visible)
            .field("ticking", &self.ticker.is_some())
            .finish_non_exhaustive()
    }
}
