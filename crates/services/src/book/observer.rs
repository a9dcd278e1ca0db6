use sticker_core::model::QuizOutcome;

use super::progression::ProgressSnapshot;

/// Outward signals for a presentation layer.
///
/// All methods default to no-ops so hosts implement only what they draw.
pub trait ProgressObserver: Send + Sync {
    /// Slot statuses or counts may have changed.
    fn on_progress_changed(&self, _snapshot: &ProgressSnapshot) {}

    /// The open question was judged, or its feedback cleared.
    fn on_quiz_feedback(&self, _outcome: QuizOutcome) {}

    /// The book was completed; fires once per completion episode.
    fn on_completed_once(&self) {}
}
