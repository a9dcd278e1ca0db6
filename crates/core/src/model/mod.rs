mod artwork;
mod catalog;
mod ids;
mod progress;
mod quiz;
mod reward;
mod settings;
mod slot;

pub use artwork::{ArtworkError, ArtworkRef};
pub use catalog::{CatalogError, RewardCatalog};
pub use ids::{ParseIdError, RewardId};
pub use progress::ProgressState;
pub use quiz::{QuizOutcome, QuizSession, QuizView};
pub use reward::{
    OptionLetter, ParseLetterError, Question, QuestionDraft, RewardDefinition, RewardDraft,
    RewardError,
};
pub use settings::{BookSettings, DEFAULT_DELAY_MINUTES, DEFAULT_NAMESPACE, SettingsError};
pub use slot::{Slot, SlotStatus, derive_slots};
