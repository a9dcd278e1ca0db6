mod completion;
mod engine;
mod lesson;
mod observer;
mod progression;
mod quiz;
mod ticker;

// Public API of the sticker book subsystem.
pub use completion::CompletionTrigger;
pub use engine::{AnswerResult, Certificate, CertificateEntry, StickerBook};
pub use lesson::{AlwaysVisible, LessonContext, TitleMatch};
pub use observer::ProgressObserver;
pub use progression::{ProgressSnapshot, ProgressionController};
pub use quiz::{QuizEvaluator, QuizVerdict};
pub use ticker::CooldownTicker;
