#![forbid(unsafe_code)]

pub mod book;
pub mod error;

pub use sticker_core::Clock;

pub use book::{
    AlwaysVisible, AnswerResult, Certificate, CertificateEntry, CompletionTrigger, CooldownTicker,
    LessonContext, ProgressObserver, ProgressSnapshot, ProgressionController, QuizEvaluator,
    QuizVerdict, StickerBook, TitleMatch,
};
pub use error::EngineError;
