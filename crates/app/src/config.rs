//! Book definition files.

use std::path::Path;

use chrono::Duration;
use serde::Deserialize;
use sticker_core::model::{
    BookSettings, DEFAULT_DELAY_MINUTES, DEFAULT_NAMESPACE, RewardCatalog, RewardDraft,
};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read book file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse book file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("delay_minutes must be a finite, non-negative number (got {0})")]
    InvalidDelay(f64),

    #[error("invalid book: {0}")]
    Book(#[from] sticker_core::Error),
}

/// On-disk shape of a sticker book.
///
/// ```toml
/// delay_minutes = 1
/// namespace = "sticker_book"
/// target_lesson = "Lesson 4"
///
/// [[rewards]]
/// id = "fox"
/// name = "Clever Fox"
/// image = "stickers/fox.png"
/// quiz = { question = "2 + 2?", answers = { a = "3", b = "4" }, correct = "b" }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookFile {
    #[serde(default = "default_delay")]
    pub delay_minutes: f64,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub target_lesson: Option<String>,
    #[serde(default)]
    pub rewards: Vec<RewardDraft>,
}

fn default_delay() -> f64 {
    f64::from(DEFAULT_DELAY_MINUTES)
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_owned()
}

/// A validated book: the catalog plus its settings.
#[derive(Debug, Clone)]
pub struct Book {
    pub catalog: RewardCatalog,
    pub settings: BookSettings,
}

impl BookFile {
    /// Parse a book from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML or unknown fields.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Read and parse a book file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    /// Validate the rewards and settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a bad delay, namespace, or reward.
    pub fn into_book(self) -> Result<Book, ConfigError> {
        if !self.delay_minutes.is_finite() || self.delay_minutes < 0.0 {
            return Err(ConfigError::InvalidDelay(self.delay_minutes));
        }
        #[allow(clippy::cast_possible_truncation)]
        let millis = (self.delay_minutes * 60_000.0).round() as i64;
        let settings =
            BookSettings::new(Duration::milliseconds(millis), self.namespace, self.target_lesson)
                .map_err(sticker_core::Error::from)?;
        let catalog = RewardCatalog::from_drafts(self.rewards).map_err(sticker_core::Error::from)?;
        Ok(Book { catalog, settings })
    }
}
