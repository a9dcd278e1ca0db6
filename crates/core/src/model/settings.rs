use chrono::Duration;
use thiserror::Error;

pub const DEFAULT_NAMESPACE: &str = "sticker_book";
pub const DEFAULT_DELAY_MINUTES: u32 = 1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("cooldown delay cannot be negative")]
    NegativeDelay,

    #[error("storage namespace must be non-empty and contain no whitespace")]
    InvalidNamespace,
}

/// Runtime-immutable knobs for one sticker book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSettings {
    cooldown: Duration,
    namespace: String,
    target_lesson: Option<String>,
}

impl Default for BookSettings {
    fn default() -> Self {
        Self {
            cooldown: Duration::minutes(i64::from(DEFAULT_DELAY_MINUTES)),
            namespace: DEFAULT_NAMESPACE.to_owned(),
            target_lesson: None,
        }
    }
}

impl BookSettings {
    /// Creates custom book settings.
    ///
    /// A zero `cooldown` disables the wait between claims. A blank
    /// `target_lesson` means the book is shown everywhere.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` for a negative delay or an unusable namespace.
    pub fn new(
        cooldown: Duration,
        namespace: impl Into<String>,
        target_lesson: Option<String>,
    ) -> Result<Self, SettingsError> {
        if cooldown < Duration::zero() {
            return Err(SettingsError::NegativeDelay);
        }
        let namespace = namespace.into();
        if namespace.is_empty() || namespace.chars().any(char::is_whitespace) {
            return Err(SettingsError::InvalidNamespace);
        }
        let target_lesson = target_lesson
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty());

        Ok(Self {
            cooldown,
            namespace,
            target_lesson,
        })
    }

    /// Default settings with the delay given in whole minutes.
    #[must_use]
    pub fn with_delay_minutes(minutes: u32) -> Self {
        Self {
            cooldown: Duration::minutes(i64::from(minutes)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    #[must_use]
    pub fn cooldown_enabled(&self) -> bool {
        self.cooldown > Duration::zero()
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn target_lesson(&self) -> Option<&str> {
        self.target_lesson.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_book() {
        let settings = BookSettings::default();
        assert_eq!(settings.cooldown(), Duration::minutes(1));
        assert_eq!(settings.namespace(), "sticker_book");
        assert_eq!(settings.target_lesson(), None);
        assert!(settings.cooldown_enabled());
    }

    #[test]
    fn zero_delay_disables_cooldown() {
        let settings = BookSettings::with_delay_minutes(0);
        assert!(!settings.cooldown_enabled());
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            BookSettings::new(Duration::seconds(-1), "ns", None),
            Err(SettingsError::NegativeDelay)
        );
        assert_eq!(
            BookSettings::new(Duration::zero(), "two words", None),
            Err(SettingsError::InvalidNamespace)
        );
        assert_eq!(
            BookSettings::new(Duration::zero(), "", None),
            Err(SettingsError::InvalidNamespace)
        );
    }

    #[test]
    fn blank_target_lesson_means_everywhere() {
        let settings = BookSettings::new(Duration::zero(), "ns", Some("   ".into())).unwrap();
        assert_eq!(settings.target_lesson(), None);
    }
}
