use std::sync::RwLock;

use sticker_core::model::BookSettings;

/// Host-provided predicate deciding whether the book belongs on the current page.
pub trait LessonContext: Send + Sync {
    fn is_target_lesson(&self) -> bool;
}

/// Shows the book everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysVisible;

impl LessonContext for AlwaysVisible {
    fn is_target_lesson(&self) -> bool {
        true
    }
}

/// Matches when the target text appears in any title the host reports
/// (page title, headings, lesson titles). No target means every page.
#[derive(Debug, Default)]
pub struct TitleMatch {
    target: Option<String>,
    titles: RwLock<Vec<String>>,
}

impl TitleMatch {
    #[must_use]
    pub fn new(target: Option<&str>) -> Self {
        Self {
            target: target.map(str::to_owned).filter(|t| !t.is_empty()),
            titles: RwLock::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &BookSettings) -> Self {
        Self::new(settings.target_lesson())
    }

    /// Replace the titles visible on the current page.
    pub fn set_titles<I, S>(&self, titles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut guard) = self.titles.write() {
            *guard = titles.into_iter().map(Into::into).collect();
        }
    }
}

impl LessonContext for TitleMatch {
    fn is_target_lesson(&self) -> bool {
        let Some(target) = self.target.as_deref() else {
            return true;
        };
        self.titles
            .read()
            .map(|titles| titles.iter().any(|t| t.contains(target)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_target_matches_everywhere() {
        assert!(TitleMatch::new(None).is_target_lesson());
        assert!(TitleMatch::new(Some("")).is_target_lesson());
        assert!(AlwaysVisible.is_target_lesson());
    }

    #[test]
    fn target_must_appear_in_a_title() {
        let ctx = TitleMatch::new(Some("Lesson 3"));
        assert!(!ctx.is_target_lesson());

        ctx.set_titles(["Course home", "Lesson 3: Fractions"]);
        assert!(ctx.is_target_lesson());

        ctx.set_titles(["Lesson 4"]);
        assert!(!ctx.is_target_lesson());
    }

    #[test]
    fn built_from_settings() {
        let settings = BookSettings::new(chrono::Duration::zero(), "ns", Some("Intro".into())).unwrap();
        let ctx = TitleMatch::from_settings(&settings);
        ctx.set_titles(["Intro to Rust"]);
        assert!(ctx.is_target_lesson());
    }
}
