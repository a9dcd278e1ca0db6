use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::artwork::{ArtworkError, ArtworkRef};
use crate::model::ids::RewardId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RewardError {
    #[error("reward id cannot be empty")]
    EmptyId,

    #[error("reward name cannot be empty")]
    EmptyName,

    #[error(transparent)]
    Artwork(#[from] ArtworkError),

    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must have between 2 and 4 options, got {0}")]
    OptionCount(usize),

    #[error("invalid option letter: {0}")]
    InvalidLetter(#[from] ParseLetterError),

    #[error("option {0} has no text")]
    EmptyOption(OptionLetter),

    #[error("correct option {0} is not among the options")]
    CorrectNotInOptions(OptionLetter),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("expected one of a, b, c, d; got {raw:?}")]
pub struct ParseLetterError {
    raw: String,
}

//
// ─── OPTION LETTER ─────────────────────────────────────────────────────────────
//

/// Letter labelling one answer option. Ordering follows the alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [Self::A, Self::B, Self::C, Self::D];

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            OptionLetter::A => 'a',
            OptionLetter::B => 'b',
            OptionLetter::C => 'c',
            OptionLetter::D => 'd',
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char().to_ascii_uppercase())
    }
}

impl FromStr for OptionLetter {
    type Err = ParseLetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(Self::A),
            "b" => Ok(Self::B),
            "c" => Ok(Self::C),
            "d" => Ok(Self::D),
            _ => Err(ParseLetterError { raw: s.to_owned() }),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    options: BTreeMap<OptionLetter, String>,
    correct: OptionLetter,
}

impl Question {
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Options in letter order.
    pub fn options(&self) -> impl Iterator<Item = (OptionLetter, &str)> {
        self.options.iter().map(|(letter, text)| (*letter, text.as_str()))
    }

    #[must_use]
    pub fn option(&self, letter: OptionLetter) -> Option<&str> {
        self.options.get(&letter).map(String::as_str)
    }

    #[must_use]
    pub fn correct(&self) -> OptionLetter {
        self.correct
    }

    #[must_use]
    pub fn is_correct(&self, letter: OptionLetter) -> bool {
        letter == self.correct
    }
}

/// Unvalidated question as written in a book file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionDraft {
    pub question: String,
    pub answers: BTreeMap<String, String>,
    pub correct: String,
}

impl QuestionDraft {
    /// Validate the draft into a `Question`.
    ///
    /// # Errors
    ///
    /// Returns `RewardError` if the prompt is blank, the option count is
    /// outside 2..=4, a letter is not a-d, or the correct letter has no option.
    pub fn validate(self) -> Result<Question, RewardError> {
        let prompt = self.question.trim().to_owned();
        if prompt.is_empty() {
            return Err(RewardError::EmptyPrompt);
        }
        if !(2..=4).contains(&self.answers.len()) {
            return Err(RewardError::OptionCount(self.answers.len()));
        }

        let mut options = BTreeMap::new();
        for (raw_letter, text) in self.answers {
            let letter: OptionLetter = raw_letter.parse()?;
            let text = text.trim().to_owned();
            if text.is_empty() {
                return Err(RewardError::EmptyOption(letter));
            }
            options.insert(letter, text);
        }
        // "a" and "A" collapse onto the same letter
        if options.len() < 2 {
            return Err(RewardError::OptionCount(options.len()));
        }

        let correct: OptionLetter = self.correct.parse()?;
        if !options.contains_key(&correct) {
            return Err(RewardError::CorrectNotInOptions(correct));
        }

        Ok(Question {
            prompt,
            options,
            correct,
        })
    }
}

//
// ─── REWARD ────────────────────────────────────────────────────────────────────
//

/// A collectible sticker and the question that guards it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardDefinition {
    id: RewardId,
    name: String,
    artwork: ArtworkRef,
    question: Question,
}

impl RewardDefinition {
    #[must_use]
    pub fn id(&self) -> &RewardId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn artwork(&self) -> &ArtworkRef {
        &self.artwork
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }
}

/// Unvalidated reward as written in a book file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RewardDraft {
    pub id: String,
    pub name: String,
    pub image: String,
    pub quiz: QuestionDraft,
}

impl RewardDraft {
    /// Validate the draft into a `RewardDefinition`.
    ///
    /// # Errors
    ///
    /// Returns `RewardError` for a blank id, name or artwork, or any question error.
    pub fn validate(self) -> Result<RewardDefinition, RewardError> {
        let id = RewardId::new(self.id).map_err(|_| RewardError::EmptyId)?;
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(RewardError::EmptyName);
        }
        let artwork = ArtworkRef::parse(&self.image)?;
        let question = self.quiz.validate()?;

        Ok(RewardDefinition {
            id,
            name,
            artwork,
            question,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn question(answers: &[(&str, &str)], correct: &str) -> QuestionDraft {
        QuestionDraft {
            question: "Which one?".into(),
            answers: answers
                .iter()
                .map(|(l, t)| ((*l).to_owned(), (*t).to_owned()))
                .collect(),
            correct: correct.into(),
        }
    }

    fn draft(correct: &str) -> RewardDraft {
        RewardDraft {
            id: "sticker_1".into(),
            name: "First Sticker".into(),
            image: "https://example.com/sticker1.png".into(),
            quiz: question(&[("a", "One"), ("b", "Two"), ("c", "Three")], correct),
        }
    }

    #[test]
    fn valid_reward_keeps_options_in_letter_order() {
        let reward = draft("c").validate().unwrap();
        assert_eq!(reward.id().as_str(), "sticker_1");
        let letters: Vec<_> = reward.question().options().map(|(l, _)| l).collect();
        assert_eq!(letters, vec![OptionLetter::A, OptionLetter::B, OptionLetter::C]);
        assert_eq!(reward.question().correct(), OptionLetter::C);
        assert!(reward.question().is_correct(OptionLetter::C));
        assert!(!reward.question().is_correct(OptionLetter::A));
    }

    #[test]
    fn correct_letter_must_be_an_option() {
        let err = draft("d").validate().unwrap_err();
        assert_eq!(err, RewardError::CorrectNotInOptions(OptionLetter::D));
    }

    #[test]
    fn correct_letter_must_parse() {
        let err = draft("z").validate().unwrap_err();
        assert!(matches!(err, RewardError::InvalidLetter(_)));
    }

    #[test]
    fn option_count_is_bounded() {
        let mut one = draft("a");
        one.quiz = question(&[("a", "Only")], "a");
        assert_eq!(one.validate().unwrap_err(), RewardError::OptionCount(1));

        let mut five = draft("a");
        five.quiz = question(
            &[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4"), ("e", "5")],
            "a",
        );
        assert_eq!(five.validate().unwrap_err(), RewardError::OptionCount(5));
    }

    #[test]
    fn duplicate_letters_by_case_count_once() {
        let mut dup = draft("a");
        dup.quiz = question(&[("a", "lower"), ("A", "upper")], "a");
        assert_eq!(dup.validate().unwrap_err(), RewardError::OptionCount(1));
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut no_name = draft("a");
        no_name.name = " ".into();
        assert_eq!(no_name.validate().unwrap_err(), RewardError::EmptyName);

        let mut no_id = draft("a");
        no_id.id = String::new();
        assert_eq!(no_id.validate().unwrap_err(), RewardError::EmptyId);

        let mut no_text = draft("a");
        no_text.quiz = question(&[("a", "ok"), ("b", "  ")], "a");
        assert_eq!(
            no_text.validate().unwrap_err(),
            RewardError::EmptyOption(OptionLetter::B)
        );
    }

    #[test]
    fn letters_parse_case_insensitively() {
        assert_eq!("B".parse::<OptionLetter>().unwrap(), OptionLetter::B);
        assert_eq!(" d ".parse::<OptionLetter>().unwrap(), OptionLetter::D);
        assert!("ab".parse::<OptionLetter>().is_err());
        assert_eq!(OptionLetter::C.to_string(), "C");
    }
}
