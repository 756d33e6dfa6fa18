//! Surface-text proficiency heuristic.

use serde::{Deserialize, Serialize};

const ELEMENTARY_MIN_TOKENS: usize = 8;
const INTERMEDIATE_MIN_TOKENS: usize = 18;

/// Coarse proficiency band of a learner utterance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Elementary,
    Intermediate,
}

impl Level {
    /// CEFR tag used when annotating the instruction prompt.
    #[must_use]
    pub const fn cefr(self) -> &'static str {
        match self {
            Self::Beginner => "A1",
            Self::Elementary => "A2",
            Self::Intermediate => "B1",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.cefr())
    }
}

/// Classify `text` by its whitespace-delimited token count.
#[must_use]
pub fn estimate_level(text: &str) -> Level {
    match text.split_whitespace().count() {
        n if n < ELEMENTARY_MIN_TOKENS => Level::Beginner,
        n if n < INTERMEDIATE_MIN_TOKENS => Level::Elementary,
        _ => Level::Intermediate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["mot"; n].join(" ")
    }

    #[test]
    fn single_word_is_beginner() {
        assert_eq!(estimate_level("Salut"), Level::Beginner);
    }

    #[test]
    fn empty_input_is_beginner() {
        assert_eq!(estimate_level(""), Level::Beginner);
        assert_eq!(estimate_level("   \n\t "), Level::Beginner);
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(estimate_level(&words(7)), Level::Beginner);
        assert_eq!(estimate_level(&words(8)), Level::Elementary);
        assert_eq!(estimate_level(&words(17)), Level::Elementary);
        assert_eq!(estimate_level(&words(18)), Level::Intermediate);
        assert_eq!(estimate_level(&words(40)), Level::Intermediate);
    }

    #[test]
    fn counts_tokens_not_characters() {
        let sentence = "Je   m'appelle\tLéa et\nj'habite à Lyon avec ma famille";
        assert_eq!(estimate_level(sentence), Level::Elementary);
    }

    #[test]
    fn cefr_tags() {
        assert_eq!(Level::Beginner.to_string(), "A1");
        assert_eq!(Level::Elementary.cefr(), "A2");
        assert_eq!(Level::Intermediate.cefr(), "B1");
    }
}
