//! Typing animation: type a phrase, hold, delete it, move to the next.

use crate::config::TypingConfig;
use crate::result::{FolioError, FolioResult};

/// Text to display and how long to wait before the next step
#[derive(Debug, Clone, PartialEq)]
pub struct TypingFrame {
    /// Visible prefix of the current phrase
    pub text: String,
    /// Delay before the next step
    pub next_delay_ms: f64,
}

/// Type/delete cycle over a list of phrases
#[derive(Debug, Clone)]
pub struct TypingEffect {
    phrases: Vec<String>,
    phrase_index: usize,
    char_index: usize,
    deleting: bool,
    type_delay_ms: f64,
    delete_delay_ms: f64,
    hold_delay_ms: f64,
}

impl TypingEffect {
    /// Create an effect; fails on an empty list or an empty phrase
    pub fn new(phrases: Vec<String>, config: &TypingConfig) -> FolioResult<Self> {
        if phrases.is_empty() {
            return Err(FolioError::config("typing animation needs at least one phrase"));
        }
        if phrases.iter().any(String::is_empty) {
            return Err(FolioError::config("typing phrases must not be empty"));
        }
        Ok(Self {
            phrases,
            phrase_index: 0,
            char_index: 0,
            deleting: false,
            type_delay_ms: config.type_delay_ms,
            delete_delay_ms: config.delete_delay_ms,
            hold_delay_ms: config.hold_delay_ms,
        })
    }

    /// Split a `data-phrases` value (`"A|B|C"`), dropping blank entries
    #[must_use]
    pub fn parse_phrases(raw: &str) -> Vec<String> {
        raw.split('|')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Index of the phrase being typed or deleted
    #[must_use]
    pub fn phrase_index(&self) -> usize {
        self.phrase_index
    }

    /// Whether the effect is currently deleting
    #[must_use]
    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    /// Advance one character
    pub fn step(&mut self) -> TypingFrame {
        let phrase = &self.phrases[self.phrase_index];
        let len = phrase.chars().count();

        let mut delay = if self.deleting {
            self.char_index = self.char_index.saturating_sub(1);
            self.delete_delay_ms
        } else {
            self.char_index = (self.char_index + 1).min(len);
            self.type_delay_ms
        };
        let text: String = phrase.chars().take(self.char_index).collect();

        if !self.deleting && self.char_index == len {
            self.deleting = true;
            delay = self.hold_delay_ms;
        } else if self.deleting && self.char_index == 0 {
            // Keeps the delete delay before typing the next phrase
            self.deleting = false;
            self.phrase_index = (self.phrase_index + 1) % self.phrases.len();
        }

        TypingFrame {
            text,
            next_delay_ms: delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(phrases: &[&str]) -> TypingEffect {
        TypingEffect::new(
            phrases.iter().map(|p| (*p).to_string()).collect(),
            &TypingConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_empty_input() {
        assert!(TypingEffect::new(Vec::new(), &TypingConfig::default()).is_err());
        assert!(TypingEffect::new(vec![String::new()], &TypingConfig::default()).is_err());
    }

    #[test]
    fn test_parse_phrases() {
        assert_eq!(
            TypingEffect::parse_phrases(" Rust Dev | | Author "),
            vec!["Rust Dev", "Author"]
        );
        assert!(TypingEffect::parse_phrases("").is_empty());
    }

    #[test]
    fn test_full_cycle() {
        let mut typing = effect(&["ab", "c"]);
        let frames: Vec<(String, f64)> = (0..8)
            .map(|_| {
                let f = typing.step();
                (f.text, f.next_delay_ms)
            })
            .collect();
        let expected = vec![
            ("a".to_string(), 150.0),
            ("ab".to_string(), 2000.0),
            ("a".to_string(), 50.0),
            (String::new(), 50.0),
            ("c".to_string(), 2000.0),
            (String::new(), 50.0),
            ("a".to_string(), 150.0),
            ("ab".to_string(), 2000.0),
        ];
        assert_eq!(frames, expected);
    }

    #[test]
    fn test_phrase_index_wraps() {
        let mut typing = effect(&["x", "y"]);
        typing.step(); // "x", start deleting
        assert!(typing.is_deleting());
        typing.step(); // "", next phrase
        assert_eq!(typing.phrase_index(), 1);
        typing.step();
        typing.step();
        assert_eq!(typing.phrase_index(), 0);
    }

    #[test]
    fn test_multibyte_characters() {
        let mut typing = effect(&["héllo"]);
        assert_eq!(typing.step().text, "h");
        assert_eq!(typing.step().text, "hé");
    }
}
