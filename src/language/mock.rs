//! Mock language detector for testing
//!
//! Deterministic answers let pipeline tests exercise language filtering and
//! routing without depending on a statistical model.
//!
//! # Example
//!
//! ```
//! use exquisite_corpus::language::{LanguageDetector, MockDetector};
//!
//! let detector = MockDetector::fixed("fr");
//! assert_eq!(detector.detect("anything").language, "fr");
//! ```

use crate::language::detector::{Detection, LanguageDetector};
use std::collections::HashMap;

/// Mock detection modes
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Every text is detected as the given language
    Fixed(String),

    /// Exact text -> language table; other texts are undetermined
    Mappings(HashMap<String, String>),

    /// Nothing is ever detected
    Undetermined,
}

/// Mock detector returning predetermined answers.
///
/// Answers carry full confidence unless set with [`MockDetector::with_confidence`].
#[derive(Debug, Clone)]
pub struct MockDetector {
    mode: MockMode,
    confidence: f64,
}

impl MockDetector {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            confidence: 1.0,
        }
    }

    /// Report `confidence` for every determined answer.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn fixed(language: &str) -> Self {
        Self::new(MockMode::Fixed(language.to_string()))
    }

    /// Build a detector from `(text, language)` pairs.
    pub fn with_mappings<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mappings = pairs
            .into_iter()
            .map(|(text, language)| (text.to_string(), language.to_string()))
            .collect();
        Self::new(MockMode::Mappings(mappings))
    }

    fn answer(&self, language: &str) -> Detection {
        Detection {
            language: language.to_string(),
            confidence: self.confidence,
        }
    }
}

impl LanguageDetector for MockDetector {
    fn detect(&self, text: &str) -> Detection {
        match &self.mode {
            MockMode::Fixed(language) => self.answer(language),
            MockMode::Mappings(mappings) => mappings
                .get(text)
                .map(|language| self.answer(language))
                .unwrap_or_else(Detection::undetermined),
            MockMode::Undetermined => Detection::undetermined(),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
