//! Language detector trait and the whatlang-backed implementation
//!
//! The [`LanguageDetector`] trait keeps pipelines independent of the
//! detection backend. [`WhatlangDetector`] is the production backend; tests
//! use [`crate::language::MockDetector`].

use crate::language::tag::UNDETERMINED;
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

/// Text fragments that carry no language signal.
static NOISE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+|[@#]\w+|\d+").unwrap());

/// ISO 639-3 codes reported by whatlang and their shortest BCP 47 tags.
const ISO639_3_TO_BCP47: &[(&str, &str)] = &[
    ("afr", "af"),
    ("aka", "ak"),
    ("amh", "am"),
    ("ara", "ar"),
    ("aze", "az"),
    ("bel", "be"),
    ("ben", "bn"),
    ("bul", "bg"),
    ("cat", "ca"),
    ("ces", "cs"),
    ("cmn", "zh"),
    ("dan", "da"),
    ("deu", "de"),
    ("ell", "el"),
    ("eng", "en"),
    ("epo", "eo"),
    ("est", "et"),
    ("fin", "fi"),
    ("fra", "fr"),
    ("guj", "gu"),
    ("heb", "he"),
    ("hin", "hi"),
    ("hrv", "hr"),
    ("hun", "hu"),
    ("hye", "hy"),
    ("ind", "id"),
    ("ita", "it"),
    ("jav", "jv"),
    ("jpn", "ja"),
    ("kan", "kn"),
    ("kat", "ka"),
    ("khm", "km"),
    ("kor", "ko"),
    ("lat", "la"),
    ("lav", "lv"),
    ("lit", "lt"),
    ("mal", "ml"),
    ("mar", "mr"),
    ("mkd", "mk"),
    ("mya", "my"),
    ("nep", "ne"),
    ("nld", "nl"),
    ("nob", "nb"),
    ("ori", "or"),
    ("pan", "pa"),
    ("pes", "fa"),
    ("pol", "pl"),
    ("por", "pt"),
    ("ron", "ro"),
    ("rus", "ru"),
    ("sin", "si"),
    ("slk", "sk"),
    ("slv", "sl"),
    ("sna", "sn"),
    ("spa", "es"),
    ("srp", "sr"),
    ("swe", "sv"),
    ("tam", "ta"),
    ("tel", "te"),
    ("tgl", "tl"),
    ("tha", "th"),
    ("tuk", "tk"),
    ("tur", "tr"),
    ("ukr", "uk"),
    ("urd", "ur"),
    ("uzb", "uz"),
    ("vie", "vi"),
    ("yid", "yi"),
    ("zul", "zu"),
];

/// Language tags the default detector can produce, in the same order as the
/// ISO 639-3 table.
pub const DETECTABLE_LANGUAGES: &[&str] = &[
    "af", "ak", "am", "ar", "az", "be", "bn", "bg", "ca", "cs", "zh", "da", "de", "el", "en",
    "eo", "et", "fi", "fr", "gu", "he", "hi", "hr", "hu", "hy", "id", "it", "jv", "ja", "kn",
    "ka", "km", "ko", "la", "lv", "lt", "ml", "mr", "mk", "my", "ne", "nl", "nb", "or", "pa",
    "fa", "pl", "pt", "ro", "ru", "si", "sk", "sl", "sn", "es", "sr", "sv", "ta", "te", "tl",
    "th", "tk", "tr", "uk", "ur", "uz", "vi", "yi", "zu",
];

/// Map an ISO 639-3 code to its shortest BCP 47 tag.
///
/// Codes without a two-letter equivalent are returned unchanged, since a
/// three-letter code is itself a valid BCP 47 language subtag.
pub fn bcp47_for_iso639_3(code: &str) -> &str {
    ISO639_3_TO_BCP47
        .iter()
        .find(|(iso, _)| *iso == code)
        .map(|(_, tag)| *tag)
        .unwrap_or(code)
}

/// Result of identifying the language of one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// BCP 47 tag, [`UNDETERMINED`] when nothing was detected.
    pub language: String,
    /// Detector confidence between 0.0 and 1.0.
    pub confidence: f64,
}

impl Detection {
    pub fn undetermined() -> Self {
        Self {
            language: UNDETERMINED.to_string(),
            confidence: 0.0,
        }
    }

    pub fn is_undetermined(&self) -> bool {
        self.language == UNDETERMINED
    }
}

/// Generic trait for language identification backends
///
/// Implementations never fail: text that cannot be identified yields
/// [`Detection::undetermined`].
pub trait LanguageDetector {
    /// Identify the language of a single line of text.
    fn detect(&self, text: &str) -> Detection;

    /// Name of the backend, used in logs.
    fn name(&self) -> &str;
}

/// Detector backed by the `whatlang` trigram models.
#[derive(Debug, Clone, Default)]
pub struct WhatlangDetector;

impl WhatlangDetector {
    pub fn new() -> Self {
        Self
    }

    /// Strip URLs, handles, hashtags and digits, and collapse whitespace.
    pub fn clean(text: &str) -> String {
        NOISE_RE
            .replace_all(text, " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Detection {
        let cleaned = Self::clean(text);
        if cleaned.is_empty() {
            return Detection::undetermined();
        }
        match whatlang::detect(&cleaned) {
            Some(info) => {
                let language = bcp47_for_iso639_3(info.lang().code()).to_string();
                trace!(
                    language = %language,
                    confidence = info.confidence(),
                    "Detected language"
                );
                Detection {
                    language,
                    confidence: info.confidence(),
                }
            }
            None => Detection::undetermined(),
        }
    }

    fn name(&self) -> &str {
        "whatlang"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso639_3_mapping() {
        assert_eq!(bcp47_for_iso639_3("eng"), "en");
        assert_eq!(bcp47_for_iso639_3("cmn"), "zh");
        assert_eq!(bcp47_for_iso639_3("pes"), "fa");
        assert_eq!(bcp47_for_iso639_3("nob"), "nb");
        // Unknown codes pass through
        assert_eq!(bcp47_for_iso639_3("xyz"), "xyz");
    }

    #[test]
    fn test_detectable_languages_match_table() {
        assert_eq!(DETECTABLE_LANGUAGES.len(), ISO639_3_TO_BCP47.len());
        for (tag, (_, mapped)) in DETECTABLE_LANGUAGES.iter().zip(ISO639_3_TO_BCP47) {
            assert_eq!(tag, mapped);
        }
    }

    #[test]
    fn test_clean_removes_noise() {
        assert_eq!(
            WhatlangDetector::clean("see https://example.com/x @bob #tag 2024 now"),
            "see now"
        );
    }

    #[test]
    fn test_detect_english() {
        let detector = WhatlangDetector::new();
        let detection = detector.detect(
            "The quick brown fox jumps over the lazy dog while the farmer watches from the porch.",
        );
        assert_eq!(detection.language, "en");
        assert!(detection.confidence > 0.0);
    }

    #[test]
    fn test_detect_russian() {
        let detector = WhatlangDetector::new();
        let detection = detector.detect(
            "Сегодня утром я пошёл в магазин, чтобы купить свежий хлеб и молоко для всей семьи.",
        );
        assert_eq!(detection.language, "ru");
    }

    #[test]
    fn test_detect_noise_only_is_undetermined() {
        let detector = WhatlangDetector::new();
        let detection = detector.detect("12345 https://example.com @someone");
        assert!(detection.is_undetermined());
        assert_eq!(detection.confidence, 0.0);
    }
}
