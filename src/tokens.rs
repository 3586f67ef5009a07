//! Word-level tokenization
//!
//! Text is normalized with a few language-specific rules, case-folded, and
//! split on Unicode word boundaries (UAX #29).
//!
//! # Example
//!
//! ```
//! use exquisite_corpus::tokens::tokenize;
//!
//! assert_eq!(tokenize("Hello, World!", "en", false), vec!["hello", "world"]);
//! assert_eq!(tokenize("Hello, World!", "en", true), vec!["hello", ",", "world", "!"]);
//! assert_eq!(tokenize("L'heure du thé", "fr", false), vec!["l'", "heure", "du", "thé"]);
//! ```

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

static MARK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{Mn}\x{0640}]").unwrap());

static EMOJI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Extended_Pictographic}").unwrap());

/// Languages normalized with NFKC instead of NFC.
const NFKC_LANGUAGES: &[&str] = &["ar", "fa", "ur", "ja", "ko", "zh"];

/// Languages whose vowel marks and tatweel are dropped.
const MARK_REMOVING_LANGUAGES: &[&str] = &["ar", "fa", "ur", "ps", "he", "yi"];

/// Languages with dotted and dotless I.
const TURKIC_LANGUAGES: &[&str] = &["tr", "az", "kk", "tt"];

/// Languages where an elided article or pronoun is split from its word.
const ELIDING_LANGUAGES: &[&str] = &["fr", "ca"];

/// Longest elided prefix that is split off, in letters.
const MAX_ELIDED_PREFIX: usize = 2;

/// Split text into word tokens for the given language.
///
/// Punctuation tokens are only kept when `include_punctuation` is set.
/// Adjacent punctuation characters form a single token (`...`). Emoji are
/// always kept.
///
/// # Arguments
/// * `text` - A single line of text
/// * `language` - BCP 47 tag of the text's language; only the primary
///   language subtag is consulted
/// * `include_punctuation` - Keep punctuation tokens
pub fn tokenize(text: &str, language: &str, include_punctuation: bool) -> Vec<String> {
    let language = primary_language(language);
    let text = preprocess(text, &language);

    let mut tokens: Vec<String> = Vec::new();
    let mut last_was_punctuation = false;

    for segment in text.split_word_bounds() {
        if segment.chars().all(char::is_whitespace) {
            last_was_punctuation = false;
            continue;
        }
        if segment.chars().any(char::is_alphanumeric) {
            push_word(&mut tokens, segment, &language);
            last_was_punctuation = false;
        } else if EMOJI_RE.is_match(segment) {
            tokens.push(segment.to_string());
            last_was_punctuation = false;
        } else if include_punctuation {
            if let (true, Some(previous)) = (last_was_punctuation, tokens.last_mut()) {
                previous.push_str(segment);
            } else {
                tokens.push(segment.to_string());
            }
            last_was_punctuation = true;
        }
    }
    tokens
}

/// The lowercase primary language subtag of a tag (`pt-BR` -> `pt`).
fn primary_language(tag: &str) -> String {
    tag.split(['-', '_'])
        .next()
        .unwrap_or(tag)
        .to_ascii_lowercase()
}

/// Normalize and case-fold text according to its language.
pub fn preprocess(text: &str, language: &str) -> String {
    let mut text: String = if NFKC_LANGUAGES.contains(&language) {
        text.nfkc().collect()
    } else {
        text.nfc().collect()
    };

    if MARK_REMOVING_LANGUAGES.contains(&language) {
        text = MARK_RE.replace_all(&text, "").into_owned();
    }

    match language {
        "ro" => text = text.replace('ş', "ș").replace('ţ', "ț"),
        "tr" | "az" | "kk" | "tt" => text = text.replace('ș', "ş").replace('ț', "ţ"),
        _ => {}
    }

    casefold(&text, language)
}

fn casefold(text: &str, language: &str) -> String {
    let text = if TURKIC_LANGUAGES.contains(&language) {
        text.replace('İ', "i").replace('I', "ı")
    } else {
        text.to_string()
    };
    text.to_lowercase().replace('ß', "ss")
}

fn push_word(tokens: &mut Vec<String>, segment: &str, language: &str) {
    let word = segment.replace('\u{2019}', "'");

    if ELIDING_LANGUAGES.contains(&language) {
        if let Some((prefix, rest)) = split_elision(&word) {
            tokens.push(prefix.to_string());
            tokens.push(rest.to_string());
            return;
        }
    }
    tokens.push(word);
}

/// Split `l'heure` into `l'` and `heure`.
fn split_elision(word: &str) -> Option<(&str, &str)> {
    let apostrophe = word.find('\'')?;
    let (prefix, rest) = word.split_at(apostrophe + 1);
    let letters = prefix[..apostrophe].chars().count();
    if letters == 0 || letters > MAX_ELIDED_PREFIX || rest.is_empty() {
        return None;
    }
    if !prefix[..apostrophe].chars().all(char::is_alphabetic) {
        return None;
    }
    Some((prefix, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_words_only() {
        assert_eq!(
            tokenize("This is a test, isn't it?", "en", false),
            vec!["this", "is", "a", "test", "isn't", "it"]
        );
    }

    #[test]
    fn test_tokenize_with_punctuation() {
        assert_eq!(
            tokenize("Wait... what?!", "en", true),
            vec!["wait", "...", "what", "?!"]
        );
    }

    #[test]
    fn test_tokenize_empty_and_blank() {
        assert!(tokenize("", "en", true).is_empty());
        assert!(tokenize("   \t ", "en", true).is_empty());
        assert!(tokenize("--- !!!", "en", false).is_empty());
    }

    #[test]
    fn test_tokenize_numbers_kept() {
        assert_eq!(tokenize("In 2019, 3.5%", "en", false), vec!["in", "2019", "3.5"]);
    }

    #[test]
    fn test_tokenize_curly_apostrophe() {
        assert_eq!(tokenize("Don’t", "en", false), vec!["don't"]);
    }

    #[test]
    fn test_tokenize_french_elision() {
        assert_eq!(
            tokenize("Qu'il vienne aujourd'hui", "fr", false),
            vec!["qu'", "il", "vienne", "aujourd'hui"]
        );
        // Other languages keep the apostrophe inside the word
        assert_eq!(tokenize("l'heure", "en", false), vec!["l'heure"]);
    }

    #[test]
    fn test_tokenize_catalan_region_tag() {
        assert_eq!(tokenize("l'home", "ca-ES", false), vec!["l'", "home"]);
    }

    #[test]
    fn test_tokenize_german_sharp_s() {
        assert_eq!(tokenize("Straße", "de", false), vec!["strasse"]);
    }

    #[test]
    fn test_tokenize_turkish_dotted_i() {
        assert_eq!(tokenize("İSTANBUL ISPARTA", "tr", false), vec!["istanbul", "ısparta"]);
        assert_eq!(tokenize("ISPARTA", "en", false), vec!["isparta"]);
    }

    #[test]
    fn test_tokenize_romanian_comma_below() {
        assert_eq!(tokenize("şcoală", "ro", false), vec!["școală"]);
    }

    #[test]
    fn test_tokenize_arabic_marks_removed() {
        assert_eq!(tokenize("مُحَمَّد", "ar", false), vec!["محمد"]);
    }

    #[test]
    fn test_tokenize_japanese_width() {
        assert_eq!(tokenize("ＡＢＣ", "ja", false), vec!["abc"]);
    }

    #[test]
    fn test_tokenize_emoji_always_kept() {
        assert_eq!(tokenize("good 😀", "en", false), vec!["good", "😀"]);
    }

    #[test]
    fn test_split_elision() {
        assert_eq!(split_elision("l'eau"), Some(("l'", "eau")));
        assert_eq!(split_elision("qu'on"), Some(("qu'", "on")));
        assert_eq!(split_elision("aujourd'hui"), None);
        assert_eq!(split_elision("'tis"), None);
        assert_eq!(split_elision("l'"), None);
    }
}
