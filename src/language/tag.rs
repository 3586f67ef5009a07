//! Language tag comparison.
//!
//! Tags are compared after alias canonicalization and likely-subtag
//! expansion, so `en` equals `en-Latn-US` and `iw` equals `he`.

use crate::error::{CorpusError, Result};
use icu_locale::{Locale, LocaleCanonicalizer, LocaleExpander};

/// Minimum score for a detected language to count as the declared one.
pub const MATCH_THRESHOLD: u8 = 90;

/// The tag for text whose language is unknown.
pub const UNDETERMINED: &str = "und";

const REGION_MISMATCH_SCORE: u8 = 96;
const SCRIPT_MISMATCH_SCORE: u8 = 50;

/// Distinct language subtags that are close enough to score above zero.
const CLOSE_LANGUAGES: &[(&str, &str, u8)] = &[
    ("nb", "no", 99),
    ("nn", "no", 99),
    ("nb", "nn", 90),
    ("ms", "id", 80),
    ("hr", "sr", 50),
    ("bs", "hr", 50),
];

/// Score how well `supported` serves a reader of `desired`, from 0 to 100.
///
/// - 100: same language, script and region once expanded
/// - 96: same language and script, different region
/// - 50: same language written in a different script (`zh-Hant` and `zh-Hans`)
/// - a fixed score for a few near-identical languages (`nb` and `no`)
/// - 0: different languages, unparseable tags, or `und`
///
/// The score is symmetric.
///
/// # Example
///
/// ```
/// use exquisite_corpus::language::tag_match_score;
/// assert_eq!(tag_match_score("en", "en-US"), 100);
/// assert_eq!(tag_match_score("en-GB", "en"), 96);
/// assert_eq!(tag_match_score("fr", "en"), 0);
/// ```
pub fn tag_match_score(desired: &str, supported: &str) -> u8 {
    let (Some(desired), Some(supported)) = (expand_tag(desired), expand_tag(supported)) else {
        return 0;
    };

    if desired.id.language != supported.id.language {
        let (a, b) = (desired.id.language.as_str(), supported.id.language.as_str());
        return CLOSE_LANGUAGES
            .iter()
            .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
            .map(|(_, _, score)| *score)
            .unwrap_or(0);
    }
    if desired.id.script != supported.id.script {
        return SCRIPT_MISMATCH_SCORE;
    }
    if desired.id.region != supported.id.region {
        return REGION_MISMATCH_SCORE;
    }
    100
}

/// Check that `tag` is a well-formed language tag naming a language.
pub fn validate_tag(tag: &str) -> Result<()> {
    match expand_tag(tag) {
        Some(_) => Ok(()),
        None => Err(CorpusError::InvalidLanguageTag(tag.to_string())),
    }
}

/// Parse, canonicalize and maximize a tag. `und` and invalid tags yield `None`.
fn expand_tag(tag: &str) -> Option<Locale> {
    let tag = tag.trim().replace('_', "-");
    if tag.is_empty() {
        return None;
    }
    let mut locale: Locale = tag.parse().ok()?;
    LocaleCanonicalizer::new_extended().canonicalize(&mut locale);
    if locale.id.language.as_str() == UNDETERMINED {
        return None;
    }
    LocaleExpander::new_extended().maximize(&mut locale.id);
    Some(locale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tag() {
        assert!(validate_tag("pt_BR").is_ok());
        assert!(validate_tag("zh-Hant").is_ok());
        assert!(matches!(
            validate_tag("und"),
            Err(CorpusError::InvalidLanguageTag(tag)) if tag == "und"
        ));
        assert!(validate_tag("not a tag").is_err());
    }

    #[test]
    fn test_identical_tags() {
        assert_eq!(tag_match_score("en", "en"), 100);
        assert_eq!(tag_match_score("de-DE", "de-DE"), 100);
    }

    #[test]
    fn test_likely_subtags_are_implied() {
        assert_eq!(tag_match_score("en", "en-US"), 100);
        assert_eq!(tag_match_score("ja", "ja-Jpan-JP"), 100);
        assert_eq!(tag_match_score("zh", "zh-Hans"), 100);
    }

    #[test]
    fn test_region_mismatch() {
        assert_eq!(tag_match_score("en-GB", "en"), 96);
        assert_eq!(tag_match_score("pt-BR", "pt-PT"), 96);
        assert!(tag_match_score("en-AU", "en-GB") >= MATCH_THRESHOLD);
    }

    #[test]
    fn test_script_mismatch() {
        assert_eq!(tag_match_score("zh-Hant", "zh-Hans"), 50);
        assert_eq!(tag_match_score("zh-TW", "zh"), 50);
        assert!(tag_match_score("sr-Latn", "sr") < MATCH_THRESHOLD);
    }

    #[test]
    fn test_language_mismatch() {
        assert_eq!(tag_match_score("fr", "en"), 0);
        assert_eq!(tag_match_score("es", "pt"), 0);
    }

    #[test]
    fn test_close_languages() {
        // Depending on alias data `no` may already canonicalize to `nb`
        assert!(tag_match_score("nb", "no") >= 99);
        assert!(tag_match_score("no", "nn") >= MATCH_THRESHOLD);
        assert_eq!(tag_match_score("id", "ms"), 80);
        assert!(tag_match_score("id", "ms") < MATCH_THRESHOLD);
    }

    #[test]
    fn test_deprecated_codes_are_canonicalized() {
        assert_eq!(tag_match_score("iw", "he"), 100);
        assert_eq!(tag_match_score("in", "id"), 100);
    }

    #[test]
    fn test_undetermined_and_invalid() {
        assert_eq!(tag_match_score("und", "en"), 0);
        assert_eq!(tag_match_score("en", "und"), 0);
        assert_eq!(tag_match_score("", "en"), 0);
        assert_eq!(tag_match_score("not a tag!", "en"), 0);
    }

    #[test]
    fn test_underscore_separator() {
        assert_eq!(tag_match_score("en_US", "en"), 100);
    }

    #[test]
    fn test_score_is_symmetric() {
        let pairs = [("en", "en-GB"), ("zh-Hant", "zh"), ("ms", "id"), ("fr", "de")];
        for (a, b) in pairs {
            assert_eq!(
                tag_match_score(a, b),
                tag_match_score(b, a),
                "Score should be symmetric for {} / {}",
                a,
                b
            );
        }
    }
}
