//! Language identification and language tag matching
//!
//! Lines are identified by a [`LanguageDetector`]. The detected tag is then
//! compared with a declared tag by [`tag_match_score`], which tolerates
//! regional differences but not different languages or scripts.
//!
//! # Example
//!
//! ```
//! use exquisite_corpus::language::{LanguageDetector, MockDetector, MATCH_THRESHOLD, tag_match_score};
//!
//! let detector = MockDetector::fixed("en-GB");
//! let detection = detector.detect("Colourful behaviour");
//! assert!(tag_match_score(&detection.language, "en") >= MATCH_THRESHOLD);
//! ```
pub mod detector;
pub mod mock;
pub mod tag;

pub use detector::{
    DETECTABLE_LANGUAGES, Detection, LanguageDetector, WhatlangDetector, bcp47_for_iso639_3,
};
pub use mock::{MockDetector, MockMode};
pub use tag::{MATCH_THRESHOLD, UNDETERMINED, tag_match_score, validate_tag};
