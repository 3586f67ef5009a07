//! Preprocessing for multilingual training corpora
//!
//! The crate turns raw or language-tagged text into tokens for language
//! models. Every operation is a single pass over lines:
//!
//! - [`fixes`] repairs broken text (HTML entities, mojibake, control
//!   characters)
//! - [`tokens`] splits text into case-folded word tokens
//! - [`language`] detects the language of a line and compares language tags
//! - [`pipeline`] combines the above into file-to-file tokenizers, including
//!   routing tagged lines to one output per language
//! - [`subword`] trains a unigram subword model and encodes or decodes with it
//!
//! # Example
//!
//! ```
//! use exquisite_corpus::config::TokenizeOptions;
//! use exquisite_corpus::language::WhatlangDetector;
//! use exquisite_corpus::pipeline::tokenize_file;
//! use std::io::Cursor;
//!
//! let mut output = Vec::new();
//! let options = TokenizeOptions::default();
//! tokenize_file(Cursor::new("Fish &amp; Chips\n"), &mut output, "en", &options, &WhatlangDetector::new())
//!     .unwrap();
//! assert_eq!(String::from_utf8(output).unwrap(), "fish chips\n");
//! ```

pub mod config;
pub mod corpus_io;
pub mod error;
pub mod fixes;
pub mod language;
pub mod pipeline;
pub mod subword;
pub mod tokens;

// Re-export the main entry points for convenient access
pub use config::{SubwordTrainerConfig, TextFixerConfig, TokenizeOptions};
pub use error::{CorpusError, Result};
pub use fixes::{fix_text, quick_fix};
pub use language::{LanguageDetector, WhatlangDetector, tag_match_score};
pub use pipeline::{
    PipelineStats, tag_languages, tokenize_by_language, tokenize_by_language_to_dir, tokenize_file,
};
pub use subword::SubwordModel;
pub use tokens::tokenize;
