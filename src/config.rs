//! Configuration for the preprocessing pipelines and the subword trainer.

use crate::error::{CorpusError, Result};
use crate::language::MATCH_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options for [`crate::pipeline::tokenize_file`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizeOptions {
    /// Drop lines whose detected language does not match the declared one.
    pub check_language: bool,
    /// Keep punctuation tokens.
    pub punctuation: bool,
    /// Run the full text repair instead of the quick fixes.
    pub full_fix: bool,
    /// Minimum tag match score for a line to be kept when checking language.
    pub min_match_score: u8,
    /// Steps run by the full text repair.
    pub fixer: TextFixerConfig,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self {
            check_language: false,
            punctuation: false,
            full_fix: false,
            min_match_score: MATCH_THRESHOLD,
            fixer: TextFixerConfig::default(),
        }
    }
}

/// Switches for each step of [`crate::fixes::fix_text`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextFixerConfig {
    pub remove_terminal_escapes: bool,
    pub unescape_html: bool,
    pub fix_encoding: bool,
    pub fix_line_breaks: bool,
    pub remove_control_chars: bool,
    pub fix_latin_ligatures: bool,
    pub fix_character_width: bool,
    pub uncurl_quotes: bool,
    /// Apply NFC as the last step.
    pub normalize: bool,
}

impl Default for TextFixerConfig {
    fn default() -> Self {
        Self {
            remove_terminal_escapes: true,
            unescape_html: true,
            fix_encoding: true,
            fix_line_breaks: true,
            remove_control_chars: true,
            fix_latin_ligatures: true,
            fix_character_width: true,
            uncurl_quotes: true,
            normalize: true,
        }
    }
}

/// Text normalization applied by the subword model before segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationRule {
    /// NMT cleanup followed by NFKC.
    NmtNfkc,
    /// NMT cleanup, NFKC and case folding.
    NmtNfkcCf,
    /// Leave text untouched.
    Identity,
}

/// Parameters for training a unigram subword model.
///
/// Defaults: 32,000 pieces (a soft target), at most 1,000,000 training
/// sentences sampled at random, `nmt_nfkc_cf` normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubwordTrainerConfig {
    pub vocab_size: u32,
    /// Maximum number of sentences loaded for training.
    pub input_sentence_size: usize,
    /// Sample sentences uniformly at random instead of taking the first ones.
    pub shuffle_input_sentence: bool,
    /// Seed for sentence sampling; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub max_piece_length: usize,
    pub normalization: NormalizationRule,
}

impl Default for SubwordTrainerConfig {
    fn default() -> Self {
        Self {
            vocab_size: 32_000,
            input_sentence_size: 1_000_000,
            shuffle_input_sentence: true,
            seed: None,
            max_piece_length: 16,
            normalization: NormalizationRule::NmtNfkcCf,
        }
    }
}

impl SubwordTrainerConfig {
    /// Load a trainer configuration from a JSON file.
    ///
    /// Fields missing from the file keep their default values.
    ///
    /// # Errors
    /// - File read errors
    /// - Invalid JSON
    /// - A zero vocabulary or sample size
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CorpusError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            CorpusError::Config(format!("Failed to parse '{}': {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.vocab_size == 0 {
            return Err(CorpusError::Config("vocab_size must be positive".into()));
        }
        if self.input_sentence_size == 0 {
            return Err(CorpusError::Config(
                "input_sentence_size must be positive".into(),
            ));
        }
        if self.max_piece_length == 0 {
            return Err(CorpusError::Config(
                "max_piece_length must be positive".into(),
            ));
        }
        Ok(())
    }
}
