//! Unigram model training.

use crate::config::{NormalizationRule, SubwordTrainerConfig};
use crate::corpus_io::{lossy_lines, open_input};
use crate::error::{CorpusError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use tokenizers::models::unigram::{Unigram, UnigramTrainerBuilder};
use tokenizers::normalizers::replace::ReplacePattern;
use tokenizers::normalizers::{Lowercase, NFKC, Nmt, Replace, Sequence, Strip};
use tokenizers::pre_tokenizers::metaspace::Metaspace;
use tokenizers::{
    AddedToken, DecoderWrapper, NormalizerWrapper, PostProcessorWrapper, PreTokenizerWrapper,
    TokenizerBuilder, TokenizerImpl,
};
use tracing::{debug, info};

/// Pieces with reserved ids 0, 1 and 2.
pub const SPECIAL_PIECES: [&str; 3] = ["<unk>", "<s>", "</s>"];

type UnigramTokenizer = TokenizerImpl<
    Unigram,
    NormalizerWrapper,
    PreTokenizerWrapper,
    PostProcessorWrapper,
    DecoderWrapper,
>;

/// Files written by [`train`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainedModel {
    /// `<prefix>.model`, loadable with [`crate::subword::SubwordModel::load`]
    pub model_path: PathBuf,
    /// `<prefix>.vocab`, one `piece\tscore` line per id
    pub vocab_path: PathBuf,
}

impl TrainedModel {
    fn for_prefix(prefix: &Path) -> Self {
        let with_suffix = |suffix: &str| {
            let mut name = prefix.as_os_str().to_os_string();
            name.push(suffix);
            PathBuf::from(name)
        };
        Self {
            model_path: with_suffix(".model"),
            vocab_path: with_suffix(".vocab"),
        }
    }
}

/// Train a unigram subword model on a corpus with one sentence per line.
///
/// # Arguments
/// * `input` - Raw corpus file (`.gz` allowed, `-` for stdin)
/// * `model_prefix` - Output path prefix; `.model` and `.vocab` are appended
/// * `config` - Vocabulary size, sampling and normalization settings
///
/// # Errors
/// - Invalid configuration
/// - Unreadable input or unwritable outputs
/// - A corpus without any non-empty line
/// - Trainer failures
pub fn train(
    input: &Path,
    model_prefix: &Path,
    config: &SubwordTrainerConfig,
) -> Result<TrainedModel> {
    config.validate()?;
    let sentences = sample_sentences(open_input(input)?, config)?;
    if sentences.is_empty() {
        return Err(CorpusError::Subword(format!(
            "No training sentences in '{}'",
            input.display()
        )));
    }
    info!(
        sentences = sentences.len(),
        vocab_size = config.vocab_size,
        "Training unigram model"
    );

    let mut tokenizer: UnigramTokenizer = TokenizerBuilder::new()
        .with_model(Unigram::default())
        .with_normalizer(normalizer_for(config.normalization)?)
        .with_pre_tokenizer(Some(PreTokenizerWrapper::Metaspace(Metaspace::default())))
        .with_decoder(Some(DecoderWrapper::Metaspace(Metaspace::default())))
        .build()?;

    let mut trainer = UnigramTrainerBuilder::default()
        .show_progress(false)
        .vocab_size(config.vocab_size)
        .max_piece_length(config.max_piece_length)
        .special_tokens(
            SPECIAL_PIECES
                .iter()
                .map(|piece| AddedToken::from(*piece, true))
                .collect(),
        )
        .unk_token(Some(SPECIAL_PIECES[0].to_string()))
        .build()
        .map_err(|e| CorpusError::Subword(format!("Invalid trainer settings: {}", e)))?;

    tokenizer.train(&mut trainer, sentences.iter())?;

    let trained = TrainedModel::for_prefix(model_prefix);
    if let Some(parent) = trained.model_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    tokenizer.save(&trained.model_path, false)?;
    let pieces = write_vocab_file(&tokenizer, &trained.vocab_path)?;

    info!(
        model = %trained.model_path.display(),
        pieces,
        "Saved unigram model"
    );
    Ok(trained)
}

/// Build the normalizer for `rule`.
///
/// The NMT rules map control and unusual whitespace characters to spaces,
/// collapse runs of spaces and trim both ends before NFKC. Case folding is
/// lowercasing plus `ß` to `ss`.
fn normalizer_for(rule: NormalizationRule) -> Result<Option<NormalizerWrapper>> {
    let mut steps: Vec<NormalizerWrapper> = match rule {
        NormalizationRule::Identity => return Ok(None),
        NormalizationRule::NmtNfkc | NormalizationRule::NmtNfkcCf => vec![
            Nmt.into(),
            NFKC.into(),
            Replace::new(ReplacePattern::Regex(" {2,}".to_string()), " ")?.into(),
            Strip::new(true, true).into(),
        ],
    };
    if rule == NormalizationRule::NmtNfkcCf {
        steps.push(Lowercase.into());
        steps.push(Replace::new("ß", "ss")?.into());
    }
    Ok(Some(Sequence::new(steps).into()))
}

/// Write `piece\tscore` lines in id order and return the number of pieces.
fn write_vocab_file(tokenizer: &UnigramTokenizer, path: &Path) -> Result<usize> {
    let model = serde_json::to_value(tokenizer.get_model())?;
    let vocab = model
        .get("vocab")
        .and_then(|vocab| vocab.as_array())
        .ok_or_else(|| CorpusError::Subword("Trained model has no vocabulary".into()))?;

    let mut writer = BufWriter::new(File::create(path)?);
    for entry in vocab {
        let piece = entry.get(0).and_then(|p| p.as_str()).unwrap_or_default();
        let score = entry.get(1).and_then(|s| s.as_f64()).unwrap_or_default();
        writeln!(writer, "{}\t{}", piece, score)?;
    }
    writer.flush()?;
    Ok(vocab.len())
}

/// Load at most `config.input_sentence_size` non-empty, trimmed lines.
///
/// With `shuffle_input_sentence` the lines are a uniform random sample of
/// the whole input (reservoir sampling) in random order; otherwise they are
/// the first lines of the input.
pub fn sample_sentences<R: BufRead>(
    input: R,
    config: &SubwordTrainerConfig,
) -> Result<Vec<String>> {
    let limit = config.input_sentence_size;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut sample: Vec<String> = Vec::new();
    let mut seen: usize = 0;
    for line in lossy_lines(input) {
        let line = line?;
        let sentence = line.trim();
        if sentence.is_empty() {
            continue;
        }
        seen += 1;
        if sample.len() < limit {
            sample.push(sentence.to_string());
        } else if config.shuffle_input_sentence {
            let slot = rng.gen_range(0..seen);
            if slot < limit {
                sample[slot] = sentence.to_string();
            }
        } else {
            break;
        }
    }

    if config.shuffle_input_sentence {
        sample.shuffle(&mut rng);
    }
    debug!(seen, sampled = sample.len(), "Sampled training sentences");
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn numbered_lines(count: usize) -> String {
        (0..count).map(|i| format!("line {}\n", i)).collect()
    }

    #[test]
    fn test_sample_first_lines_without_shuffle() {
        let config = SubwordTrainerConfig {
            input_sentence_size: 3,
            shuffle_input_sentence: false,
            ..SubwordTrainerConfig::default()
        };
        let sample = sample_sentences(Cursor::new(numbered_lines(10)), &config).unwrap();
        assert_eq!(sample, vec!["line 0", "line 1", "line 2"]);
    }

    #[test]
    fn test_sample_is_bounded_and_drawn_from_input() {
        let config = SubwordTrainerConfig {
            input_sentence_size: 5,
            seed: Some(42),
            ..SubwordTrainerConfig::default()
        };
        let sample = sample_sentences(Cursor::new(numbered_lines(100)), &config).unwrap();
        assert_eq!(sample.len(), 5);
        for sentence in &sample {
            assert!(sentence.starts_with("line "), "Unexpected sentence {}", sentence);
        }
        let mut unique = sample.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 5, "Sampled lines should be distinct");
    }

    #[test]
    fn test_sample_is_reproducible_with_seed() {
        let config = SubwordTrainerConfig {
            input_sentence_size: 4,
            seed: Some(7),
            ..SubwordTrainerConfig::default()
        };
        let a = sample_sentences(Cursor::new(numbered_lines(50)), &config).unwrap();
        let b = sample_sentences(Cursor::new(numbered_lines(50)), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_skips_blank_lines() {
        let config = SubwordTrainerConfig {
            shuffle_input_sentence: false,
            ..SubwordTrainerConfig::default()
        };
        let sample = sample_sentences(Cursor::new("  a b \n\n   \nc\n"), &config).unwrap();
        assert_eq!(sample, vec!["a b", "c"]);
    }

    fn normalize(rule: NormalizationRule, text: &str) -> String {
        use tokenizers::{NormalizedString, Normalizer};
        let mut normalized = NormalizedString::from(text);
        if let Some(normalizer) = normalizer_for(rule).unwrap() {
            normalizer.normalize(&mut normalized).unwrap();
        }
        normalized.get().to_string()
    }

    #[test]
    fn test_nmt_nfkc_cf_cleans_whitespace_and_folds_case() {
        assert_eq!(
            normalize(NormalizationRule::NmtNfkcCf, "  Straße\t  Hello   ＷＯＲＬＤ "),
            "strasse hello world"
        );
    }

    #[test]
    fn test_nmt_nfkc_keeps_case() {
        assert_eq!(normalize(NormalizationRule::NmtNfkc, " Straße  Hello"), "Straße Hello");
        assert_eq!(normalize(NormalizationRule::Identity, " A  b"), " A  b");
    }

    #[test]
    fn test_model_paths_from_prefix() {
        let trained = TrainedModel::for_prefix(Path::new("out/sp.en"));
        assert_eq!(trained.model_path, PathBuf::from("out/sp.en.model"));
        assert_eq!(trained.vocab_path, PathBuf::from("out/sp.en.vocab"));
    }

    #[test]
    fn test_train_rejects_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.txt");
        fs::write(&input, "\n\n").unwrap();
        let result = train(&input, &dir.path().join("sp"), &SubwordTrainerConfig::default());
        assert!(matches!(result, Err(CorpusError::Subword(_))));
    }
}
