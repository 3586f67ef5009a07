//! Line-by-line word tokenization pipelines
//!
//! Each pipeline reads lines, runs one or two transformations on each, and
//! writes one line per kept input line:
//!
//! 1. [`tokenize_file`] - monolingual text to space-separated tokens,
//!    optionally dropping lines detected as another language
//! 2. [`tokenize_by_language`] - `<lang>\t<text>` lines routed to one output
//!    per language
//! 3. [`tag_languages`] - raw text to `<lang>\t<text>` lines, the input format
//!    of (2)

use crate::config::TokenizeOptions;
use crate::corpus_io::{LanguageSinks, lossy_lines};
use crate::error::Result;
use crate::fixes::{fix_text, quick_fix};
use crate::language::{LanguageDetector, tag_match_score, validate_tag};
use crate::tokens::tokenize;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Line counts reported by every pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub lines_read: u64,
    pub lines_written: u64,
    pub lines_skipped: u64,
}

impl PipelineStats {
    fn log(&self, pipeline: &str) {
        info!(
            pipeline,
            lines_read = self.lines_read,
            lines_written = self.lines_written,
            lines_skipped = self.lines_skipped,
            "Pipeline finished"
        );
    }
}

/// Tokenize plain text in a known language, one output line per input line.
///
/// Each line has its trailing whitespace removed and is repaired, either with
/// [`quick_fix`] or, when `options.full_fix` is set, with [`fix_text`] (line
/// breaks it produces become spaces). When `options.check_language` is set,
/// lines whose detected language scores below `options.min_match_score`
/// against `language` are dropped. Lines yielding no tokens are written as
/// empty lines.
///
/// # Arguments
/// * `input` - Source of plain text lines
/// * `output` - Destination for space-separated tokens
/// * `language` - BCP 47 tag of the text
/// * `options` - Repair, punctuation and language-check switches
/// * `detector` - Used only when `options.check_language` is set
pub fn tokenize_file<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    language: &str,
    options: &TokenizeOptions,
    detector: &dyn LanguageDetector,
) -> Result<PipelineStats> {
    validate_tag(language)?;
    let mut stats = PipelineStats::default();

    for line in lossy_lines(input) {
        let line = line?;
        stats.lines_read += 1;

        let text = if options.full_fix {
            fix_text(line.trim_end(), &options.fixer).replace('\n', " ")
        } else {
            quick_fix(line.trim_end())
        };
        let tokens = tokenize(&text, language, options.punctuation);

        if options.check_language {
            let detected = detector.detect(text.trim_end());
            let score = tag_match_score(&detected.language, language);
            if score < options.min_match_score {
                debug!(
                    line = stats.lines_read,
                    detected = %detected.language,
                    score,
                    "Dropping line in another language"
                );
                stats.lines_skipped += 1;
                continue;
            }
        }

        writeln!(output, "{}", tokens.join(" "))?;
        stats.lines_written += 1;
    }

    output.flush()?;
    stats.log("tokenize");
    Ok(stats)
}

/// Tokenize language-tagged lines into one output per language.
///
/// Input lines look like `<lang>\t<text>`. Lines whose language has a sink
/// are tokenized as that language, punctuation included, and written to it.
/// Other languages are skipped, and so are malformed lines without a tab.
pub fn tokenize_by_language<R: BufRead>(
    input: R,
    sinks: &mut LanguageSinks,
) -> Result<PipelineStats> {
    let mut stats = PipelineStats::default();

    for line in lossy_lines(input) {
        let line = line?;
        stats.lines_read += 1;

        let Some((language, text)) = line.trim_end().split_once('\t') else {
            warn!(line = stats.lines_read, "Skipping line without a language tag");
            stats.lines_skipped += 1;
            continue;
        };
        if !sinks.contains(language) {
            stats.lines_skipped += 1;
            continue;
        }

        let tokens = tokenize(text, language, true);
        sinks.write_line(language, &tokens.join(" "))?;
        stats.lines_written += 1;
    }

    stats.log("tokenize-by-language");
    Ok(stats)
}

/// Run [`tokenize_by_language`] into `<out_dir>/<lang>.txt[.gz]` files.
///
/// Every output is closed before returning, whether or not tokenizing
/// succeeded.
pub fn tokenize_by_language_to_dir<R: BufRead, S: AsRef<str>>(
    input: R,
    out_dir: &Path,
    languages: &[S],
    zipped: bool,
) -> Result<PipelineStats> {
    let mut sinks = LanguageSinks::create(out_dir, languages, zipped)?;
    let result = tokenize_by_language(input, &mut sinks);
    let closed = sinks.finish();
    let stats = result?;
    closed?;
    Ok(stats)
}

/// Label raw text lines with their detected language.
///
/// Writes `<lang>\t<text>` for every line whose detection is determined and
/// at least `min_confidence`. Empty lines and uncertain lines are skipped.
pub fn tag_languages<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    detector: &dyn LanguageDetector,
    min_confidence: f64,
) -> Result<PipelineStats> {
    let mut stats = PipelineStats::default();
    debug!(detector = detector.name(), min_confidence, "Tagging languages");

    for line in lossy_lines(input) {
        let line = line?;
        stats.lines_read += 1;

        let text = quick_fix(line.trim());
        if text.is_empty() {
            stats.lines_skipped += 1;
            continue;
        }
        // A tab inside the text would break the tagged format
        let text = text.replace('\t', " ");

        let detection = detector.detect(&text);
        if detection.is_undetermined() || detection.confidence < min_confidence {
            stats.lines_skipped += 1;
            continue;
        }

        writeln!(output, "{}\t{}", detection.language, text)?;
        stats.lines_written += 1;
    }

    output.flush()?;
    stats.log("tag-languages");
    Ok(stats)
}
