//! Subword segmentation with a unigram language model
//!
//! A model is trained once per corpus with [`train`], which writes
//! `<prefix>.model` and `<prefix>.vocab`. The model is then loaded with
//! [`SubwordModel::load`] and used by the line pipelines in this module.
//!
//! Pieces mark the start of a word with `▁` (U+2581), so `Hello world`
//! becomes `▁hello ▁world` and decoding reverses it.
//!
//! # Example
//!
//! ```ignore
//! use exquisite_corpus::config::SubwordTrainerConfig;
//! use exquisite_corpus::subword::{SubwordModel, train};
//! use std::path::Path;
//!
//! let trained = train(Path::new("corpus.txt"), Path::new("sp/en"), &SubwordTrainerConfig::default())?;
//! let model = SubwordModel::load(&trained.model_path)?;
//! let pieces = model.encode_pieces("Hello world")?;
//! assert_eq!(model.decode_pieces(&pieces)?, "hello world");
//! ```
pub mod model;
pub mod trainer;

pub use model::SubwordModel;
pub use trainer::{SPECIAL_PIECES, TrainedModel, sample_sentences, train};

use crate::corpus_io::lossy_lines;
use crate::error::Result;
use crate::pipeline::PipelineStats;
use std::io::{BufRead, Write};
use tracing::info;

/// Encode each line as a MessagePack array of piece ids.
///
/// Arrays are written back to back, one per input line, with no separator.
pub fn encode_ids<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    model: &SubwordModel,
) -> Result<PipelineStats> {
    let mut stats = PipelineStats::default();
    for line in lossy_lines(input) {
        let line = line?;
        stats.lines_read += 1;
        let ids = model.encode_ids(line.trim_end())?;
        rmp_serde::encode::write(output, &ids)?;
        stats.lines_written += 1;
    }
    output.flush()?;
    info!(lines = stats.lines_written, "Encoded lines as piece ids");
    Ok(stats)
}

/// Encode each line as space-separated pieces.
pub fn encode_pieces<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    model: &SubwordModel,
) -> Result<PipelineStats> {
    let mut stats = PipelineStats::default();
    for line in lossy_lines(input) {
        let line = line?;
        stats.lines_read += 1;
        let pieces = model.encode_pieces(line.trim_end())?;
        writeln!(output, "{}", pieces.join(" "))?;
        stats.lines_written += 1;
    }
    output.flush()?;
    info!(lines = stats.lines_written, "Encoded lines as pieces");
    Ok(stats)
}

/// Decode lines of space-separated pieces back into text.
pub fn decode_pieces<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    model: &SubwordModel,
) -> Result<PipelineStats> {
    let mut stats = PipelineStats::default();
    for line in lossy_lines(input) {
        let line = line?;
        stats.lines_read += 1;
        let pieces: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        writeln!(output, "{}", model.decode_pieces(&pieces)?)?;
        stats.lines_written += 1;
    }
    output.flush()?;
    info!(lines = stats.lines_written, "Decoded piece lines");
    Ok(stats)
}

/// Write the model vocabulary, one piece per line, without the special
/// pieces `<unk>`, `<s>` and `</s>`.
pub fn write_vocabulary<W: Write>(output: &mut W, model: &SubwordModel) -> Result<usize> {
    let vocabulary = model.vocabulary();
    for piece in &vocabulary {
        writeln!(output, "{}", piece)?;
    }
    output.flush()?;
    info!(pieces = vocabulary.len(), "Wrote vocabulary");
    Ok(vocabulary.len())
}
