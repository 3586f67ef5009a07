//! Loading and applying a trained subword model.

use crate::error::{CorpusError, Result};
use crate::subword::trainer::SPECIAL_PIECES;
use std::path::Path;
use tokenizers::{Decoder, Tokenizer};
use tracing::debug;

/// Word-start marker used by pieces.
pub const WORD_BOUNDARY: char = '\u{2581}';

/// A loaded unigram segmentation model.
pub struct SubwordModel {
    tokenizer: Tokenizer,
}

impl SubwordModel {
    /// Load a `.model` file written by [`crate::subword::train`].
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CorpusError::ModelNotFound(path.to_path_buf()));
        }
        let tokenizer = Tokenizer::from_file(path).map_err(|e| {
            CorpusError::Subword(format!("Failed to load '{}': {}", path.display(), e))
        })?;
        debug!(
            path = %path.display(),
            pieces = tokenizer.get_vocab_size(false),
            "Loaded subword model"
        );
        Ok(Self { tokenizer })
    }

    /// Segment text into piece ids.
    pub fn encode_ids(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self.tokenizer.encode(text, false)?;
        Ok(encoding.get_ids().to_vec())
    }

    /// Segment text into pieces such as `▁hello`.
    pub fn encode_pieces(&self, text: &str) -> Result<Vec<String>> {
        let encoding = self.tokenizer.encode(text, false)?;
        Ok(encoding.get_tokens().to_vec())
    }

    /// Join pieces back into text.
    ///
    /// Word-start markers become spaces and the leading space is dropped.
    pub fn decode_pieces(&self, pieces: &[String]) -> Result<String> {
        match self.tokenizer.get_decoder() {
            Some(decoder) => Ok(decoder.decode(pieces.to_vec())?),
            None => Ok(join_pieces(pieces)),
        }
    }

    /// Number of pieces, special pieces included.
    pub fn piece_size(&self) -> usize {
        self.tokenizer.get_vocab_size(false)
    }

    pub fn id_to_piece(&self, id: u32) -> Option<String> {
        self.tokenizer.id_to_token(id)
    }

    /// All pieces in id order, without the special pieces.
    pub fn vocabulary(&self) -> Vec<String> {
        (SPECIAL_PIECES.len()..self.piece_size())
            .filter_map(|id| self.id_to_piece(id as u32))
            .collect()
    }
}

fn join_pieces(pieces: &[String]) -> String {
    pieces
        .concat()
        .replace(WORD_BOUNDARY, " ")
        .trim_start()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SubwordTrainerConfig;
    use crate::subword::{decode_pieces, encode_ids, encode_pieces, train, write_vocabulary};
    use serde::Deserialize;
    use std::fs;
    use std::io::Cursor;

    const CORPUS: &[&str] = &[
        "Hello world, this is a small corpus.",
        "The world is wide and the sea is deep.",
        "Hello again, small world.",
        "A corpus is a collection of written texts.",
        "Deep learning models read a lot of text.",
        "The quick brown fox jumps over the lazy dog.",
        "Small models learn small vocabularies.",
        "Texts are written, read and written again.",
    ];

    fn trained_model(dir: &Path) -> SubwordModel {
        let input = dir.join("corpus.txt");
        let text: String = (0..20)
            .flat_map(|_| CORPUS.iter())
            .map(|line| format!("{}\n", line))
            .collect();
        fs::write(&input, text).unwrap();

        let config = SubwordTrainerConfig {
            vocab_size: 120,
            seed: Some(1),
            ..SubwordTrainerConfig::default()
        };
        let trained = train(&input, &dir.join("sp"), &config).unwrap();
        assert!(trained.model_path.exists());
        assert!(trained.vocab_path.exists());
        SubwordModel::load(&trained.model_path).unwrap()
    }

    #[test]
    fn test_special_pieces_have_reserved_ids() {
        let dir = tempfile::tempdir().unwrap();
        let model = trained_model(dir.path());
        assert_eq!(model.id_to_piece(0).as_deref(), Some("<unk>"));
        assert_eq!(model.id_to_piece(1).as_deref(), Some("<s>"));
        assert_eq!(model.id_to_piece(2).as_deref(), Some("</s>"));

        let vocab_file = fs::read_to_string(dir.path().join("sp.vocab")).unwrap();
        let first: Vec<&str> = vocab_file
            .lines()
            .take(3)
            .map(|line| line.split('\t').next().unwrap())
            .collect();
        assert_eq!(first, SPECIAL_PIECES);
    }

    #[test]
    fn test_vocabulary_excludes_special_pieces() {
        let dir = tempfile::tempdir().unwrap();
        let model = trained_model(dir.path());
        let vocabulary = model.vocabulary();
        assert_eq!(vocabulary.len(), model.piece_size() - 3);
        for special in SPECIAL_PIECES {
            assert!(!vocabulary.iter().any(|piece| piece == special));
        }

        let mut output = Vec::new();
        let written = write_vocabulary(&mut output, &model).unwrap();
        assert_eq!(written, vocabulary.len());
        assert_eq!(String::from_utf8(output).unwrap().lines().count(), written);
    }

    #[test]
    fn test_pieces_roundtrip_normalizes_case() {
        let dir = tempfile::tempdir().unwrap();
        let model = trained_model(dir.path());

        let pieces = model.encode_pieces("Hello small world").unwrap();
        assert!(pieces[0].starts_with(WORD_BOUNDARY));
        assert_eq!(model.decode_pieces(&pieces).unwrap(), "hello small world");

        let ids = model.encode_ids("Hello small world").unwrap();
        let from_ids: Vec<String> = ids
            .iter()
            .map(|id| model.id_to_piece(*id).unwrap())
            .collect();
        assert_eq!(from_ids, pieces);
    }

    #[test]
    fn test_extra_spaces_do_not_become_pieces() {
        let dir = tempfile::tempdir().unwrap();
        let model = trained_model(dir.path());

        let pieces = model.encode_pieces("  Hello   world ").unwrap();
        assert!(!pieces.iter().any(|piece| piece == "\u{2581}"), "{:?}", pieces);
        assert_eq!(model.decode_pieces(&pieces).unwrap(), "hello world");
    }

    #[test]
    fn test_sharp_s_is_case_folded() {
        let dir = tempfile::tempdir().unwrap();
        let model = trained_model(dir.path());

        let pieces = model.encode_pieces("Straße  Hello").unwrap();
        assert_eq!(model.decode_pieces(&pieces).unwrap(), "strasse hello");
        assert!(!pieces.concat().contains('ß'));
    }

    #[test]
    fn test_encode_and_decode_piece_files() {
        let dir = tempfile::tempdir().unwrap();
        let model = trained_model(dir.path());

        let mut encoded = Vec::new();
        let stats = encode_pieces(
            Cursor::new("The world is deep.\n\nHello again\n"),
            &mut encoded,
            &model,
        )
        .unwrap();
        assert_eq!(stats.lines_written, 3);

        let mut decoded = Vec::new();
        decode_pieces(Cursor::new(encoded), &mut decoded, &model).unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            "the world is deep.\n\nhello again\n"
        );
    }

    #[test]
    fn test_encode_ids_writes_messagepack_stream() {
        let dir = tempfile::tempdir().unwrap();
        let model = trained_model(dir.path());

        let mut packed = Vec::new();
        encode_ids(Cursor::new("small world\nthe sea  \n"), &mut packed, &model).unwrap();

        let mut deserializer = rmp_serde::Deserializer::new(Cursor::new(packed));
        let first = Vec::<u32>::deserialize(&mut deserializer).unwrap();
        let second = Vec::<u32>::deserialize(&mut deserializer).unwrap();
        assert_eq!(first, model.encode_ids("small world").unwrap());
        assert_eq!(second, model.encode_ids("the sea").unwrap());
    }

    #[test]
    fn test_load_missing_model() {
        let result = SubwordModel::load(Path::new("/nonexistent/sp.model"));
        assert!(matches!(result, Err(CorpusError::ModelNotFound(_))));
    }

    #[test]
    fn test_join_pieces() {
        let pieces = vec![
            "\u{2581}hello".to_string(),
            "\u{2581}wor".to_string(),
            "ld".to_string(),
        ];
        assert_eq!(join_pieces(&pieces), "hello world");
        assert_eq!(join_pieces(&[]), "");
    }
}
