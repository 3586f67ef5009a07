//! Command-line interface for corpus preprocessing.
//!
//! Inputs and outputs default to the standard streams; `.gz` paths are
//! (de)compressed on the fly. Logs go to stderr.

use clap::{Parser, Subcommand};
use exquisite_corpus::config::{SubwordTrainerConfig, TokenizeOptions};
use exquisite_corpus::corpus_io::{STDIO_PATH, open_input, open_output};
use exquisite_corpus::language::{DETECTABLE_LANGUAGES, WhatlangDetector};
use exquisite_corpus::pipeline::{tag_languages, tokenize_by_language_to_dir, tokenize_file};
use exquisite_corpus::subword::{self, SubwordModel};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "exquisite-corpus")]
#[command(version)]
#[command(about = "Clean, split by language and tokenize text corpora", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug details (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize plain text in a known language into space-separated tokens
    Tokenize {
        /// Language of the text (BCP 47 tag, e.g. en, pt-BR)
        #[arg(short, long)]
        language: String,

        /// Drop lines detected as a different language
        #[arg(long)]
        check_language: bool,

        /// Keep punctuation tokens
        #[arg(short, long)]
        punctuation: bool,

        /// Run the full text repair instead of the quick fixes
        #[arg(long)]
        ftfy: bool,

        #[arg(default_value = STDIO_PATH)]
        input: PathBuf,

        #[arg(default_value = STDIO_PATH)]
        output: PathBuf,
    },

    /// Tokenize `<lang>\t<text>` lines into one file per language
    TokenizeByLanguage {
        /// Directory receiving `<lang>.txt` files
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Write gzip-compressed `<lang>.txt.gz` files
        #[arg(short, long)]
        zipped: bool,

        /// Comma-separated languages to keep (default: every detectable language)
        #[arg(short, long, value_delimiter = ',')]
        languages: Vec<String>,

        #[arg(default_value = STDIO_PATH)]
        input: PathBuf,
    },

    /// Label lines of raw text with their detected language
    TagLanguages {
        /// Minimum detector confidence for a line to be kept
        #[arg(long, default_value_t = 0.5)]
        min_confidence: f64,

        #[arg(default_value = STDIO_PATH)]
        input: PathBuf,

        #[arg(default_value = STDIO_PATH)]
        output: PathBuf,
    },

    /// Train a unigram subword model
    SpTrain {
        /// Raw corpus, one sentence per line
        input: PathBuf,

        /// Output prefix; writes <prefix>.model and <prefix>.vocab
        #[arg(short = 'p', long)]
        model_prefix: PathBuf,

        /// JSON trainer configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the vocabulary size
        #[arg(long)]
        vocab_size: Option<u32>,

        /// Seed for sentence sampling
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Encode text as MessagePack arrays of piece ids
    SpEncodeIds {
        #[arg(short, long)]
        model: PathBuf,

        #[arg(default_value = STDIO_PATH)]
        input: PathBuf,

        #[arg(default_value = STDIO_PATH)]
        output: PathBuf,
    },

    /// Encode text as space-separated pieces
    SpEncodePieces {
        #[arg(short, long)]
        model: PathBuf,

        #[arg(default_value = STDIO_PATH)]
        input: PathBuf,

        #[arg(default_value = STDIO_PATH)]
        output: PathBuf,
    },

    /// Decode space-separated pieces back into text
    SpDecodePieces {
        #[arg(short, long)]
        model: PathBuf,

        #[arg(default_value = STDIO_PATH)]
        input: PathBuf,

        #[arg(default_value = STDIO_PATH)]
        output: PathBuf,
    },

    /// Print the model vocabulary, one piece per line
    SpVocab {
        #[arg(short, long)]
        model: PathBuf,

        #[arg(default_value = STDIO_PATH)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> exquisite_corpus::Result<()> {
    match command {
        Commands::Tokenize {
            language,
            check_language,
            punctuation,
            ftfy,
            input,
            output,
        } => {
            let options = TokenizeOptions {
                check_language,
                punctuation,
                full_fix: ftfy,
                ..TokenizeOptions::default()
            };
            let mut writer = open_output(&output)?;
            tokenize_file(
                open_input(&input)?,
                &mut writer,
                &language,
                &options,
                &WhatlangDetector::new(),
            )?;
            writer.finish()?;
        }
        Commands::TokenizeByLanguage {
            out_dir,
            zipped,
            languages,
            input,
        } => {
            let languages: Vec<String> = if languages.is_empty() {
                DETECTABLE_LANGUAGES.iter().map(|l| l.to_string()).collect()
            } else {
                languages
            };
            tokenize_by_language_to_dir(open_input(&input)?, &out_dir, &languages, zipped)?;
        }
        Commands::TagLanguages {
            min_confidence,
            input,
            output,
        } => {
            let mut writer = open_output(&output)?;
            tag_languages(
                open_input(&input)?,
                &mut writer,
                &WhatlangDetector::new(),
                min_confidence,
            )?;
            writer.finish()?;
        }
        Commands::SpTrain {
            input,
            model_prefix,
            config,
            vocab_size,
            seed,
        } => {
            let mut trainer_config = match config {
                Some(path) => SubwordTrainerConfig::from_file(&path)?,
                None => SubwordTrainerConfig::default(),
            };
            if let Some(vocab_size) = vocab_size {
                trainer_config.vocab_size = vocab_size;
            }
            if seed.is_some() {
                trainer_config.seed = seed;
            }
            let trained = subword::train(&input, &model_prefix, &trainer_config)?;
            info!(
                model = %trained.model_path.display(),
                vocab = %trained.vocab_path.display(),
                "Training complete"
            );
        }
        Commands::SpEncodeIds {
            model,
            input,
            output,
        } => {
            let model = SubwordModel::load(&model)?;
            let mut writer = open_output(&output)?;
            subword::encode_ids(open_input(&input)?, &mut writer, &model)?;
            writer.finish()?;
        }
        Commands::SpEncodePieces {
            model,
            input,
            output,
        } => {
            let model = SubwordModel::load(&model)?;
            let mut writer = open_output(&output)?;
            subword::encode_pieces(open_input(&input)?, &mut writer, &model)?;
            writer.finish()?;
        }
        Commands::SpDecodePieces {
            model,
            input,
            output,
        } => {
            let model = SubwordModel::load(&model)?;
            let mut writer = open_output(&output)?;
            subword::decode_pieces(open_input(&input)?, &mut writer, &model)?;
            writer.finish()?;
        }
        Commands::SpVocab { model, output } => {
            let model = SubwordModel::load(&model)?;
            let mut writer = open_output(&output)?;
            subword::write_vocabulary(&mut writer, &model)?;
            writer.finish()?;
        }
    }
    Ok(())
}
