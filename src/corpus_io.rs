//! Line-oriented input and output for corpus files
//!
//! Inputs and outputs are files or the standard streams (`-`). Paths ending
//! in `.gz` are transparently (de)compressed.

use crate::error::{CorpusError, Result};
use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path meaning "standard input" or "standard output".
pub const STDIO_PATH: &str = "-";

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO_PATH
}

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("gz")
}

/// Open a file, a gzip file, or standard input for buffered reading.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    if is_stdio(path) {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).map_err(|e| {
        CorpusError::Io(io::Error::new(
            e.kind(),
            format!("Failed to open '{}': {}", path.display(), e),
        ))
    })?;
    debug!(path = %path.display(), "Opened input");
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Open a file, a gzip file, or standard output for buffered writing.
///
/// Call [`Sink::finish`] when done: it writes the gzip trailer and reports
/// errors that dropping the sink would swallow.
pub fn open_output(path: &Path) -> Result<Sink> {
    if is_stdio(path) {
        return Ok(Sink::Stdout(BufWriter::new(io::stdout())));
    }
    Sink::create(path, is_gzip(path))
}

/// Iterator over the lines of a reader, decoded lossily as UTF-8.
///
/// Invalid byte sequences become U+FFFD instead of aborting the run. The
/// line terminator (`\n` or `\r\n`) is removed.
pub struct LossyLines<R> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                if self.buffer.last() == Some(&b'\n') {
                    self.buffer.pop();
                    if self.buffer.last() == Some(&b'\r') {
                        self.buffer.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buffer).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Read `reader` line by line with lossy UTF-8 decoding.
pub fn lossy_lines<R: BufRead>(reader: R) -> LossyLines<R> {
    LossyLines {
        reader,
        buffer: Vec::new(),
    }
}

/// A single output stream: standard output, a file, or a gzip file.
pub enum Sink {
    Stdout(BufWriter<io::Stdout>),
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Sink {
    pub fn create(path: &Path, zipped: bool) -> Result<Self> {
        let file = File::create(path).map_err(|e| {
            CorpusError::Io(io::Error::new(
                e.kind(),
                format!("Failed to create '{}': {}", path.display(), e),
            ))
        })?;
        let writer = BufWriter::new(file);
        Ok(if zipped {
            Sink::Gzip(GzEncoder::new(writer, Compression::default()))
        } else {
            Sink::Plain(writer)
        })
    }

    /// Flush buffered data and write the gzip trailer, if any.
    pub fn finish(self) -> io::Result<()> {
        match self {
            Sink::Stdout(mut writer) => writer.flush(),
            Sink::Plain(mut writer) => writer.flush(),
            Sink::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Stdout(writer) => writer.write(buf),
            Sink::Plain(writer) => writer.write(buf),
            Sink::Gzip(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Stdout(writer) => writer.flush(),
            Sink::Plain(writer) => writer.flush(),
            Sink::Gzip(writer) => writer.flush(),
        }
    }
}

/// One output file per language, all opened up front.
///
/// Files are named `<lang>.txt`, or `<lang>.txt.gz` when zipped. Languages
/// that never receive a line still get an (empty) file.
pub struct LanguageSinks {
    sinks: BTreeMap<String, Sink>,
}

impl LanguageSinks {
    /// Create the output directory if needed and open a sink per language.
    pub fn create<S: AsRef<str>>(out_dir: &Path, languages: &[S], zipped: bool) -> Result<Self> {
        fs::create_dir_all(out_dir)?;
        let mut sinks = BTreeMap::new();
        for language in languages {
            let language = language.as_ref();
            let path = Self::path_for(out_dir, language, zipped);
            sinks.insert(language.to_string(), Sink::create(&path, zipped)?);
        }
        debug!(
            out_dir = %out_dir.display(),
            count = sinks.len(),
            zipped,
            "Opened per-language outputs"
        );
        Ok(Self { sinks })
    }

    /// Path of the output file for `language`.
    pub fn path_for(out_dir: &Path, language: &str, zipped: bool) -> PathBuf {
        let extension = if zipped { "txt.gz" } else { "txt" };
        out_dir.join(format!("{}.{}", language, extension))
    }

    pub fn contains(&self, language: &str) -> bool {
        self.sinks.contains_key(language)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.sinks.keys().map(String::as_str)
    }

    /// Write one line (a newline is appended) to the sink for `language`.
    pub fn write_line(&mut self, language: &str, line: &str) -> Result<()> {
        let sink = self
            .sinks
            .get_mut(language)
            .ok_or_else(|| CorpusError::MissingOutputSink(language.to_string()))?;
        sink.write_all(line.as_bytes())?;
        sink.write_all(b"\n")?;
        Ok(())
    }

    /// Flush and close every sink, reporting the first error.
    ///
    /// All sinks are closed even if one of them fails.
    pub fn finish(self) -> Result<()> {
        let mut first_error = None;
        for (_, sink) in self.sinks {
            if let Err(e) = sink.finish() {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}
