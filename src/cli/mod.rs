//! Command-line interface for samstream.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **view**: Read a SAM file and write it back out, optionally re-encoding
//!   FLAG or dropping the header
//! - **refs**: List the reference dictionary with per-reference record counts
//! - **bin**: Compute the index bin of a coordinate interval
//!
//! ## Usage
//!
//! ```text
//! # Re-encode FLAG as a character string
//! samstream view sample.sam --flag-format string
//!
//! # Pipe from another tool, no header needed
//! samtools view sample.bam | samstream refs -
//!
//! # JSON output for scripting
//! samstream refs sample.sam.gz --format json
//!
//! # Bin of a 100 bp alignment
//! samstream bin 16300 16400
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use flate2::read::MultiGzDecoder;

pub mod bin;
pub mod refs;
pub mod view;

#[derive(Parser)]
#[command(name = "samstream")]
#[command(version)]
#[command(about = "Stream, inspect, and re-encode SAM text alignment files")]
#[command(
    long_about = "samstream reads SAM text with or without a header.\n\nWhen the header is missing, reference sequences are discovered from the records themselves, in the order they are first seen, so downstream tools still get a consistent dictionary."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read SAM and write it back out
    View(view::ViewArgs),

    /// List reference sequences and how many records align to each
    Refs(refs::RefsArgs),

    /// Compute the index bin for a zero-based, half-open interval
    Bin(bin::BinArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open `path` (or stdin for `-`) for reading, decompressing gzip input.
pub(crate) fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    let raw: Box<dyn Read> = if path.as_os_str() == "-" {
        Box::new(io::stdin())
    } else {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Box::new(file)
    };

    let mut reader = BufReader::new(raw);
    let is_gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    if is_gzipped {
        tracing::debug!(path = %path.display(), "Reading gzip-compressed input");
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn read_all(mut input: Box<dyn BufRead>) -> String {
        let mut text = String::new();
        input.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_open_plain_input() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"@HD\tVN:1.6\n").unwrap();

        let text = read_all(open_input(file.path()).unwrap());
        assert_eq!(text, "@HD\tVN:1.6\n");
    }

    #[test]
    fn test_open_gzip_input() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"@HD\tVN:1.6\n").unwrap();
        let compressed = encoder.finish().unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&compressed).unwrap();

        let text = read_all(open_input(file.path()).unwrap());
        assert_eq!(text, "@HD\tVN:1.6\n");
    }

    #[test]
    fn test_open_missing_input() {
        let err = open_input(Path::new("/nonexistent/input.sam")).err().unwrap();
        assert!(err.to_string().contains("Failed to open"));
    }
}
