use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{open_input, OutputFormat};
use crate::core::flags::FlagFormat;
use crate::core::header::Header;
use crate::io::{Reader, RecordIterator, Writer};

#[derive(Args)]
pub struct ViewArgs {
    /// Input SAM file, plain or gzip-compressed
    /// Use '-' for stdin
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file (stdout if not given)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How to write the FLAG field
    #[arg(long, value_enum, default_value = "decimal")]
    pub flag_format: FlagFormat,

    /// Write the header and no records
    #[arg(long, conflicts_with = "no_header")]
    pub header_only: bool,

    /// Write records without the header
    #[arg(long)]
    pub no_header: bool,
}

/// Execute view subcommand
///
/// # Errors
///
/// Returns an error if the input cannot be read or decoded, or the output
/// cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ViewArgs, _format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut reader = Reader::new(open_input(&args.input)?)
        .with_context(|| format!("Failed to read header from {}", args.input.display()))?;

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    let empty = Header::new();
    let header = if args.no_header {
        &empty
    } else {
        reader.header()
    };
    let mut writer = Writer::new(BufWriter::new(sink), header, args.flag_format)?;

    let mut count = 0usize;
    if !args.header_only {
        let mut records = RecordIterator::new(&mut reader);
        while records.advance() {
            if let Some(record) = records.record() {
                writer.write_record(record)?;
                count += 1;
            }
        }
        if let Some(e) = records.error() {
            anyhow::bail!("Failed to read record {}: {e}", count + 1);
        }
    }
    writer.flush()?;

    if verbose {
        let source = if reader.has_header_block() {
            "from header"
        } else {
            "discovered from records"
        };
        eprintln!(
            "Wrote {count} records; {} reference sequences {source}",
            reader.header().len()
        );
    }

    Ok(())
}
