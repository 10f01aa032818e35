use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{open_input, OutputFormat};
use crate::core::header::Header;
use crate::io::Reader;

#[derive(Args)]
pub struct RefsArgs {
    /// Input SAM file, plain or gzip-compressed
    /// Use '-' for stdin
    #[arg(required = true)]
    pub input: PathBuf,
}

/// Record counts gathered from one pass over the input.
struct Tally {
    per_reference: Vec<u64>,
    unplaced: u64,
    total: u64,
}

impl Tally {
    fn add(&mut self, index: Option<usize>) {
        self.total += 1;
        match index {
            Some(i) => {
                if self.per_reference.len() <= i {
                    self.per_reference.resize(i + 1, 0);
                }
                self.per_reference[i] += 1;
            }
            None => self.unplaced += 1,
        }
    }

    fn count(&self, index: usize) -> u64 {
        self.per_reference.get(index).copied().unwrap_or(0)
    }
}

/// Execute refs subcommand
///
/// # Errors
///
/// Returns an error if the input cannot be read or a record does not decode.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: RefsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut reader = Reader::new(open_input(&args.input)?)
        .with_context(|| format!("Failed to read header from {}", args.input.display()))?;
    let from_header = reader.has_header_block();

    let mut tally = Tally {
        per_reference: Vec::new(),
        unplaced: 0,
        total: 0,
    };
    for result in reader.records() {
        let record =
            result.with_context(|| format!("Failed to read record {}", tally.total + 1))?;
        tally.add(record.reference.index());
    }

    let header = reader.into_header();
    if verbose {
        eprintln!(
            "Read {} records; {} reference sequences {}",
            tally.total,
            header.len(),
            if from_header {
                "from header"
            } else {
                "discovered from records"
            }
        );
    }

    match format {
        OutputFormat::Text => print_text(&header, &tally, from_header),
        OutputFormat::Json => print_json(&header, &tally, from_header)?,
        OutputFormat::Tsv => print_tsv(&header, &tally),
    }

    Ok(())
}

fn print_text(header: &Header, tally: &Tally, from_header: bool) {
    let source = if from_header { "header" } else { "records" };
    println!(
        "Reference dictionary ({} sequences, from {source})\n",
        header.len()
    );
    println!("{:<25} {:>12} {:>12} MD5", "Name", "Length", "Records");
    println!("{}", "-".repeat(85));
    for (i, reference) in header.references().iter().enumerate() {
        println!(
            "{:<25} {:>12} {:>12} {}",
            reference.name,
            reference
                .length
                .map_or_else(|| "-".to_string(), |l| l.to_string()),
            tally.count(i),
            reference.md5.as_deref().unwrap_or("-")
        );
    }
    println!("\nUnplaced records: {}", tally.unplaced);
    println!("Total records:    {}", tally.total);
}

fn print_json(header: &Header, tally: &Tally, from_header: bool) -> anyhow::Result<()> {
    let references: Vec<serde_json::Value> = header
        .references()
        .iter()
        .enumerate()
        .map(|(i, reference)| {
            let mut json = serde_json::to_value(reference.as_ref())?;
            json["records"] = serde_json::json!(tally.count(i));
            Ok(json)
        })
        .collect::<serde_json::Result<_>>()?;

    let output = serde_json::json!({
        "source": if from_header { "header" } else { "records" },
        "references": references,
        "unplaced_records": tally.unplaced,
        "total_records": tally.total,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(header: &Header, tally: &Tally) {
    println!("index\tname\tlength\tmd5\trecords");
    for (i, reference) in header.references().iter().enumerate() {
        println!(
            "{i}\t{}\t{}\t{}\t{}",
            reference.name,
            reference.length.map(|l| l.to_string()).unwrap_or_default(),
            reference.md5.as_deref().unwrap_or(""),
            tally.count(i)
        );
    }
}
