use clap::Args;

use crate::cli::OutputFormat;
use crate::utils::binning::{bin_level, level_shift, reg2bin};
use crate::utils::validation::{valid_index_pos, INDEX_WORD_BITS};

#[derive(Args)]
pub struct BinArgs {
    /// Zero-based start of the interval (inclusive)
    #[arg(allow_negative_numbers = true)]
    pub beg: i64,

    /// Zero-based end of the interval (exclusive)
    #[arg(allow_negative_numbers = true)]
    pub end: i64,
}

/// Execute bin subcommand
///
/// # Errors
///
/// Returns an error if either coordinate is outside the range the binning
/// index can address.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: BinArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    for (name, value) in [("BEG", args.beg), ("END", args.end)] {
        if !valid_index_pos(value) {
            anyhow::bail!(
                "{name} {value} is outside the indexable range -1..={}",
                (1i64 << INDEX_WORD_BITS) - 2
            );
        }
    }

    let bin = reg2bin(args.beg, args.end);
    let level = bin_level(bin).ok_or_else(|| anyhow::anyhow!("Bin {bin} has no level"))?;

    if verbose {
        eprintln!(
            "Level {level} windows span {} bp",
            1u64 << level_shift(level)
        );
    }

    match format {
        OutputFormat::Text => {
            println!("Interval: [{}, {})", args.beg, args.end);
            println!("Bin:      {bin}");
            println!("Level:    {level}");
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "beg": args.beg,
                "end": args.end,
                "bin": bin,
                "level": level,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("beg\tend\tbin\tlevel");
            println!("{}\t{}\t{bin}\t{level}", args.beg, args.end);
        }
    }

    Ok(())
}
