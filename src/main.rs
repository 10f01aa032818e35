use clap::Parser;
use tracing_subscriber::EnvFilter;

use samstream::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("samstream=debug,info")
    } else {
        EnvFilter::new("samstream=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::View(args) => {
            cli::view::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Refs(args) => {
            cli::refs::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Bin(args) => {
            cli::bin::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
