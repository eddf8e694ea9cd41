//! Runebpe CLI - Command-line interface for the rune-level BPE tokenizer.
//!
//! This is the main entry point for the `runebpe` command-line tool.

mod commands;

use clap::{Parser, Subcommand};
use commands::{BenchmarkCommand, DecodeCommand, EncodeCommand};

#[derive(Parser)]
#[command(name = "runebpe")]
#[command(about = "A rune-level BPE tokenizer", long_about = None)]
#[command(version)]
struct Cli {
    /// Log pipeline construction and merge rounds (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split text into tokens
    Encode(EncodeCommand),
    /// Join tokens back into text
    Decode(DecodeCommand),
    /// Benchmark encoding performance
    Benchmark(BenchmarkCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG applies unless -v was given; the default is warn.
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = verbosity_filter(cli.verbose) {
        logger.filter_level(level);
    }
    logger.init();

    match cli.command {
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Decode(cmd) => commands::decode::run(cmd)?,
        Commands::Benchmark(cmd) => commands::benchmark::run(cmd)?,
    }

    Ok(())
}

/// Log level forced by `-v` flags, if any.
fn verbosity_filter(verbose: u8) -> Option<log::LevelFilter> {
    match verbose {
        0 => None,
        1 => Some(log::LevelFilter::Info),
        2 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_leaves_env_alone_by_default() {
        assert_eq!(verbosity_filter(0), None);
        assert_eq!(verbosity_filter(2), Some(log::LevelFilter::Debug));
        assert_eq!(verbosity_filter(5), Some(log::LevelFilter::Trace));
    }

    #[test]
    fn test_cli_parses_verbose_count() {
        let cli = Cli::try_parse_from(["runebpe", "-vv", "decode", "a", "b"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
