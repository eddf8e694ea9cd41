//! Benchmark command implementation.

use super::TokenizerArgs;
use anyhow::{ensure, Result as AnyhowResult};
use clap::Parser;
use std::fs;
use std::time::Instant;

/// Benchmark command arguments.
#[derive(Parser)]
pub struct BenchmarkCommand {
    #[command(flatten)]
    pub tokenizer: TokenizerArgs,

    /// Path to input text file for benchmarking
    #[arg(short, long)]
    pub input: String,

    /// Number of iterations to run
    #[arg(short = 'n', long, default_value_t = 100)]
    pub iterations: usize,

    /// Encode lines in parallel instead of the whole file at once
    #[arg(long, default_value_t = false)]
    pub batch: bool,
}

pub fn run(cmd: BenchmarkCommand) -> AnyhowResult<()> {
    ensure!(cmd.iterations > 0, "iterations must be positive");

    let mut tokenizer = cmd.tokenizer.tokenizer()?;
    let text = fs::read_to_string(&cmd.input)?;
    let lines: Vec<String> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect();

    println!("Benchmarking encoding...");
    println!("  Text length: {} bytes", text.len());
    println!("  Iterations: {}", cmd.iterations);
    println!("  Mode: {}", if cmd.batch { "batch" } else { "sequential" });
    println!();

    let mut encode = || -> AnyhowResult<usize> {
        if cmd.batch {
            let encodings = tokenizer.encode_batch(&lines)?;
            Ok(encodings.iter().map(|e| e.len()).sum())
        } else {
            Ok(tokenizer.tokenize(&text)?.len())
        }
    };

    // Warmup
    let tokens = encode()?;

    let start = Instant::now();
    for _ in 0..cmd.iterations {
        encode()?;
    }
    let elapsed = start.elapsed();

    let avg_secs = elapsed.as_secs_f64() / cmd.iterations as f64;
    log::debug!("{} tokens per iteration", tokens);

    println!("Results:");
    println!("  Tokens per iteration: {}", tokens);
    println!("  Total time: {:.2}s", elapsed.as_secs_f64());
    println!("  Average time: {:.3}ms", avg_secs * 1000.0);
    if avg_secs > 0.0 {
        println!("  Throughput: {:.0} tokens/s", tokens as f64 / avg_secs);
        println!(
            "  Throughput: {:.2} MB/s",
            text.len() as f64 / avg_secs / 1_000_000.0
        );
    }

    Ok(())
}
