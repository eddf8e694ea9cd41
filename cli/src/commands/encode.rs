//! Encode command implementation.

use super::{read_input, TokenizerArgs};
use anyhow::Result as AnyhowResult;
use clap::Parser;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    #[command(flatten)]
    pub tokenizer: TokenizerArgs,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Print tokens one per line instead of space-separated
    #[arg(short, long, default_value_t = false)]
    pub lines: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<String>,
}

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let mut tokenizer = cmd.tokenizer.tokenizer()?;
    let input_text = read_input(&cmd.input)?;

    let encoding = tokenizer.encode(&input_text)?;

    let separator = if cmd.lines { "\n" } else { " " };
    let output = encoding
        .tokens
        .iter()
        .map(|t| format!("{:?}", t))
        .collect::<Vec<_>>()
        .join(separator);

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            println!("Encoded {} tokens to {}", encoding.len(), path);
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
