//! Decode command implementation.

use super::TokenizerArgs;
use anyhow::Result as AnyhowResult;
use clap::Parser;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    #[command(flatten)]
    pub tokenizer: TokenizerArgs,

    /// Tokens to join, in order
    #[arg(required = true)]
    pub tokens: Vec<String>,
}

pub fn run(cmd: DecodeCommand) -> AnyhowResult<()> {
    let mut tokenizer = cmd.tokenizer.tokenizer()?;
    println!("{}", tokenizer.decode(&cmd.tokens));
    Ok(())
}
