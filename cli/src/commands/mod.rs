//! CLI commands for the runebpe tokenizer.

pub mod benchmark;
pub mod decode;
pub mod encode;

pub use benchmark::BenchmarkCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use runebpe_tokenizer::{
    MergeTable, NormalizationForm, SplitPattern, Splitter, Tokenizer, TokenizerConfig,
};
use std::io::Read;

/// Normalization form accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Normalization {
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
    None,
}

impl From<Normalization> for NormalizationForm {
    fn from(n: Normalization) -> Self {
        match n {
            Normalization::Nfc => NormalizationForm::NFC,
            Normalization::Nfd => NormalizationForm::NFD,
            Normalization::Nfkc => NormalizationForm::NFKC,
            Normalization::Nfkd => NormalizationForm::NFKD,
            Normalization::None => NormalizationForm::None,
        }
    }
}

/// Split strategy accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Split {
    /// Keep the input as one word
    None,
    /// Runs of whitespace
    Whitespace,
    /// Every single space
    Space,
    /// Unicode word boundaries
    Words,
    /// One word per character
    Character,
}

/// Merge rules plus pipeline options shared by every command.
#[derive(Debug, Args)]
pub struct TokenizerArgs {
    /// Merge rule "LEFT RIGHT", in rank order (repeatable); either side may be
    /// a single space, e.g. "  t" or "t  "
    #[arg(short, long = "merge", value_name = "LEFT RIGHT")]
    pub merges: Vec<String>,

    /// File with one merge rule per line, kept verbatim (trailing spaces are
    /// significant); empty lines and `#` comments are skipped
    #[arg(long, value_name = "PATH")]
    pub merges_file: Option<String>,

    /// Unicode normalization form
    #[arg(long, value_enum, default_value_t = Normalization::Nfc)]
    pub normalization: Normalization,

    /// Remove combining marks (accents)
    #[arg(long, default_value_t = false)]
    pub strip_marks: bool,

    /// Lowercase before splitting
    #[arg(long, default_value_t = false)]
    pub lowercase: bool,

    /// How to split text into words
    #[arg(long, value_enum, default_value_t = Split::Whitespace)]
    pub split: Split,

    /// Regex matching word separators (overrides --split)
    #[arg(long, value_name = "REGEX")]
    pub split_regex: Option<String>,

    /// Word cache capacity (0 disables the cache)
    #[arg(long, default_value_t = 1000)]
    pub cache_capacity: usize,
}

impl TokenizerArgs {
    /// Build a merge table from `--merges-file` followed by `--merge` rules.
    pub fn merge_table(&self) -> Result<MergeTable> {
        let mut rules = Vec::new();
        if let Some(path) = &self.merges_file {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read merges file {}", path))?;
            rules.extend(
                text.lines()
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(str::to_string),
            );
        }
        rules.extend(self.merges.iter().cloned());

        let mut builder = MergeTable::builder();
        for (line, rule) in rules.iter().enumerate() {
            let Some((left, right)) = parse_rule(rule) else {
                bail!("Merge rule {} ({:?}) is not of the form \"LEFT RIGHT\"", line, rule);
            };
            builder
                .push_str(left, right)
                .with_context(|| format!("Invalid merge rule {:?}", rule))?;
        }

        let table = builder.build();
        table.validate().context("Merge table is inconsistent")?;
        log::info!("loaded {} merge rules", table.len());
        Ok(table)
    }

    /// Build a tokenizer from these options.
    pub fn tokenizer(&self) -> Result<Tokenizer> {
        let split = match &self.split_regex {
            Some(re) => Splitter::regex(re)?.pattern().clone(),
            None => match self.split {
                Split::None => SplitPattern::NoSplit,
                Split::Whitespace => SplitPattern::Whitespace,
                Split::Space => SplitPattern::Space,
                Split::Words => SplitPattern::Words,
                Split::Character => SplitPattern::Character,
            },
        };

        let config = TokenizerConfig {
            normalization: self.normalization.into(),
            strip_marks: self.strip_marks,
            lowercase: self.lowercase,
            split,
            cache_capacity: self.cache_capacity,
        };

        Ok(Tokenizer::new(self.merge_table()?.into(), config)?)
    }
}

/// Split a rule into its two components, separated by one space.
///
/// Either component may itself be a single space: `"  the"` is
/// `(" ", "the")` and `"t  "` is `("t", " ")`.
fn parse_rule(rule: &str) -> Option<(&str, &str)> {
    let (left, right) = match rule.strip_suffix("  ") {
        Some(left) => (left, " "),
        None => rule.rsplit_once(' ')?,
    };
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left, right))
}

/// Read `input`, or stdin when it is `-`.
pub fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(input.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rule() {
        assert_eq!(parse_rule("l o"), Some(("l", "o")));
        assert_eq!(parse_rule("lo w"), Some(("lo", "w")));
        assert_eq!(parse_rule("  the"), Some((" ", "the")));
        assert_eq!(parse_rule("low"), None);
        assert_eq!(parse_rule("low "), None);
        assert_eq!(parse_rule("  "), None);
    }

    #[test]
    fn test_parse_rule_trailing_space_component() {
        assert_eq!(parse_rule("t  "), Some(("t", " ")));
        assert_eq!(parse_rule("lo  "), Some(("lo", " ")));
        assert_eq!(parse_rule("   "), Some((" ", " ")));
    }

    #[test]
    fn test_merges_file_keeps_trailing_spaces() {
        let path = std::env::temp_dir()
            .join(format!("runebpe-merges-{}.txt", std::process::id()));
        std::fs::write(&path, "# rules\nl o\r\nt  \n\nlo w\n").unwrap();

        let args = TokenizerArgs {
            merges: vec!["e r".to_string()],
            merges_file: Some(path.to_string_lossy().into_owned()),
            normalization: Normalization::Nfc,
            strip_marks: false,
            lowercase: false,
            split: Split::None,
            split_regex: None,
            cache_capacity: 0,
        };
        let table = args.merge_table();
        std::fs::remove_file(&path).unwrap();

        let table = table.unwrap();
        assert_eq!(table.len(), 4);
        assert!(table.rank(('t', ' ')).is_some());
        assert_eq!(table.rank(('e', 'r')), Some(3));
    }
}
