//! Command-line parsing for `lexrag-ask` and `lexrag-index`.
//!
//! Value flags consume the next argument whatever it looks like, so
//! `--threshold -0.5` reaches validation instead of being read as a flag.
use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;
use std::str::FromStr;

use lexrag_core::RetrievalParams;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AskArgs {
    pub help: bool,
    pub json: bool,
    /// Remaining words joined by single spaces; empty means "read stdin".
    pub question: String,
    pub top_k: Option<usize>,
    pub threshold: Option<f32>,
    pub max_results: Option<usize>,
}

impl AskArgs {
    /// Parse everything after the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut parsed = Self::default();
        let mut words = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => parsed.help = true,
                "--json" => parsed.json = true,
                "--top-k" => parsed.top_k = Some(number(arg, iter.next())?),
                "--threshold" => parsed.threshold = Some(number(arg, iter.next())?),
                "--max-results" => parsed.max_results = Some(number(arg, iter.next())?),
                word => words.push(word),
            }
        }
        parsed.question = words.join(" ");
        Ok(parsed)
    }

    /// `base` with every flag that was given applied on top.
    pub fn retrieval_params(&self, base: RetrievalParams) -> RetrievalParams {
        RetrievalParams {
            top_k: self.top_k.unwrap_or(base.top_k),
            similarity_threshold: self.threshold.unwrap_or(base.similarity_threshold),
            max_results: self.max_results.unwrap_or(base.max_results),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexArgs {
    pub help: bool,
    pub from_dir: Option<PathBuf>,
}

impl IndexArgs {
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut parsed = Self::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => parsed.help = true,
                "--from-dir" => {
                    let dir = iter
                        .next()
                        .ok_or_else(|| anyhow!("--from-dir requires a directory"))?;
                    parsed.from_dir = Some(PathBuf::from(dir));
                }
                other => bail!("unexpected argument {other:?}"),
            }
        }
        Ok(parsed)
    }
}

fn number<T: FromStr>(flag: &str, value: Option<&String>) -> Result<T> {
    let value = value.ok_or_else(|| anyhow!("{flag} requires a number"))?;
    value
        .parse()
        .map_err(|_| anyhow!("{flag} requires a number, got {value:?}"))
}
