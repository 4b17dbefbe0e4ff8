use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::prompts::SUPPORTED_LANGUAGES;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to request from the remote endpoint
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// OpenAI-compatible base URL to route model calls through
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Write a Markdown report into this directory
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[arg(long, global = true)]
    pub debug: bool,

    /// Print the default configuration and exit
    #[arg(long)]
    pub generate_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Audit a code snippet for security vulnerabilities
    Code {
        /// Source file to audit, or `-` to read from stdin
        input: PathBuf,

        /// Language the snippet is written in
        #[arg(short, long, default_value = "JavaScript")]
        language: String,
    },
    /// Fetch a website and audit its source
    Url {
        /// Absolute URL including http:// or https://
        url: String,
    },
}

/// Options shared by both scan modes, in the shape the config layer applies.
#[derive(Debug, Clone, Default)]
pub struct ScanArgs {
    pub model: Option<String>,
    pub api_base_url: Option<String>,
    pub config: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub verbosity: u8,
    pub debug: bool,
}

impl From<&Args> for ScanArgs {
    fn from(args: &Args) -> Self {
        ScanArgs {
            model: args.model.clone(),
            api_base_url: args.api_base_url.clone(),
            config: args.config.clone(),
            output_dir: args.output_dir.clone(),
            verbosity: args.verbosity,
            debug: args.debug,
        }
    }
}

/// Resolve a `--language` value against the supported list, ignoring case.
pub fn canonical_language(language: &str) -> Result<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(language.trim()))
        .copied()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Unsupported language: {}. Supported languages: {}",
                language,
                SUPPORTED_LANGUAGES.join(", ")
            )
        })
}
