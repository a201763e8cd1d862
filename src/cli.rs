//! CLI argument parsing module for zuluai
//!
//! This module defines the command-line interface with the clap crate. Each
//! subcommand is one independent entry point:
//!
//! - `csv`: question answering over the input file
//! - `chat`: the persona chat, optionally interactive
//! - `sql`: question answering over a SQLite mirror of the input file
//!
//! Model parameters are global options; `ANTHROPIC_BASE_URL` may replace the
//! default endpoint.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::{
    DEFAULT_BASE_URL, DEFAULT_DATA_PATH, DEFAULT_DB_PATH, DEFAULT_MODEL, DEFAULT_TABLE,
};

/// Command-line arguments for zuluai
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Ask natural-language questions about a salary CSV file, its SQLite mirror, or a persona chat"
)]
pub struct ZuluArgs {
    /// Show every agent step (thought, action, observation)
    #[clap(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Log level used when neither --verbose nor RUST_LOG is set
    #[clap(long, global = true, default_value = "info", help = "Log level (error, warn, info, debug, trace)")]
    pub log_level: String,

    /// Model identifier sent with every request
    #[clap(long, global = true, default_value = DEFAULT_MODEL, help = "Model identifier")]
    pub model: String,

    /// Sampling temperature; the default of zero is fully deterministic
    #[clap(long, global = true, default_value_t = 0.0, help = "Sampling temperature")]
    pub temperature: f32,

    /// Ceiling on output tokens per model call
    #[clap(long, global = true, default_value_t = 1000, help = "Maximum output tokens per call")]
    pub max_tokens: u32,

    /// Messages API base URL
    #[clap(
        long,
        global = true,
        env = "ANTHROPIC_BASE_URL",
        default_value = DEFAULT_BASE_URL,
        help = "Model service base URL"
    )]
    pub base_url: String,

    /// Upper bound on agent thought/action cycles per question
    #[clap(long, global = true, default_value_t = 15, help = "Maximum agent iterations")]
    pub max_iterations: usize,

    #[clap(subcommand)]
    pub command: Command,
}

/// The independent entry points
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer a question about the input file with the tabular agent
    Csv(CsvArgs),
    /// Ask the persona chat one question, or loop over terminal input
    Chat(ChatArgs),
    /// Mirror the input file into SQLite and answer a question with the SQL agent
    Sql(SqlArgs),
}

/// Options for `zuluai csv`
#[derive(Args, Debug)]
pub struct CsvArgs {
    /// Comma-separated input file
    #[clap(long, default_value = DEFAULT_DATA_PATH, help = "Input CSV file")]
    pub data: PathBuf,

    /// Question to ask instead of the default one
    #[clap(short, long, conflicts_with = "serve", help = "Question to ask")]
    pub question: Option<String>,

    /// Wrap the question in the cross-check instructions
    #[clap(long, help = "Ask the model to verify its answer by two methods")]
    pub double_check: bool,

    /// Serve a one-field web form on this address instead of asking once
    #[clap(long, value_name = "ADDR", help = "Serve a web form, e.g. 127.0.0.1:8501")]
    pub serve: Option<String>,
}

/// Options for `zuluai chat`
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Question to ask instead of the default one
    #[clap(short, long, conflicts_with = "interactive", help = "Question to ask")]
    pub question: Option<String>,

    /// Read questions from the terminal until 'exit'
    #[clap(short, long, help = "Start in interactive mode")]
    pub interactive: bool,
}

/// Options for `zuluai sql`
#[derive(Args, Debug)]
pub struct SqlArgs {
    /// Comma-separated input file
    #[clap(long, default_value = DEFAULT_DATA_PATH, help = "Input CSV file")]
    pub data: PathBuf,

    /// SQLite database file, rewritten on every run
    #[clap(long, default_value = DEFAULT_DB_PATH, help = "SQLite database file")]
    pub db: PathBuf,

    /// Table the input file is written to
    #[clap(long, default_value = DEFAULT_TABLE, help = "Table name")]
    pub table: String,

    /// Default row limit the agent is asked to apply
    #[clap(long, default_value_t = 30, help = "Default row limit for queries")]
    pub top_k: usize,

    /// Question to ask instead of the default one
    #[clap(short, long, conflicts_with = "serve", help = "Question to ask")]
    pub question: Option<String>,

    /// Serve a one-field web form on this address instead of asking once
    #[clap(long, value_name = "ADDR", help = "Serve a web form, e.g. 127.0.0.1:8501")]
    pub serve: Option<String>,
}

impl ZuluArgs {
    /// Input file of the selected entry point, if it reads one
    pub fn data_path(&self) -> Option<&PathBuf> {
        match &self.command {
            Command::Csv(args) => Some(&args.data),
            Command::Sql(args) => Some(&args.data),
            Command::Chat(_) => None,
        }
    }
}

/// Parse command-line arguments into the ZuluArgs structure
pub fn parse_args() -> Result<ZuluArgs> {
    Ok(ZuluArgs::parse())
}
