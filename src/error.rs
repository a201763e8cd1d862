//! Error handling for zuluai
//!
//! This module defines the error type shared by the library modules.
//! Every failure path is fatal for the current run: nothing here is retried
//! or downgraded to a warning. The binary wraps these errors with `anyhow`
//! context so the printed diagnostic carries the stage that failed.

use std::path::PathBuf;

use thiserror::Error;

/// AgentError represents all possible errors that can occur in zuluai
///
/// The variants follow the order in which an entry point runs:
/// - credential bootstrap
/// - dataset loading (three distinguished kinds)
/// - agent construction
/// - agent invocation (network, API and output-parsing failures)
#[derive(Error, Debug)]
pub enum AgentError {
    /// The model-service credential is absent or empty
    #[error("{0} not found in environment variables.")]
    MissingCredential(String),

    /// The input file does not exist
    #[error(
        "The file '{}' was not found. Current working directory: {}",
        .path.display(),
        .cwd.display()
    )]
    DatasetNotFound { path: PathBuf, cwd: PathBuf },

    /// The input file exists but has no header line
    #[error("The file '{}' is empty.", .0.display())]
    DatasetEmpty(PathBuf),

    /// The input file exists but its rows cannot be parsed
    #[error("The file '{}' contains invalid data: {}", .path.display(), .detail)]
    DatasetMalformed { path: PathBuf, detail: String },

    /// The tabular agent was built without opting in to statement execution
    #[error(
        "The tabular agent executes arbitrary model-derived statements against the table. \
         Set allow_dangerous_code to opt in."
    )]
    DangerousCodeNotAllowed,

    /// Error during file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the SQLite engine
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Error raised while parsing a statement for the query checker
    #[error("SQL parsing error: {0}")]
    SqlParse(#[from] sqlparser::parser::ParserError),

    /// Error while reading terminal input
    #[error("Input error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    /// Transport-level failure talking to the model service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The model service answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The model service answered with a body we could not interpret
    #[error("Invalid response from model service: {0}")]
    InvalidResponse(String),

    /// The model output follows neither the action nor the final-answer format
    #[error("Could not parse LLM output: `{0}`")]
    OutputParse(String),

    /// A form submission declared a body larger than the server accepts
    #[error("Request body of {length} bytes exceeds the limit of {limit} bytes")]
    PayloadTooLarge { length: usize, limit: usize },

    /// A schema lookup named a table that does not exist
    #[error("Table '{0}' not found")]
    UnknownTable(String),
}

/// Result type alias for operations that can produce an AgentError
pub type AgentResult<T> = std::result::Result<T, AgentError>;
