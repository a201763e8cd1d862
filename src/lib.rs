//! zuluai library crate
//!
//! Natural-language question answering over a salary dataset. The library
//! provides:
//!
//! - Credential bootstrap from the environment and an optional `.env` file
//! - CSV loading with distinguished failures and a zero fill for missing cells
//! - A SQLite mirror of the dataset, rewritten on every run
//! - A blocking client for the Anthropic Messages API
//! - A thought/action/observation agent executor with a tabular agent and a
//!   SQL agent built on it
//! - A persona chat with an interactive loop
//! - A one-field web form around either agent
//!
//! Everything runs on one thread and blocks on the network call.

pub mod agent;
pub mod chat;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod dataset;
pub mod error;
pub mod llm;
pub mod logging;
pub mod prompts;
pub mod relational;
pub mod web;
