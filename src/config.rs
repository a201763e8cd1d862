//! Configuration module for zuluai
//!
//! This module provides the configuration structures created once at startup
//! and passed to the components that need them, rather than reading global
//! state from inside each component.

use std::path::{Path, PathBuf};

/// Default model identifier
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Default Messages API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Default input file
pub const DEFAULT_DATA_PATH: &str = "./data/salaries_2023.csv";

/// Default SQLite database file
pub const DEFAULT_DB_PATH: &str = "./db/salary.db";

/// Default table name in the SQLite database
pub const DEFAULT_TABLE: &str = "salaries_2023";

/// Parameters for every call to the model service
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    /// Model identifier
    pub model: String,
    /// Sampling temperature; zero is fully deterministic
    pub temperature: f32,
    /// Ceiling on output tokens per call
    pub max_tokens: u32,
    /// Messages API base URL (without the `/messages` suffix)
    pub base_url: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_tokens: 1000,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Application configuration
///
/// Holds the settings shared by all entry points. Entry-point specific
/// options (the question, the serve address) stay on the parsed arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Whether to show each agent step
    verbose: bool,

    /// Model parameters
    model: ModelSettings,

    /// Input file path
    data_path: PathBuf,

    /// Upper bound on thought/action cycles per question
    max_iterations: usize,
}

impl AppConfig {
    /// Create a new application configuration
    ///
    /// # Arguments
    /// * `verbose` - Whether to show each agent step
    /// * `model` - Model parameters
    /// * `data_path` - Input file path
    /// * `max_iterations` - Upper bound on agent cycles
    pub fn new(verbose: bool, model: ModelSettings, data_path: PathBuf, max_iterations: usize) -> Self {
        Self {
            verbose,
            model,
            data_path,
            max_iterations,
        }
    }

    /// Get the verbose flag
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Get the model parameters
    pub fn model(&self) -> &ModelSettings {
        &self.model
    }

    /// Get the input file path
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Get the agent iteration limit
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}
