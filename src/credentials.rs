//! Environment bootstrap
//!
//! Every entry point reads the model-service credential before touching the
//! input file or the network. A missing credential aborts the run.

use std::fmt;

use tracing::debug;

use crate::error::{AgentError, AgentResult};

/// Name of the environment variable holding the model-service key
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Load variables from a `.env` file if one exists
///
/// A missing `.env` file is not an error; variables already set in the
/// process environment take precedence over the file.
pub fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(_) => debug!("No .env file found"),
    }
}

/// Secret string authorizing calls to the model service
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    /// Read the credential from the named environment variable
    ///
    /// An unset or empty variable is reported as
    /// [`AgentError::MissingCredential`].
    pub fn from_env(var: &str) -> AgentResult<Self> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(Credential(value)),
            _ => Err(AgentError::MissingCredential(var.to_string())),
        }
    }

    /// Wrap a known key
    pub fn new(key: impl Into<String>) -> Self {
        Credential(key.into())
    }

    /// The raw key, for request headers only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
