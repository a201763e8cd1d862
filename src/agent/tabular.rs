//! Tabular querying agent
//!
//! The model answers questions about the dataset by running statements of
//! its own choosing against an in-memory SQLite copy of the table. Those
//! statements are not restricted in any way, so building the agent requires
//! an explicit opt-in.

use tracing::warn;

use super::executor::{AgentExecutor, PromptTemplate, DEFAULT_MAX_ITERATIONS};
use super::tools::{clean_tool_input, Tool};
use crate::dataset::Dataset;
use crate::error::{AgentError, AgentResult};
use crate::llm::ChatModel;
use crate::prompts;
use crate::relational::RelationalStore;

/// Table name of the dataset inside the statement tool
pub const TABLE_NAME: &str = "df";

/// Options for [`create_tabular_agent`]
#[derive(Debug, Clone)]
pub struct TabularAgentOptions {
    /// Permit the model to execute arbitrary statements against the table
    pub allow_dangerous_code: bool,
    pub max_iterations: usize,
    pub handle_parsing_errors: bool,
    /// Rows shown to the model in the prompt
    pub preview_rows: usize,
}

impl Default for TabularAgentOptions {
    fn default() -> Self {
        Self {
            allow_dangerous_code: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            handle_parsing_errors: false,
            preview_rows: 5,
        }
    }
}

/// Runs any SQLite statement against the in-memory copy of the dataset
pub struct TableQueryTool {
    store: RelationalStore,
    description: String,
}

impl TableQueryTool {
    pub fn new(dataset: &Dataset) -> AgentResult<Self> {
        let mut store = RelationalStore::in_memory()?;
        store.replace_table(dataset, TABLE_NAME)?;
        let description = format!(
            "A SQLite engine holding the table as `{TABLE_NAME}` with columns {}. \
             Use this to execute statements against the table. Input should be a single valid \
             SQLite statement. The output is a list of row tuples, or an error message.",
            dataset.columns().join(", ")
        );
        Ok(Self { store, description })
    }
}

impl Tool for TableQueryTool {
    fn name(&self) -> &str {
        "table_query"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn run(&self, input: &str) -> AgentResult<String> {
        self.store.run(&clean_tool_input(input))
    }
}

/// Build an agent that answers questions about `dataset`
///
/// # Errors
/// * [`AgentError::DangerousCodeNotAllowed`] - `allow_dangerous_code` is not set
pub fn create_tabular_agent(
    model: Box<dyn ChatModel>,
    dataset: &Dataset,
    options: TabularAgentOptions,
) -> AgentResult<AgentExecutor> {
    if !options.allow_dangerous_code {
        return Err(AgentError::DangerousCodeNotAllowed);
    }
    warn!("Tabular agent may execute arbitrary statements; run it only on data you can afford to expose");

    let tool = TableQueryTool::new(dataset)?;
    let preview = dataset.preview(options.preview_rows);

    let template = PromptTemplate {
        prefix: prompts::render(prompts::TABULAR_PREFIX, &[("table", TABLE_NAME)]),
        format_instructions: prompts::FORMAT_INSTRUCTIONS.to_string(),
        suffix: prompts::render(prompts::TABULAR_SUFFIX, &[("preview", preview.as_str())]),
    };

    Ok(AgentExecutor::new(model, vec![Box::new(tool)], template)
        .with_max_iterations(options.max_iterations)
        .with_handle_parsing_errors(options.handle_parsing_errors))
}
