//! Agents composed from a chat model, a prompt template and tools
//!
//! Both agents share one executor. They differ only in their tools and their
//! prompt text.

pub mod executor;
pub mod output_parser;
pub mod sql;
pub mod tabular;
pub mod tools;

pub use executor::{AgentExecutor, AgentOutput, AgentStep, PromptTemplate};
pub use sql::{create_sql_agent, SqlAgentOptions};
pub use tabular::{create_tabular_agent, TabularAgentOptions};
pub use tools::Tool;
