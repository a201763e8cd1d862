//! Tool trait shared by the agents

use crate::error::AgentResult;

/// An operation the model can request by name
///
/// Errors returned from [`Tool::run`] are shown to the model as the
/// observation; they do not end the run.
pub trait Tool {
    /// Name the model uses in `Action:`
    fn name(&self) -> &str;

    /// One-paragraph description included in the prompt
    fn description(&self) -> &str;

    /// Run the tool on the raw `Action Input:` text
    fn run(&self, input: &str) -> AgentResult<String>;
}

/// Strip whitespace and Markdown code fences the model wraps around input
pub fn clean_tool_input(input: &str) -> String {
    let mut text = input.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop an optional language tag on the fence line.
        text = match rest.find('\n') {
            Some(pos) if !rest[..pos].trim().contains(' ') => &rest[pos + 1..],
            _ => rest,
        };
        text = text.trim_end();
        text = text.strip_suffix("```").unwrap_or(text);
    }
    text.trim().trim_matches('`').trim().to_string()
}
