//! Parser for the Thought / Action / Action Input / Final Answer format

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AgentError, AgentResult};

const FINAL_ANSWER: &str = "Final Answer:";

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentAction {
    /// Name of the tool to run
    pub tool: String,
    /// Raw input for the tool
    pub tool_input: String,
    /// Model text that produced this action, thought included
    pub log: String,
}

/// The model's final answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentFinish {
    pub output: String,
    pub log: String,
}

/// What the model asked for in one completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentDecision {
    Action(AgentAction),
    Finish(AgentFinish),
}

fn action_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
            .expect("action pattern is valid")
    })
}

/// Parse one model completion
///
/// A completion holding both a final answer and an action is rejected, as is
/// a completion holding neither.
pub fn parse(text: &str) -> AgentResult<AgentDecision> {
    let action = action_regex().captures(text);
    let has_final = text.contains(FINAL_ANSWER);

    match (action, has_final) {
        (Some(_), true) => Err(AgentError::OutputParse(format!(
            "Parsing LLM output produced both a final answer and a parse-able action: {text}"
        ))),
        (None, true) => {
            let output = text
                .rsplit(FINAL_ANSWER)
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            Ok(AgentDecision::Finish(AgentFinish {
                output,
                log: text.to_string(),
            }))
        }
        (Some(caps), false) => {
            let tool = caps[1].trim().to_string();
            let mut tool_input = caps[2].to_string();
            // The model sometimes runs past the stop sequence.
            if let Some(pos) = tool_input.find("\nObservation") {
                tool_input.truncate(pos);
            }
            let tool_input = tool_input.trim().trim_matches('"').to_string();

            if tool.is_empty() {
                return Err(AgentError::OutputParse(format!(
                    "Missing 'Action:' after 'Thought:': {text}"
                )));
            }

            Ok(AgentDecision::Action(AgentAction {
                tool,
                tool_input,
                log: text.to_string(),
            }))
        }
        (None, false) => {
            if text.contains("Action:") {
                Err(AgentError::OutputParse(format!(
                    "Missing 'Action Input:' after 'Action:': {text}"
                )))
            } else {
                Err(AgentError::OutputParse(text.to_string()))
            }
        }
    }
}
