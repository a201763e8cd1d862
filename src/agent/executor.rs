//! Thought / action / observation loop
//!
//! The executor renders the prompt, asks the model for the next step, runs
//! the requested tool and feeds the observation back until the model gives a
//! final answer or the iteration limit is reached.

use tracing::{debug, info, warn};

use super::output_parser::{self, AgentAction, AgentDecision};
use super::tools::Tool;
use crate::error::{AgentError, AgentResult};
use crate::llm::{ChatModel, Message};
use crate::prompts;

/// Default upper bound on thought/action cycles
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Output returned when the iteration limit is hit
pub const STOPPED_OUTPUT: &str = "Agent stopped due to iteration limit or time limit.";

/// The model stops generating before it would invent an observation.
const OBSERVATION_STOP: &str = "\nObservation:";

/// The three fixed parts of an agent prompt
///
/// `format_instructions` may contain `{tool_names}`; `suffix` must contain
/// `{input}`.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub prefix: String,
    pub format_instructions: String,
    pub suffix: String,
}

/// One completed tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStep {
    pub action: AgentAction,
    pub observation: String,
}

/// Result of one question
#[derive(Debug, Clone)]
pub struct AgentOutput {
    /// The question as given
    pub input: String,
    /// The final answer text
    pub output: String,
    /// Every tool call made on the way, in order
    pub intermediate_steps: Vec<AgentStep>,
}

/// Runs a model and a set of tools against one question at a time
pub struct AgentExecutor {
    model: Box<dyn ChatModel>,
    tools: Vec<Box<dyn Tool>>,
    template: PromptTemplate,
    max_iterations: usize,
    handle_parsing_errors: bool,
}

impl AgentExecutor {
    pub fn new(model: Box<dyn ChatModel>, tools: Vec<Box<dyn Tool>>, template: PromptTemplate) -> Self {
        Self {
            model,
            tools,
            template,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            handle_parsing_errors: false,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Feed unparseable completions back to the model instead of failing
    pub fn with_handle_parsing_errors(mut self, handle: bool) -> Self {
        self.handle_parsing_errors = handle;
        self
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// The prompt for `input` before any step has been taken
    pub fn render_prompt(&self, input: &str) -> String {
        let tool_lines: Vec<String> = self
            .tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect();
        let tool_names = self.tool_names().join(", ");

        let format_instructions =
            prompts::render(&self.template.format_instructions, &[("tool_names", tool_names.as_str())]);
        let suffix = prompts::render(&self.template.suffix, &[("input", input)]);

        format!(
            "{}\n\n{}\n\n{}\n\n{}",
            self.template.prefix.trim_end(),
            tool_lines.join("\n"),
            format_instructions.trim(),
            suffix
        )
    }

    /// Answer one question
    ///
    /// # Errors
    /// Model failures and, unless parsing errors are handled, unparseable
    /// completions end the run. Tool failures become observations.
    pub fn invoke(&self, input: &str) -> AgentResult<AgentOutput> {
        info!("Entering agent run with {} tools", self.tools.len());
        let base = self.render_prompt(input);
        let stop = vec![OBSERVATION_STOP.to_string()];

        let mut scratchpad = String::new();
        let mut steps: Vec<AgentStep> = Vec::new();

        for iteration in 1..=self.max_iterations {
            let prompt = format!("{base}{scratchpad}");
            let completion = self.model.invoke(&[Message::human(prompt)], &stop)?;
            debug!("Iteration {iteration} completion:\n{completion}");

            let action = match output_parser::parse(&completion) {
                Ok(AgentDecision::Finish(finish)) => {
                    info!("Finished agent run after {} steps", steps.len());
                    return Ok(AgentOutput {
                        input: input.to_string(),
                        output: finish.output,
                        intermediate_steps: steps,
                    });
                }
                Ok(AgentDecision::Action(action)) => action,
                Err(AgentError::OutputParse(detail)) if self.handle_parsing_errors => {
                    warn!("Could not parse model output, asking again");
                    AgentAction {
                        tool: "_Exception".to_string(),
                        tool_input: format!("Invalid or incomplete response: {detail}"),
                        log: completion.clone(),
                    }
                }
                Err(e) => return Err(e),
            };

            let observation = self.observe(&action);
            debug!("Observation: {observation}");

            scratchpad.push_str(&format!(
                "{}\nObservation: {}\nThought: ",
                action.log.trim_end(),
                observation
            ));
            steps.push(AgentStep {
                action,
                observation,
            });
        }

        warn!("Agent stopped after {} iterations", self.max_iterations);
        Ok(AgentOutput {
            input: input.to_string(),
            output: STOPPED_OUTPUT.to_string(),
            intermediate_steps: steps,
        })
    }

    fn observe(&self, action: &AgentAction) -> String {
        if action.tool == "_Exception" {
            return action.tool_input.clone();
        }

        match self.tools.iter().find(|t| t.name() == action.tool) {
            Some(tool) => {
                debug!("Running tool {} with input: {}", tool.name(), action.tool_input);
                match tool.run(&action.tool_input) {
                    Ok(observation) => observation,
                    Err(e) => format!("Error: {e}"),
                }
            }
            None => format!(
                "{} is not a valid tool, try one of [{}].",
                action.tool,
                self.tool_names().join(", ")
            ),
        }
    }
}
