//! Chat responder and its interactive loop
//!
//! A conversation is a persona instruction followed by one question. The
//! interactive loop asks one question per input line; earlier turns are not
//! sent again.

use std::io::{BufRead, Write};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, info};

use crate::error::AgentResult;
use crate::llm::{ChatModel, Message};
use crate::prompts;

/// Input that ends the interactive loop (compared case-insensitively)
pub const EXIT_SENTINEL: &str = "exit";

const PROMPT: &str = "You: ";

/// The fixed persona conversation
pub fn default_conversation() -> Vec<Message> {
    vec![
        Message::system(prompts::CHAT_PERSONA),
        Message::human(prompts::DEFAULT_CHAT_QUESTION),
    ]
}

/// Whether `line` is the sentinel that ends the loop
pub fn is_exit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(EXIT_SENTINEL)
}

/// Sends a conversation to the model and returns the single reply
pub struct ChatResponder {
    model: Box<dyn ChatModel>,
}

impl ChatResponder {
    pub fn new(model: Box<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub fn respond(&self, messages: &[Message]) -> AgentResult<Message> {
        debug!("Sending {} messages", messages.len());
        let reply = self.model.invoke(messages, &[])?;
        Ok(Message::ai(reply))
    }
}

/// Source of input lines for [`ChatLoop`]
pub trait LineSource {
    /// Next line, or `None` at end of input
    fn read_line(&mut self, prompt: &str) -> AgentResult<Option<String>>;
}

/// Lines from any buffered reader (piped stdin, tests)
pub struct ReaderSource<R: BufRead> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn read_line(&mut self, _prompt: &str) -> AgentResult<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Lines from a terminal with editing and history
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new() -> AgentResult<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> AgentResult<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Read-eval loop over a [`LineSource`]
pub struct ChatLoop {
    responder: ChatResponder,
    persona: String,
}

impl ChatLoop {
    pub fn new(responder: ChatResponder) -> Self {
        Self {
            responder,
            persona: prompts::CHAT_PERSONA.to_string(),
        }
    }

    /// Ask one question per line until the sentinel or end of input
    ///
    /// Blank lines are skipped. The sentinel is never sent to the model.
    /// Returns the number of questions answered.
    pub fn run<S: LineSource, W: Write>(&self, source: &mut S, out: &mut W) -> AgentResult<usize> {
        writeln!(out, "Type '{EXIT_SENTINEL}' to quit.")?;
        let mut answered = 0;

        while let Some(line) = source.read_line(PROMPT)? {
            if is_exit(&line) {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            let messages = [Message::system(self.persona.clone()), Message::human(line.trim())];
            let reply = self.responder.respond(&messages)?;
            writeln!(out, "AI: {}", reply.content)?;
            out.flush()?;
            answered += 1;
        }

        info!("Chat loop ended after {answered} questions");
        Ok(answered)
    }
}
