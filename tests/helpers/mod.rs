//! Test helpers for zuluai integration tests
//!
//! This module provides a scripted stand-in for the model service and
//! fixture writers for input files, so the agents can be exercised without
//! network access.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::TempDir;

use zuluai::error::{AgentError, AgentResult};
use zuluai::llm::{ChatModel, Message};

/// Small salary file with one missing overtime cell
pub const SALARY_CSV: &str = "\
department,grade,base_salary,overtime_pay
Police,M1,50000,1000
Fire,M2,60000,
Police,M3,70000,500
";

/// A different salary file, used to check that the store is replaced
pub const OTHER_SALARY_CSV: &str = "\
department,grade,base_salary,overtime_pay
Library,L1,41000,0
";

/// Model that answers from a fixed list of replies and records every call
#[derive(Default)]
pub struct ScriptedModel {
    replies: RefCell<VecDeque<String>>,
    calls: RefCell<Vec<Vec<Message>>>,
    stops: RefCell<Vec<Vec<String>>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Rc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rc::new(Self {
            replies: RefCell::new(replies.into_iter().map(Into::into).collect()),
            ..Self::default()
        })
    }

    /// Model that repeats the same reply forever
    pub fn repeating(reply: &str, times: usize) -> Rc<Self> {
        Self::new(std::iter::repeat(reply).take(times))
    }

    /// Every conversation sent so far, in order
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Stop sequences passed with each call
    pub fn stops(&self) -> Vec<Vec<String>> {
        self.stops.borrow().clone()
    }

    /// Text of the last message of call `index`
    pub fn prompt(&self, index: usize) -> String {
        self.calls.borrow()[index]
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

impl ChatModel for ScriptedModel {
    fn invoke(&self, messages: &[Message], stop: &[String]) -> AgentResult<String> {
        self.calls.borrow_mut().push(messages.to_vec());
        self.stops.borrow_mut().push(stop.to_vec());
        self.replies
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| AgentError::InvalidResponse("no scripted reply left".to_string()))
    }
}

/// Boxed handle to a shared scripted model, as the agents take it
pub fn boxed(model: &Rc<ScriptedModel>) -> Box<dyn ChatModel> {
    Box::new(Rc::clone(model))
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> std::io::Result<TempDir> {
    TempDir::new()
}

/// Write `contents` to `name` inside `dir`
pub fn write_file(dir: &Path, name: &str, contents: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

/// Write the standard salary fixture into `dir`
pub fn write_salary_csv(dir: &Path) -> std::io::Result<PathBuf> {
    write_file(dir, "salaries_2023.csv", SALARY_CSV)
}
