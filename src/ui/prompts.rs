//! ui::prompts
//!
//! Interactive prompts.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. Callers receive an
//! `Option<&dyn Prompter>`: `None` means operations requiring input must
//! fail with a clear error instead of blocking on stdin.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(String),
}

/// Source of answers to interactive questions.
pub trait Prompter {
    /// Ask for a line of visible text.
    fn input(&self, message: &str) -> Result<String, PromptError>;

    /// Ask for a line of hidden text (tokens, passwords).
    fn password(&self, message: &str) -> Result<String, PromptError>;
}

/// Prompter reading from the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn input(&self, message: &str) -> Result<String, PromptError> {
        eprint!("{}: ", message);
        io::stderr()
            .flush()
            .map_err(|e| PromptError::IoError(e.to_string()))?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| PromptError::IoError(e.to_string()))?;
        if read == 0 {
            return Err(PromptError::Cancelled);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn password(&self, message: &str) -> Result<String, PromptError> {
        rpassword::prompt_password(format!("{}: ", message))
            .map_err(|e| PromptError::IoError(e.to_string()))
    }
}

/// Prompter answering from a fixed script, for tests and automation.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
        }
    }

    fn next(&self) -> Result<String, PromptError> {
        self.answers
            .lock()
            .map_err(|e| PromptError::IoError(e.to_string()))?
            .pop_front()
            .ok_or(PromptError::Cancelled)
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&self, _message: &str) -> Result<String, PromptError> {
        self.next()
    }

    fn password(&self, _message: &str) -> Result<String, PromptError> {
        self.next()
    }
}
