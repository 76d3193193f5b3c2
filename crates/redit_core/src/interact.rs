//! Session-scoped interactive input.
//!
//! Every prompting operation receives an explicit `Interact` handle; nothing
//! reads the terminal as ambient global state. The terminal implementation
//! can be released before spawning an external program that needs exclusive
//! access to the terminal, and re-acquired afterward.

use crate::error::{ReditError, Result};
use console::Term;
use std::collections::VecDeque;

/// Interactive input/output capability for prompts.
pub trait Interact {
    /// Displays text to the user (diffs, conflict reports).
    fn show(&mut self, text: &str) -> Result<()>;

    /// Prompts for a line of input; returns the trimmed answer.
    fn prompt_line(&mut self, prompt: &str) -> Result<String>;

    /// Asks a yes/no question; only an explicit `y`/`yes` confirms.
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.prompt_line(&format!("{} [y/N] ", prompt))?;
        Ok(matches!(answer.as_str(), "y" | "Y" | "yes" | "YES"))
    }

    /// Releases the interactive handle before an external program takes the
    /// terminal. Must be called exactly once per release/reacquire cycle.
    fn release(&mut self) {}

    /// Re-acquires the handle after the external program exits.
    fn reacquire(&mut self) {}
}

/// Terminal implementation over a session-scoped `console::Term`.
pub struct TermInteract {
    term: Option<Term>,
}

impl TermInteract {
    /// Creates a handle bound to stderr, keeping stdout clean for output
    /// that may be piped.
    pub fn new() -> Self {
        Self {
            term: Some(Term::stderr()),
        }
    }

    fn term(&mut self) -> Result<&mut Term> {
        self.term.as_mut().ok_or_else(|| {
            ReditError::Config("interactive handle used while released".to_string())
        })
    }
}

impl Default for TermInteract {
    fn default() -> Self {
        Self::new()
    }
}

impl Interact for TermInteract {
    fn show(&mut self, text: &str) -> Result<()> {
        let term = self.term()?;
        term.write_line(text)?;
        Ok(())
    }

    fn prompt_line(&mut self, prompt: &str) -> Result<String> {
        let term = self.term()?;
        term.write_str(prompt)?;
        Ok(term.read_line()?.trim().to_string())
    }

    fn release(&mut self) {
        self.term = None;
    }

    fn reacquire(&mut self) {
        self.term = Some(Term::stderr());
    }
}

/// Scripted implementation for tests: answers come from a fixed queue and
/// every prompt is recorded. An exhausted queue answers with an empty line
/// (which every prompt in this system treats as the safe default).
#[derive(Debug, Default)]
pub struct ScriptedInteract {
    answers: VecDeque<String>,
    /// Prompts issued so far, in order.
    pub prompts: Vec<String>,
    /// Text shown so far, in order.
    pub shown: Vec<String>,
}

impl ScriptedInteract {
    /// Creates a script from a list of answers.
    pub fn with_answers<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            shown: Vec::new(),
        }
    }
}

impl Interact for ScriptedInteract {
    fn show(&mut self, text: &str) -> Result<()> {
        self.shown.push(text.to_string());
        Ok(())
    }

    fn prompt_line(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}
