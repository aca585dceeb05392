//! Yes/no confirmation for gated phases.
use anyhow::{Context as _, Result};

use crate::config::Confirmation;

/// A question put to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    /// Answer taken when the user just presses enter.
    pub default: bool,
    /// Answer shown as recommended, if any.
    pub recommended: Option<bool>,
}

impl From<&Confirmation> for Question {
    fn from(c: &Confirmation) -> Self {
        Self {
            text: c.prompt.clone(),
            default: c.default,
            recommended: c.recommended,
        }
    }
}

/// Something that can ask the user a yes/no question.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    /// Ask `question` and return the answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read (e.g. the user
    /// interrupted the prompt).
    fn ask(&self, question: &Question) -> Result<bool>;
}

/// [`Prompter`] that asks on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&self, question: &Question) -> Result<bool> {
        let help = question
            .recommended
            .map(|yes| format!("recommended: {}", if yes { "yes" } else { "no" }));
        let mut confirm = inquire::Confirm::new(&question.text).with_default(question.default);
        if let Some(help) = help.as_deref() {
            confirm = confirm.with_help_message(help);
        }
        confirm
            .prompt()
            .with_context(|| format!("reading answer to '{}'", question.text))
    }
}

/// Decide a confirmation gate.
///
/// Returns the configured default without asking when the gate is marked
/// `noprompt` or the run is non-interactive; otherwise defers to `prompter`.
///
/// # Errors
///
/// Propagates any error from `prompter`.
pub fn confirm(
    prompter: &dyn Prompter,
    confirmation: &Confirmation,
    non_interactive: bool,
) -> Result<bool> {
    if confirmation.noprompt || non_interactive {
        return Ok(confirmation.default);
    }
    prompter.ask(&Question::from(confirmation))
}
