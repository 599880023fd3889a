//! Prompt seam between configuration resolution and the terminal

use crate::error::PromptError;

/// One entry of a select or multi-select prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOption {
    pub label: String,
    pub hint: String,
}

impl PromptOption {
    pub fn new(label: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            hint: hint.into(),
        }
    }
}

/// Validator for free-text answers; `Err` carries the message shown inline
pub type Validator = fn(&str) -> Result<(), String>;

/// Asks the user questions.
///
/// Select prompts answer with indices into the option slice so the trait
/// stays object safe. Every method returns `PromptError::Cancelled` when the
/// user aborts.
pub trait Prompter: Send + Sync {
    fn input(
        &self,
        message: &str,
        placeholder: &str,
        default: Option<&str>,
        validate: Validator,
    ) -> Result<String, PromptError>;

    fn select(
        &self,
        message: &str,
        options: &[PromptOption],
        initial: usize,
    ) -> Result<usize, PromptError>;

    fn multiselect(
        &self,
        message: &str,
        options: &[PromptOption],
        initial: &[usize],
    ) -> Result<Vec<usize>, PromptError>;

    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError>;

    fn password(&self, message: &str) -> Result<String, PromptError>;
}
