//! Charm-style prompts using cliclack

use crate::error::PromptError;
use crate::prompt::{PromptOption, Prompter, Validator};
use std::io;

/// Prompter backed by cliclack's inline widgets
#[derive(Debug, Clone, Copy, Default)]
pub struct CliclackPrompter;

impl CliclackPrompter {
    pub fn new() -> Self {
        Self
    }
}

/// cliclack reports Esc and Ctrl-C as `Interrupted`
fn interpret(err: io::Error) -> PromptError {
    match err.kind() {
        io::ErrorKind::Interrupted => PromptError::Cancelled,
        _ => PromptError::Io(err),
    }
}

impl Prompter for CliclackPrompter {
    fn input(
        &self,
        message: &str,
        placeholder: &str,
        default: Option<&str>,
        validate: Validator,
    ) -> Result<String, PromptError> {
        let mut prompt = cliclack::input(message)
            .placeholder(placeholder)
            .validate(move |value: &String| validate(value));
        if let Some(default) = default {
            prompt = prompt.default_input(default);
        }
        prompt.interact().map_err(interpret)
    }

    fn select(
        &self,
        message: &str,
        options: &[PromptOption],
        initial: usize,
    ) -> Result<usize, PromptError> {
        let mut prompt = cliclack::select(message);
        for (idx, option) in options.iter().enumerate() {
            prompt = prompt.item(idx, &option.label, &option.hint);
        }
        prompt.initial_value(initial).interact().map_err(interpret)
    }

    fn multiselect(
        &self,
        message: &str,
        options: &[PromptOption],
        initial: &[usize],
    ) -> Result<Vec<usize>, PromptError> {
        let mut prompt = cliclack::multiselect(message);
        for (idx, option) in options.iter().enumerate() {
            prompt = prompt.item(idx, &option.label, &option.hint);
        }
        prompt
            .initial_values(initial.to_vec())
            .required(false)
            .interact()
            .map_err(interpret)
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError> {
        cliclack::confirm(message)
            .initial_value(default)
            .interact()
            .map_err(interpret)
    }

    fn password(&self, message: &str) -> Result<String, PromptError> {
        cliclack::password(message)
            .mask('▪')
            .interact()
            .map_err(interpret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_is_cancellation() {
        let err = interpret(io::Error::from(io::ErrorKind::Interrupted));
        assert!(matches!(err, PromptError::Cancelled));

        let err = interpret(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(err, PromptError::Io(_)));
    }
}
