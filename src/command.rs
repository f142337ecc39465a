//! Command descriptors and batch construction.
//!
//! Raw user input, either bare command strings or maps carrying prompt and
//! answer hints, is normalized here into [`CommandDescriptor`] values before
//! anything touches a transport. Validation is front-loaded: a command that
//! is not fully qualified rejects the whole batch, and under check mode any
//! command without the read-only marker is dropped with a warning instead of
//! being dispatched.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::CommandError;

/// Marker substring identifying read-only commands.
///
/// Only commands carrying it are allowed to run under check mode.
const READ_ONLY_MARKER: &str = " print";

/// Requested shape for a command's device output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain terminal text (default).
    #[default]
    Text,
    /// Machine-readable output where the device supports it.
    Json,
}

/// One raw command entry as supplied by the caller.
///
/// Accepts both a bare command string and the full map form, matching the
/// original tool's input handling.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CommandInput {
    /// Bare command string.
    Line(String),
    /// Full form with interaction hints.
    Full {
        /// The command to execute.
        command: String,
        /// Requested output shape.
        #[serde(default)]
        output_format: OutputFormat,
        /// Prompt text the device is expected to ask.
        #[serde(default)]
        prompt: Option<String>,
        /// Answer to send when the prompt appears.
        #[serde(default)]
        answer: Option<String>,
    },
}

impl From<&str> for CommandInput {
    fn from(command: &str) -> Self {
        CommandInput::Line(command.to_string())
    }
}

/// A validated command ready for execution.
///
/// Immutable once built; invariants (non-empty, leading `/`) are enforced by
/// [`parse_commands`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CommandDescriptor {
    /// Fully qualified command text.
    pub command: String,

    /// Requested output shape, passed through to the session layer.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Prompt text the device is expected to ask, if interactive.
    #[serde(default)]
    pub prompt: Option<String>,

    /// Answer to send when the prompt appears.
    #[serde(default)]
    pub answer: Option<String>,
}

impl CommandDescriptor {
    /// Builds a descriptor for a plain command with default settings.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            output_format: OutputFormat::Text,
            prompt: None,
            answer: None,
        }
    }
}

impl From<CommandInput> for CommandDescriptor {
    fn from(input: CommandInput) -> Self {
        match input {
            CommandInput::Line(command) => CommandDescriptor::new(command),
            CommandInput::Full {
                command,
                output_format,
                prompt,
                answer,
            } => CommandDescriptor {
                command,
                output_format,
                prompt,
                answer,
            },
        }
    }
}

/// Normalizes and validates raw inputs into an executable batch.
///
/// Fails with [`CommandError::MalformedCommand`] on the first command that
/// does not start with `/`, before any transport call is made. Under check
/// mode, commands without the read-only marker are skipped entirely and one
/// warning per skipped command is appended to `warnings`.
pub fn parse_commands(
    inputs: &[CommandInput],
    check_mode: bool,
    warnings: &mut Vec<String>,
) -> Result<Vec<CommandDescriptor>, CommandError> {
    let mut items = Vec::with_capacity(inputs.len());

    for input in inputs {
        let descriptor = CommandDescriptor::from(input.clone());

        if !descriptor.command.starts_with('/') {
            return Err(CommandError::MalformedCommand(descriptor.command));
        }

        if check_mode && !descriptor.command.contains(READ_ONLY_MARKER) {
            warnings.push(format!(
                "only print commands are supported when using check mode, not executing `{}`",
                descriptor.command
            ));
            continue;
        }

        items.push(descriptor);
    }

    Ok(items)
}
