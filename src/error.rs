//! Error types for command batches, transports and wait-for evaluation.
//!
//! This module defines all errors that can occur while building a command
//! batch, dispatching it over a transport, and polling wait-for conditionals.

use thiserror::Error;

/// Errors that can occur during batch construction and execution.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The command string is not fully qualified.
    ///
    /// RouterOS commands must always begin with `/`. This is checked at
    /// batch-build time, before any transport call is made.
    #[error("commands should always start with `/` to be fully qualified; not executing `{0}`")]
    MalformedCommand(String),

    /// A command reported a non-zero status on the device.
    ///
    /// Carries the device's own error text. With error checking enabled
    /// (the default) this aborts the remaining batch.
    #[error("command `{command}` failed: {message}")]
    DeviceExecution {
        /// The command that was being executed.
        command: String,
        /// Error text reported by the device.
        message: String,
    },

    /// A wait-for expression could not be parsed.
    #[error("invalid conditional `{expression}`: {reason}")]
    InvalidConditional {
        /// The original expression text.
        expression: String,
        /// What made it unparsable.
        reason: String,
    },

    /// The retry budget was spent with conditionals still pending.
    ///
    /// The payload lists the unsatisfied conditionals by their original
    /// expression text.
    #[error("one or more conditional statements have not been satisfied: {0:?}")]
    UnsatisfiedConditions(Vec<String>),

    /// The selected transport cannot be built.
    ///
    /// Returned by the transport factory when the required collaborator
    /// (terminal session or API connector) was not supplied.
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),

    /// The external session or connection failed below the command level.
    #[error("session error: {0}")]
    Session(String),
}
