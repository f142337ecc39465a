//! Batch orchestration: run commands, poll conditionals, report.
//!
//! This module ties the pieces together the way the original tool's main
//! flow does: normalize and validate the command list, parse the wait-for
//! expressions, then run the batch against the selected transport until
//! every pending conditional is satisfied or the retry budget is spent.
//!
//! # Main Components
//!
//! - [`BatchRunner`] - executes a batch over a [`DeviceTransport`]
//! - [`RetryController`] - the RUNNING/SATISFIED/EXHAUSTED state machine
//! - [`BatchRequest`] / [`BatchReport`] - the external interface

use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::command::{CommandDescriptor, CommandInput, parse_commands};
use crate::conditional::Conditional;
use crate::config::{MatchMode, RetryPolicy};
use crate::error::CommandError;
use crate::transport::{DeviceTransport, Response};

/// One batch request: what to run, what to wait for, and the loop bounds.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BatchRequest {
    /// Commands to send, in order. Each must be fully qualified.
    pub commands: Vec<CommandInput>,

    /// Wait-for conditional expressions. Empty means run once and return.
    #[serde(default)]
    pub wait_for: Vec<String>,

    /// Retry bounds and match policy.
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Dry-run mode: only read-only commands are dispatched.
    #[serde(default)]
    pub check_mode: bool,

    /// Abort the batch on the first failing command (default true).
    #[serde(default = "default_check_errors")]
    pub check_errors: bool,
}

fn default_check_errors() -> bool {
    true
}

impl BatchRequest {
    /// A request running `commands` once with default bounds.
    pub fn new(commands: Vec<CommandInput>) -> Self {
        Self {
            commands,
            wait_for: Vec::new(),
            retry: RetryPolicy::default(),
            check_mode: false,
            check_errors: true,
        }
    }
}

/// Result of a successful batch run.
///
/// `changed` is always false: commands may well mutate the device, but this
/// tool does not track declarative state and never claims a change.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct BatchReport {
    /// Always false.
    pub changed: bool,

    /// One response per executed command, from the final iteration.
    pub stdout: Vec<Response>,

    /// Each response normalized to lines: string responses become arrays
    /// of lines, structured responses pass through unchanged.
    pub stdout_lines: Vec<Response>,

    /// Warnings recorded while building the batch (check-mode skips).
    pub warnings: Vec<String>,
}

/// Splits string responses into line arrays for the report.
pub fn to_lines(stdout: &[Response]) -> Vec<Response> {
    stdout
        .iter()
        .map(|item| match item {
            Value::String(text) => Value::Array(
                text.split('\n')
                    .map(|line| Value::String(line.to_string()))
                    .collect(),
            ),
            other => other.clone(),
        })
        .collect()
}

/// Observable state of the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Conditionals pending, attempts remaining.
    Running,
    /// Every conditional satisfied (or none were supplied).
    Satisfied,
    /// Retry budget spent with conditionals still pending.
    Exhausted,
}

/// Bookkeeping for the wait-for loop.
///
/// Holds the pending conditional set and the attempt counter; each
/// [`observe`](Self::observe) call consumes one attempt against a fresh
/// response snapshot. The controller performs no I/O; [`BatchRunner`]
/// drives it.
pub struct RetryController {
    pending: Vec<Conditional>,
    attempts_left: u32,
    match_mode: MatchMode,
}

impl RetryController {
    /// Starts the loop with all conditionals pending.
    ///
    /// An attempt floor of one keeps the contract total: even `retries: 0`
    /// executes the batch once.
    pub fn new(conditionals: Vec<Conditional>, policy: &RetryPolicy) -> Self {
        Self {
            pending: conditionals,
            attempts_left: policy.retries.max(1),
            match_mode: policy.match_mode,
        }
    }

    /// Evaluates the pending set against `responses` and consumes one
    /// attempt if anything remains unsatisfied.
    ///
    /// Under `any`, the first true conditional clears the whole set. Under
    /// `all`, satisfied conditionals are removed individually; the rest are
    /// re-evaluated next attempt against the then-fresh snapshot.
    pub fn observe(&mut self, responses: &[Response]) -> RetryState {
        match self.match_mode {
            MatchMode::Any => {
                if self
                    .pending
                    .iter()
                    .any(|conditional| conditional.evaluate(responses))
                {
                    self.pending.clear();
                }
            }
            MatchMode::All => {
                self.pending
                    .retain(|conditional| !conditional.evaluate(responses));
            }
        }

        if self.pending.is_empty() {
            return RetryState::Satisfied;
        }

        self.attempts_left = self.attempts_left.saturating_sub(1);
        if self.attempts_left == 0 {
            RetryState::Exhausted
        } else {
            debug!(
                "{} conditionals pending, {} attempts left",
                self.pending.len(),
                self.attempts_left
            );
            RetryState::Running
        }
    }

    /// Original expression text of every still-pending conditional.
    pub fn failed_conditions(&self) -> Vec<String> {
        self.pending
            .iter()
            .map(|conditional| conditional.raw.clone())
            .collect()
    }
}

/// Executes command batches over one transport.
pub struct BatchRunner {
    transport: DeviceTransport,
}

impl BatchRunner {
    /// Wraps a constructed transport.
    pub fn new(transport: DeviceTransport) -> Self {
        Self { transport }
    }

    /// Runs validated descriptors once, in order.
    pub async fn run(
        &mut self,
        commands: &[CommandDescriptor],
        check_errors: bool,
    ) -> Result<Vec<Response>, CommandError> {
        self.transport.run(commands, check_errors).await
    }

    /// Runs a full batch request: validation, retry loop, report.
    ///
    /// Malformed commands and unparsable conditionals fail here, before any
    /// transport call. On exhaustion the error lists the unsatisfied
    /// conditionals by their original text; on success the report carries
    /// the final iteration's responses.
    pub async fn run_batch(&mut self, request: &BatchRequest) -> Result<BatchReport, CommandError> {
        let mut warnings = Vec::new();
        let commands = parse_commands(&request.commands, request.check_mode, &mut warnings)?;

        let conditionals = request
            .wait_for
            .iter()
            .map(|expression| Conditional::parse(expression))
            .collect::<Result<Vec<_>, _>>()?;

        let mut controller = RetryController::new(conditionals, &request.retry);
        let interval = Duration::from_secs(request.retry.interval);

        let responses = loop {
            let responses = self.run(&commands, request.check_errors).await?;

            match controller.observe(&responses) {
                RetryState::Satisfied => break responses,
                RetryState::Exhausted => {
                    return Err(CommandError::UnsatisfiedConditions(
                        controller.failed_conditions(),
                    ));
                }
                RetryState::Running => tokio::time::sleep(interval).await,
            }
        };

        Ok(BatchReport {
            changed: false,
            stdout_lines: to_lines(&responses),
            stdout: responses,
            warnings,
        })
    }
}
