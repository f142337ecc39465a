//! Device transports and response normalization.
//!
//! Two very different device-access protocols are normalized here into one
//! command-execution contract: the line-oriented terminal session and the
//! typed API. Both produce a [`SessionReply`] per command; the shared batch
//! loop applies fail-fast error checking and decodes every reply into a
//! uniform JSON [`Response`], so callers never see which transport ran.
//!
//! # Main Components
//!
//! - [`DeviceTransport`] - tagged variant over both transports, selected at
//!   construction time
//! - [`cli::CliTransport`] / [`cli::TerminalSession`] - terminal path
//! - [`api::ApiTransport`] / [`api::ApiConnector`] - typed API path
//! - [`normalize_output`] - JSON-decode-with-text-fallback rule

use log::{debug, trace};
use serde_json::Value;

use crate::command::CommandDescriptor;
use crate::config::{ConnectOptions, TransportKind};
use crate::error::CommandError;

pub mod api;
pub mod cli;

pub use api::{ApiConnection, ApiConnector, ApiTransport};
pub use cli::{CliTransport, TerminalSession};

/// The decoded device reply for one command.
pub type Response = Value;

/// Raw result of one command execution, before normalization.
///
/// Shared by both transports: the terminal session reports it directly,
/// the API transport synthesizes it from the typed call result.
#[derive(Debug, Clone, Default)]
pub struct SessionReply {
    /// Zero on success, non-zero when the device reported an error.
    pub status: i32,
    /// Captured standard output, or serialized API result.
    pub stdout: String,
    /// Device error text, when `status` is non-zero.
    pub stderr: String,
}

/// Applies the uniform output rule: text that parses as JSON becomes the
/// decoded structure, anything else becomes the trimmed raw string.
pub fn normalize_output(text: &str) -> Response {
    let trimmed = text.trim();
    match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => Value::String(trimmed.to_string()),
    }
}

/// A device transport selected at construction time.
///
/// Both variants satisfy the same contract; substituting one for the other
/// changes how commands reach the device, never what callers observe.
pub enum DeviceTransport {
    /// Commands go through a line-oriented terminal session.
    Cli(CliTransport),
    /// Commands are translated and issued over the typed API.
    Api(ApiTransport),
}

impl DeviceTransport {
    /// Wraps an established terminal session.
    pub fn cli(session: Box<dyn TerminalSession>) -> Self {
        Self::Cli(CliTransport::new(session))
    }

    /// Wraps an API connector; the connection is established lazily on
    /// first use and reused afterwards.
    pub fn api(connector: Box<dyn ApiConnector>, options: ConnectOptions) -> Self {
        Self::Api(ApiTransport::new(connector, options))
    }

    /// Builds the transport `kind` from whichever collaborators are at hand.
    ///
    /// Fails with [`CommandError::TransportUnavailable`] when the selected
    /// kind's collaborator is missing, before any command executes.
    pub fn build(
        kind: TransportKind,
        terminal: Option<Box<dyn TerminalSession>>,
        connector: Option<Box<dyn ApiConnector>>,
        options: ConnectOptions,
    ) -> Result<Self, CommandError> {
        match kind {
            TransportKind::Cli => terminal.map(Self::cli).ok_or_else(|| {
                CommandError::TransportUnavailable(
                    "cli transport selected but no terminal session was supplied".to_string(),
                )
            }),
            TransportKind::Api => connector
                .map(|connector| Self::api(connector, options))
                .ok_or_else(|| {
                    CommandError::TransportUnavailable(
                        "api transport selected but no api connector was supplied".to_string(),
                    )
                }),
        }
    }

    /// Executes `commands` in order, collecting one [`Response`] each.
    ///
    /// With `check_errors` (the default elsewhere), the first command whose
    /// reply carries a non-zero status aborts the remaining batch with
    /// [`CommandError::DeviceExecution`]. With it off, failures fall through
    /// to the normal response fallback. Dispatch is strictly sequential; one
    /// command is in flight at a time.
    pub async fn run(
        &mut self,
        commands: &[CommandDescriptor],
        check_errors: bool,
    ) -> Result<Vec<Response>, CommandError> {
        let mut responses = Vec::with_capacity(commands.len());

        for descriptor in commands {
            trace!("dispatching `{}`", descriptor.command);
            let reply = match self {
                Self::Cli(transport) => transport.execute(descriptor).await?,
                Self::Api(transport) => transport.execute(descriptor).await?,
            };

            if reply.status != 0 {
                let message = if reply.stderr.is_empty() {
                    reply.stdout.trim().to_string()
                } else {
                    reply.stderr.trim().to_string()
                };
                if check_errors {
                    return Err(CommandError::DeviceExecution {
                        command: descriptor.command.clone(),
                        message,
                    });
                }
                debug!(
                    "command `{}` failed with status {}, continuing: {}",
                    descriptor.command, reply.status, message
                );
            }

            responses.push(normalize_output(&reply.stdout));
        }

        Ok(responses)
    }
}
