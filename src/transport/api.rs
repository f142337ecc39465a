//! Typed-API transport.
//!
//! Commands are translated into [`StructuredCommand`] form and issued over
//! an [`ApiConnection`]. The connection is established once, lazily, on the
//! first command and reused for every subsequent one: a single shared
//! connection, not one per batch. Library-level call errors are captured as
//! a failed [`SessionReply`] so the caller-facing behavior matches the CLI
//! transport exactly.

use async_trait::async_trait;
use log::{debug, trace};
use serde_json::Value;
use thiserror::Error;

use crate::command::CommandDescriptor;
use crate::config::{ConnectOptions, TransportKind};
use crate::error::CommandError;
use crate::translate::{StructuredCommand, translate};
use crate::transport::SessionReply;

/// Error raised by a typed API call.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ApiCallError(pub String);

/// Contract of an established typed API connection.
#[async_trait]
pub trait ApiConnection: Send {
    /// Issues one structured command and returns the typed result as JSON.
    async fn call(&mut self, command: &StructuredCommand) -> Result<Value, ApiCallError>;
}

/// Factory for [`ApiConnection`]s.
///
/// Connection setup happens exactly once per transport; failures here are
/// fatal and abort the batch before any command executes.
#[async_trait]
pub trait ApiConnector: Send {
    /// Opens a connection to the device described by `options`.
    async fn connect(
        &self,
        options: &ConnectOptions,
    ) -> Result<Box<dyn ApiConnection>, CommandError>;
}

/// Transport over the typed API.
pub struct ApiTransport {
    connector: Box<dyn ApiConnector>,
    options: ConnectOptions,
    connection: Option<Box<dyn ApiConnection>>,
}

impl ApiTransport {
    /// Wraps a connector; nothing is connected until the first command.
    pub fn new(connector: Box<dyn ApiConnector>, options: ConnectOptions) -> Self {
        Self {
            connector,
            options,
            connection: None,
        }
    }

    async fn connection(&mut self) -> Result<&mut Box<dyn ApiConnection>, CommandError> {
        if self.connection.is_none() {
            debug!(
                "establishing api connection to {}:{}",
                self.options.host,
                self.options.effective_port(TransportKind::Api)
            );
            let connection = self.connector.connect(&self.options).await?;
            self.connection = Some(connection);
        }

        self.connection
            .as_mut()
            .ok_or_else(|| CommandError::Session("api connection unavailable".to_string()))
    }

    pub(crate) async fn execute(
        &mut self,
        descriptor: &CommandDescriptor,
    ) -> Result<SessionReply, CommandError> {
        let structured = translate(&descriptor.command)?;
        trace!("api call {}", structured.command_word());

        let connection = self.connection().await?;
        let reply = match connection.call(&structured).await {
            Ok(value) => SessionReply {
                status: 0,
                stdout: value.to_string(),
                stderr: String::new(),
            },
            Err(err) => SessionReply {
                status: 1,
                stdout: String::new(),
                stderr: err.to_string(),
            },
        };

        Ok(reply)
    }
}
