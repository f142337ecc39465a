//! Terminal-session transport.
//!
//! The external collaborator owns prompt detection, login handling and the
//! byte transport itself (see [`crate::terminal`] for the RouterOS
//! recognition patterns it needs); this side only consumes its
//! command-execution contract.

use async_trait::async_trait;

use crate::command::CommandDescriptor;
use crate::error::CommandError;
use crate::transport::SessionReply;

/// Contract of the external line-oriented session.
///
/// One call is one device round trip. Implementations receive the full
/// descriptor so they can honor `prompt`/`answer` interaction hints and the
/// requested output format.
#[async_trait]
pub trait TerminalSession: Send {
    /// Sends the command and returns its status and captured output.
    async fn execute(
        &mut self,
        descriptor: &CommandDescriptor,
    ) -> Result<SessionReply, CommandError>;
}

/// Transport over a [`TerminalSession`].
pub struct CliTransport {
    session: Box<dyn TerminalSession>,
}

impl CliTransport {
    /// Wraps an established session.
    pub fn new(session: Box<dyn TerminalSession>) -> Self {
        Self { session }
    }

    pub(crate) async fn execute(
        &mut self,
        descriptor: &CommandDescriptor,
    ) -> Result<SessionReply, CommandError> {
        self.session.execute(descriptor).await
    }
}
