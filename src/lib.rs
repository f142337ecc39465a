//! # roscmd - RouterOS Command Automation
//!
//! `roscmd` is a Rust library for running command batches against MikroTik
//! RouterOS devices and waiting for their state to converge. It normalizes
//! two very different device-access protocols (the interactive terminal
//! session and the typed binary API) into one command-execution contract,
//! translates human-typed CLI commands into the structured form the API
//! requires, and polls user-supplied conditionals against command output
//! with bounded retries.
//!
//! ## Features
//!
//! - **Dual Transports**: terminal session and typed API behind one
//!   contract; both produce identically shaped JSON responses
//! - **Command Translation**: CLI strings become API path/verb/attribute
//!   sentences, including ambiguous verb boundary detection
//! - **Wait-For Polling**: `result[0].name == router`-style conditionals
//!   with `all`/`any` matching, bounded retries and inter-attempt delay
//! - **Check Mode**: dry runs dispatch only read-only commands and record
//!   a warning for everything skipped
//! - **Async/Await**: built on Tokio; execution is strictly sequential,
//!   one command in flight at a time
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roscmd::runner::{BatchRequest, BatchRunner};
//! use roscmd::transport::{DeviceTransport, SessionReply, TerminalSession};
//! use roscmd::command::CommandDescriptor;
//! use roscmd::error::CommandError;
//!
//! // The terminal session collaborator is supplied by your connection
//! // layer; see `roscmd::terminal` for the RouterOS prompt patterns.
//! struct MySession;
//!
//! #[async_trait::async_trait]
//! impl TerminalSession for MySession {
//!     async fn execute(
//!         &mut self,
//!         descriptor: &CommandDescriptor,
//!     ) -> Result<SessionReply, CommandError> {
//!         // ... send descriptor.command over the wire ...
//!         Ok(SessionReply::default())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), CommandError> {
//!     let transport = DeviceTransport::cli(Box::new(MySession));
//!     let mut runner = BatchRunner::new(transport);
//!
//!     let mut request = BatchRequest::new(vec!["/ip neighbor print".into()]);
//!     request.wait_for = vec!["result[0] contains ether1".to_string()];
//!
//!     let report = runner.run_batch(&request).await?;
//!     println!("{:?}", report.stdout);
//!     Ok(())
//! }
//! ```
//!
//! ## Main Components
//!
//! - [`runner::BatchRunner`] - batch execution and the wait-for retry loop
//! - [`transport::DeviceTransport`] - CLI/API transport selection
//! - [`translate::translate`] - CLI command string to structured API form
//! - [`conditional::Conditional`] - wait-for expression parse and evaluate
//! - [`terminal`] - RouterOS prompt and error-line patterns
//! - [`error::CommandError`] - error types for batch operations

pub mod command;
pub mod conditional;
pub mod config;
pub mod error;
pub mod runner;
pub mod terminal;
pub mod translate;
pub mod transport;
