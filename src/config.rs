//! Connection and retry configuration for RouterOS transports.
//!
//! This module contains the parameter types shared by both transports:
//! which transport to use, how to reach the device, and how the wait-for
//! retry loop is bounded. Defaults follow the original tool: transport
//! `cli`, ten retries, one second between attempts, `all` match policy.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default CLI (terminal session) port.
pub const DEFAULT_CLI_PORT: u16 = 22;

/// Default API port without TLS.
pub const DEFAULT_API_PORT: u16 = 8728;

/// Default API port with TLS.
pub const DEFAULT_API_TLS_PORT: u16 = 8729;

/// Which device-access protocol to use for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Line-oriented terminal session (default).
    #[default]
    Cli,
    /// Structured typed API protocol.
    Api,
}

/// Policy for combining multiple wait-for conditionals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every conditional must hold (default).
    #[default]
    All,
    /// At least one conditional must hold.
    Any,
}

/// Parameters for reaching the device.
///
/// The low-level session establishment itself is performed by the external
/// collaborators; these options are handed to them once, at first use, and
/// the established connection is reused for all subsequent commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConnectOptions {
    /// Device hostname or address.
    pub host: String,

    /// Explicit port. When absent, the transport default applies
    /// (22 for CLI, 8728 for API, 8729 for API over TLS).
    #[serde(default)]
    pub port: Option<u16>,

    /// Login username.
    pub username: String,

    /// Login password, if password authentication is used.
    #[serde(default)]
    pub password: Option<String>,

    /// Path to an SSH private key, if key authentication is used.
    #[serde(default)]
    pub ssh_keyfile: Option<String>,

    /// Wrap the API connection in TLS.
    #[serde(default)]
    pub use_tls: bool,

    /// Per-call timeout in seconds, enforced by the collaborator layer.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_timeout() -> u64 {
    10
}

impl ConnectOptions {
    /// Creates options for `host` and `username` with defaults elsewhere.
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            username: username.into(),
            password: None,
            ssh_keyfile: None,
            use_tls: false,
            timeout: default_timeout(),
        }
    }

    /// The port to connect to, applying the per-transport default.
    pub fn effective_port(&self, kind: TransportKind) -> u16 {
        if let Some(port) = self.port {
            return port;
        }
        match kind {
            TransportKind::Cli => DEFAULT_CLI_PORT,
            TransportKind::Api if self.use_tls => DEFAULT_API_TLS_PORT,
            TransportKind::Api => DEFAULT_API_PORT,
        }
    }
}

/// Bounds for the wait-for retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RetryPolicy {
    /// Number of attempts before the batch is considered failed.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Seconds to wait between attempts.
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// How conditionals are combined.
    #[serde(default)]
    pub match_mode: MatchMode,
}

fn default_retries() -> u32 {
    10
}

fn default_interval() -> u64 {
    1
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            interval: default_interval(),
            match_mode: MatchMode::All,
        }
    }
}
