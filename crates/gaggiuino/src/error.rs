//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError`, `ValidationError` and `ConfigError` into user-facing
//! errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use gaggiuino_config::ConfigError;
use gaggiuino_core::{CoreError, ValidationError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Gaggiuino at {url}")]
    #[diagnostic(
        code(gaggiuino::connection_failed),
        help(
            "Check that the machine is powered on and reachable.\n\
             {reason}\n\
             Try: gaggiuino validate {url}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(gaggiuino::timeout),
        help("Increase the timeout with --timeout or check the machine's Wi-Fi signal.")
    )]
    Timeout { url: String },

    #[error("Gaggiuino at {url} is unhealthy")]
    #[diagnostic(code(gaggiuino::unhealthy))]
    Unhealthy { url: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(gaggiuino::not_found),
        help("Run: gaggiuino {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Device ───────────────────────────────────────────────────────
    #[error("The machine rejected the {operation}")]
    #[diagnostic(
        code(gaggiuino::rejected),
        help("The controller answered with a client error; check the value and firmware version.")
    )]
    Rejected { operation: String },

    #[error("{what} is not available yet")]
    #[diagnostic(
        code(gaggiuino::unavailable),
        help("The machine has not reported this settings group. Check its firmware version.")
    )]
    Unavailable { what: String },

    #[error("Device error: {message}")]
    #[diagnostic(code(gaggiuino::device))]
    Device { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(gaggiuino::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Machine '{name}' not found in configuration")]
    #[diagnostic(
        code(gaggiuino::machine_not_found),
        help(
            "Available machines: {available}\n\
             Add one with: gaggiuino config add <NAME> <HOST>"
        )
    )]
    MachineNotFound { name: String, available: String },

    #[error("No machine configured")]
    #[diagnostic(
        code(gaggiuino::no_config),
        help(
            "Create a config with: gaggiuino config init --host <HOST>\n\
             Or pass --host. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(gaggiuino::config))]
    Config(ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(gaggiuino::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Unhealthy { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::MachineNotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::NotReady { host, reason } => Self::ConnectionFailed { url: host, reason },
            CoreError::Timeout { url } => Self::Timeout { url },
            CoreError::Validation { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Config { message } => Self::Validation {
                field: "host".into(),
                reason: message,
            },
            CoreError::EntryNotFound { id } => Self::NotFound {
                resource_type: "entry".into(),
                identifier: id,
                list_command: "config show".into(),
            },
            other @ (CoreError::UpdateFailed { .. } | CoreError::Stopped | CoreError::Api { .. }) => {
                Self::Device {
                    message: other.to_string(),
                }
            }
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::CannotConnect { host, reason } => Self::ConnectionFailed {
                url: host,
                reason,
            },
            ValidationError::Unknown { host, reason } => Self::Validation {
                field: "host".into(),
                reason: format!("{host}: {reason}"),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}
