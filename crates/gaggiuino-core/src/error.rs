// ── Core error types ──
//
// Errors surfaced by the coordinator and the integration registry.
// `From<gaggiuino_api::Error>` keeps the transient/other split visible so
// callers can still tell a flaky network apart from a broken device.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lifecycle ────────────────────────────────────────────────────
    /// The first refresh of a new coordinator failed; the entry should be
    /// retried later rather than set up with empty data.
    #[error("Gaggiuino at {host} is not ready: {reason}")]
    NotReady { host: String, reason: String },

    /// A refresh or write failed for a reason other than a network blip.
    #[error("Update failed: {message}")]
    UpdateFailed { message: String },

    /// The coordinator has been shut down.
    #[error("Coordinator is stopped")]
    Stopped,

    // ── Connectivity ─────────────────────────────────────────────────
    #[error("Cannot connect to Gaggiuino at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    // ── Local checks ─────────────────────────────────────────────────
    /// Rejected locally before any request was sent.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Entry not found: {id}")]
    EntryNotFound { id: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Device API (wrapped) ─────────────────────────────────────────
    #[error("Device API error: {message}")]
    Api { message: String, status: Option<u16> },
}

impl CoreError {
    /// True for errors that a later retry can plausibly fix.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::NotReady { .. }
        )
    }

    pub(crate) fn update_failed(err: &impl std::fmt::Display) -> Self {
        Self::UpdateFailed {
            message: err.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<gaggiuino_api::Error> for CoreError {
    fn from(err: gaggiuino_api::Error) -> Self {
        use gaggiuino_api::Error as E;
        match err {
            E::Timeout { url } => Self::Timeout { url },
            E::Connection { url, reason } => Self::ConnectionFailed { url, reason },
            E::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            E::Tls(message) => Self::Config { message },
            other => Self::Api {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}
