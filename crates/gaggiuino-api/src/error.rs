use thiserror::Error;

/// Top-level error type for the `gaggiuino-api` crate.
///
/// Connectivity failures are split out into [`Timeout`](Self::Timeout) and
/// [`Connection`](Self::Connection) so that `gaggiuino-core` can keep its
/// cached snapshot across brief network blips. Everything else is treated
/// as an unexpected failure.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connectivity ────────────────────────────────────────────────
    /// The request did not complete within the transport timeout.
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Connection refused, DNS failure, host unreachable, reset mid-request.
    #[error("Cannot connect to {url}: {reason}")]
    Connection { url: String, reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Any other HTTP transport error (redirect loop, request builder).
    #[error("HTTP transport error: {0}")]
    Transport(reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup error while building the HTTP client.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Device API ──────────────────────────────────────────────────
    /// Non-success HTTP status from the controller.
    #[error("Device API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Endpoint does not exist on this firmware.
    #[error("Endpoint not found: {url}")]
    NotFound { url: String },

    /// The controller answered with an empty array where one record was expected.
    #[error("Empty response from {endpoint}")]
    EmptyResponse { endpoint: &'static str },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map_or_else(|| "<unknown>".to_owned(), ToString::to_string);
        if err.is_timeout() {
            Self::Timeout { url }
        } else if err.is_connect() || is_connection_drop(&err) {
            Self::Connection {
                url,
                reason: err.to_string(),
            }
        } else {
            Self::Transport(err)
        }
    }
}

/// Socket closed or reset after connecting: no HTTP status was received,
/// or the body stopped short. Bodies are read as text, so a reqwest decode
/// error can only come from the transfer itself.
fn is_connection_drop(err: &reqwest::Error) -> bool {
    if err.status().is_some() || err.is_builder() || err.is_redirect() {
        return false;
    }
    err.is_request() || err.is_body() || err.is_decode() || has_io_source(err)
}

fn has_io_source(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = err.source();
    while let Some(e) = source {
        if e.is::<std::io::Error>() {
            return true;
        }
        source = e.source();
    }
    false
}

impl Error {
    /// Returns `true` for timeouts and connection failures.
    ///
    /// These never invalidate data fetched earlier; the next poll retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connection { .. })
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if the endpoint answered 404.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::Api { status: 404, .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// HTTP status code, if the error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
