// ── Host validation ──
//
// Checks a user-supplied host before an entry is created by fetching the
// profile list once.

use gaggiuino_api::{GaggiuinoClient, Profile, TransportConfig};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::registry::entry_title;

#[derive(Debug, Error)]
pub enum ValidationError {
    /// The machine could not be reached or answered with an HTTP error.
    #[error("Cannot connect to {host}: {reason}")]
    CannotConnect { host: String, reason: String },

    /// Anything else: malformed host, unreadable response.
    #[error("Unexpected error validating {host}: {reason}")]
    Unknown { host: String, reason: String },
}

/// A host that answered the profile list request.
#[derive(Debug, Clone)]
pub struct ValidatedHost {
    /// Entry title, `"gaggiuino (<host>)"` with the host as entered.
    pub title: String,
    /// Host to persist, as entered (trimmed).
    pub host: String,
    pub base_url: Url,
    pub profiles: Vec<Profile>,
}

/// Probe `host` by listing its profiles.
pub async fn validate_host(
    host: &str,
    transport: &TransportConfig,
) -> Result<ValidatedHost, ValidationError> {
    let host = host.trim();
    debug!(%host, "validating host");

    let client = GaggiuinoClient::new(host, transport).map_err(|e| ValidationError::Unknown {
        host: host.to_owned(),
        reason: e.to_string(),
    })?;

    let profiles = client.get_profiles().await.map_err(|e| {
        warn!(%host, error = %e, "host validation failed");
        classify(host, &e)
    })?;

    Ok(ValidatedHost {
        title: entry_title(host),
        host: host.to_owned(),
        base_url: client.base_url().clone(),
        profiles,
    })
}

fn classify(host: &str, err: &gaggiuino_api::Error) -> ValidationError {
    use gaggiuino_api::Error as E;
    let host = host.to_owned();
    let reason = err.to_string();
    match err {
        E::Timeout { .. }
        | E::Connection { .. }
        | E::Transport(_)
        | E::Api { .. }
        | E::NotFound { .. } => ValidationError::CannotConnect { host, reason },
        E::InvalidUrl(_) | E::Tls(_) | E::EmptyResponse { .. } | E::Deserialization { .. } => {
            ValidationError::Unknown { host, reason }
        }
    }
}
