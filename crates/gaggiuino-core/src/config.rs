// ── Runtime coordinator configuration ──
//
// Describes how to reach one machine and how the coordinator behaves.
// Never touches disk: the CLI (via gaggiuino-config) builds a
// `CoordinatorConfig` and hands it in.

use std::time::Duration;

use gaggiuino_api::{TransportConfig, normalize_base_url};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;

/// Default polling cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// What a profile-selection write does when the request times out.
///
/// The controller often applies the selection even though the HTTP
/// response never arrives, so a timeout is ambiguous.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WriteTimeoutPolicy {
    /// Log the timeout and report [`WriteOutcome::Unconfirmed`](crate::WriteOutcome::Unconfirmed).
    #[default]
    Ignore,
    /// Surface the timeout as [`CoreError::UpdateFailed`].
    Fail,
}

/// How profiles are presented as select options.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ProfileNaming {
    /// `"Lungo"`. Duplicate names become ambiguous.
    NameOnly,
    /// `"Lungo (ID: 2)"`. Always unique.
    #[default]
    NameWithId,
}

/// Configuration for a single machine's coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Controller base URL (e.g. `http://gaggiuino.local/`).
    pub host: Url,
    /// Per-request timeout and TLS handling.
    pub transport: TransportConfig,
    /// Background poll cadence. Zero disables background polling.
    pub poll_interval: Duration,
    pub write_timeout: WriteTimeoutPolicy,
    pub profile_naming: ProfileNaming,
}

impl CoordinatorConfig {
    /// Config for `host` with default timings.
    ///
    /// Bare hostnames are accepted and get an `http://` scheme.
    pub fn new(host: &str) -> Result<Self, CoreError> {
        let host = normalize_base_url(host).map_err(|e| CoreError::Config {
            message: format!("invalid host '{host}': {e}"),
        })?;
        Ok(Self {
            host,
            transport: TransportConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            write_timeout: WriteTimeoutPolicy::default(),
            profile_naming: ProfileNaming::default(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_write_timeout(mut self, policy: WriteTimeoutPolicy) -> Self {
        self.write_timeout = policy;
        self
    }

    pub fn with_profile_naming(mut self, naming: ProfileNaming) -> Self {
        self.profile_naming = naming;
        self
    }
}
