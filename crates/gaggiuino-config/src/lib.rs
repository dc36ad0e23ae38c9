//! Configuration for the Gaggiuino CLI.
//!
//! A TOML file of named machines (the only thing persisted per machine is
//! its host), global defaults, and translation to
//! `gaggiuino_core::CoordinatorConfig`. The CLI layers its own flag
//! overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gaggiuino_core::{
    CoordinatorConfig, DEFAULT_POLL_INTERVAL, ProfileNaming, TlsMode, WriteTimeoutPolicy,
};

/// Environment variable prefix, e.g. `GAGGIUINO_DEFAULTS__TIMEOUT=5`.
pub const ENV_PREFIX: &str = "GAGGIUINO_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no machine named '{name}' in config")]
    UnknownMachine { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Machine used when none is named on the command line.
    pub default_machine: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named machines.
    #[serde(default)]
    pub machines: BTreeMap<String, Machine>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_machine: None,
            defaults: Defaults::default(),
            machines: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn machine(&self, name: &str) -> Result<&Machine, ConfigError> {
        self.machines
            .get(name)
            .ok_or_else(|| ConfigError::UnknownMachine { name: name.into() })
    }

    /// Add or replace a machine. The first machine added becomes the default.
    pub fn upsert_machine(&mut self, name: &str, machine: Machine) {
        if self.machines.is_empty()
            || self
                .default_machine
                .as_deref()
                .is_none_or(|d| !self.machines.contains_key(d))
        {
            self.default_machine = Some(name.into());
        }
        self.machines.insert(name.into(), machine);
    }

    /// Remove a machine, clearing the default if it pointed there.
    pub fn remove_machine(&mut self, name: &str) -> Result<Machine, ConfigError> {
        let removed = self
            .machines
            .remove(name)
            .ok_or_else(|| ConfigError::UnknownMachine { name: name.into() })?;
        if self.default_machine.as_deref() == Some(name) {
            self.default_machine = self.machines.keys().next().cloned();
        }
        Ok(removed)
    }

    pub fn set_default(&mut self, name: &str) -> Result<(), ConfigError> {
        self.machine(name)?;
        self.default_machine = Some(name.into());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Poll cadence for `watch`, seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    #[serde(default)]
    pub write_timeout: WriteTimeoutPolicy,

    #[serde(default)]
    pub profile_naming: ProfileNaming,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
            write_timeout: WriteTimeoutPolicy::default(),
            profile_naming: ProfileNaming::default(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

/// A configured machine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Machine {
    /// Host or base URL (e.g. "http://gaggiuino.local").
    pub host: String,

    /// Accept invalid TLS certificates (reverse proxies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override the request timeout, seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Override the poll cadence, seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<u64>,
}

impl Machine {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            insecure: None,
            timeout: None,
            poll_interval: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "gaggiuino", "gaggiuino").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("gaggiuino");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file + environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `CoordinatorConfig` for a machine, applying global defaults
/// where the machine has no override.
pub fn machine_to_coordinator_config(
    machine: &Machine,
    defaults: &Defaults,
) -> Result<CoordinatorConfig, ConfigError> {
    let mut cfg = CoordinatorConfig::new(&machine.host).map_err(|e| ConfigError::Validation {
        field: "host".into(),
        reason: e.to_string(),
    })?;

    let timeout = machine.timeout.unwrap_or(defaults.timeout);
    if timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    cfg.transport.timeout = Duration::from_secs(timeout);
    if machine.insecure.unwrap_or(defaults.insecure) {
        cfg.transport.tls = TlsMode::DangerAcceptInvalid;
    }
    cfg.poll_interval =
        Duration::from_secs(machine.poll_interval.unwrap_or(defaults.poll_interval));
    cfg.write_timeout = defaults.write_timeout;
    cfg.profile_naming = defaults.profile_naming;
    Ok(cfg)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.defaults.timeout, 10);
        assert_eq!(cfg.defaults.poll_interval, 30);
        assert!(cfg.machines.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.upsert_machine("kitchen", Machine::new("http://gaggiuino.local"));
        let mut office = Machine::new("192.168.1.50");
        office.timeout = Some(3);
        cfg.upsert_machine("office", office);
        cfg.defaults.write_timeout = WriteTimeoutPolicy::Fail;
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.default_machine.as_deref(), Some("kitchen"));
    }

    #[test]
    fn reads_hand_written_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_machine = "bar"

[defaults]
profile_naming = "name-only"

[machines.bar]
host = "espresso.lan:8080"
insecure = true
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.defaults.profile_naming, ProfileNaming::NameOnly);
        let bar = cfg.machine("bar").unwrap();
        let coord = machine_to_coordinator_config(bar, &cfg.defaults).unwrap();
        assert_eq!(coord.host.as_str(), "http://espresso.lan:8080/");
        assert_eq!(coord.transport.tls, TlsMode::DangerAcceptInvalid);
        assert_eq!(coord.profile_naming, ProfileNaming::NameOnly);
    }

    #[test]
    fn removing_default_machine_promotes_another() {
        let mut cfg = Config::default();
        cfg.upsert_machine("a", Machine::new("a.local"));
        cfg.upsert_machine("b", Machine::new("b.local"));
        assert_eq!(cfg.default_machine.as_deref(), Some("a"));

        cfg.remove_machine("a").unwrap();
        assert_eq!(cfg.default_machine.as_deref(), Some("b"));
        assert!(matches!(
            cfg.remove_machine("a"),
            Err(ConfigError::UnknownMachine { .. })
        ));
        assert!(cfg.set_default("zzz").is_err());
    }

    #[test]
    fn machine_overrides_beat_defaults() {
        let defaults = Defaults::default();
        let mut m = Machine::new("gaggiuino.local");
        m.poll_interval = Some(5);
        let cfg = machine_to_coordinator_config(&m, &defaults).unwrap();
        assert_eq!(cfg.poll_interval, Duration::from_secs(5));
        assert_eq!(cfg.transport.timeout, Duration::from_secs(10));

        m.timeout = Some(0);
        assert!(machine_to_coordinator_config(&m, &defaults).is_err());
        assert!(machine_to_coordinator_config(&Machine::new("http://"), &defaults).is_err());
    }
}
