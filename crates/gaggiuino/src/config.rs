//! Resolution of the active machine from CLI flags and the config file.
//!
//! Flags win over the file: `--host` replaces the machine's host,
//! `--timeout` and `--insecure` override per-machine and global defaults.

use std::time::Duration;

use gaggiuino_config::{Config, Machine, config_path, machine_to_coordinator_config};
use gaggiuino_core::CoordinatorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active machine name from CLI flags and config.
pub fn active_machine_name(global: &GlobalOpts, config: &Config) -> Option<String> {
    global
        .machine
        .clone()
        .or_else(|| config.default_machine.clone())
}

/// The machine to talk to, with flag overrides applied.
///
/// `--machine` picks a configured machine; a bare `--host` needs no config
/// at all; otherwise the config's default machine is used.
pub fn resolve_machine(global: &GlobalOpts, config: &Config) -> Result<Machine, CliError> {
    let lookup = |name: &str| {
        config
            .machines
            .get(name)
            .cloned()
            .ok_or_else(|| CliError::MachineNotFound {
                name: name.into(),
                available: available_machines(config),
            })
    };

    let mut machine = if let Some(name) = &global.machine {
        lookup(name)?
    } else if global.host.is_some() {
        Machine::new("")
    } else if let Some(name) = active_machine_name(global, config) {
        lookup(&name)?
    } else {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    };

    if let Some(host) = &global.host {
        machine.host.clone_from(host);
    }
    if let Some(timeout) = global.timeout {
        machine.timeout = Some(timeout);
    }
    if global.insecure {
        machine.insecure = Some(true);
    }
    Ok(machine)
}

/// Build a `CoordinatorConfig` from the config file, machine, and CLI overrides.
pub fn build_coordinator_config(
    global: &GlobalOpts,
    config: &Config,
) -> Result<CoordinatorConfig, CliError> {
    let machine = resolve_machine(global, config)?;
    Ok(machine_to_coordinator_config(&machine, &config.defaults)?)
}

/// Apply a `--interval` override.
pub fn with_poll_interval(cfg: CoordinatorConfig, secs: Option<u64>) -> CoordinatorConfig {
    match secs {
        Some(secs) => cfg.with_poll_interval(Duration::from_secs(secs)),
        None => cfg,
    }
}

pub fn available_machines(config: &Config) -> String {
    if config.machines.is_empty() {
        return "(none)".into();
    }
    config
        .machines
        .keys()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
