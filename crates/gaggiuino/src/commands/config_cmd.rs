//! Config subcommand handlers.

use gaggiuino_config::{
    Config, Machine, config_path, load_config, machine_to_coordinator_config, save_config,
};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::available_machines;
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init { host, name, force } => {
            let path = config_path();
            if path.exists() && !force {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!(
                        "{} already exists; use --force to overwrite",
                        path.display()
                    ),
                });
            }

            let mut cfg = Config::default();
            let machine = checked_machine(Machine::new(host), &cfg)?;
            cfg.upsert_machine(&name, machine);
            save_config(&cfg)?;

            if !global.quiet {
                eprintln!("✓ Configuration written to {}", path.display());
                eprintln!("  Default machine: {name}");
                eprintln!("  Test it: gaggiuino status");
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = load_config()?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("<unrenderable: {e}>")),
                |c| c.machines.keys().cloned().collect::<Vec<_>>().join("\n"),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Add <name> <host> ───────────────────────────────────────
        ConfigCommand::Add {
            name,
            host,
            timeout,
            poll_interval,
        } => {
            let mut cfg = load_config()?;
            let machine = checked_machine(
                Machine {
                    timeout,
                    poll_interval,
                    ..Machine::new(host)
                },
                &cfg,
            )?;
            cfg.upsert_machine(&name, machine);
            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Machine '{name}' saved");
            }
            Ok(())
        }

        // ── Remove <name> ───────────────────────────────────────────
        ConfigCommand::Remove { name } => {
            let mut cfg = load_config()?;
            cfg.remove_machine(&name).map_err(|_| not_found(&name, &cfg))?;
            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Machine '{name}' removed");
            }
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = load_config()?;
            cfg.set_default(&name).map_err(|_| not_found(&name, &cfg))?;
            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default machine set to '{name}'");
            }
            Ok(())
        }
    }
}

/// Reject hosts that can't be turned into a coordinator config.
fn checked_machine(machine: Machine, cfg: &Config) -> Result<Machine, CliError> {
    machine_to_coordinator_config(&machine, &cfg.defaults)?;
    Ok(machine)
}

fn not_found(name: &str, cfg: &Config) -> CliError {
    CliError::MachineNotFound {
        name: name.into(),
        available: available_machines(cfg),
    }
}
