//! Validate command handler.

use std::time::Duration;

use serde::Serialize;

use gaggiuino_config::{Machine, load_config, save_config};
use gaggiuino_core::{TlsMode, TransportConfig, validate_host};

use crate::cli::{GlobalOpts, ValidateArgs};
use crate::config::resolve_machine;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ValidationView {
    title: String,
    host: String,
    base_url: String,
    profiles: usize,
}

pub async fn handle(args: ValidateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = load_config()?;

    let host = match args.host {
        Some(host) => host,
        None => resolve_machine(global, &cfg)?.host,
    };

    let mut transport = TransportConfig::with_timeout(Duration::from_secs(
        global.timeout.unwrap_or(cfg.defaults.timeout),
    ));
    if global.insecure {
        transport.tls = TlsMode::DangerAcceptInvalid;
    }

    let validated = validate_host(&host, &transport).await?;
    let view = ValidationView {
        title: validated.title.clone(),
        host: validated.host.clone(),
        base_url: validated.base_url.to_string(),
        profiles: validated.profiles.len(),
    };
    let out = output::render_single(
        &global.output,
        &view,
        |v| {
            output::render_detail(&[
                ("Title", v.title.clone()),
                ("URL", v.base_url.clone()),
                ("Profiles", v.profiles.to_string()),
            ])
        },
        |v| v.base_url.clone(),
    )?;
    output::print_output(&out, global.quiet);

    if let Some(name) = args.save {
        let mut machine = Machine::new(validated.host);
        if global.insecure {
            machine.insecure = Some(true);
        }
        cfg.upsert_machine(&name, machine);
        save_config(&cfg)?;
        if !global.quiet {
            eprintln!("Saved machine '{name}'");
        }
    }
    Ok(())
}
