//! Watch command: keep a coordinator polling and re-render every entity
//! value on each new snapshot until Ctrl-C.

use chrono::Local;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;

use gaggiuino_core::entity::{self, EntityState};
use gaggiuino_core::{CoordinatorConfig, IntegrationRegistry};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config::with_poll_interval;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Clone, Serialize, Tabled)]
struct EntityRow {
    #[tabled(rename = "Entity")]
    unique_id: String,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Value")]
    #[serde(skip)]
    display: String,
    #[tabled(skip)]
    value: Option<String>,
    #[tabled(skip)]
    unit: Option<&'static str>,
}

impl EntityRow {
    fn new(state: &EntityState, entry_id: &str) -> Self {
        let d = &state.descriptor;
        let display = match (&state.value, d.unit) {
            (Some(v), Some(unit)) => format!("{v} {unit}"),
            (Some(v), None) => v.clone(),
            (None, _) => "unknown".into(),
        };
        Self {
            unique_id: d.unique_id(entry_id),
            name: d.name,
            display,
            value: state.value.clone(),
            unit: d.unit,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: CoordinatorConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let config = with_poll_interval(config, args.interval);
    if config.poll_interval.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let registry = IntegrationRegistry::new();
    let id = registry.setup_entry(config).await?;
    let Some(entry) = registry.get(id) else {
        return Ok(());
    };
    let entry_id = entry.id.to_string();
    let coordinator = entry.coordinator.clone();
    let color = output::should_color(&global.color);

    if !global.quiet {
        eprintln!("Watching {} (Ctrl-C to stop)", entry.title);
    }

    let mut stream = coordinator.subscribe();
    let result = loop {
        let rows: Vec<EntityRow> = entity::states(&coordinator)
            .iter()
            .filter(|s| args.all || s.descriptor.enabled_by_default)
            .map(|s| EntityRow::new(s, &entry_id))
            .collect();
        if let Err(e) = render(&rows, global, color) {
            break Err(e);
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            next = stream.changed() => {
                if next.is_none() {
                    break Ok(());
                }
            }
        }
    };

    registry.shutdown_all().await;
    result
}

fn render(rows: &[EntityRow], global: &GlobalOpts, color: bool) -> Result<(), CliError> {
    // One line per update keeps structured output streamable.
    let format = match global.output {
        OutputFormat::Json => &OutputFormat::JsonCompact,
        ref other => other,
    };
    let out = output::render_list(
        format,
        rows,
        EntityRow::clone,
        |r| format!("{}={}", r.unique_id, r.value.as_deref().unwrap_or("")),
    )?;

    if matches!(format, OutputFormat::Table) && !global.quiet {
        let stamp = Local::now().format("%H:%M:%S").to_string();
        if color {
            println!("{}", stamp.dimmed());
        } else {
            println!("{stamp}");
        }
    }
    output::print_output(&out, global.quiet);
    Ok(())
}
