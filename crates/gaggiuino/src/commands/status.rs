//! Status command handler.

use serde::Serialize;
use strum::IntoEnumIterator;

use gaggiuino_core::entity::{BinarySensorKind, SensorKind};
use gaggiuino_core::{Coordinator, CoordinatorConfig, DeviceSnapshot, Profile, Status};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Structured form for json/yaml output.
#[derive(Serialize)]
struct StatusView<'a> {
    online: bool,
    healthy: bool,
    status: Option<&'a Status>,
    profile: Option<&'a Profile>,
    latest_shot_id: Option<u64>,
}

pub async fn handle(config: CoordinatorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let (snap, available) = Coordinator::oneshot(config, |c| async move {
        Ok((c.snapshot(), c.last_update_success()))
    })
    .await?;

    let view = StatusView {
        online: snap.online,
        healthy: snap.healthy,
        status: snap.status.as_ref(),
        profile: snap.profile.as_ref(),
        latest_shot_id: snap.latest_shot_id,
    };
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |_| output::render_detail(&detail_rows(&snap, available, color)),
        |_| plain_lines(&snap),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Sensor value with its unit, e.g. `"92.46 °C"`.
pub fn sensor_text(kind: SensorKind, snap: &DeviceSnapshot) -> String {
    match (kind.formatted(snap), kind.unit()) {
        (Some(value), Some(unit)) => format!("{value} {unit}"),
        (Some(value), None) => value,
        (None, _) => "-".into(),
    }
}

fn detail_rows(snap: &DeviceSnapshot, available: bool, color: bool) -> Vec<(&'static str, String)> {
    let mut rows: Vec<(&'static str, String)> = SensorKind::iter()
        .map(|k| (k.name(), sensor_text(k, snap)))
        .collect();
    rows.extend(BinarySensorKind::iter().map(|k| {
        let label = match k {
            BinarySensorKind::Availability => "Available",
            _ => k.name(),
        };
        (label, output::on_off(Some(k.is_on(snap, available)), color))
    }));
    rows.push(("Healthy", output::on_off(Some(snap.healthy), color)));
    rows
}

fn plain_lines(snap: &DeviceSnapshot) -> String {
    SensorKind::iter()
        .filter_map(|k| k.formatted(snap).map(|v| format!("{}={v}", k.key())))
        .collect::<Vec<_>>()
        .join("\n")
}
