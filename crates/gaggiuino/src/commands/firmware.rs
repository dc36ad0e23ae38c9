//! Firmware command handler.

use serde::Serialize;

use gaggiuino_core::{Coordinator, CoordinatorConfig, FirmwareProgress, Versions};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, opt};

#[derive(Serialize)]
struct FirmwareView<'a> {
    versions: Option<&'a Versions>,
    update: Option<&'a FirmwareProgress>,
}

pub async fn handle(config: CoordinatorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let snap = Coordinator::oneshot(config, |c| async move { Ok(c.snapshot()) }).await?;

    let view = FirmwareView {
        versions: snap.versions.as_ref(),
        update: snap.firmware_progress.as_ref(),
    };
    let out = output::render_single(
        &global.output,
        &view,
        |v| output::render_detail(&detail_rows(v)),
        |v| opt(v.versions.and_then(|ver| ver.firmware.clone())),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn detail_rows(view: &FirmwareView<'_>) -> Vec<(&'static str, String)> {
    let versions = view.versions.cloned().unwrap_or_default();
    let mut rows = vec![
        ("Firmware", opt(versions.firmware)),
        ("Frontend", opt(versions.frontend)),
        ("Static files", opt(versions.static_files)),
    ];
    match view.update {
        Some(progress) => {
            rows.push(("Update status", progress.status.as_str().to_owned()));
            rows.push(("Update type", progress.update_type.as_str().to_owned()));
            rows.push((
                "Progress",
                opt(progress.progress.map(|p| format!("{p:.0}%"))),
            ));
        }
        None => rows.push(("Update status", "not reported".to_owned())),
    }
    rows
}
