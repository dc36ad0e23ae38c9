//! Settings command handlers.
//!
//! Every group subcommand shows the group when given no flags. With flags,
//! it writes through the matching entity and shows the group as re-read
//! from the machine.

use serde::Serialize;

use gaggiuino_core::entity::{LedLight, SteamSetPoint, SwitchKind};
use gaggiuino_core::{
    BoilerSettings, Coordinator, CoordinatorConfig, DeviceSnapshot, LedColor, LedSettings,
    ScalesSettings, SystemSettings, Versions,
};

use crate::cli::{GlobalOpts, SettingsArgs, SettingsCommand, Toggle};
use crate::error::CliError;
use crate::output::{self, on_off, opt};

use super::util;

/// Structured form of `settings show`.
#[derive(Serialize)]
struct SettingsView<'a> {
    boiler: Option<&'a BoilerSettings>,
    system: Option<&'a SystemSettings>,
    led: Option<&'a LedSettings>,
    scales: Option<&'a ScalesSettings>,
    versions: Option<&'a Versions>,
}

#[derive(Clone, Copy)]
enum Group {
    Boiler,
    Led,
    Scales,
}

pub async fn handle(
    config: CoordinatorConfig,
    args: SettingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let quiet = global.quiet;

    let (snap, group) = match args.command {
        SettingsCommand::Show => {
            let snap = Coordinator::oneshot(config, |c| async move { Ok(c.snapshot()) }).await?;
            return print_all(&snap, global);
        }

        SettingsCommand::Boiler { steam_set_point } => {
            let snap = util::with_coordinator(config, |c| async move {
                if let Some(value) = steam_set_point {
                    let result = SteamSetPoint::set_value(&c, value).await;
                    util::report_write(result, "Boiler settings", quiet)?;
                }
                Ok(c.snapshot())
            })
            .await?;
            (snap, Group::Boiler)
        }

        SettingsCommand::Led {
            state,
            color,
            disco,
        } => {
            let snap = util::with_coordinator(config, |c| async move {
                let color = color.map(|(r, g, b)| LedColor::new(r, g, b));
                match (state, color) {
                    (Some(Toggle::Off), _) => {
                        util::report_write(LedLight::turn_off(&c).await, "LED", quiet)?;
                    }
                    (Some(Toggle::On), color) | (None, color @ Some(_)) => {
                        util::report_write(LedLight::turn_on(&c, color).await, "LED", quiet)?;
                    }
                    (None, None) => {}
                }
                if let Some(disco) = disco {
                    let result = SwitchKind::LedDisco.set(&c, disco.is_on()).await;
                    util::report_write(result, "LED disco mode", quiet)?;
                }
                Ok(c.snapshot())
            })
            .await?;
            (snap, Group::Led)
        }

        SettingsCommand::Scales {
            force_predictive,
            hw_scales,
            bt_scales,
        } => {
            let snap = util::with_coordinator(config, |c| async move {
                let writes = [
                    (SwitchKind::ForcePredictive, force_predictive),
                    (SwitchKind::HwScalesEnabled, hw_scales),
                    (SwitchKind::BtScalesEnabled, bt_scales),
                ];
                for (kind, toggle) in writes {
                    if let Some(toggle) = toggle {
                        let result = kind.set(&c, toggle.is_on()).await;
                        util::report_write(result, kind.name(), quiet)?;
                    }
                }
                Ok(c.snapshot())
            })
            .await?;
            (snap, Group::Scales)
        }
    };

    print_group(&snap, group, global)
}

// ── Rendering ───────────────────────────────────────────────────────

fn print_all(snap: &DeviceSnapshot, global: &GlobalOpts) -> Result<(), CliError> {
    let view = SettingsView {
        boiler: snap.boiler.as_ref(),
        system: snap.system.as_ref(),
        led: snap.led.as_ref(),
        scales: snap.scales.as_ref(),
        versions: snap.versions.as_ref(),
    };
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |_| output::render_detail(&all_rows(snap, color)),
        |_| plain(&all_rows(snap, false)),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn all_rows(snap: &DeviceSnapshot, color: bool) -> Vec<(&'static str, String)> {
    let mut rows = boiler_rows(snap.boiler.as_ref());
    rows.extend(system_rows(snap.system.as_ref(), color));
    rows.extend(led_rows(snap.led.as_ref(), color));
    rows.extend(scales_rows(snap.scales.as_ref(), color));
    rows
}

fn print_group(snap: &DeviceSnapshot, group: Group, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let rows = |color| match group {
        Group::Boiler => boiler_rows(snap.boiler.as_ref()),
        Group::Led => led_rows(snap.led.as_ref(), color),
        Group::Scales => scales_rows(snap.scales.as_ref(), color),
    };
    let (detail, lines) = (rows(color), rows(false));

    let out = match group {
        Group::Boiler => render_group(global, &snap.boiler, &detail, &lines),
        Group::Led => render_group(global, &snap.led, &detail, &lines),
        Group::Scales => render_group(global, &snap.scales, &detail, &lines),
    }?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render_group<T: Serialize>(
    global: &GlobalOpts,
    data: &T,
    detail: &[(&str, String)],
    lines: &[(&str, String)],
) -> Result<String, CliError> {
    output::render_single(
        &global.output,
        data,
        |_| output::render_detail(detail),
        |_| plain(lines),
    )
}

fn plain(rows: &[(&str, String)]) -> String {
    rows.iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn boiler_rows(boiler: Option<&BoilerSettings>) -> Vec<(&'static str, String)> {
    let b = boiler.cloned().unwrap_or_default();
    vec![
        ("Steam set point (°C)", opt(b.steam_set_point)),
        ("Temperature offset (°C)", opt(b.offset_temp)),
        ("Heater power", opt(b.hpwr)),
        ("Main divider", opt(b.main_divider)),
        ("Brew divider", opt(b.brew_divider)),
    ]
}

fn system_rows(system: Option<&SystemSettings>, color: bool) -> Vec<(&'static str, String)> {
    let s = system.cloned().unwrap_or_default();
    vec![
        ("Warm-up", on_off(s.warmup_state, color)),
        ("LCD sleep (min)", opt(s.lcd_sleep)),
        ("Power line frequency (Hz)", opt(s.power_line_frequency)),
        ("Pump flow at zero", opt(s.pump_flow_at_zero)),
    ]
}

fn led_rows(led: Option<&LedSettings>, color: bool) -> Vec<(&'static str, String)> {
    let l = led.cloned().unwrap_or_default();
    vec![
        ("LED", on_off(l.state, color)),
        ("LED disco", on_off(l.disco, color)),
        (
            "LED colour",
            opt(l.color.map(|c| format!("{},{},{}", c.r, c.g, c.b))),
        ),
    ]
}

fn scales_rows(scales: Option<&ScalesSettings>, color: bool) -> Vec<(&'static str, String)> {
    let s = scales.cloned().unwrap_or_default();
    vec![
        ("Force predictive", on_off(s.force_predictive, color)),
        ("Hardware scales", on_off(s.hw_scales_enabled, color)),
        ("Bluetooth scales", on_off(s.bt_scales_enabled, color)),
        ("Bluetooth auto-connect", on_off(s.bt_scales_auto_connect, color)),
    ]
}
