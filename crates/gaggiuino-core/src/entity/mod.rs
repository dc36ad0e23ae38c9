// ── Entity projections ──
//
// Stateless views over a `DeviceSnapshot`. Each platform is a typed table
// (an enum or unit struct) mapping an entity to the snapshot field it
// reads; writable entities build a settings payload from the cached group
// and hand it to the coordinator.

mod binary_sensor;
mod light;
mod number;
mod select;
mod sensor;
mod switch;

pub use binary_sensor::BinarySensorKind;
pub use light::LedLight;
pub use number::SteamSetPoint;
pub use select::ProfileSelect;
pub use sensor::{SensorKind, SensorValue};
pub use switch::SwitchKind;

use strum::IntoEnumIterator;
use tracing::warn;

use crate::command::{SettingsUpdate, WriteOutcome};
use crate::config::ProfileNaming;
use crate::coordinator::Coordinator;
use crate::error::CoreError;

/// Integration domain, used in identifiers and entry titles.
pub const DOMAIN: &str = "gaggiuino";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    Sensor,
    BinarySensor,
    Switch,
    Light,
    Number,
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum EntityCategory {
    Config,
    Diagnostic,
}

/// The physical machine every entity of an entry belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// `(domain, entry id)`.
    pub identifier: (String, String),
    pub name: String,
    pub manufacturer: String,
    pub model: String,
}

impl DeviceInfo {
    pub fn for_entry(entry_id: &str) -> Self {
        Self {
            identifier: (DOMAIN.to_owned(), entry_id.to_owned()),
            name: "Gaggiuino".to_owned(),
            manufacturer: "Gaggiuino".to_owned(),
            model: "Gaggiuino".to_owned(),
        }
    }
}

/// Static metadata for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub platform: Platform,
    pub key: &'static str,
    pub name: &'static str,
    pub icon: Option<&'static str>,
    pub unit: Option<&'static str>,
    pub category: Option<EntityCategory>,
    pub enabled_by_default: bool,
}

impl EntityDescriptor {
    pub(crate) const fn new(platform: Platform, key: &'static str, name: &'static str) -> Self {
        Self {
            platform,
            key,
            name,
            icon: None,
            unit: None,
            category: None,
            enabled_by_default: true,
        }
    }

    /// Stable id, unique across entries: `"{entry_id}_{key}"`.
    pub fn unique_id(&self, entry_id: &str) -> String {
        format!("{entry_id}_{}", self.key)
    }
}

/// Rendered value of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityState {
    pub descriptor: EntityDescriptor,
    /// `None` when the underlying data is unknown.
    pub value: Option<String>,
}

/// Every entity the integration exposes, platform by platform.
pub fn descriptors(naming: ProfileNaming) -> Vec<EntityDescriptor> {
    let mut out: Vec<EntityDescriptor> = SensorKind::iter().map(SensorKind::descriptor).collect();
    out.extend(BinarySensorKind::iter().map(BinarySensorKind::descriptor));
    out.extend(SwitchKind::iter().map(SwitchKind::descriptor));
    out.push(LedLight::DESCRIPTOR);
    out.push(SteamSetPoint::DESCRIPTOR);
    out.push(ProfileSelect::new(naming).descriptor());
    out
}

/// Current value of every entity, in [`descriptors`] order.
pub fn states(coordinator: &Coordinator) -> Vec<EntityState> {
    let snap = coordinator.snapshot();
    let available = coordinator.last_update_success();
    let select = ProfileSelect::new(coordinator.config().profile_naming);

    let mut out: Vec<EntityState> = SensorKind::iter()
        .map(|k| EntityState {
            descriptor: k.descriptor(),
            value: k.formatted(&snap),
        })
        .collect();
    out.extend(BinarySensorKind::iter().map(|k| EntityState {
        descriptor: k.descriptor(),
        value: Some(on_off(k.is_on(&snap, available))),
    }));
    out.extend(SwitchKind::iter().map(|k| EntityState {
        descriptor: k.descriptor(),
        value: k.is_on(&snap).map(on_off),
    }));
    out.push(EntityState {
        descriptor: LedLight::DESCRIPTOR,
        value: LedLight::is_on(&snap).map(|on| match LedLight::rgb_color(&snap) {
            Some(c) if on => format!("on ({}, {}, {})", c.r, c.g, c.b),
            _ => on_off(on),
        }),
    });
    out.push(EntityState {
        descriptor: SteamSetPoint::DESCRIPTOR,
        value: SteamSetPoint::value(&snap).map(|v| format!("{v:.0}")),
    });
    out.push(EntityState {
        descriptor: select.descriptor(),
        value: select.current_option(&snap),
    });
    out
}

/// Write a settings group, then poll the whole machine once an accepted
/// write has been re-read. A failing follow-up poll does not undo the write.
pub(crate) async fn write_and_refresh(
    coordinator: &Coordinator,
    update: SettingsUpdate,
) -> Result<WriteOutcome, CoreError> {
    let outcome = coordinator.update_settings(update).await?;
    if outcome.is_applied() {
        if let Err(e) = coordinator.refresh().await {
            warn!(error = %e, "refresh after settings write failed");
        }
    }
    Ok(outcome)
}

fn on_off(on: bool) -> String {
    let label = if on { "on" } else { "off" };
    label.to_owned()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn unique_ids_are_distinct_per_entry() {
        let ids: HashSet<String> = descriptors(ProfileNaming::NameWithId)
            .iter()
            .map(|d| d.unique_id("entry-1"))
            .collect();
        assert_eq!(ids.len(), descriptors(ProfileNaming::NameWithId).len());
        assert!(ids.contains("entry-1_temperature"));
        assert!(ids.contains("entry-1_steam_set_point"));
        assert!(ids.contains("entry-1_profile"));
    }

    #[test]
    fn device_info_is_keyed_by_entry() {
        let info = DeviceInfo::for_entry("abc");
        assert_eq!(info.identifier, ("gaggiuino".to_owned(), "abc".to_owned()));
        assert_eq!(info.model, "Gaggiuino");
    }
}
