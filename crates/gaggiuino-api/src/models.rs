// Gaggiuino API response and payload types
//
// Field names follow the controller's camelCase JSON. Settings groups carry
// an `extra` catch-all so fields this crate does not model survive a
// read -> modify -> write round trip untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lenient;

type Extra = serde_json::Map<String, serde_json::Value>;

// ── Envelope ─────────────────────────────────────────────────────────

/// Some endpoints return a single-element array, newer firmware a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_first(self) -> Option<T> {
        match self {
            Self::Many(items) => items.into_iter().next(),
            Self::One(item) => Some(item),
        }
    }
}

// ── Status ───────────────────────────────────────────────────────────

/// Live machine status from `GET /api/system/status`.
///
/// Every field is optional: older firmware omits some of them and a
/// machine without scales never reports a weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Seconds since boot.
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub up_time: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub profile_id: Option<u32>,
    #[serde(default)]
    pub profile_name: Option<String>,
    /// Boiler target in °C.
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub target_temperature: Option<f64>,
    /// Boiler temperature in °C.
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub temperature: Option<f64>,
    /// Brew pressure in bar.
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub pressure: Option<f64>,
    /// Tank level in percent.
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub water_level: Option<f64>,
    /// Scales reading in grams.
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub brew_switch_state: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub steam_switch_state: Option<bool>,
}

// ── Profiles ─────────────────────────────────────────────────────────

/// A brew profile stored on the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u32,
    pub name: String,
    /// Whether the controller reports this profile as the active one.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub selected: bool,
    /// Phases, recipe and global stop conditions (not modelled).
    #[serde(flatten)]
    pub extra: Extra,
}

impl Profile {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            selected: false,
            extra: Extra::new(),
        }
    }

    /// Pick the active profile out of a list.
    ///
    /// The `selected` flag wins; otherwise the profile whose id matches
    /// `status_profile_id` is used.
    pub fn active_in(profiles: &[Self], status_profile_id: Option<u32>) -> Option<&Self> {
        profiles.iter().find(|p| p.selected).or_else(|| {
            let id = status_profile_id?;
            profiles.iter().find(|p| p.id == id)
        })
    }
}

/// `GET /api/shots/latest` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LatestShot {
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub last_shot_id: Option<u64>,
}

// ── Settings ─────────────────────────────────────────────────────────

/// The four independently writable settings groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsGroup {
    Boiler,
    System,
    Led,
    Scales,
}

impl SettingsGroup {
    pub const ALL: [Self; 4] = [Self::Boiler, Self::System, Self::Led, Self::Scales];

    /// Path segment under `/api/settings/`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boiler => "boiler",
            Self::System => "system",
            Self::Led => "led",
            Self::Scales => "scales",
        }
    }
}

impl fmt::Display for SettingsGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoilerSettings {
    /// Steam boiler target in °C.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_u32")]
    pub steam_set_point: Option<u32>,
    /// Offset between the thermocouple and the group head, °C.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_f64")]
    pub offset_temp: Option<f64>,
    /// Heating power.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_u32")]
    pub hpwr: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_u32")]
    pub main_divider: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_u32")]
    pub brew_divider: Option<u32>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_bool")]
    pub warmup_state: Option<bool>,
    /// Screen sleep timeout in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_u32")]
    pub lcd_sleep: Option<u32>,
    /// Mains frequency in Hz (50/60).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_u32")]
    pub power_line_frequency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_f64")]
    pub pump_flow_at_zero: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_f64")]
    pub scales_f1: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// RGB colour of the machine's LED strip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedColor {
    #[serde(rename = "R")]
    pub r: u8,
    #[serde(rename = "G")]
    pub g: u8,
    #[serde(rename = "B")]
    pub b: u8,
}

impl LedColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedSettings {
    /// LED strip on/off.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_bool")]
    pub state: Option<bool>,
    /// Colour cycling mode.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_bool")]
    pub disco: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<LedColor>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalesSettings {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_bool")]
    pub force_predictive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_bool")]
    pub hw_scales_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_f64")]
    pub hw_scales_f1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_f64")]
    pub hw_scales_f2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_bool")]
    pub bt_scales_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_bool")]
    pub bt_scales_auto_connect: Option<bool>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Component versions reported alongside the settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versions {
    #[serde(default)]
    pub firmware: Option<String>,
    #[serde(default)]
    pub frontend: Option<String>,
    #[serde(default, rename = "static")]
    pub static_files: Option<String>,
}

/// Aggregate of `GET /api/settings`. Each group is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub boiler: Option<BoilerSettings>,
    #[serde(default)]
    pub system: Option<SystemSettings>,
    #[serde(default)]
    pub led: Option<LedSettings>,
    #[serde(default)]
    pub scales: Option<ScalesSettings>,
    #[serde(default)]
    pub versions: Option<Versions>,
}

// ── Firmware update ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirmwareUpdateStatus {
    Idle,
    InProgress,
    Success,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl FirmwareUpdateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InProgress => "in_progress",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirmwareUpdateType {
    Firmware,
    Filesystem,
    #[default]
    #[serde(other)]
    Unknown,
}

impl FirmwareUpdateType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Firmware => "firmware",
            Self::Filesystem => "filesystem",
            Self::Unknown => "unknown",
        }
    }
}

/// `GET /api/firmware/progress` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirmwareProgress {
    #[serde(default)]
    pub status: FirmwareUpdateStatus,
    /// Percentage, 0–100.
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub progress: Option<f64>,
    #[serde(default, rename = "type")]
    pub update_type: FirmwareUpdateType,
}
