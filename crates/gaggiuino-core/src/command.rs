// ── Write commands ──
//
// Payloads and outcomes for the coordinator's mutation operations.

use gaggiuino_api::{BoilerSettings, LedSettings, ScalesSettings, SettingsGroup, SystemSettings};

/// A full settings-group document to write to the device.
///
/// Groups are written whole: callers copy the cached group, change the
/// fields they care about and submit the copy.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsUpdate {
    Boiler(BoilerSettings),
    System(SystemSettings),
    Led(LedSettings),
    Scales(ScalesSettings),
}

impl SettingsUpdate {
    pub fn group(&self) -> SettingsGroup {
        match self {
            Self::Boiler(_) => SettingsGroup::Boiler,
            Self::System(_) => SettingsGroup::System,
            Self::Led(_) => SettingsGroup::Led,
            Self::Scales(_) => SettingsGroup::Scales,
        }
    }
}

/// Result of a write the device answered (or failed to answer in time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum WriteOutcome {
    /// Accepted by the device; the cached snapshot reflects it.
    Applied,
    /// The device refused the write. The snapshot is unchanged.
    Rejected,
    /// The request timed out; the device may or may not have applied it.
    Unconfirmed,
}

impl WriteOutcome {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}
