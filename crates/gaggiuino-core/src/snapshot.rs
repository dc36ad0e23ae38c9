// ── Device snapshot ──
//
// The coordinator's cached view of one machine. Replaced wholesale by each
// successful poll; patched in place only after a confirmed write.

use chrono::{DateTime, Utc};
use gaggiuino_api::{
    BoilerSettings, FirmwareProgress, LedSettings, Profile, ScalesSettings, Settings, Status,
    SystemSettings, Versions,
};
use serde::Serialize;

use crate::command::SettingsUpdate;

/// Last known state of a machine. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    pub status: Option<Status>,
    /// The active brew profile.
    pub profile: Option<Profile>,
    pub profiles: Option<Vec<Profile>>,
    pub latest_shot_id: Option<u64>,
    pub boiler: Option<BoilerSettings>,
    pub system: Option<SystemSettings>,
    pub led: Option<LedSettings>,
    pub scales: Option<ScalesSettings>,
    pub versions: Option<Versions>,
    pub firmware_progress: Option<FirmwareProgress>,
    /// Whether the last poll reached the machine.
    pub online: bool,
    /// Result of the health probe in the last successful poll.
    pub healthy: bool,
    /// When the last successful poll completed.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl DeviceSnapshot {
    /// Assemble a snapshot from one complete poll cycle.
    pub(crate) fn from_poll(
        status: Status,
        profiles: Vec<Profile>,
        healthy: bool,
        latest_shot_id: Option<u64>,
        settings: Settings,
        firmware_progress: Option<FirmwareProgress>,
    ) -> Self {
        let profile = Profile::active_in(&profiles, status.profile_id).cloned();
        Self {
            status: Some(status),
            profile,
            profiles: Some(profiles),
            latest_shot_id,
            boiler: settings.boiler,
            system: settings.system,
            led: settings.led,
            scales: settings.scales,
            versions: settings.versions,
            firmware_progress,
            online: true,
            healthy,
            refreshed_at: Some(Utc::now()),
        }
    }

    /// Id of the active profile, from the profile record or the status.
    pub fn active_profile_id(&self) -> Option<u32> {
        self.profile
            .as_ref()
            .map(|p| p.id)
            .or_else(|| self.status.as_ref()?.profile_id)
    }

    /// Look up a cached profile by id.
    pub fn profile_by_id(&self, id: u32) -> Option<&Profile> {
        self.profiles.as_deref()?.iter().find(|p| p.id == id)
    }

    /// Mark `selected` as the active profile everywhere it is mirrored.
    pub(crate) fn apply_profile_selection(&mut self, selected: &Profile) {
        if let Some(profiles) = self.profiles.as_mut() {
            for p in profiles.iter_mut() {
                p.selected = p.id == selected.id;
            }
        }
        if let Some(status) = self.status.as_mut() {
            status.profile_id = Some(selected.id);
            status.profile_name = Some(selected.name.clone());
        }
        let mut active = selected.clone();
        active.selected = true;
        self.profile = Some(active);
    }

    /// Replace one settings group with a value read back from the device.
    pub(crate) fn apply_settings(&mut self, settings: SettingsUpdate) {
        match settings {
            SettingsUpdate::Boiler(b) => self.boiler = Some(b),
            SettingsUpdate::System(s) => self.system = Some(s),
            SettingsUpdate::Led(l) => self.led = Some(l),
            SettingsUpdate::Scales(s) => self.scales = Some(s),
        }
    }
}
