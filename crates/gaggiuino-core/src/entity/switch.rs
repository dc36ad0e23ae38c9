use super::{EntityCategory, EntityDescriptor, Platform};
use crate::command::{SettingsUpdate, WriteOutcome};
use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::snapshot::DeviceSnapshot;

/// Boolean settings exposed as switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SwitchKind {
    LedDisco,
    ForcePredictive,
    HwScalesEnabled,
    BtScalesEnabled,
}

impl SwitchKind {
    pub fn key(self) -> &'static str {
        self.into()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::LedDisco => "LED Disco",
            Self::ForcePredictive => "Force Predictive Scales",
            Self::HwScalesEnabled => "Hardware Scales",
            Self::BtScalesEnabled => "Bluetooth Scales",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::LedDisco => "mdi:led-variant-on",
            Self::ForcePredictive => "mdi:scale-balance",
            Self::HwScalesEnabled => "mdi:scale-bathroom",
            Self::BtScalesEnabled => "mdi:bluetooth",
        }
    }

    pub fn descriptor(self) -> EntityDescriptor {
        EntityDescriptor {
            icon: Some(self.icon()),
            category: Some(EntityCategory::Config),
            ..EntityDescriptor::new(Platform::Switch, self.key(), self.name())
        }
    }

    /// `None` when the owning settings group is unknown.
    pub fn is_on(self, snapshot: &DeviceSnapshot) -> Option<bool> {
        match self {
            Self::LedDisco => snapshot.led.as_ref()?.disco,
            Self::ForcePredictive => snapshot.scales.as_ref()?.force_predictive,
            Self::HwScalesEnabled => snapshot.scales.as_ref()?.hw_scales_enabled,
            Self::BtScalesEnabled => snapshot.scales.as_ref()?.bt_scales_enabled,
        }
    }

    /// Copy of the cached group with this switch set to `on`.
    pub fn payload(self, snapshot: &DeviceSnapshot, on: bool) -> Option<SettingsUpdate> {
        if self == Self::LedDisco {
            let mut led = snapshot.led.clone()?;
            led.disco = Some(on);
            return Some(SettingsUpdate::Led(led));
        }
        let mut scales = snapshot.scales.clone()?;
        match self {
            Self::ForcePredictive => scales.force_predictive = Some(on),
            Self::HwScalesEnabled => scales.hw_scales_enabled = Some(on),
            Self::BtScalesEnabled => scales.bt_scales_enabled = Some(on),
            Self::LedDisco => {}
        }
        Some(SettingsUpdate::Scales(scales))
    }

    /// Write the new state. `Ok(None)` when the group is not cached yet.
    pub async fn set(
        self,
        coordinator: &Coordinator,
        on: bool,
    ) -> Result<Option<WriteOutcome>, CoreError> {
        let Some(update) = self.payload(&coordinator.snapshot(), on) else {
            return Ok(None);
        };
        coordinator.update_settings(update).await.map(Some)
    }

    pub async fn turn_on(self, coordinator: &Coordinator) -> Result<Option<WriteOutcome>, CoreError> {
        self.set(coordinator, true).await
    }

    pub async fn turn_off(self, coordinator: &Coordinator) -> Result<Option<WriteOutcome>, CoreError> {
        self.set(coordinator, false).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gaggiuino_api::{LedSettings, ScalesSettings};
    use serde_json::json;

    use super::*;

    fn snapshot() -> DeviceSnapshot {
        let mut scales = ScalesSettings {
            force_predictive: Some(false),
            hw_scales_enabled: Some(true),
            bt_scales_enabled: Some(false),
            ..ScalesSettings::default()
        };
        scales.extra.insert("hwScalesF1".into(), json!(3.2));
        DeviceSnapshot {
            scales: Some(scales),
            ..DeviceSnapshot::default()
        }
    }

    #[test]
    fn reads_flags_from_their_group() {
        let snap = snapshot();
        assert_eq!(SwitchKind::HwScalesEnabled.is_on(&snap), Some(true));
        assert_eq!(SwitchKind::ForcePredictive.is_on(&snap), Some(false));
        assert_eq!(SwitchKind::LedDisco.is_on(&snap), None);
    }

    #[test]
    fn payload_copies_whole_group() {
        let snap = snapshot();
        let Some(SettingsUpdate::Scales(s)) = SwitchKind::BtScalesEnabled.payload(&snap, true)
        else {
            panic!("expected scales payload");
        };
        assert_eq!(s.bt_scales_enabled, Some(true));
        assert_eq!(s.hw_scales_enabled, Some(true));
        assert_eq!(s.extra.get("hwScalesF1"), Some(&json!(3.2)));
    }

    #[test]
    fn unknown_group_produces_no_payload() {
        assert!(SwitchKind::LedDisco.payload(&snapshot(), true).is_none());

        let snap = DeviceSnapshot {
            led: Some(LedSettings::default()),
            ..DeviceSnapshot::default()
        };
        let update = SwitchKind::LedDisco.payload(&snap, true).unwrap();
        assert_eq!(update.group(), gaggiuino_api::SettingsGroup::Led);
    }
}
