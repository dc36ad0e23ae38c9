use super::{EntityCategory, EntityDescriptor, Platform};
use crate::snapshot::DeviceSnapshot;

/// On/off indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum BinarySensorKind {
    /// Whether the coordinator's last poll succeeded.
    Availability,
    BrewSwitch,
    SteamSwitch,
}

impl BinarySensorKind {
    pub fn key(self) -> &'static str {
        self.into()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Availability => "Gaggiuino",
            Self::BrewSwitch => "Brew Switch",
            Self::SteamSwitch => "Steam Switch",
        }
    }

    pub fn descriptor(self) -> EntityDescriptor {
        let base = EntityDescriptor::new(Platform::BinarySensor, self.key(), self.name());
        match self {
            Self::Availability => EntityDescriptor {
                category: Some(EntityCategory::Diagnostic),
                ..base
            },
            Self::BrewSwitch | Self::SteamSwitch => EntityDescriptor {
                icon: Some("mdi:water-pump"),
                ..base
            },
        }
    }

    /// Unknown values read as off.
    pub fn is_on(self, snapshot: &DeviceSnapshot, last_update_success: bool) -> bool {
        match self {
            Self::Availability => last_update_success,
            Self::BrewSwitch => snapshot
                .status
                .as_ref()
                .and_then(|s| s.brew_switch_state)
                .unwrap_or(false),
            Self::SteamSwitch => snapshot
                .status
                .as_ref()
                .and_then(|s| s.steam_switch_state)
                .unwrap_or(false),
        }
    }
}
