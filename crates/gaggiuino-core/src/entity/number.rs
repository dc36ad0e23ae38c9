use super::{EntityCategory, EntityDescriptor, Platform};
use crate::command::{SettingsUpdate, WriteOutcome};
use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::snapshot::DeviceSnapshot;

/// Steam boiler set point, written through the boiler settings group.
#[derive(Debug, Clone, Copy, Default)]
pub struct SteamSetPoint;

impl SteamSetPoint {
    pub const MIN: f64 = 100.0;
    pub const MAX: f64 = 165.0;
    pub const STEP: f64 = 1.0;

    pub const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
        icon: Some("mdi:thermometer-high"),
        unit: Some("°C"),
        category: Some(EntityCategory::Config),
        ..EntityDescriptor::new(Platform::Number, "steam_set_point", "Steam")
    };

    pub fn value(snapshot: &DeviceSnapshot) -> Option<f64> {
        snapshot
            .boiler
            .as_ref()?
            .steam_set_point
            .map(f64::from)
    }

    /// Copy of the cached boiler group with the new set point (truncated to
    /// whole degrees). `Ok(None)` when the boiler group is unknown.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::as_conversions
    )]
    pub fn payload(snapshot: &DeviceSnapshot, value: f64) -> Result<Option<SettingsUpdate>, CoreError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(CoreError::Validation {
                message: format!(
                    "steam set point {value} outside {}..={}",
                    Self::MIN,
                    Self::MAX
                ),
            });
        }
        let Some(mut boiler) = snapshot.boiler.clone() else {
            return Ok(None);
        };
        boiler.steam_set_point = Some(value.trunc() as u32);
        Ok(Some(SettingsUpdate::Boiler(boiler)))
    }

    pub async fn set_value(
        coordinator: &Coordinator,
        value: f64,
    ) -> Result<Option<WriteOutcome>, CoreError> {
        let Some(update) = Self::payload(&coordinator.snapshot(), value)? else {
            return Ok(None);
        };
        super::write_and_refresh(coordinator, update).await.map(Some)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gaggiuino_api::BoilerSettings;

    use super::*;

    fn snapshot() -> DeviceSnapshot {
        DeviceSnapshot {
            boiler: Some(BoilerSettings {
                steam_set_point: Some(155),
                hpwr: Some(550),
                ..BoilerSettings::default()
            }),
            ..DeviceSnapshot::default()
        }
    }

    #[test]
    fn value_is_read_from_boiler_group() {
        assert_eq!(SteamSetPoint::value(&snapshot()), Some(155.0));
        assert_eq!(SteamSetPoint::value(&DeviceSnapshot::default()), None);
    }

    #[test]
    fn payload_truncates_and_keeps_other_fields() {
        let Some(SettingsUpdate::Boiler(b)) = SteamSetPoint::payload(&snapshot(), 140.9).unwrap()
        else {
            panic!("expected boiler payload");
        };
        assert_eq!(b.steam_set_point, Some(140));
        assert_eq!(b.hpwr, Some(550));
    }

    #[test]
    fn out_of_range_values_are_rejected_locally() {
        assert!(matches!(
            SteamSetPoint::payload(&snapshot(), 99.0),
            Err(CoreError::Validation { .. })
        ));
        assert!(SteamSetPoint::payload(&snapshot(), f64::NAN).is_err());
        assert!(SteamSetPoint::payload(&DeviceSnapshot::default(), 120.0).unwrap().is_none());
    }
}
