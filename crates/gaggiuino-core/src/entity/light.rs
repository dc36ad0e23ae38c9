use gaggiuino_api::LedColor;

use super::{EntityCategory, EntityDescriptor, Platform};
use crate::command::{SettingsUpdate, WriteOutcome};
use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::snapshot::DeviceSnapshot;

/// The machine's RGB LED strip. On/off and colour only, no brightness.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedLight;

impl LedLight {
    pub const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
        icon: Some("mdi:led-variant-on"),
        category: Some(EntityCategory::Config),
        ..EntityDescriptor::new(Platform::Light, "led", "LED")
    };

    pub fn is_on(snapshot: &DeviceSnapshot) -> Option<bool> {
        snapshot.led.as_ref()?.state
    }

    pub fn rgb_color(snapshot: &DeviceSnapshot) -> Option<LedColor> {
        snapshot.led.as_ref()?.color
    }

    /// Copy of the cached LED group with the new state and, optionally, colour.
    pub fn payload(
        snapshot: &DeviceSnapshot,
        on: bool,
        color: Option<LedColor>,
    ) -> Option<SettingsUpdate> {
        let mut led = snapshot.led.clone()?;
        led.state = Some(on);
        if let Some(color) = color {
            led.color = Some(color);
        }
        Some(SettingsUpdate::Led(led))
    }

    /// Turn the strip on, optionally changing its colour. `Ok(None)` when
    /// the LED group is not cached yet.
    pub async fn turn_on(
        coordinator: &Coordinator,
        color: Option<LedColor>,
    ) -> Result<Option<WriteOutcome>, CoreError> {
        let Some(update) = Self::payload(&coordinator.snapshot(), true, color) else {
            return Ok(None);
        };
        super::write_and_refresh(coordinator, update).await.map(Some)
    }

    pub async fn turn_off(coordinator: &Coordinator) -> Result<Option<WriteOutcome>, CoreError> {
        let Some(update) = Self::payload(&coordinator.snapshot(), false, None) else {
            return Ok(None);
        };
        super::write_and_refresh(coordinator, update).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use gaggiuino_api::LedSettings;

    use super::*;

    #[test]
    fn turn_on_keeps_colour_unless_given() {
        let snap = DeviceSnapshot {
            led: Some(LedSettings {
                state: Some(false),
                disco: Some(true),
                color: Some(LedColor::new(10, 20, 30)),
                ..LedSettings::default()
            }),
            ..DeviceSnapshot::default()
        };
        assert_eq!(LedLight::is_on(&snap), Some(false));

        let Some(SettingsUpdate::Led(kept)) = LedLight::payload(&snap, true, None) else {
            panic!("expected LED payload");
        };
        assert_eq!(kept.state, Some(true));
        assert_eq!(kept.disco, Some(true));
        assert_eq!(kept.color, Some(LedColor::new(10, 20, 30)));

        let Some(SettingsUpdate::Led(red)) =
            LedLight::payload(&snap, true, Some(LedColor::new(255, 0, 0)))
        else {
            panic!("expected LED payload");
        };
        assert_eq!(red.color, Some(LedColor::new(255, 0, 0)));
    }

    #[test]
    fn unknown_led_group_is_a_no_op() {
        let snap = DeviceSnapshot::default();
        assert!(LedLight::is_on(&snap).is_none());
        assert!(LedLight::payload(&snap, false, None).is_none());
    }
}
