use std::fmt;

use super::{EntityCategory, EntityDescriptor, Platform};
use crate::snapshot::DeviceSnapshot;

/// Read-only measurements taken from the machine status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SensorKind {
    Uptime,
    ProfileId,
    ProfileName,
    LatestShotId,
    TargetTemperature,
    Temperature,
    Pressure,
    WaterLevel,
    Weight,
}

/// Native value of a sensor.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorValue {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl SensorKind {
    pub fn key(self) -> &'static str {
        self.into()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Uptime => "Uptime",
            Self::ProfileId => "Profile ID",
            Self::ProfileName => "Profile Name",
            Self::LatestShotId => "Latest Shot ID",
            Self::TargetTemperature => "Target Temperature",
            Self::Temperature => "Temperature",
            Self::Pressure => "Pressure",
            Self::WaterLevel => "Water Level",
            Self::Weight => "Weight",
        }
    }

    pub fn unit(self) -> Option<&'static str> {
        match self {
            Self::Uptime => Some("s"),
            Self::TargetTemperature | Self::Temperature => Some("°C"),
            Self::Pressure => Some("bar"),
            Self::WaterLevel => Some("%"),
            Self::Weight => Some("g"),
            Self::ProfileId | Self::ProfileName | Self::LatestShotId => None,
        }
    }

    /// Suggested number of decimals when displaying.
    pub fn precision(self) -> Option<usize> {
        match self {
            Self::TargetTemperature | Self::Temperature | Self::Weight => Some(2),
            Self::Pressure => Some(1),
            _ => None,
        }
    }

    pub fn icon(self) -> Option<&'static str> {
        match self {
            Self::ProfileId | Self::ProfileName | Self::LatestShotId => Some("mdi:coffee"),
            Self::TargetTemperature => Some("mdi:thermometer-high"),
            Self::Temperature => Some("mdi:thermometer-water"),
            Self::WaterLevel => Some("mdi:car-coolant-level"),
            Self::Uptime | Self::Pressure | Self::Weight => None,
        }
    }

    pub fn category(self) -> Option<EntityCategory> {
        match self {
            Self::Uptime | Self::ProfileId | Self::ProfileName | Self::LatestShotId => {
                Some(EntityCategory::Diagnostic)
            }
            _ => None,
        }
    }

    pub fn enabled_by_default(self) -> bool {
        !matches!(
            self,
            Self::Uptime | Self::LatestShotId | Self::Pressure | Self::Weight
        )
    }

    pub fn descriptor(self) -> EntityDescriptor {
        EntityDescriptor {
            icon: self.icon(),
            unit: self.unit(),
            category: self.category(),
            enabled_by_default: self.enabled_by_default(),
            ..EntityDescriptor::new(Platform::Sensor, self.key(), self.name())
        }
    }

    pub fn value(self, snapshot: &DeviceSnapshot) -> Option<SensorValue> {
        if self == Self::LatestShotId {
            return snapshot.latest_shot_id.map(SensorValue::Integer);
        }
        let status = snapshot.status.as_ref()?;
        match self {
            Self::Uptime => status.up_time.map(SensorValue::Integer),
            Self::ProfileId => status.profile_id.map(|id| SensorValue::Integer(id.into())),
            Self::ProfileName => status.profile_name.clone().map(SensorValue::Text),
            Self::TargetTemperature => status.target_temperature.map(SensorValue::Float),
            Self::Temperature => status.temperature.map(SensorValue::Float),
            Self::Pressure => status.pressure.map(SensorValue::Float),
            Self::WaterLevel => status.water_level.map(SensorValue::Float),
            Self::Weight => status.weight.map(SensorValue::Float),
            Self::LatestShotId => None,
        }
    }

    /// Value rendered with the suggested precision.
    pub fn formatted(self, snapshot: &DeviceSnapshot) -> Option<String> {
        let value = self.value(snapshot)?;
        Some(match (value, self.precision()) {
            (SensorValue::Float(v), Some(p)) => format!("{v:.p$}"),
            (other, _) => other.to_string(),
        })
    }
}
