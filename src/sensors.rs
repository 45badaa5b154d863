//! Published sensor registry
//!
//! The fixed set of sensors this bridge publishes to the host, with the
//! attribute bundle each one carries. Measurement sensors are fed from the
//! parameters page, status sensors from the home-page icon colors, and
//! setting sensors from the home-page setting fields.

use serde_json::{Map, Value};

/// Attribute bundle for one published sensor
#[derive(Debug, Clone, Copy)]
pub struct SensorMeta {
    /// Sensor key; also the last segment of the entity id
    pub key: &'static str,

    /// Home Assistant device class
    pub device_class: &'static str,

    /// Human-readable name
    pub friendly_name: &'static str,

    /// Default unit of measurement, if any
    pub unit: Option<&'static str>,

    /// Material Design icon name
    pub icon: &'static str,

    /// Initial state advertised for binary-ish status sensors
    pub initial_state: Option<&'static str>,
}

/// Measurement sensors, fed from `params_<key>` readouts
pub static MEASUREMENTS: [SensorMeta; 4] = [
    SensorMeta {
        key: "temp_room",
        device_class: "temperature",
        friendly_name: "Room temperature",
        unit: Some("°C"),
        icon: "mdi:thermometer",
        initial_state: None,
    },
    SensorMeta {
        key: "temp_outside",
        device_class: "temperature",
        friendly_name: "Outside temperature",
        unit: Some("°C"),
        icon: "mdi:thermometer",
        initial_state: None,
    },
    SensorMeta {
        key: "temp_boil",
        device_class: "temperature",
        friendly_name: "Tap water temperature",
        unit: Some("°C"),
        icon: "mdi:thermometer",
        initial_state: None,
    },
    SensorMeta {
        key: "power",
        device_class: "power",
        friendly_name: "Current power",
        unit: Some("kW"),
        icon: "mdi:lightning-bolt-outline",
        initial_state: None,
    },
];

/// Status sensors, fed from home-page icon colors
pub static STATUSES: [SensorMeta; 4] = [
    SensorMeta {
        key: "radiator",
        device_class: "running",
        friendly_name: "Radiators heating",
        unit: None,
        icon: "mdi:radiator",
        initial_state: Some("off"),
    },
    SensorMeta {
        key: "tap",
        device_class: "running",
        friendly_name: "Tap water heating",
        unit: None,
        icon: "mdi:water-pump",
        initial_state: Some("off"),
    },
    SensorMeta {
        key: "pump",
        device_class: "running",
        friendly_name: "Heating pump",
        unit: None,
        icon: "mdi:pump",
        initial_state: Some("off"),
    },
    SensorMeta {
        key: "error",
        device_class: "binary_sensor",
        friendly_name: "Error",
        unit: None,
        icon: "mdi:alert-circle",
        initial_state: Some("off"),
    },
];

/// Setting sensors, fed from home-page setting fields
pub static SETTINGS: [SensorMeta; 2] = [
    SensorMeta {
        key: "temp_prog",
        device_class: "temperature",
        friendly_name: "Room temperature setting",
        unit: Some("°C"),
        icon: "mdi:thermometer",
        initial_state: None,
    },
    SensorMeta {
        key: "temp_zas_nas",
        device_class: "temperature",
        friendly_name: "Tap water temperature setting",
        unit: Some("°C"),
        icon: "mdi:thermometer",
        initial_state: None,
    },
];

impl SensorMeta {
    /// Fixed attribute bundle merged into every state write for this sensor
    pub fn attributes(&self) -> Map<String, Value> {
        let mut attrs = Map::new();
        attrs.insert(
            "device_class".to_string(),
            Value::String(self.device_class.to_string()),
        );
        attrs.insert(
            "friendly_name".to_string(),
            Value::String(self.friendly_name.to_string()),
        );
        if let Some(unit) = self.unit {
            attrs.insert(
                "unit_of_measurement".to_string(),
                Value::String(unit.to_string()),
            );
        }
        if let Some(initial) = self.initial_state {
            attrs.insert(
                "initial_state".to_string(),
                Value::String(initial.to_string()),
            );
        }
        attrs.insert("icon".to_string(), Value::String(self.icon.to_string()));
        attrs
    }

    /// Key of the raw parameter readout backing this measurement
    pub fn param_key(&self) -> String {
        format!("params_{}", self.key)
    }
}

/// All published sensors, in reset order
pub fn all() -> impl Iterator<Item = &'static SensorMeta> {
    MEASUREMENTS
        .iter()
        .chain(STATUSES.iter())
        .chain(SETTINGS.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_sizes() {
        assert_eq!(MEASUREMENTS.len(), 4);
        assert_eq!(STATUSES.len(), 4);
        assert_eq!(SETTINGS.len(), 2);
        assert_eq!(all().count(), 10);
    }

    #[test]
    fn measurement_attributes() {
        let meta = &MEASUREMENTS[0];
        let attrs = meta.attributes();
        assert_eq!(
            attrs.get("device_class").and_then(|v| v.as_str()),
            Some("temperature")
        );
        assert_eq!(
            attrs.get("unit_of_measurement").and_then(|v| v.as_str()),
            Some("°C")
        );
        assert!(attrs.get("initial_state").is_none());
        assert_eq!(meta.param_key(), "params_temp_room");
    }

    #[test]
    fn status_attributes_carry_initial_state() {
        let meta = &STATUSES[0];
        let attrs = meta.attributes();
        assert_eq!(
            attrs.get("initial_state").and_then(|v| v.as_str()),
            Some("off")
        );
        assert!(attrs.get("unit_of_measurement").is_none());
    }

    #[test]
    fn keys_are_unique() {
        let mut keys: Vec<&str> = all().map(|m| m.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 10);
    }
}
