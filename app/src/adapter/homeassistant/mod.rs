mod client;

pub use client::{FetchError, HaHttpClient};

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{core::unit::Watt, device::PowerState};

const SIGNAL_ATTRIBUTES: [&str; 3] = ["rssi", "signal_strength", "linkquality"];

/// One entry of the `/api/states` snapshot.
#[derive(Deserialize, Debug, Clone)]
pub struct EntityState {
    pub entity_id: String,
    pub state: StateValue,
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Available(String),
    Unavailable,
}

impl<'de> Deserialize<'de> for StateValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        match value.as_deref().map(str::trim) {
            None | Some("") | Some("unavailable") | Some("unknown") => Ok(StateValue::Unavailable),
            Some(v) => Ok(StateValue::Available(v.to_owned())),
        }
    }
}

impl EntityState {
    pub fn friendly_name(&self) -> &str {
        self.attributes
            .get("friendly_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Power in watts, `None` if the state carries no usable number this cycle.
    pub fn power_reading(&self) -> Option<Watt> {
        let StateValue::Available(value) = &self.state else {
            return None;
        };

        let reading = value.parse::<f64>().ok().filter(|v| v.is_finite())?;

        let factor = match self.attributes.get("unit_of_measurement").and_then(Value::as_str) {
            Some("kW") => 1000.0,
            _ => 1.0,
        };

        Some(Watt(reading * factor))
    }

    pub fn switch_state(&self) -> PowerState {
        match &self.state {
            StateValue::Available(v) if v.eq_ignore_ascii_case("on") => PowerState::On,
            StateValue::Available(v) if v.eq_ignore_ascii_case("off") => PowerState::Off,
            _ => PowerState::Unknown,
        }
    }

    pub fn signal_strength(&self) -> Option<f64> {
        SIGNAL_ATTRIBUTES
            .iter()
            .filter_map(|name| self.attributes.get(*name))
            .find_map(|value| match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(json: serde_json::Value) -> EntityState {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_sentinel_states_are_unavailable() {
        for state in ["unavailable", "unknown", "", "  "] {
            let e = entity(serde_json::json!({"entity_id": "sensor.tv_power", "state": state, "attributes": {}}));
            assert_eq!(e.state, StateValue::Unavailable, "state {:?}", state);
            assert_eq!(e.power_reading(), None);
        }
    }

    #[test]
    fn test_null_state_and_missing_attributes() {
        let e = entity(serde_json::json!({"entity_id": "sensor.tv_power", "state": null}));

        assert_eq!(e.state, StateValue::Unavailable);
        assert_eq!(e.friendly_name(), "");
    }

    #[test]
    fn test_power_reading() {
        let e = entity(serde_json::json!({
            "entity_id": "sensor.tv_power",
            "state": "87.5",
            "attributes": {"friendly_name": "TV Power", "unit_of_measurement": "W"}
        }));

        assert_eq!(e.power_reading(), Some(Watt(87.5)));
        assert_eq!(e.friendly_name(), "TV Power");
    }

    #[test]
    fn test_power_reading_in_kilowatt() {
        let e = entity(serde_json::json!({
            "entity_id": "sensor.heater_power",
            "state": "1.5",
            "attributes": {"unit_of_measurement": "kW"}
        }));

        assert_eq!(e.power_reading(), Some(Watt(1500.0)));
    }

    #[test]
    fn test_non_numeric_power_has_no_reading() {
        let e = entity(serde_json::json!({"entity_id": "sensor.tv_power", "state": "n/a", "attributes": {}}));

        assert_eq!(e.power_reading(), None);
    }

    #[test]
    fn test_switch_state() {
        let on = entity(serde_json::json!({"entity_id": "switch.tv", "state": "on", "attributes": {}}));
        let off = entity(serde_json::json!({"entity_id": "switch.tv", "state": "OFF", "attributes": {}}));
        let gone = entity(serde_json::json!({"entity_id": "switch.tv", "state": "unavailable", "attributes": {}}));

        assert_eq!(on.switch_state(), PowerState::On);
        assert_eq!(off.switch_state(), PowerState::Off);
        assert_eq!(gone.switch_state(), PowerState::Unknown);
    }

    #[test]
    fn test_signal_strength() {
        let rssi = entity(serde_json::json!({"entity_id": "switch.tv", "state": "on", "attributes": {"rssi": -61}}));
        let lqi = entity(serde_json::json!({
            "entity_id": "switch.tv",
            "state": "on",
            "attributes": {"linkquality": "120"}
        }));
        let none = entity(serde_json::json!({"entity_id": "switch.tv", "state": "on", "attributes": {}}));

        assert_eq!(rssi.signal_strength(), Some(-61.0));
        assert_eq!(lqi.signal_strength(), Some(120.0));
        assert_eq!(none.signal_strength(), None);
    }
}
