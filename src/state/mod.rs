//! Entity state as delivered by the host dashboard.

use std::collections::HashMap;

pub const STATE_ON: &str = "on";
pub const STATE_OFF: &str = "off";

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EntityAttributes {
    /// 0..=255; `null` from the host deserializes to `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgb_color: Option<[f64; 3]>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EntityState {
    pub state: String,
    #[serde(default)]
    pub attributes: EntityAttributes,
}

impl EntityState {
    pub fn new(state: &str) -> Self {
        Self {
            state: state.to_string(),
            attributes: EntityAttributes::default(),
        }
    }

    pub fn on() -> Self {
        Self::new(STATE_ON)
    }

    pub fn off() -> Self {
        Self::new(STATE_OFF)
    }

    pub fn with_brightness(mut self, brightness: f64) -> Self {
        self.attributes.brightness = Some(brightness);
        self
    }

    pub fn with_rgb(mut self, rgb: [f64; 3]) -> Self {
        self.attributes.rgb_color = Some(rgb);
        self
    }

    pub fn is_on(&self) -> bool {
        self.state == STATE_ON
    }
}

/// Point-in-time, read-only view of all known entity states.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct EntitySnapshot {
    states: HashMap<String, EntityState>,
}

impl EntitySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityState> {
        self.states.get(entity_id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl FromIterator<(String, EntityState)> for EntitySnapshot {
    fn from_iter<I: IntoIterator<Item = (String, EntityState)>>(iter: I) -> Self {
        Self {
            states: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_state_map_deserializes() {
        let json = r#"{
            "light.kitchen": {
                "state": "on",
                "attributes": {
                    "brightness": 128,
                    "rgb_color": [255, 0, 0],
                    "friendly_name": "Kitchen",
                    "supported_color_modes": ["rgb"]
                }
            },
            "light.hall": {
                "state": "off",
                "attributes": { "brightness": null, "rgb_color": null }
            },
            "sensor.door": { "state": "unavailable" }
        }"#;
        let snapshot: EntitySnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.len(), 3);

        let kitchen = snapshot.get("light.kitchen").unwrap();
        assert!(kitchen.is_on());
        assert_eq!(kitchen.attributes.brightness, Some(128.0));
        assert_eq!(kitchen.attributes.rgb_color, Some([255.0, 0.0, 0.0]));

        let hall = snapshot.get("light.hall").unwrap();
        assert!(!hall.is_on());
        assert_eq!(hall.attributes, EntityAttributes::default());

        assert_eq!(snapshot.get("sensor.door").unwrap().state, "unavailable");
        assert!(snapshot.get("light.missing").is_none());
    }
}
