//! Card configuration and the typed light descriptors built from it.

pub mod serialization;

pub use serialization::{load_config_from_file, parse_config, ConfigError};

use crate::lights::BindingOptions;
use crate::scene::Color;
use glam::Vec3;

pub const DEFAULT_MAX_INTENSITY: f32 = 1.0;
pub const DEFAULT_AMBIENT_INTENSITY: f32 = 1.0;

fn default_true() -> bool {
    true
}

fn default_ambient_intensity() -> f32 {
    DEFAULT_AMBIENT_INTENSITY
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CardConfig {
    #[serde(default)]
    pub obj_path: String,
    #[serde(default)]
    pub light_map: Vec<LightMapEntry>,
    #[serde(default)]
    pub debug_mode: bool,
    #[serde(default = "default_true")]
    pub shadows: bool,
    #[serde(default = "default_ambient_intensity")]
    pub ambient_light_intensity: f32,
}

impl CardConfig {
    pub fn binding_options(&self) -> BindingOptions {
        BindingOptions {
            debug_mode: self.debug_mode,
            shadows_enabled: self.shadows,
        }
    }

    /// Entity ids named by the light map, in order, without duplicates.
    pub fn entity_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for light in self.light_map.iter().filter_map(LightMapEntry::as_light) {
            if let Some(id) = light.entity_id.as_deref().filter(|id| !id.is_empty()) {
                if !ids.iter().any(|existing| existing == id) {
                    ids.push(id.to_string());
                }
            }
        }
        ids
    }
}

/// A coordinate written either as a number or as a numeric string.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f32),
    Text(String),
}

impl Scalar {
    pub fn value(&self) -> Option<f32> {
        let value = match self {
            Scalar::Number(value) => *value,
            Scalar::Text(text) => text.trim().parse::<f32>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// One `light_map` entry as written by the user.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LightConfig {
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Maximum intensity.
    #[serde(default)]
    pub intensity: Option<f32>,
    /// World point `[x, y, z]`.
    #[serde(default)]
    pub position: Option<[f32; 3]>,
    /// Floor-plane `[x, z]`, lifted by `height`.
    #[serde(default)]
    pub xy: Option<Vec<Scalar>>,
    #[serde(default)]
    pub height: Option<Scalar>,
    #[serde(default)]
    pub object_name: Option<String>,
    #[serde(default)]
    pub cast_shadows: bool,
    #[serde(default)]
    pub distance: Option<f32>,
    #[serde(default)]
    pub decay: Option<f32>,
    #[serde(default = "default_true")]
    pub clickable: bool,
}

impl LightConfig {
    /// Minimal entry for `entity_id`; fill in position fields afterwards.
    pub fn new(entity_id: &str) -> Self {
        Self {
            entity_id: Some(entity_id.to_string()),
            color: None,
            intensity: None,
            position: None,
            xy: None,
            height: None,
            object_name: None,
            cast_shadows: false,
            distance: None,
            decay: None,
            clickable: true,
        }
    }
}

/// One `light_map` element. An element that does not fit [`LightConfig`] is
/// kept as raw JSON, so it skips only its own light instead of failing the
/// whole card.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum LightMapEntry {
    Light(LightConfig),
    Malformed(serde_json::Value),
}

impl LightMapEntry {
    pub fn as_light(&self) -> Option<&LightConfig> {
        match self {
            LightMapEntry::Light(light) => Some(light),
            LightMapEntry::Malformed(_) => None,
        }
    }

    /// Entity id as written, if it is a string.
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            LightMapEntry::Light(light) => light.entity_id.as_deref(),
            LightMapEntry::Malformed(raw) => raw.get("entity_id").and_then(|id| id.as_str()),
        }
    }
}

impl From<LightConfig> for LightMapEntry {
    fn from(light: LightConfig) -> Self {
        LightMapEntry::Light(light)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("light entry has no entity_id")]
    MissingEntityId,
    #[error("{entity_id}: neither a position nor an object_name is configured")]
    NoPositionSource { entity_id: String },
    #[error("{entity_id}: xy must be two numbers")]
    MalformedXy { entity_id: String },
    #[error("malformed light entry: {reason}")]
    Malformed {
        entity_id: Option<String>,
        reason: String,
    },
}

impl DescriptorError {
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            DescriptorError::MissingEntityId => None,
            DescriptorError::NoPositionSource { entity_id }
            | DescriptorError::MalformedXy { entity_id } => Some(entity_id),
            DescriptorError::Malformed { entity_id, .. } => entity_id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionSource {
    /// World-space point, used as is.
    Explicit(Vec3),
    /// Name of a scene object whose world position is sampled after load.
    Object(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightDescriptor {
    pub entity_id: String,
    pub static_color: Option<Color>,
    pub max_intensity: f32,
    pub position: PositionSource,
    pub cast_shadows: bool,
    pub range: Option<f32>,
    pub decay: Option<f32>,
    pub clickable: bool,
}

impl LightDescriptor {
    pub fn new(entity_id: &str, position: PositionSource) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            static_color: None,
            max_intensity: DEFAULT_MAX_INTENSITY,
            position,
            cast_shadows: false,
            range: None,
            decay: None,
            clickable: true,
        }
    }

    /// Color the scene light starts with.
    pub fn initial_color(&self) -> Color {
        self.static_color.unwrap_or_default()
    }
}

impl TryFrom<&LightConfig> for LightDescriptor {
    type Error = DescriptorError;

    fn try_from(config: &LightConfig) -> Result<Self, Self::Error> {
        let entity_id = config
            .entity_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(DescriptorError::MissingEntityId)?
            .to_string();

        let position = resolve_position_source(&entity_id, config)?;

        let static_color = config.color.as_deref().and_then(|text| {
            Color::from_hex(text)
                .map_err(|err| log::warn!("{}: ignoring color: {}", entity_id, err))
                .ok()
        });

        let max_intensity = match config.intensity {
            None => DEFAULT_MAX_INTENSITY,
            Some(value) if value.is_finite() && value >= 0.0 => value,
            Some(value) => {
                log::warn!(
                    "{}: invalid intensity {}, using {}",
                    entity_id,
                    value,
                    DEFAULT_MAX_INTENSITY
                );
                DEFAULT_MAX_INTENSITY
            }
        };

        Ok(Self {
            entity_id,
            static_color,
            max_intensity,
            position,
            cast_shadows: config.cast_shadows,
            range: config.distance.filter(|d| d.is_finite() && *d > 0.0),
            decay: config.decay.filter(|d| d.is_finite() && *d >= 0.0),
            clickable: config.clickable,
        })
    }
}

impl TryFrom<&LightMapEntry> for LightDescriptor {
    type Error = DescriptorError;

    fn try_from(entry: &LightMapEntry) -> Result<Self, Self::Error> {
        match entry {
            LightMapEntry::Light(light) => LightDescriptor::try_from(light),
            LightMapEntry::Malformed(raw) => {
                let reason = match serde_json::from_value::<LightConfig>(raw.clone()) {
                    Err(err) => err.to_string(),
                    Ok(_) => "unrecognized entry".to_string(),
                };
                Err(DescriptorError::Malformed {
                    entity_id: entry.entity_id().map(str::to_string),
                    reason,
                })
            }
        }
    }
}

fn resolve_position_source(
    entity_id: &str,
    config: &LightConfig,
) -> Result<PositionSource, DescriptorError> {
    if let Some(position) = config.position {
        if position.iter().all(|v| v.is_finite()) {
            return Ok(PositionSource::Explicit(Vec3::from_array(position)));
        }
        log::warn!("{}: ignoring non-finite position {:?}", entity_id, position);
    }

    let object_name = config
        .object_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    if let Some(xy) = &config.xy {
        match floor_point(xy, config.height.as_ref()) {
            Some(point) => return Ok(PositionSource::Explicit(point)),
            None if object_name.is_none() => {
                return Err(DescriptorError::MalformedXy {
                    entity_id: entity_id.to_string(),
                })
            }
            None => log::warn!("{}: malformed xy, using object_name", entity_id),
        }
    }

    object_name
        .map(|name| PositionSource::Object(name.to_string()))
        .ok_or_else(|| DescriptorError::NoPositionSource {
            entity_id: entity_id.to_string(),
        })
}

/// `[x, z]` on the floor plane lifted to `height` (0 when absent).
fn floor_point(xy: &[Scalar], height: Option<&Scalar>) -> Option<Vec3> {
    let [x, z] = xy else {
        return None;
    };
    let height = match height {
        Some(scalar) => scalar.value()?,
        None => 0.0,
    };
    Some(Vec3::new(x.value()?, height, z.value()?))
}
