//! Rendering collaborator seam.
//!
//! The light binding never talks to a renderer directly. Everything it needs
//! from the scene (creating point lights and pickable spheres, pushing
//! intensity and color, tagging objects with an entity id, disposing handles)
//! goes through [`SceneBackend`]. [`HeadlessScene`] is the in-memory backend
//! used by the binary and the tests.

pub mod color;
pub mod headless;

pub use color::{Color, ColorParseError};
pub use headless::HeadlessScene;

use glam::Vec3;

/// Opaque handle to an object owned by a scene backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(u32);

impl ObjectHandle {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLightParams {
    pub name: String,
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
    /// Falloff range; backend default when `None`.
    pub range: Option<f32>,
    pub decay: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SphereParams {
    pub name: String,
    pub position: Vec3,
    pub diameter: f32,
    /// 0.0 is fully transparent but still pickable.
    pub visibility: f32,
    /// Unlit marker color, if any.
    pub emissive: Option<Color>,
    pub pickable: bool,
}

impl SphereParams {
    /// Invisible, pickable sphere used to make a light clickable.
    pub fn proxy(name: String, position: Vec3, diameter: f32) -> Self {
        Self {
            name,
            position,
            diameter,
            visibility: 0.0,
            emissive: None,
            pickable: true,
        }
    }

    /// Visible glowing sphere used for debug markers. Never pickable.
    pub fn marker(name: String, position: Vec3, diameter: f32, color: Color) -> Self {
        Self {
            name,
            position,
            diameter,
            visibility: 1.0,
            emissive: Some(color),
            pickable: false,
        }
    }
}

/// Operations the light binding needs from a renderer.
///
/// Creation returns `None` when the backend cannot produce the object; callers
/// treat that as a skipped descriptor, never as a fatal error. Every setter and
/// `dispose` must be a no-op for handles the backend no longer knows.
pub trait SceneBackend {
    fn create_point_light(&mut self, params: &PointLightParams) -> Option<ObjectHandle>;
    fn set_light_intensity(&mut self, light: ObjectHandle, intensity: f32);
    fn set_light_color(&mut self, light: ObjectHandle, color: Color);
    /// Disabled lights are skipped during shading.
    fn set_light_enabled(&mut self, light: ObjectHandle, enabled: bool);

    fn create_hemispheric_light(&mut self, direction: Vec3, intensity: f32) -> Option<ObjectHandle>;

    fn create_sphere(&mut self, params: &SphereParams) -> Option<ObjectHandle>;

    /// Attaches the entity id reported back by picks that hit `object`.
    fn set_entity_tag(&mut self, object: ObjectHandle, entity_id: &str);
    fn clear_entity_tag(&mut self, object: ObjectHandle);

    /// Makes `light` cast shadows from `casters`. The returned handle owns the
    /// association and is released with `dispose`.
    fn attach_shadow_caster(
        &mut self,
        light: ObjectHandle,
        casters: &[ObjectHandle],
    ) -> Option<ObjectHandle>;

    fn dispose(&mut self, object: ObjectHandle);
}
