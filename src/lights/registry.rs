use crate::config::LightDescriptor;
use crate::scene::{Color, ObjectHandle, SceneBackend};
use glam::Vec3;
use std::collections::HashMap;

/// Pickable object that makes a light clickable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proxy {
    /// Sphere created for the light; disposed with the entry.
    Owned(ObjectHandle),
    /// Model mesh tagged with the entity id; the model owns it, only the tag
    /// is removed on release.
    Tagged(ObjectHandle),
}

impl Proxy {
    pub fn handle(&self) -> ObjectHandle {
        match self {
            Proxy::Owned(handle) | Proxy::Tagged(handle) => *handle,
        }
    }
}

/// Runtime binding between one descriptor and its scene objects.
///
/// `target_intensity` and `color` are written only by the state resolver,
/// `current_intensity` only by the animator. Both intensities stay within
/// `0..=max_intensity`.
#[derive(Debug, Clone, PartialEq)]
pub struct LightEntry {
    entity_id: String,
    light: ObjectHandle,
    position: Vec3,
    color: Color,
    current_intensity: f32,
    target_intensity: f32,
    max_intensity: f32,
    enabled: bool,
    proxy: Option<Proxy>,
    shadow_caster: Option<ObjectHandle>,
    debug_marker: Option<ObjectHandle>,
}

impl LightEntry {
    /// New entry for a light created at intensity 0.
    pub fn new(
        descriptor: &LightDescriptor,
        position: Vec3,
        light: ObjectHandle,
        proxy: Option<Proxy>,
    ) -> Self {
        Self {
            entity_id: descriptor.entity_id.clone(),
            light,
            position,
            color: descriptor.initial_color(),
            current_intensity: 0.0,
            target_intensity: 0.0,
            max_intensity: descriptor.max_intensity.max(0.0),
            enabled: false,
            proxy,
            shadow_caster: None,
            debug_marker: None,
        }
    }

    pub(super) fn with_shadow_caster(mut self, shadow_caster: Option<ObjectHandle>) -> Self {
        self.shadow_caster = shadow_caster;
        self
    }

    pub(super) fn with_debug_marker(mut self, debug_marker: Option<ObjectHandle>) -> Self {
        self.debug_marker = debug_marker;
        self
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn light(&self) -> ObjectHandle {
        self.light
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn current_intensity(&self) -> f32 {
        self.current_intensity
    }

    pub fn target_intensity(&self) -> f32 {
        self.target_intensity
    }

    pub fn max_intensity(&self) -> f32 {
        self.max_intensity
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn proxy(&self) -> Option<Proxy> {
        self.proxy
    }

    pub fn shadow_caster(&self) -> Option<ObjectHandle> {
        self.shadow_caster
    }

    pub fn debug_marker(&self) -> Option<ObjectHandle> {
        self.debug_marker
    }

    pub(super) fn set_target_intensity(&mut self, intensity: f32) {
        self.target_intensity = clamp_intensity(intensity, self.max_intensity);
    }

    pub(super) fn set_current_intensity(&mut self, intensity: f32) {
        self.current_intensity = clamp_intensity(intensity, self.max_intensity);
    }

    pub(super) fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub(super) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Releases every scene object this entry owns.
    pub(super) fn release(self, scene: &mut dyn SceneBackend) {
        match self.proxy {
            Some(Proxy::Owned(handle)) => scene.dispose(handle),
            Some(Proxy::Tagged(handle)) => scene.clear_entity_tag(handle),
            None => {}
        }
        if let Some(handle) = self.debug_marker {
            scene.dispose(handle);
        }
        if let Some(handle) = self.shadow_caster {
            scene.dispose(handle);
        }
        scene.dispose(self.light);
    }
}

fn clamp_intensity(intensity: f32, max: f32) -> f32 {
    if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, max)
    }
}

/// Entries keyed by entity id. Iteration order is unspecified.
#[derive(Debug, Default)]
pub struct LightRegistry {
    entries: HashMap<String, LightEntry>,
}

impl LightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry`, returning the entry it displaced. A displaced entry
    /// still owns scene objects and must be released by the caller.
    #[must_use = "a displaced entry still owns scene objects"]
    pub fn register(&mut self, entry: LightEntry) -> Option<LightEntry> {
        self.entries.insert(entry.entity_id.clone(), entry)
    }

    pub fn get(&self, entity_id: &str) -> Option<&LightEntry> {
        self.entries.get(entity_id)
    }

    pub(super) fn get_mut(&mut self, entity_id: &str) -> Option<&mut LightEntry> {
        self.entries.get_mut(entity_id)
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.entries.contains_key(entity_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LightEntry> {
        self.entries.values()
    }

    pub(super) fn for_each_mut(&mut self, mut f: impl FnMut(&mut LightEntry)) {
        self.entries.values_mut().for_each(|entry| f(entry));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(super) fn drain(&mut self) -> impl Iterator<Item = LightEntry> + '_ {
        self.entries.drain().map(|(_, entry)| entry)
    }
}
