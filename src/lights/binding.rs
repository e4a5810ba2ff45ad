use super::{animator, resolver, LightEntry, LightRegistry, Proxy};
use crate::config::{CardConfig, DescriptorError, LightDescriptor, PositionSource};
use crate::model::LoadedModel;
use crate::pick::{PickEvent, PickOutcome, PickResolver};
use crate::scene::{Color, ObjectHandle, PointLightParams, SceneBackend, SphereParams};
use crate::state::EntitySnapshot;
use glam::Vec3;

pub const PROXY_DIAMETER: f32 = 1.0;
pub const DEBUG_MARKER_DIAMETER: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingOptions {
    pub debug_mode: bool,
    pub shadows_enabled: bool,
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self {
            debug_mode: false,
            shadows_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error("object '{0}' not found in the loaded model")]
    ObjectNotFound(String),
    #[error("entity is already bound, keeping the first light")]
    Duplicate,
    #[error("scene backend could not create the light")]
    LightUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLight {
    pub entity_id: Option<String>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub registered: Vec<String>,
    pub skipped: Vec<SkippedLight>,
}

impl BuildReport {
    fn skip(&mut self, entity_id: Option<&str>, reason: SkipReason) {
        match entity_id {
            Some(id) => log::warn!("Skipping light {}: {}", id, reason),
            None => log::warn!("Skipping light: {}", reason),
        }
        self.skipped.push(SkippedLight {
            entity_id: entity_id.map(str::to_string),
            reason,
        });
    }
}

/// Owns the light registry for one model load.
///
/// Built once the model geometry is available and torn down with the scene.
/// Every per-frame and per-snapshot call is a no-op on an empty binding, so
/// calls after `teardown` never touch disposed objects.
#[derive(Debug)]
pub struct LightBinding {
    options: BindingOptions,
    descriptors: Vec<LightDescriptor>,
    registry: LightRegistry,
    pick: PickResolver,
}

impl LightBinding {
    pub fn new(options: BindingOptions) -> Self {
        Self {
            options,
            descriptors: Vec::new(),
            registry: LightRegistry::new(),
            pick: PickResolver::new(options.debug_mode, Vec3::ZERO),
        }
    }

    pub fn options(&self) -> BindingOptions {
        self.options
    }

    pub fn registry(&self) -> &LightRegistry {
        &self.registry
    }

    pub fn is_built(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Converts the configured light map and builds from it. Entries that
    /// fail conversion are reported as skipped.
    pub fn build_from_config(
        &mut self,
        config: &CardConfig,
        model: &LoadedModel,
        scene: &mut dyn SceneBackend,
    ) -> BuildReport {
        let mut conversion = BuildReport::default();
        let mut descriptors = Vec::with_capacity(config.light_map.len());
        for light in &config.light_map {
            match LightDescriptor::try_from(light) {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(err) => {
                    let entity_id = err.entity_id().map(str::to_string);
                    conversion.skip(entity_id.as_deref(), err.into());
                }
            }
        }
        let mut report = self.build(&descriptors, model, scene);
        conversion.skipped.append(&mut report.skipped);
        report.skipped = conversion.skipped;
        report
    }

    /// Creates one entry per resolvable descriptor. Any previous build is torn
    /// down first.
    pub fn build(
        &mut self,
        descriptors: &[LightDescriptor],
        model: &LoadedModel,
        scene: &mut dyn SceneBackend,
    ) -> BuildReport {
        self.teardown(scene);
        self.pick = PickResolver::new(self.options.debug_mode, model.centering_offset());

        let mut report = BuildReport::default();
        for descriptor in descriptors {
            let entity_id = descriptor.entity_id.as_str();
            if self.registry.contains(entity_id) {
                report.skip(Some(entity_id), SkipReason::Duplicate);
                continue;
            }
            match self.bind_light(descriptor, model, scene) {
                Ok(entry) => {
                    if let Some(displaced) = self.registry.register(entry) {
                        displaced.release(scene);
                    }
                    self.descriptors.push(descriptor.clone());
                    report.registered.push(entity_id.to_string());
                }
                Err(reason) => report.skip(Some(entity_id), reason),
            }
        }

        log::info!(
            "Bound {} lights ({} skipped)",
            report.registered.len(),
            report.skipped.len()
        );
        report
    }

    fn bind_light(
        &self,
        descriptor: &LightDescriptor,
        model: &LoadedModel,
        scene: &mut dyn SceneBackend,
    ) -> Result<LightEntry, SkipReason> {
        let entity_id = descriptor.entity_id.as_str();
        let (position, named_mesh) = match &descriptor.position {
            PositionSource::Explicit(position) => (*position, None),
            PositionSource::Object(name) => {
                let mesh = model
                    .find_mesh(name)
                    .ok_or_else(|| SkipReason::ObjectNotFound(name.clone()))?;
                (mesh.position, Some(mesh.handle))
            }
        };

        let light = scene
            .create_point_light(&PointLightParams {
                name: entity_id.to_string(),
                position,
                color: descriptor.initial_color(),
                intensity: 0.0,
                range: descriptor.range,
                decay: descriptor.decay,
            })
            .ok_or(SkipReason::LightUnavailable)?;
        scene.set_light_enabled(light, false);

        let proxy = if descriptor.clickable {
            create_proxy(entity_id, position, named_mesh, scene)
        } else {
            None
        };

        let shadow_caster = if self.options.shadows_enabled && descriptor.cast_shadows {
            let caster = scene.attach_shadow_caster(light, &model.mesh_handles());
            if caster.is_none() {
                log::warn!("{}: shadow casting unavailable", entity_id);
            }
            caster
        } else {
            None
        };

        let debug_marker = if self.options.debug_mode {
            scene.create_sphere(&SphereParams::marker(
                format!("debug_{}", entity_id),
                position,
                DEBUG_MARKER_DIAMETER,
                Color::RED,
            ))
        } else {
            None
        };

        Ok(LightEntry::new(descriptor, position, light, proxy)
            .with_shadow_caster(shadow_caster)
            .with_debug_marker(debug_marker))
    }

    /// Resolves `snapshot` against every entry and pushes changed colors.
    pub fn apply_snapshot(&mut self, snapshot: &EntitySnapshot, scene: &mut dyn SceneBackend) {
        for descriptor in &self.descriptors {
            let Some(entry) = self.registry.get_mut(&descriptor.entity_id) else {
                continue;
            };
            if resolver::resolve(descriptor, entry, snapshot) {
                scene.set_light_color(entry.light(), entry.color());
            }
        }
    }

    /// Advances every entry one frame.
    pub fn tick(&mut self, scene: &mut dyn SceneBackend) {
        self.registry
            .for_each_mut(|entry| animator::tick(entry, scene));
    }

    pub fn resolve_pick(&self, event: &PickEvent) -> Option<PickOutcome> {
        self.pick.resolve(event)
    }

    /// Releases every scene object owned by the registry. Safe to call
    /// repeatedly or before any build.
    pub fn teardown(&mut self, scene: &mut dyn SceneBackend) {
        let mut released = 0usize;
        for entry in self.registry.drain() {
            entry.release(scene);
            released += 1;
        }
        self.descriptors.clear();
        if released > 0 {
            log::info!("Released {} lights", released);
        }
    }
}

fn create_proxy(
    entity_id: &str,
    position: Vec3,
    named_mesh: Option<ObjectHandle>,
    scene: &mut dyn SceneBackend,
) -> Option<Proxy> {
    if let Some(mesh) = named_mesh {
        scene.set_entity_tag(mesh, entity_id);
        return Some(Proxy::Tagged(mesh));
    }
    let sphere = scene.create_sphere(&SphereParams::proxy(
        format!("clickable_{}", entity_id),
        position,
        PROXY_DIAMETER,
    ));
    match sphere {
        Some(handle) => {
            scene.set_entity_tag(handle, entity_id);
            Some(Proxy::Owned(handle))
        }
        None => {
            log::warn!("{}: could not create click proxy", entity_id);
            None
        }
    }
}
