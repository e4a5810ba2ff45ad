use super::{Color, ObjectHandle, PointLightParams, SceneBackend, SphereParams};
use crate::model::{Bounds, LoadedModel, ModelManifest, ModelMesh};
use crate::pick::{PickEvent, PickHit};
use glam::Vec3;
use std::collections::{BTreeMap, HashMap};

/// Height of the origin of top-down floor picks.
const FLOOR_PICK_HEIGHT: f32 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessLight {
    pub name: String,
    pub position: Vec3,
    pub diffuse: Color,
    pub specular: Color,
    pub intensity: f32,
    pub enabled: bool,
    pub range: Option<f32>,
    pub decay: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessObject {
    PointLight(HeadlessLight),
    HemisphericLight { direction: Vec3, intensity: f32 },
    Sphere(SphereParams),
    Mesh { name: String, bounds: Bounds },
    ShadowCaster { light: ObjectHandle, casters: Vec<ObjectHandle> },
}

/// In-memory scene. Keeps every live object so callers can inspect what the
/// binding created, pushed and released.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    next_id: u32,
    objects: BTreeMap<ObjectHandle, HeadlessObject>,
    tags: HashMap<ObjectHandle, String>,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, object: HeadlessObject) -> ObjectHandle {
        self.next_id = self.next_id.wrapping_add(1);
        let handle = ObjectHandle::from_raw(self.next_id);
        self.objects.insert(handle, object);
        handle
    }

    /// Adds the manifest meshes and moves the model so its bounds are centered
    /// on the origin.
    pub fn load_model(&mut self, manifest: &ModelManifest) -> LoadedModel {
        let model_bounds = manifest
            .meshes
            .iter()
            .map(|mesh| Bounds::new(Vec3::from_array(mesh.min), Vec3::from_array(mesh.max)))
            .reduce(|acc, b| acc.union(&b));
        let Some(model_bounds) = model_bounds else {
            return LoadedModel::empty();
        };
        let offset = -model_bounds.center();

        let mut meshes = Vec::with_capacity(manifest.meshes.len());
        for mesh in &manifest.meshes {
            let bounds = Bounds::new(Vec3::from_array(mesh.min), Vec3::from_array(mesh.max))
                .translated(offset);
            let handle = self.insert(HeadlessObject::Mesh {
                name: mesh.name.clone(),
                bounds,
            });
            meshes.push(ModelMesh {
                name: mesh.name.clone(),
                handle,
                position: bounds.center(),
                bounds,
            });
        }
        log::info!(
            "Loaded model with {} meshes, centering offset {:?}",
            meshes.len(),
            offset
        );
        LoadedModel::new(meshes, offset)
    }

    pub fn object(&self, handle: ObjectHandle) -> Option<&HeadlessObject> {
        self.objects.get(&handle)
    }

    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.objects.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn light(&self, handle: ObjectHandle) -> Option<&HeadlessLight> {
        match self.objects.get(&handle) {
            Some(HeadlessObject::PointLight(light)) => Some(light),
            _ => None,
        }
    }

    pub fn sphere(&self, handle: ObjectHandle) -> Option<&SphereParams> {
        match self.objects.get(&handle) {
            Some(HeadlessObject::Sphere(sphere)) => Some(sphere),
            _ => None,
        }
    }

    pub fn tag(&self, handle: ObjectHandle) -> Option<&str> {
        self.tags.get(&handle).map(String::as_str)
    }

    pub fn point_light_count(&self) -> usize {
        self.objects
            .values()
            .filter(|object| matches!(object, HeadlessObject::PointLight(_)))
            .count()
    }

    pub fn shadow_caster_count(&self) -> usize {
        self.objects
            .values()
            .filter(|object| matches!(object, HeadlessObject::ShadowCaster { .. }))
            .count()
    }

    /// Nearest pickable object along the ray. Lights and shadow associations
    /// are never pickable.
    pub fn pick_ray(&self, origin: Vec3, direction: Vec3) -> PickEvent {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return PickEvent::Miss;
        }

        let mut nearest: Option<(f32, ObjectHandle)> = None;
        for (handle, object) in &self.objects {
            let distance = match object {
                HeadlessObject::Sphere(sphere) if sphere.pickable => {
                    ray_sphere(origin, direction, sphere.position, sphere.diameter * 0.5)
                }
                HeadlessObject::Mesh { bounds, .. } => bounds.ray_intersection(origin, direction),
                _ => None,
            };
            if let Some(t) = distance {
                if nearest.map_or(true, |(best, _)| t < best) {
                    nearest = Some((t, *handle));
                }
            }
        }

        match nearest {
            Some((t, object)) => PickEvent::Hit(PickHit {
                object,
                entity_tag: self.tags.get(&object).cloned(),
                point: origin + direction * t,
            }),
            None => PickEvent::Miss,
        }
    }

    /// Top-down pick through floor coordinates `(x, z)`, matching the
    /// orthographic floorplan view.
    pub fn pick_floor(&self, x: f32, z: f32) -> PickEvent {
        self.pick_ray(Vec3::new(x, FLOOR_PICK_HEIGHT, z), Vec3::NEG_Y)
    }
}

fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(direction);
    // Distance from the center to the ray line, not `b*b - |oc|^2`, which
    // cancels out small radii when the origin is far away.
    let perp = oc - direction * b;
    let discriminant = radius * radius - perp.length_squared();
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let near = -b - root;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + root;
    (far >= 0.0).then_some(far)
}

impl SceneBackend for HeadlessScene {
    fn create_point_light(&mut self, params: &PointLightParams) -> Option<ObjectHandle> {
        Some(self.insert(HeadlessObject::PointLight(HeadlessLight {
            name: params.name.clone(),
            position: params.position,
            diffuse: params.color,
            specular: params.color,
            intensity: params.intensity,
            enabled: true,
            range: params.range,
            decay: params.decay,
        })))
    }

    fn set_light_intensity(&mut self, light: ObjectHandle, intensity: f32) {
        if let Some(HeadlessObject::PointLight(data)) = self.objects.get_mut(&light) {
            data.intensity = intensity;
        }
    }

    fn set_light_color(&mut self, light: ObjectHandle, color: Color) {
        if let Some(HeadlessObject::PointLight(data)) = self.objects.get_mut(&light) {
            data.diffuse = color;
        }
    }

    fn set_light_enabled(&mut self, light: ObjectHandle, enabled: bool) {
        if let Some(HeadlessObject::PointLight(data)) = self.objects.get_mut(&light) {
            data.enabled = enabled;
        }
    }

    fn create_hemispheric_light(&mut self, direction: Vec3, intensity: f32) -> Option<ObjectHandle> {
        Some(self.insert(HeadlessObject::HemisphericLight {
            direction,
            intensity,
        }))
    }

    fn create_sphere(&mut self, params: &SphereParams) -> Option<ObjectHandle> {
        if params.diameter.is_nan() || params.diameter <= 0.0 {
            log::warn!("Refusing sphere '{}' with diameter {}", params.name, params.diameter);
            return None;
        }
        Some(self.insert(HeadlessObject::Sphere(params.clone())))
    }

    fn set_entity_tag(&mut self, object: ObjectHandle, entity_id: &str) {
        if self.objects.contains_key(&object) {
            self.tags.insert(object, entity_id.to_string());
        }
    }

    fn clear_entity_tag(&mut self, object: ObjectHandle) {
        self.tags.remove(&object);
    }

    fn attach_shadow_caster(
        &mut self,
        light: ObjectHandle,
        casters: &[ObjectHandle],
    ) -> Option<ObjectHandle> {
        if self.light(light).is_none() {
            return None;
        }
        Some(self.insert(HeadlessObject::ShadowCaster {
            light,
            casters: casters.to_vec(),
        }))
    }

    fn dispose(&mut self, object: ObjectHandle) {
        if self.objects.remove(&object).is_none() {
            log::debug!("Dispose of unknown object {:?} ignored", object);
        }
        self.tags.remove(&object);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MeshManifest;

    fn floor_manifest() -> ModelManifest {
        ModelManifest {
            meshes: vec![
                MeshManifest {
                    name: "Floor".to_string(),
                    min: [0.0, 0.0, 0.0],
                    max: [10.0, 0.2, 8.0],
                },
                MeshManifest {
                    name: "Lamp_Kitchen".to_string(),
                    min: [1.0, 2.0, 1.0],
                    max: [1.4, 2.4, 1.4],
                },
            ],
        }
    }

    #[test]
    fn model_is_centered_on_origin() {
        let mut scene = HeadlessScene::new();
        let model = scene.load_model(&floor_manifest());
        assert_eq!(model.centering_offset(), Vec3::new(-5.0, -1.2, -4.0));
        assert!(model.bounds().center().length() < 1e-5);
        let lamp = model.find_mesh("Lamp_Kitchen").unwrap();
        assert!((lamp.position - Vec3::new(-3.8, 1.0, -2.8)).length() < 1e-5);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn floor_pick_prefers_nearest_object() {
        let mut scene = HeadlessScene::new();
        let model = scene.load_model(&floor_manifest());
        let proxy = scene
            .create_sphere(&SphereParams::proxy(
                "clickable_light.kitchen".to_string(),
                Vec3::new(2.0, 1.5, 1.0),
                1.0,
            ))
            .unwrap();
        scene.set_entity_tag(proxy, "light.kitchen");

        match scene.pick_floor(2.0, 1.0) {
            PickEvent::Hit(hit) => {
                assert_eq!(hit.object, proxy);
                assert_eq!(hit.entity_tag.as_deref(), Some("light.kitchen"));
                assert!((hit.point.y - 2.0).abs() < 1e-3);
            }
            PickEvent::Miss => panic!("expected a hit on the proxy"),
        }

        let floor = model.find_mesh("Floor").unwrap().handle;
        match scene.pick_floor(4.0, 3.0) {
            PickEvent::Hit(hit) => {
                assert_eq!(hit.object, floor);
                assert!(hit.entity_tag.is_none());
            }
            PickEvent::Miss => panic!("expected a hit on the floor"),
        }

        assert_eq!(scene.pick_floor(50.0, 50.0), PickEvent::Miss);
    }

    #[test]
    fn lights_are_not_pickable() {
        let mut scene = HeadlessScene::new();
        scene.create_point_light(&PointLightParams {
            name: "light.hall".to_string(),
            position: Vec3::ZERO,
            color: Color::WHITE,
            intensity: 1.0,
            range: None,
            decay: None,
        });
        assert_eq!(scene.pick_floor(0.0, 0.0), PickEvent::Miss);
        assert_eq!(scene.pick_ray(Vec3::ZERO, Vec3::ZERO), PickEvent::Miss);
    }

    #[test]
    fn dispose_is_idempotent_and_drops_tags() {
        let mut scene = HeadlessScene::new();
        let sphere = scene
            .create_sphere(&SphereParams::proxy("p".to_string(), Vec3::ZERO, 1.0))
            .unwrap();
        scene.set_entity_tag(sphere, "light.a");
        scene.dispose(sphere);
        scene.dispose(sphere);
        assert!(scene.is_empty());
        assert!(scene.tag(sphere).is_none());
        scene.set_light_intensity(sphere, 3.0);
        scene.set_entity_tag(sphere, "light.a");
        assert!(scene.tag(sphere).is_none());
    }

    #[test]
    fn small_sphere_is_hit_from_floor_pick_height() {
        let mut scene = HeadlessScene::new();
        scene.load_model(&floor_manifest());
        let center = Vec3::new(1.3, -0.9, -0.7);
        let sphere = scene
            .create_sphere(&SphereParams::proxy("small".to_string(), center, 0.3))
            .unwrap();
        for (dx, dz) in [(0.0, 0.0), (0.1, 0.0), (0.0, -0.12)] {
            match scene.pick_floor(center.x + dx, center.z + dz) {
                PickEvent::Hit(hit) => assert_eq!(hit.object, sphere),
                PickEvent::Miss => panic!("expected a hit on the sphere"),
            }
        }
        match scene.pick_floor(center.x + 0.2, center.z) {
            PickEvent::Hit(hit) => assert_ne!(hit.object, sphere),
            PickEvent::Miss => panic!("expected a hit on the floor"),
        }
    }

    #[test]
    fn markers_are_not_pickable() {
        let mut scene = HeadlessScene::new();
        let model = scene.load_model(&floor_manifest());
        scene
            .create_sphere(&SphereParams::marker(
                "marker".to_string(),
                Vec3::new(0.0, -0.9, 0.0),
                0.3,
                Color::GREEN,
            ))
            .unwrap();
        let floor = model.find_mesh("Floor").unwrap().handle;
        match scene.pick_floor(0.0, 0.0) {
            PickEvent::Hit(hit) => assert_eq!(hit.object, floor),
            PickEvent::Miss => panic!("expected a hit on the floor"),
        }
    }
}
