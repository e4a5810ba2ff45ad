//! Loaded model geometry as seen by the light binding.
//!
//! Parsing real model files is the renderer's business. The binding consumes
//! the result: named mesh handles with world positions, the hierarchy bounds,
//! and the offset that moved the model so its bounds are centered on the
//! origin. [`ModelManifest`] is the JSON stand-in the headless backend loads.

use crate::scene::ObjectHandle;
use glam::Vec3;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("model manifest contains no meshes")]
    Empty,
}

/// Axis-aligned bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn translated(&self, offset: Vec3) -> Bounds {
        Bounds {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Slab test. Returns the entry distance along `direction` (unit length).
    pub fn ray_intersection(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() <= f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        if t_max < 0.0 {
            return None;
        }
        Some(t_min.max(0.0))
    }
}

/// One mesh entry of a model manifest, in model space.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MeshManifest {
    pub name: String,
    pub min: [f32; 3],
    pub max: [f32; 3],
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelManifest {
    #[serde(default)]
    pub meshes: Vec<MeshManifest>,
}

pub fn load_manifest_from_file(path: &Path) -> Result<ModelManifest, ModelError> {
    let json = std::fs::read_to_string(path)?;
    let manifest: ModelManifest = serde_json::from_str(&json)?;
    if manifest.meshes.is_empty() {
        return Err(ModelError::Empty);
    }
    Ok(manifest)
}

/// A mesh after load and centering.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMesh {
    pub name: String,
    pub handle: ObjectHandle,
    /// World-space absolute position (center of the mesh bounds).
    pub position: Vec3,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    meshes: Vec<ModelMesh>,
    bounds: Bounds,
    centering_offset: Vec3,
}

impl LoadedModel {
    /// `meshes` are already in world space; `centering_offset` is the
    /// translation that was applied to the model root.
    pub fn new(meshes: Vec<ModelMesh>, centering_offset: Vec3) -> Self {
        let bounds = meshes
            .iter()
            .map(|mesh| mesh.bounds)
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or(Bounds::new(Vec3::ZERO, Vec3::ZERO));
        Self {
            meshes,
            bounds,
            centering_offset,
        }
    }

    /// Nothing loaded. Named lookups always fail.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec3::ZERO)
    }

    pub fn meshes(&self) -> &[ModelMesh] {
        &self.meshes
    }

    pub fn mesh_handles(&self) -> Vec<ObjectHandle> {
        self.meshes.iter().map(|mesh| mesh.handle).collect()
    }

    /// First mesh with this name, like a scene-wide name lookup.
    pub fn find_mesh(&self, name: &str) -> Option<&ModelMesh> {
        self.meshes.iter().find(|mesh| mesh.name == name)
    }

    /// World-space bounds of the whole hierarchy.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn centering_offset(&self) -> Vec3 {
        self.centering_offset
    }
}
