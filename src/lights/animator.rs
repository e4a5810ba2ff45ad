use super::LightEntry;
use crate::scene::SceneBackend;

/// Below this distance the current intensity snaps onto the target.
pub const SNAP_THRESHOLD: f32 = 0.01;
/// Fraction of the remaining distance covered per frame.
pub const SMOOTHING_FACTOR: f32 = 0.1;
/// Lights at or below this intensity are disabled in the scene.
pub const VISIBILITY_THRESHOLD: f32 = 0.01;

/// One frame of exponential smoothing. Frame-rate dependent: there is no
/// time-delta normalization.
pub fn step(current: f32, target: f32) -> f32 {
    let delta = target - current;
    if delta.abs() < SNAP_THRESHOLD {
        target
    } else {
        current + delta * SMOOTHING_FACTOR
    }
}

/// Advances `entry` one frame and pushes the result to its scene light.
pub fn tick(entry: &mut LightEntry, scene: &mut dyn SceneBackend) {
    let next = step(entry.current_intensity(), entry.target_intensity());
    entry.set_current_intensity(next);
    scene.set_light_intensity(entry.light(), entry.current_intensity());

    let enabled = entry.current_intensity() > VISIBILITY_THRESHOLD;
    if enabled != entry.is_enabled() {
        entry.set_enabled(enabled);
        scene.set_light_enabled(entry.light(), enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LightDescriptor, PositionSource};
    use crate::scene::{Color, HeadlessScene, PointLightParams};
    use glam::Vec3;

    fn entry_with_light(scene: &mut HeadlessScene, max: f32) -> LightEntry {
        let light = scene
            .create_point_light(&PointLightParams {
                name: "light.test".to_string(),
                position: Vec3::ZERO,
                color: Color::WHITE,
                intensity: 0.0,
                range: None,
                decay: None,
            })
            .unwrap();
        let mut descriptor = LightDescriptor::new("light.test", PositionSource::Explicit(Vec3::ZERO));
        descriptor.max_intensity = max;
        LightEntry::new(&descriptor, Vec3::ZERO, light, None)
    }

    #[test]
    fn step_snaps_inside_threshold() {
        assert_eq!(step(0.995, 1.0), 1.0);
        assert_eq!(step(1.0, 1.0), 1.0);
        assert!((step(0.0, 1.0) - 0.1).abs() < 1e-6);
        assert!((step(1.0, 0.0) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn converges_then_stays_exact() {
        let mut scene = HeadlessScene::new();
        let mut entry = entry_with_light(&mut scene, 2.0);
        entry.set_target_intensity(1.7);
        let mut frames = 0;
        while entry.current_intensity() != entry.target_intensity() {
            tick(&mut entry, &mut scene);
            frames += 1;
            assert!(entry.current_intensity() <= 1.7, "overshoot at frame {}", frames);
            assert!(frames < 200, "did not converge");
        }
        for _ in 0..10 {
            tick(&mut entry, &mut scene);
            assert_eq!(entry.current_intensity(), 1.7);
        }
        let light = scene.light(entry.light()).unwrap();
        assert_eq!(light.intensity, 1.7);
        assert!(light.enabled);
    }

    #[test]
    fn monotonic_in_both_directions() {
        let mut scene = HeadlessScene::new();
        let mut entry = entry_with_light(&mut scene, 1.0);
        entry.set_target_intensity(1.0);
        let mut previous = entry.current_intensity();
        for _ in 0..100 {
            tick(&mut entry, &mut scene);
            assert!(entry.current_intensity() >= previous);
            previous = entry.current_intensity();
        }
        assert_eq!(previous, 1.0);

        entry.set_target_intensity(0.0);
        for _ in 0..100 {
            tick(&mut entry, &mut scene);
            assert!(entry.current_intensity() <= previous);
            assert!(entry.current_intensity() >= 0.0);
            previous = entry.current_intensity();
        }
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn dark_light_is_disabled() {
        let mut scene = HeadlessScene::new();
        let mut entry = entry_with_light(&mut scene, 1.0);
        entry.set_target_intensity(1.0);
        tick(&mut entry, &mut scene);
        assert!(entry.is_enabled());
        assert!(scene.light(entry.light()).unwrap().enabled);

        entry.set_target_intensity(0.0);
        for _ in 0..100 {
            tick(&mut entry, &mut scene);
        }
        assert!(!entry.is_enabled());
        let light = scene.light(entry.light()).unwrap();
        assert!(!light.enabled);
        assert_eq!(light.intensity, 0.0);
    }
}
