use super::LightEntry;
use crate::config::LightDescriptor;
use crate::scene::Color;
use crate::state::{EntityAttributes, EntitySnapshot};

const MAX_BRIGHTNESS: f64 = 255.0;

/// Updates `entry`'s target intensity and color from `snapshot`.
///
/// Returns whether the color changed, so the caller knows to push it to the
/// scene. An entity missing from the snapshot leaves the entry untouched.
pub fn resolve(
    descriptor: &LightDescriptor,
    entry: &mut LightEntry,
    snapshot: &EntitySnapshot,
) -> bool {
    let Some(state) = snapshot.get(&descriptor.entity_id) else {
        return false;
    };
    let on = state.is_on();

    let color = match state.attributes.rgb_color {
        Some(rgb) if on => Some(Color::from_ints(rgb)),
        _ => descriptor.static_color,
    };
    let color_changed = match color {
        Some(color) if color != entry.color() => {
            entry.set_color(color);
            true
        }
        _ => false,
    };

    let target = if on {
        entry.max_intensity() * brightness_fraction(&state.attributes)
    } else {
        0.0
    };
    entry.set_target_intensity(target);

    color_changed
}

/// Unknown brightness means full brightness.
fn brightness_fraction(attributes: &EntityAttributes) -> f32 {
    attributes
        .brightness
        .filter(|value| value.is_finite())
        .map(|value| (value / MAX_BRIGHTNESS).clamp(0.0, 1.0) as f32)
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PositionSource;
    use crate::scene::ObjectHandle;
    use crate::state::EntityState;
    use glam::Vec3;

    fn descriptor(max: f32, color: Option<Color>) -> LightDescriptor {
        let mut d = LightDescriptor::new("light.kitchen", PositionSource::Explicit(Vec3::ZERO));
        d.max_intensity = max;
        d.static_color = color;
        d
    }

    fn snapshot(state: EntityState) -> EntitySnapshot {
        [("light.kitchen".to_string(), state)].into_iter().collect()
    }

    fn entry_for(d: &LightDescriptor) -> LightEntry {
        LightEntry::new(d, Vec3::ZERO, ObjectHandle::from_raw(1), None)
    }

    #[test]
    fn brightness_scales_max_intensity() {
        let d = descriptor(2.0, None);
        let mut entry = entry_for(&d);
        resolve(&d, &mut entry, &snapshot(EntityState::on().with_brightness(128.0)));
        assert!((entry.target_intensity() - 2.0 * (128.0 / 255.0)).abs() < 1e-5);
        assert!((entry.target_intensity() - 1.003).abs() < 1e-3);
    }

    #[test]
    fn missing_brightness_means_full() {
        let d = descriptor(2.0, None);
        let mut entry = entry_for(&d);
        resolve(&d, &mut entry, &snapshot(EntityState::on()));
        assert_eq!(entry.target_intensity(), 2.0);
    }

    #[test]
    fn out_of_range_brightness_is_clamped() {
        let d = descriptor(1.5, None);
        let mut entry = entry_for(&d);
        resolve(&d, &mut entry, &snapshot(EntityState::on().with_brightness(400.0)));
        assert_eq!(entry.target_intensity(), 1.5);
        resolve(&d, &mut entry, &snapshot(EntityState::on().with_brightness(f64::NAN)));
        assert_eq!(entry.target_intensity(), 1.5);
    }

    #[test]
    fn any_other_state_targets_zero() {
        let d = descriptor(1.0, None);
        for state in ["off", "unavailable", "unknown"] {
            let mut entry = entry_for(&d);
            resolve(&d, &mut entry, &snapshot(EntityState::on()));
            assert_eq!(entry.target_intensity(), 1.0);
            resolve(&d, &mut entry, &snapshot(EntityState::new(state).with_brightness(200.0)));
            assert_eq!(entry.target_intensity(), 0.0, "state {}", state);
        }
    }

    #[test]
    fn missing_entity_keeps_last_target() {
        let d = descriptor(1.0, Some(Color::GREEN));
        let mut entry = entry_for(&d);
        resolve(&d, &mut entry, &snapshot(EntityState::on().with_brightness(51.0)));
        let before = entry.clone();
        let changed = resolve(&d, &mut entry, &EntitySnapshot::new());
        assert!(!changed);
        assert_eq!(entry, before);
    }

    #[test]
    fn explicit_rgb_wins_when_on() {
        let d = descriptor(1.0, Some(Color::GREEN));
        let mut entry = entry_for(&d);
        let changed = resolve(
            &d,
            &mut entry,
            &snapshot(EntityState::on().with_rgb([255.0, 0.0, 0.0])),
        );
        assert!(changed);
        assert_eq!(entry.color(), Color::RED);
    }

    #[test]
    fn static_color_used_without_rgb() {
        let d = descriptor(1.0, Some(Color::GREEN));
        let mut entry = entry_for(&d);
        resolve(
            &d,
            &mut entry,
            &snapshot(EntityState::on().with_rgb([255.0, 0.0, 0.0])),
        );
        let changed = resolve(&d, &mut entry, &snapshot(EntityState::on()));
        assert!(changed);
        assert_eq!(entry.color(), Color::GREEN);

        // rgb reported while off does not apply
        resolve(
            &d,
            &mut entry,
            &snapshot(EntityState::off().with_rgb([0.0, 0.0, 255.0])),
        );
        assert_eq!(entry.color(), Color::GREEN);
    }

    #[test]
    fn color_retained_without_any_source() {
        let d = descriptor(1.0, None);
        let mut entry = entry_for(&d);
        resolve(
            &d,
            &mut entry,
            &snapshot(EntityState::on().with_rgb([0.0, 0.0, 255.0])),
        );
        let blue = entry.color();
        assert_eq!(blue, Color::new(0.0, 0.0, 1.0));

        let changed = resolve(&d, &mut entry, &snapshot(EntityState::on()));
        assert!(!changed);
        assert_eq!(entry.color(), blue);
        resolve(&d, &mut entry, &snapshot(EntityState::off()));
        assert_eq!(entry.color(), blue);
    }

    #[test]
    fn repeated_snapshot_is_a_no_op() {
        let d = descriptor(1.0, None);
        let mut entry = entry_for(&d);
        let snap = snapshot(EntityState::on().with_brightness(128.0).with_rgb([10.0, 20.0, 30.0]));
        assert!(resolve(&d, &mut entry, &snap));
        let before = entry.clone();
        assert!(!resolve(&d, &mut entry, &snap));
        assert_eq!(entry, before);
    }
}
