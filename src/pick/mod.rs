//! Pick resolution.
//!
//! The renderer translates a pointer-down into a [`PickEvent`]: either the
//! object under the pointer plus its world-space hit point, or nothing.
//! [`PickResolver`] turns that into at most one outcome: a toggle command for a
//! tagged object, or diagnostic coordinates when debug mode is on.

use crate::command::ToggleCommand;
use crate::scene::ObjectHandle;
use glam::Vec3;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub object: ObjectHandle,
    /// Entity id attached to the hit object at binding time, if any.
    pub entity_tag: Option<String>,
    pub point: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PickEvent {
    Hit(PickHit),
    Miss,
}

/// Coordinates of a debug click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugInfo {
    pub world_point: Vec3,
    /// `world_point` relative to the model's centering offset, i.e. in the
    /// coordinates of the original, uncentered floorplan.
    pub local_point: Vec3,
}

impl fmt::Display for DebugInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.local_point;
        write!(f, "xy: [{:.2}, {:.2}], height: {:.2}", p.x, p.z, p.y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    Toggle(ToggleCommand),
    Debug(DebugInfo),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickResolver {
    debug_mode: bool,
    centering_offset: Vec3,
}

impl PickResolver {
    pub fn new(debug_mode: bool, centering_offset: Vec3) -> Self {
        Self {
            debug_mode,
            centering_offset,
        }
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn resolve(&self, event: &PickEvent) -> Option<PickOutcome> {
        let PickEvent::Hit(hit) = event else {
            return None;
        };
        // Tagged objects always win, debug mode or not.
        if let Some(entity_id) = hit.entity_tag.as_deref().filter(|id| !id.is_empty()) {
            return Some(PickOutcome::Toggle(ToggleCommand::toggle_light(entity_id)));
        }
        if self.debug_mode {
            return Some(PickOutcome::Debug(DebugInfo {
                world_point: hit.point,
                local_point: hit.point - self.centering_offset,
            }));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(tag: Option<&str>, point: Vec3) -> PickEvent {
        PickEvent::Hit(PickHit {
            object: ObjectHandle::from_raw(3),
            entity_tag: tag.map(str::to_string),
            point,
        })
    }

    #[test]
    fn tagged_hit_toggles_regardless_of_debug_mode() {
        for debug_mode in [false, true] {
            let resolver = PickResolver::new(debug_mode, Vec3::new(-5.0, 0.0, -4.0));
            let outcome = resolver.resolve(&hit(Some("light.kitchen"), Vec3::ZERO));
            match outcome {
                Some(PickOutcome::Toggle(command)) => {
                    assert_eq!(command.entity_id, "light.kitchen");
                    assert_eq!(command.domain, "light");
                    assert_eq!(command.service, "toggle");
                }
                other => panic!("expected toggle, got {:?}", other),
            }
        }
    }

    #[test]
    fn miss_yields_nothing() {
        let resolver = PickResolver::new(true, Vec3::ZERO);
        assert!(resolver.resolve(&PickEvent::Miss).is_none());
    }

    #[test]
    fn untagged_hit_reports_local_coordinates_in_debug_mode() {
        let resolver = PickResolver::new(true, Vec3::new(-5.0, -1.0, -4.0));
        let outcome = resolver.resolve(&hit(None, Vec3::new(1.0, 0.0, 2.0)));
        let Some(PickOutcome::Debug(info)) = outcome else {
            panic!("expected debug info, got {:?}", outcome);
        };
        assert_eq!(info.world_point, Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(info.local_point, Vec3::new(6.0, 1.0, 6.0));
        assert_eq!(info.to_string(), "xy: [6.00, 6.00], height: 1.00");
    }

    #[test]
    fn untagged_hit_without_debug_mode_yields_nothing() {
        let resolver = PickResolver::new(false, Vec3::ZERO);
        assert!(resolver.resolve(&hit(None, Vec3::ONE)).is_none());
        assert!(resolver.resolve(&hit(Some(""), Vec3::ONE)).is_none());
    }
}
