use crate::command::{CommandError, CommandSink};
use crate::state::{EntitySnapshot, EntityState, STATE_OFF, STATE_ON};
use std::collections::BTreeMap;

/// Stand-in for the host state store. Every mutation marks a new snapshot
/// pending; the app picks it up on the next frame.
#[derive(Debug, Default)]
pub struct SimulatedHome {
    states: BTreeMap<String, EntityState>,
    dirty: bool,
    toggles: Vec<String>,
}

impl SimulatedHome {
    /// Each entity starts `"off"`.
    pub fn with_entities<I, S>(entity_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let states = entity_ids
            .into_iter()
            .map(|id| (id.into(), EntityState::off()))
            .collect();
        Self {
            states,
            dirty: true,
            toggles: Vec::new(),
        }
    }

    pub fn state(&self, entity_id: &str) -> Option<&EntityState> {
        self.states.get(entity_id)
    }

    pub fn set_state(&mut self, entity_id: &str, state: EntityState) {
        self.states.insert(entity_id.to_string(), state);
        self.dirty = true;
    }

    /// Toggles received so far, in order.
    pub fn toggles(&self) -> &[String] {
        &self.toggles
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        self.states
            .iter()
            .map(|(id, state)| (id.clone(), state.clone()))
            .collect()
    }

    /// Snapshot of the current state if it changed since the last call.
    pub fn take_pending_snapshot(&mut self) -> Option<EntitySnapshot> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.snapshot())
    }
}

impl CommandSink for SimulatedHome {
    fn toggle_light(&mut self, entity_id: &str) -> Result<(), CommandError> {
        let state = self
            .states
            .get_mut(entity_id)
            .ok_or_else(|| CommandError::UnknownEntity(entity_id.to_string()))?;
        let next = if state.is_on() { STATE_OFF } else { STATE_ON };
        state.state = next.to_string();
        self.toggles.push(entity_id.to_string());
        self.dirty = true;
        log::info!("{} -> {}", entity_id, next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_off_and_initially_pending() {
        let mut home = SimulatedHome::with_entities(["light.a", "light.b"]);
        assert_eq!(home.state("light.a"), Some(&EntityState::off()));
        let snapshot = home.take_pending_snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(home.take_pending_snapshot().is_none());
    }

    #[test]
    fn toggle_flips_and_keeps_attributes() {
        let mut home = SimulatedHome::with_entities(["light.a"]);
        home.set_state("light.a", EntityState::on().with_brightness(100.0));
        let _ = home.take_pending_snapshot();

        home.toggle_light("light.a").unwrap();
        let state = home.state("light.a").unwrap();
        assert!(!state.is_on());
        assert_eq!(state.attributes.brightness, Some(100.0));
        assert!(home.take_pending_snapshot().is_some());

        home.toggle_light("light.a").unwrap();
        assert!(home.state("light.a").unwrap().is_on());
        assert_eq!(home.toggles(), ["light.a", "light.a"]);
    }

    #[test]
    fn unknown_entity_is_rejected() {
        let mut home = SimulatedHome::with_entities(["light.a"]);
        let _ = home.take_pending_snapshot();
        assert_eq!(
            home.toggle_light("light.zzz"),
            Err(CommandError::UnknownEntity("light.zzz".to_string()))
        );
        assert!(home.take_pending_snapshot().is_none());
        assert!(home.toggles().is_empty());
    }
}
