//! Scripted timeline of host-side events for headless runs.

use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptAction {
    /// Host reports a new state for `entity_id`.
    SetState {
        entity_id: String,
        state: String,
        #[serde(default)]
        brightness: Option<f64>,
        #[serde(default)]
        rgb_color: Option<[f64; 3]>,
    },
    /// Pointer-down at floor coordinates `[x, z]`, picked top-down.
    Pick { xz: [f32; 2] },
    Teardown,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScriptEvent {
    pub frame: u64,
    pub action: ScriptAction,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    #[serde(default)]
    events: Vec<ScriptEvent>,
    #[serde(skip)]
    cursor: usize,
}

impl Timeline {
    pub fn new(mut events: Vec<ScriptEvent>) -> Self {
        events.sort_by_key(|event| event.frame);
        Self { events, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Actions scheduled at or before `frame` that have not been taken yet,
    /// in file order for equal frames.
    pub fn take_due(&mut self, frame: u64) -> Vec<ScriptAction> {
        let start = self.cursor;
        while self
            .events
            .get(self.cursor)
            .is_some_and(|event| event.frame <= frame)
        {
            self.cursor += 1;
        }
        self.events[start..self.cursor]
            .iter()
            .map(|event| event.action.clone())
            .collect()
    }
}

pub fn parse_timeline(json: &str) -> Result<Timeline, ScriptError> {
    let timeline: Timeline = serde_json::from_str(json)?;
    Ok(Timeline::new(timeline.events))
}

pub fn load_timeline_from_file(path: &Path) -> Result<Timeline, ScriptError> {
    let json = std::fs::read_to_string(path)?;
    parse_timeline(&json)
}
