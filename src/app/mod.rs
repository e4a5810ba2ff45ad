mod home;
mod script;
mod timing;

pub use home::SimulatedHome;
pub use script::{
    load_timeline_from_file, parse_timeline, ScriptAction, ScriptError, ScriptEvent, Timeline,
};
pub use timing::{target_frame_duration, FrameTiming};

use crate::command::CommandSink;
use crate::config::{load_config_from_file, CardConfig, ConfigError};
use crate::lights::{BuildReport, LightBinding};
use crate::model::{load_manifest_from_file, LoadedModel, ModelError, ModelManifest};
use crate::pick::{DebugInfo, PickOutcome};
use crate::scene::{Color, HeadlessScene, ObjectHandle, SceneBackend, SphereParams};
use crate::state::EntityState;

use glam::Vec3;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Diameter of the marker placed where a debug click landed.
pub const DEBUG_CLICK_DIAMETER: f32 = 0.3;
/// How long a debug click marker stays in the scene.
pub const DEBUG_CLICK_SECONDS: f32 = 5.0;

const AMBIENT_DIRECTION: Vec3 = Vec3::Y;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("model: {0}")]
    Model(#[from] ModelError),
    #[error("script: {0}")]
    Script(#[from] ScriptError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub fps: f32,
    /// Sleep between frames to hold `fps` instead of running flat out.
    pub realtime: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fps: 60.0,
            realtime: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LightReport {
    pub entity_id: String,
    pub current_intensity: f32,
    pub target_intensity: f32,
    pub max_intensity: f32,
    pub enabled: bool,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SkipReport {
    pub entity_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AppReport {
    pub frames: u64,
    pub registered: Vec<String>,
    pub skipped: Vec<SkipReport>,
    pub toggles: Vec<String>,
    pub lights: Vec<LightReport>,
}

struct DebugClick {
    marker: ObjectHandle,
    expires_at: u64,
}

/// Headless floorplan: scene, model, light binding and a simulated home,
/// advanced one frame at a time.
pub struct FloorplanApp {
    scene: HeadlessScene,
    model: LoadedModel,
    binding: LightBinding,
    home: SimulatedHome,
    timeline: Timeline,
    timing: FrameTiming,
    build_report: BuildReport,
    ambient_light: Option<ObjectHandle>,
    debug_clicks: Vec<DebugClick>,
    frame: u64,
    fps: f32,
    realtime: bool,
    target_frame_duration: Duration,
    next_frame_time: Instant,
}

impl FloorplanApp {
    pub fn new(
        config: &CardConfig,
        manifest: &ModelManifest,
        timeline: Timeline,
        options: RunOptions,
    ) -> Self {
        let mut scene = HeadlessScene::new();
        let ambient_light =
            scene.create_hemispheric_light(AMBIENT_DIRECTION, config.ambient_light_intensity);
        let model = scene.load_model(manifest);

        let mut binding = LightBinding::new(config.binding_options());
        let build_report = binding.build_from_config(config, &model, &mut scene);

        let mut home = SimulatedHome::with_entities(config.entity_ids());
        if let Some(snapshot) = home.take_pending_snapshot() {
            binding.apply_snapshot(&snapshot, &mut scene);
        }

        let target_frame_duration = target_frame_duration(options.fps);
        Self {
            scene,
            model,
            binding,
            home,
            timeline,
            timing: FrameTiming::new("floorplan3d".to_string()),
            build_report,
            ambient_light,
            debug_clicks: Vec::new(),
            frame: 0,
            fps: options.fps,
            realtime: options.realtime,
            target_frame_duration,
            next_frame_time: Instant::now(),
        }
    }

    /// Loads the card config, its model manifest and an optional script.
    /// Without `model_path` the manifest is `obj_path` relative to the config.
    pub fn from_files(
        config_path: &Path,
        model_path: Option<&Path>,
        script_path: Option<&Path>,
        options: RunOptions,
    ) -> Result<Self, AppError> {
        let config = load_config_from_file(config_path)?;
        let model_path = match model_path {
            Some(path) => path.to_path_buf(),
            None => resolve_model_path(config_path, &config.obj_path),
        };
        log::info!("Loading model manifest {}", model_path.display());
        let manifest = load_manifest_from_file(&model_path)?;
        let timeline = match script_path {
            Some(path) => load_timeline_from_file(path)?,
            None => Timeline::default(),
        };
        Ok(Self::new(&config, &manifest, timeline, options))
    }

    pub fn scene(&self) -> &HeadlessScene {
        &self.scene
    }

    pub fn model(&self) -> &LoadedModel {
        &self.model
    }

    pub fn binding(&self) -> &LightBinding {
        &self.binding
    }

    pub fn home(&self) -> &SimulatedHome {
        &self.home
    }

    pub fn home_mut(&mut self) -> &mut SimulatedHome {
        &mut self.home
    }

    pub fn build_report(&self) -> &BuildReport {
        &self.build_report
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn ambient_light(&self) -> Option<ObjectHandle> {
        self.ambient_light
    }

    pub fn debug_click_markers(&self) -> Vec<ObjectHandle> {
        self.debug_clicks.iter().map(|click| click.marker).collect()
    }

    /// Advances one frame.
    pub fn step_frame(&mut self) {
        for action in self.timeline.take_due(self.frame) {
            self.apply_action(action);
        }

        if let Some(snapshot) = self.home.take_pending_snapshot() {
            self.binding.apply_snapshot(&snapshot, &mut self.scene);
        }
        self.binding.tick(&mut self.scene);

        self.frame += 1;
        self.expire_debug_clicks();
        self.timing.update(Instant::now());
    }

    fn apply_action(&mut self, action: ScriptAction) {
        match action {
            ScriptAction::SetState {
                entity_id,
                state,
                brightness,
                rgb_color,
            } => {
                let mut entity = EntityState::new(&state);
                entity.attributes.brightness = brightness;
                entity.attributes.rgb_color = rgb_color;
                self.home.set_state(&entity_id, entity);
            }
            ScriptAction::Pick { xz: [x, z] } => self.pick_floor(x, z),
            ScriptAction::Teardown => self.teardown(),
        }
    }

    /// Pointer-down at floor coordinates `(x, z)`.
    pub fn pick_floor(&mut self, x: f32, z: f32) {
        let event = self.scene.pick_floor(x, z);
        match self.binding.resolve_pick(&event) {
            Some(PickOutcome::Toggle(command)) => {
                if let Err(err) = self.home.dispatch(&command) {
                    log::warn!("Toggle of {} failed: {}", command.entity_id, err);
                }
            }
            Some(PickOutcome::Debug(info)) => self.show_debug_click(info),
            None => {}
        }
    }

    fn show_debug_click(&mut self, info: DebugInfo) {
        log::info!("Debug click {}", info);
        let marker = self.scene.create_sphere(&SphereParams::marker(
            format!("debug_click_{}", self.frame),
            info.world_point,
            DEBUG_CLICK_DIAMETER,
            Color::GREEN,
        ));
        if let Some(marker) = marker {
            self.debug_clicks.push(DebugClick {
                marker,
                expires_at: self.frame.saturating_add(self.debug_click_frames()),
            });
        }
    }

    fn debug_click_frames(&self) -> u64 {
        let fps = if self.fps.is_finite() && self.fps > 0.0 {
            self.fps
        } else {
            60.0
        };
        (DEBUG_CLICK_SECONDS * fps).round() as u64
    }

    fn expire_debug_clicks(&mut self) {
        let frame = self.frame;
        let scene = &mut self.scene;
        self.debug_clicks.retain(|click| {
            if click.expires_at <= frame {
                scene.dispose(click.marker);
                false
            } else {
                true
            }
        });
    }

    /// Releases the binding and transient markers. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.binding.teardown(&mut self.scene);
        for click in self.debug_clicks.drain(..) {
            self.scene.dispose(click.marker);
        }
    }

    pub fn report(&self) -> AppReport {
        let mut lights: Vec<LightReport> = self
            .binding
            .registry()
            .iter()
            .map(|entry| LightReport {
                entity_id: entry.entity_id().to_string(),
                current_intensity: entry.current_intensity(),
                target_intensity: entry.target_intensity(),
                max_intensity: entry.max_intensity(),
                enabled: entry.is_enabled(),
                color: entry.color(),
            })
            .collect();
        lights.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));

        AppReport {
            frames: self.frame,
            registered: self.build_report.registered.clone(),
            skipped: self
                .build_report
                .skipped
                .iter()
                .map(|skipped| SkipReport {
                    entity_id: skipped.entity_id.clone(),
                    reason: skipped.reason.to_string(),
                })
                .collect(),
            toggles: self.home.toggles().to_vec(),
            lights,
        }
    }

    /// Runs `frames` frames, then tears down. Returns the state as of the
    /// last frame.
    pub fn run(&mut self, frames: u64) -> AppReport {
        log::info!("Running {} frames at {:.1} fps", frames, self.fps);
        self.next_frame_time = Instant::now();
        for _ in 0..frames {
            if self.realtime {
                self.wait_for_next_frame();
            }
            self.step_frame();
        }
        let report = self.report();
        self.teardown();
        log::info!("Finished after {} frames", self.timing.frames_total());
        report
    }

    fn wait_for_next_frame(&mut self) {
        let now = Instant::now();
        if now < self.next_frame_time {
            std::thread::sleep(self.next_frame_time - now);
        }
        self.next_frame_time = self.next_frame_time.max(now) + self.target_frame_duration;
    }
}

fn resolve_model_path(config_path: &Path, obj_path: &str) -> PathBuf {
    let obj_path = Path::new(obj_path.trim());
    if obj_path.is_absolute() {
        return obj_path.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) => dir.join(obj_path),
        None => obj_path.to_path_buf(),
    }
}
