use std::time::{Duration, Instant};

/// Frame cadence bookkeeping. Reports fps through the log every half second.
pub struct FrameTiming {
    last_frame_time: Option<Instant>,
    last_fps_time: Instant,
    frame_count: u32,
    frames_total: u64,
    frame_dt: f32,
    label: String,
}

impl FrameTiming {
    pub fn new(label: String) -> Self {
        Self {
            last_frame_time: None,
            last_fps_time: Instant::now(),
            frame_count: 0,
            frames_total: 0,
            frame_dt: 1.0 / 60.0,
            label,
        }
    }

    pub fn frames_total(&self) -> u64 {
        self.frames_total
    }

    pub fn update(&mut self, now: Instant) {
        let dt_duration = if let Some(last) = self.last_frame_time {
            now.saturating_duration_since(last)
        } else {
            Duration::from_millis(16)
        };
        self.last_frame_time = Some(now);
        self.frame_dt = dt_duration.as_secs_f32().max(0.0);
        self.frames_total = self.frames_total.saturating_add(1);

        self.frame_count = self.frame_count.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.last_fps_time);
        if elapsed.as_secs_f32() >= 0.5 {
            let fps = self.frame_count as f32 / elapsed.as_secs_f32();
            let ms = (self.frame_dt * 1000.0).max(0.0);
            log::debug!("{} - {:.1} fps (cadence {:.2} ms)", self.label, fps, ms);
            self.frame_count = 0;
            self.last_fps_time = now;
        }
    }
}

/// Duration of one frame at `fps`, falling back to 60 fps for unusable rates.
pub fn target_frame_duration(fps: f32) -> Duration {
    if fps.is_finite() && fps > 1.0 {
        Duration::from_secs_f32(1.0 / fps)
    } else {
        Duration::from_millis(16)
    }
}
