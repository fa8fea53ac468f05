//! Engine settings and window bookkeeping.
//!
//! Settings are owned by the [`Context`](crate::context::Context) and
//! passed where needed; there is no global registry. Startup values come
//! from a line-oriented `key value` file, everything else is updated by the
//! window shell as events arrive.

use std::path::Path;
use std::time::Duration;

use cgmath::Vector2;
use instant::Instant;

#[derive(Debug, Clone)]
pub struct Settings {
    window_title: String,
    physical_window_size: Vector2<u32>,
    pointer_position: Vector2<f32>,
    fixed_step: Duration,
    aspect_ratio_changed: bool,
    minimised: bool,
    load_time: Instant,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_title: "engine".to_string(),
            physical_window_size: Vector2::new(1280, 720),
            pointer_position: Vector2::new(0.0, 0.0),
            fixed_step: Duration::from_millis(16),
            aspect_ratio_changed: false,
            minimised: false,
            load_time: Instant::now(),
        }
    }
}

impl Settings {
    /// Load from a `key value` file, one pair per line. Lines starting with
    /// `#` and blank lines are skipped; unknown keys and malformed values
    /// are logged and skipped. A missing file is an error.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let mut settings = Self::default();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(char::is_whitespace) else {
                log::warn!("settings line {} has no value: `{line}`", number + 1);
                continue;
            };
            let value = value.trim();
            match key {
                "window_title" => settings.window_title = value.to_string(),
                "window_width" => match value.parse() {
                    Ok(w) => settings.physical_window_size.x = w,
                    Err(_) => log::warn!("bad window_width `{value}`"),
                },
                "window_height" => match value.parse() {
                    Ok(h) => settings.physical_window_size.y = h,
                    Err(_) => log::warn!("bad window_height `{value}`"),
                },
                "fixed_step_millis" => match value.parse() {
                    Ok(ms) => settings.fixed_step = Duration::from_millis(ms),
                    Err(_) => log::warn!("bad fixed_step_millis `{value}`"),
                },
                other => log::warn!("unknown settings key `{other}`"),
            }
        }
        Ok(settings)
    }

    pub fn window_title(&self) -> &str {
        &self.window_title
    }

    pub fn physical_window_size(&self) -> Vector2<u32> {
        self.physical_window_size
    }

    /// Records the new size, tracks minimisation and flags the aspect ratio
    /// as changed so renderers can re-derive size dependent data.
    pub fn set_physical_window_size(&mut self, width: u32, height: u32) {
        self.minimised = width == 0 || height == 0;
        if self.minimised {
            return;
        }
        if Vector2::new(width, height) != self.physical_window_size {
            self.physical_window_size = Vector2::new(width, height);
            self.aspect_ratio_changed = true;
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.physical_window_size.y == 0 {
            return 1.0;
        }
        self.physical_window_size.x as f32 / self.physical_window_size.y as f32
    }

    pub fn aspect_ratio_changed(&self) -> bool {
        self.aspect_ratio_changed
    }

    pub fn clear_aspect_ratio_changed(&mut self) {
        self.aspect_ratio_changed = false;
    }

    pub fn minimised(&self) -> bool {
        self.minimised
    }

    pub fn pointer_position(&self) -> Vector2<f32> {
        self.pointer_position
    }

    pub fn set_pointer_position(&mut self, x: f32, y: f32) {
        self.pointer_position = Vector2::new(x, y);
    }

    pub fn fixed_step(&self) -> Duration {
        self.fixed_step
    }

    pub fn seconds_since_load(&self) -> f32 {
        self.load_time.elapsed().as_secs_f32()
    }
}
