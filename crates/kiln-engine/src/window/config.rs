use std::path::PathBuf;

use winit::dpi::LogicalSize;

/// Main window settings.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
    /// Directory receiving `kiln-startup.json`, `kiln-runtime.json` and
    /// `kiln-shutdown.json` traces. `None` disables profiling sessions.
    pub profile_dir: Option<PathBuf>,
}

impl RuntimeConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.initial_size = LogicalSize::new(width, height);
        self
    }

    pub fn with_profiling(mut self, dir: impl Into<PathBuf>) -> Self {
        self.profile_dir = Some(dir.into());
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "kiln".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            resizable: true,
            profile_dir: None,
        }
    }
}
