use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

const MIN_RENDER_DISTANCE: i32 = 2;
const MAX_RENDER_DISTANCE: i32 = 32;
const MIN_FOV: f32 = 60.0;
const MAX_FOV: f32 = 120.0;

/// Renderer configuration persisted as TOML. Out-of-range values from a
/// hand-edited file are clamped rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default = "default_render_distance")]
    pub render_distance: i32,
    #[serde(default = "default_fov")]
    pub fov: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            render_distance: default_render_distance(),
            fov: default_fov(),
        }
    }
}

impl RenderSettings {
    pub fn sanitize(mut self) -> Self {
        self.render_distance = self
            .render_distance
            .clamp(MIN_RENDER_DISTANCE, MAX_RENDER_DISTANCE);
        self.fov = self.fov.clamp(MIN_FOV, MAX_FOV);
        self
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let parsed = toml::from_str::<Self>(&contents).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to deserialize render settings: {e}"),
            )
        })?;
        Ok(parsed.sanitize())
    }

    /// Missing or unreadable settings fall back to defaults; a sandbox
    /// session should never refuse to start over a config file.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                warn!("ignoring render settings at {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let settings = self.clone().sanitize();
        let serialized = toml::to_string_pretty(&settings).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to serialize render settings: {e}"),
            )
        })?;
        fs::write(path, serialized)
    }
}

fn default_render_distance() -> i32 {
    12
}

fn default_fov() -> f32 {
    70.0
}
