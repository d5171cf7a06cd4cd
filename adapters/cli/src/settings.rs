use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use bbcs_system_clock::ClockConfig;
use serde::Deserialize;

const DEFAULT_FRAME_DELTA: f64 = 1.0;

/// Session settings read from an optional TOML file.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Ticks advanced per unit of frame time.
    pub(crate) time_speed: f64,
    /// Frame time fed to the clock on every simulated frame.
    pub(crate) frame_delta: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_speed: ClockConfig::default().time_speed(),
            frame_delta: DEFAULT_FRAME_DELTA,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults for omitted keys.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(contents).context("failed to parse settings toml contents")?;
        if !(settings.time_speed.is_finite() && settings.time_speed > 0.0) {
            bail!("time_speed must be positive, got {}", settings.time_speed);
        }
        if !(settings.frame_delta.is_finite() && settings.frame_delta > 0.0) {
            bail!("frame_delta must be positive, got {}", settings.frame_delta);
        }
        Ok(settings)
    }

    /// Clock configuration described by these settings.
    pub(crate) fn clock_config(&self) -> ClockConfig {
        ClockConfig::new(self.time_speed)
    }
}
