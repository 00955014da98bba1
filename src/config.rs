use crate::error::{Result, SandError};
use crate::settings::SimulationSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tunable parameters exported/imported as JSON. Grid contents are never saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Version field for future compatibility
    pub version: u32,
    /// All simulation settings
    pub settings: SimulationSettings,
    /// Steps per tick (app-level)
    pub steps_per_frame: usize,
}

impl AppConfig {
    /// `<config dir>/sand-simulation/config.json`
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("sand-simulation").join("config.json"))
            .ok_or(SandError::NoConfigDir)
    }

    /// Export config to a JSON file, creating parent directories
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SandError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| SandError::io(path, e))
    }

    /// Import config from a JSON file; out-of-range values are clamped
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SandError::io(path, e))?;
        let mut config: AppConfig = serde_json::from_str(&content)?;
        config.settings.sanitize();
        config.steps_per_frame = config.steps_per_frame.clamp(1, 10);
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            settings: SimulationSettings::default(),
            steps_per_frame: 1,
        }
    }
}
