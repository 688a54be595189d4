//! Game settings and preferences
//!
//! Persisted separately from game saves as a small JSON file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audio::{AudioSink, Bus, Mixer};
use crate::persistence::PersistError;

/// Default bus level (dB)
pub const DEFAULT_VOLUME_DB: f32 = -6.0;

/// Window mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WindowMode {
    #[default]
    Windowed,
    Fullscreen,
}

impl WindowMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowMode::Windowed => "Windowed",
            WindowMode::Fullscreen => "Fullscreen",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "windowed" | "window" => Some(WindowMode::Windowed),
            "fullscreen" | "full" => Some(WindowMode::Fullscreen),
            _ => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio (dB) ===
    pub master_volume_db: f32,
    pub music_volume_db: f32,
    pub sfx_volume_db: f32,

    // === Display ===
    /// Window size in pixels
    pub resolution: [u32; 2],
    pub window_mode: WindowMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume_db: DEFAULT_VOLUME_DB,
            music_volume_db: DEFAULT_VOLUME_DB,
            sfx_volume_db: DEFAULT_VOLUME_DB,

            resolution: [640, 360],
            window_mode: WindowMode::Windowed,
        }
    }
}

impl Settings {
    pub fn is_fullscreen(&self) -> bool {
        self.window_mode == WindowMode::Fullscreen
    }

    /// Bus level for `bus`
    pub fn volume_db(&self, bus: Bus) -> f32 {
        match bus {
            Bus::Master => self.master_volume_db,
            Bus::Music => self.music_volume_db,
            Bus::Sfx => self.sfx_volume_db,
        }
    }

    /// Load settings from a JSON file, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, PersistError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Save settings to a JSON file
    pub fn save_to(&self, path: &Path) -> Result<(), PersistError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Push the volume levels to the mixer
    pub fn apply(&self, mixer: &mut Mixer, sink: &mut dyn AudioSink) {
        for bus in Bus::ALL {
            mixer.set_volume_db(bus, self.volume_db(bus), sink);
        }
    }
}
