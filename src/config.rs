use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::alarm::always_true;

#[must_use]
pub const fn default_snooze_minutes() -> u32 {
    5
}

fn default_time_format() -> String {
    "%l:%M %p".to_string()
}

/// everything the engine's host configures: display formatting, snooze
/// length, the notification preference and the sound library.
/// alarms themselves live in their own file, see [`crate::store::TomlFile`].
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_time_format")]
    pub time_format: String,
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: u32,
    #[serde(default = "always_true")]
    pub notifications: bool,
    #[serde(flatten)]
    pub sounds: Sounds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_format: default_time_format(),
            snooze_minutes: default_snooze_minutes(),
            notifications: true,
            sounds: Sounds::default(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// a missing or unreadable config is not an error, just the defaults
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                log::info!("no config at {}: {e}", path.display());
                return Self::default();
            }
        };
        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("couldn't parse config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) {
        let contents = match toml::to_string(self) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("couldn't serialize config: {e}");
                return;
            }
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!("couldn't create config dir {}: {e}", parent.display());
                return;
            }
        }
        if let Err(e) = std::fs::write(path, contents) {
            log::warn!("couldn't write config {}: {e}", path.display());
        }
    }

    /// # Panics
    /// when the platform has no home directory to hang a config dir off of
    #[must_use]
    pub fn config_path() -> PathBuf {
        let mut path = directories::ProjectDirs::from("", "", "reveille")
            .expect("couldn't get config path")
            .config_dir()
            .to_path_buf();
        path.push("config.toml");
        path
    }

    /// the alarm list is kept next to the config, in its own file
    #[must_use]
    pub fn alarms_path() -> PathBuf {
        let mut path = Self::config_path();
        path.pop();
        path.push("alarms.toml");
        path
    }

    /// # Panics
    /// when the platform has no home directory to hang a data dir off of
    #[must_use]
    pub fn sounds_path() -> PathBuf {
        let mut path = directories::ProjectDirs::from("", "", "reveille")
            .expect("couldn't get sounds directory path")
            .data_dir()
            .to_path_buf();
        path.push("sounds");
        path
    }

    #[must_use]
    pub fn is_config_present() -> bool {
        Self::config_path().exists()
    }
}

/// the sound library: named tones mapped to files on disk.
/// `default_sound` comes first so the flattened toml keeps plain values
/// ahead of the `[sounds.*]` tables.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Sounds {
    pub default_sound: String,
    pub sounds: HashMap<String, Sound>,
}

impl Default for Sounds {
    fn default() -> Self {
        Self {
            default_sound: Sound::default_name(),
            sounds: [
                ("ring".to_string(), Sound::ring()),
                ("bing bong".to_string(), Sound::bing_bong()),
                ("tick tock".to_string(), Sound::tick_tock()),
                ("beep beep".to_string(), Sound::beep_beep()),
                ("rain".to_string(), Sound::rain()),
            ]
            .into_iter()
            .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Sound {
    pub name: String,
    pub path: PathBuf,
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.name,
            self.path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
        )
    }
}

impl Default for Sound {
    fn default() -> Self {
        Self::beep_beep()
    }
}

impl Sound {
    #[must_use]
    pub fn default_name() -> String {
        Self::default().name
    }

    #[must_use]
    pub const fn new(name: String, path: PathBuf) -> Self {
        Self { name, path }
    }

    #[must_use]
    pub fn ring() -> Self {
        Self {
            name: "ring".to_string(),
            path: Config::sounds_path().join("ring.mp3"),
        }
    }

    #[must_use]
    pub fn bing_bong() -> Self {
        Self {
            name: "bing bong".to_string(),
            path: Config::sounds_path().join("bing_bong.mp3"),
        }
    }

    #[must_use]
    pub fn tick_tock() -> Self {
        Self {
            name: "tick tock".to_string(),
            path: Config::sounds_path().join("tick_tock.mp3"),
        }
    }

    #[must_use]
    pub fn beep_beep() -> Self {
        Self {
            name: "beep beep".to_string(),
            path: Config::sounds_path().join("beep_beep.mp3"),
        }
    }

    #[must_use]
    pub fn rain() -> Self {
        Self {
            name: "rain".to_string(),
            path: Config::sounds_path().join("rain.mp3"),
        }
    }
}
