// Application settings
// Loaded from ~/.config/ganttsheet/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG: &str = r#"{
    // Title given to sheets created without one
    "sheet.defaultTitle": "New Sheet",

    // Quiet period (milliseconds) before a live style change is written
    "style.debounceMs": 100,

    // Key the workbook is stored under
    "storage.key": "gantt-sheets-storage",

    // Directory holding stored workbooks (null = platform data directory)
    "storage.dir": null
}
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "sheet.defaultTitle")]
    pub default_sheet_title: String,

    #[serde(rename = "style.debounceMs")]
    pub style_debounce_ms: u64,

    #[serde(rename = "storage.key")]
    pub storage_key: String,

    #[serde(rename = "storage.dir")]
    pub storage_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_sheet_title: "New Sheet".to_string(),
            style_debounce_ms: 100,
            storage_key: "gantt-sheets-storage".to_string(),
            storage_dir: None,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ganttsheet");
        config_dir.join("settings.json")
    }

    /// Load settings from the user config file, creating it on first run
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`, falling back to defaults.
    ///
    /// A missing file is created with the commented defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            Self::create_default_file(path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are ignored.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Save current settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    pub fn style_debounce(&self) -> Duration {
        Duration::from_millis(self.style_debounce_ms)
    }

    /// Configured storage directory, else the platform data directory.
    pub fn resolved_storage_dir(&self) -> Option<PathBuf> {
        self.storage_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("ganttsheet")))
    }

    fn create_default_file(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("error creating config directory: {}", e);
                return;
            }
        }
        if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
            log::warn!("error writing default settings.json: {}", e);
        }
    }
}
