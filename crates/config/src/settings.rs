// Application settings
// Loaded from ~/.config/parcelgrid/settings.json (override: PARCELGRID_SETTINGS)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that points at an alternative settings file.
pub const SETTINGS_ENV: &str = "PARCELGRID_SETTINGS";

pub const MAX_DECIMALS: usize = 6;
pub const MAX_HISTORY_DEPTH: usize = 100;

/// Default rendering for `pgrid reconcile`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Fixed-width table with calculation summary
    #[default]
    Table,
    /// Tab-separated, for pasting into spreadsheets
    Tsv,
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Output
    #[serde(rename = "output.format")]
    pub output_format: OutputFormat,

    #[serde(rename = "output.decimals")]
    pub decimals: usize,

    #[serde(rename = "output.title")]
    pub title: String,

    #[serde(rename = "output.footer")]
    pub footer: String,

    // Shell
    #[serde(rename = "history.depth")]
    pub history_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Table,
            decimals: 2,
            title: "PARCEL CALCULATION TABLE".to_string(),
            footer: "Generated by Parcel Manager".to_string(),
            history_depth: 20,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(SETTINGS_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("parcelgrid")
            .join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Strip comments (lines starting with //)
                let cleaned: String = contents
                    .lines()
                    .filter(|line| !line.trim().starts_with("//"))
                    .collect::<Vec<_>>()
                    .join("\n");

                match serde_json::from_str::<Settings>(&cleaned) {
                    Ok(settings) => settings.validated(),
                    Err(e) => {
                        log::warn!("error parsing {}: {e}; using default settings", path.display());
                        Self::default()
                    }
                }
            }
            Err(e) => {
                log::warn!("error reading {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Clamp out-of-range values instead of rejecting the whole file.
    pub fn validated(mut self) -> Self {
        if self.decimals > MAX_DECIMALS {
            log::warn!("output.decimals {} clamped to {MAX_DECIMALS}", self.decimals);
            self.decimals = MAX_DECIMALS;
        }
        self.history_depth = self.history_depth.clamp(1, MAX_HISTORY_DEPTH);
        self
    }

    /// Set one dotted key from command-line text. String-valued keys take the
    /// text as is; other keys parse it as JSON (`3`, `"tsv"`, ...).
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let mut map = match serde_json::to_value(&*self).map_err(|e| e.to_string())? {
            serde_json::Value::Object(map) => map,
            _ => return Err("settings do not serialize to an object".to_string()),
        };

        let parsed = match map.get(key) {
            None => return Err(format!("unknown setting '{key}'")),
            Some(serde_json::Value::String(_)) => serde_json::Value::String(value.to_string()),
            Some(_) => serde_json::from_str(value)
                .unwrap_or_else(|_| serde_json::Value::String(value.to_string())),
        };
        map.insert(key.to_string(), parsed);

        let updated: Settings = serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| format!("invalid value for {key}: {e}"))?;
        *self = updated.validated();
        Ok(())
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Write a commented default settings file. Refuses to overwrite.
    pub fn create_default_file(path: &Path) -> Result<(), String> {
        if path.exists() {
            return Err(format!("{} already exists", path.display()));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let default_config = r#"{
    // Default output of `pgrid reconcile`: "table", "tsv", "csv" or "json"
    "output.format": "table",

    // Decimal places for unrounded areas (0-6)
    "output.decimals": 2,

    // Fixed-width table heading and closing line
    "output.title": "PARCEL CALCULATION TABLE",
    "output.footer": "Generated by Parcel Manager",

    // Undo/redo snapshots kept by `pgrid shell`
    "history.depth": 20
}
"#;

        fs::write(path, default_config).map_err(|e| e.to_string())
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn default_file_parses_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfg").join("settings.json");
        Settings::create_default_file(&path).unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
        assert!(Settings::create_default_file(&path).is_err());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "output.format": "tsv", "output.decimals": 3 }"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.output_format, OutputFormat::Tsv);
        assert_eq!(settings.decimals, 3);
        assert_eq!(settings.history_depth, 20);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "output.decimals": 12, "history.depth": 0 }"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.decimals, MAX_DECIMALS);
        assert_eq!(settings.history_depth, 1);
    }

    #[test]
    fn invalid_json_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn set_updates_known_keys() {
        let mut settings = Settings::default();
        settings.set("output.format", "csv").unwrap();
        settings.set("output.decimals", "3").unwrap();
        settings.set("output.title", "42").unwrap();
        settings.set("history.depth", "500").unwrap();

        assert_eq!(settings.output_format, OutputFormat::Csv);
        assert_eq!(settings.decimals, 3);
        assert_eq!(settings.title, "42");
        assert_eq!(settings.history_depth, MAX_HISTORY_DEPTH);
    }

    #[test]
    fn set_rejects_bad_input() {
        let mut settings = Settings::default();
        assert_eq!(
            settings.set("output.colour", "red"),
            Err("unknown setting 'output.colour'".to_string())
        );
        assert!(settings.set("output.format", "xml").is_err());
        assert!(settings.set("output.decimals", "two").is_err());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn save_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            output_format: OutputFormat::Json,
            footer: String::new(),
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }
}
