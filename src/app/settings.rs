use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppSettings {
    pub file_path: String,
    pub log_level: String,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            file_path: "diagram.json".to_string(),
            log_level: "info".to_string(),
            window_width: 1100.0,
            window_height: 750.0,
        }
    }
}

pub(crate) fn config_path() -> Option<String> {
    if let Some(home) = std::env::var_os("HOME") {
        let path = std::path::PathBuf::from(home).join(".config").join("flowdraft.toml");
        if path.exists() {
            return Some(path.display().to_string());
        }
    }
    if std::path::Path::new("settings.toml").exists() {
        return Some("settings.toml".to_string());
    }
    None
}

pub(crate) fn load_settings(path: &str) -> Option<AppSettings> {
    let s = std::fs::read_to_string(path).ok()?;
    if path.ends_with(".toml") {
        toml::from_str::<AppSettings>(&s)
            .ok()
            .or_else(|| serde_json::from_str::<AppSettings>(&s).ok())
    } else {
        serde_json::from_str::<AppSettings>(&s)
            .ok()
            .or_else(|| toml::from_str::<AppSettings>(&s).ok())
    }
}

pub(crate) fn save_settings(path: &str, settings: &AppSettings) -> Result<(), Error> {
    let text = if path.ends_with(".toml") {
        toml::to_string_pretty(settings).map_err(|e| Error::Settings(e.to_string()))?
    } else {
        serde_json::to_string_pretty(settings).map_err(|e| Error::Settings(e.to_string()))?
    };
    std::fs::write(path, text).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let s: AppSettings = toml::from_str("log_level = \"debug\"").unwrap();
        assert_eq!(s.log_level, "debug");
        assert_eq!(s.file_path, "diagram.json");
        assert_eq!(s.window_width, 1100.0);
    }

    #[test]
    fn test_json_settings_are_accepted() {
        let s: AppSettings = serde_json::from_str(r#"{"file_path": "flows/main.json"}"#).unwrap();
        assert_eq!(s.file_path, "flows/main.json");
        assert_eq!(s.log_level, "info");
    }

    #[test]
    fn test_missing_file_loads_nothing() {
        assert!(load_settings("/nonexistent/flowdraft-settings.toml").is_none());
    }
}
