use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Rows per load when neither the settings file nor the command line says
/// otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Database file; defaults to the platform data dir when unset
    pub db_path: Option<PathBuf>,
    pub list: Option<ListPrefs>,
    pub theme: Option<Theme>,
    pub reminder: Option<Reminder>,
    pub passcode: Option<Passcode>,
    pub weather: Option<WeatherPrefs>,
    pub calendar: Option<Calendar>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListPrefs {
    /// Rows per page load; defaults to 10 when unset
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Theme {
    /// Accent color name or "#rrggbb"
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Reminder {
    pub enabled: Option<bool>,
    /// Local time of day as "HH:MM"
    pub time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Passcode {
    pub enabled: Option<bool>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WeatherPrefs {
    /// Fill in the weather automatically when adding an entry
    pub auto_fetch: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Calendar {
    /// "sunday" or "monday"
    pub week_starts_on: Option<String>,
}

pub fn config_dir() -> PathBuf {
    if let Some(bd) = directories::BaseDirs::new() {
        bd.config_dir().join("hibi")
    } else {
        PathBuf::from("./.config/hibi")
    }
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if let Ok(s) = std::fs::read_to_string(&path) {
        toml::from_str(&s).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn default_db_path() -> PathBuf {
    config_dir().join("data").join("hibi.db")
}

pub fn page_size(settings: &Settings) -> usize {
    settings
        .list
        .as_ref()
        .and_then(|l| l.page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE)
}
