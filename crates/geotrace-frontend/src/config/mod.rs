//! Application configuration module
//!
//! This module handles application-wide configuration including the map's
//! home position, zoom limits, data sources and UI settings.

mod manager;

pub use manager::{ConfigError, ConfigManager, SharedConfig, create_shared_config};

use std::path::PathBuf;

use geotrace_core::Point;
use serde::{Deserialize, Serialize};

/// Where a GeoJSON dataset is read from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DataSource {
    /// Local file
    File(PathBuf),
    /// http(s) URL
    Url(String),
}

impl DataSource {
    /// Get a short description for logs and the status bar
    pub fn describe(&self) -> String {
        match self {
            DataSource::File(path) => path.display().to_string(),
            DataSource::Url(url) => url.clone(),
        }
    }
}

/// Map view settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapConfig {
    /// Position the map opens on; `None` means no location is known
    pub home: Option<Point>,
    /// Initial zoom level
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            home: Some(Point::new(39.8283, -98.5795)),
            zoom: 13.0,
            min_zoom: 3.0,
            max_zoom: 18.0,
        }
    }
}

/// GeoJSON dataset locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    pub capitals: DataSource,
    pub states: DataSource,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            capitals: DataSource::File(PathBuf::from("assets/data/usa-capitals.geojson")),
            states: DataSource::File(PathBuf::from("assets/data/gz_2010_us_040_00_5m.json")),
        }
    }
}

/// UI theme
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum UiTheme {
    #[default]
    Light,
    Dark,
}

/// UI preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UiConfig {
    pub theme: UiTheme,
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl AppConfig {
    /// Current configuration version
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrips_through_ron() {
        let mut config = AppConfig::new();
        config.data.capitals = DataSource::Url("https://example.com/capitals.geojson".into());
        config.map.home = None;

        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let back: AppConfig = ron::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: AppConfig = ron::from_str("(version: 1)").unwrap();
        assert_eq!(config.map, MapConfig::default());
        assert_eq!(config.data, DataConfig::default());
    }
}
