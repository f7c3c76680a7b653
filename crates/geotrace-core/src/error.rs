//! Error types for the map core

use thiserror::Error;

/// Map-related errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MapError {
    /// No position to center the map on; the map is not shown
    #[error("Location unavailable: the map cannot be initialized")]
    LocationUnavailable,

    /// An interaction was requested before the map finished loading
    #[error("Map is not ready")]
    MapNotReady,

    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),
}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        MapError::InvalidGeoJson(err.to_string())
    }
}
