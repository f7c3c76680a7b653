//! Geotrace Frontend
//!
//! egui-based map viewer with polygon tracing and distance measurement.

mod app;
pub mod config;
pub mod fetch;
pub mod map_view;
mod panels;
pub mod tessellate;

pub use app::GeotraceApp;
