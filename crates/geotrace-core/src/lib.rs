//! Geotrace core
//!
//! Interaction logic for the map, independent of any GUI toolkit:
//! - Point: latitude/longitude pair recorded from map clicks
//! - GeometryAccumulator: in-progress and finalized polygon traces
//! - DistanceSampler: two-point FIFO window for distance measurement
//! - ToolArbiter: decides which tool owns the map's click stream
//! - Feature styling, capital markers and GeoJSON validation
//! - MapSession: ties the pieces together once the map is ready

pub mod distance;
pub mod error;
pub mod geojson;
pub mod geometry;
pub mod markers;
pub mod point;
pub mod session;
pub mod style;
pub mod surface;
pub mod tools;

pub use distance::*;
pub use error::*;
pub use geojson::{Capital, FeatureCollection, StateShape};
pub use geometry::*;
pub use markers::*;
pub use point::*;
pub use session::*;
pub use style::*;
pub use surface::*;
pub use tools::*;
