//! Capabilities the map surface exposes to the interaction core
//!
//! Tools never see the whole map: the arbiter only needs to (un)subscribe
//! click consumers and push overlay updates, so those are the two traits.

use uuid::Uuid;

use crate::Point;

/// Handle for a click-stream subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler kinds that can own the map's click stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickConsumer {
    /// Appends a vertex per click, finalizes on double-click
    PolygonDrawer,
    /// Records clicks into the distance sampler
    DistanceMeasurer,
}

impl ClickConsumer {
    pub fn name(&self) -> &'static str {
        match self {
            ClickConsumer::PolygonDrawer => "Polygon drawer",
            ClickConsumer::DistanceMeasurer => "Distance measurer",
        }
    }
}

/// Pointer events dispatched to the subscribed consumer.
///
/// Every press is delivered as `Click`. The second press of a double-click
/// is delivered as a `Click` immediately followed by `DoubleClick` at the
/// same position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    Click(Point),
    DoubleClick(Point),
}

impl MapEvent {
    pub fn position(&self) -> Point {
        match self {
            MapEvent::Click(p) | MapEvent::DoubleClick(p) => *p,
        }
    }
}

/// Click/double-click subscription by handler identity
pub trait ClickStream {
    /// Register a consumer; events for it are tagged with the returned id
    fn subscribe(&mut self, consumer: ClickConsumer) -> ListenerId;

    /// Remove a registration. Unknown ids are ignored.
    fn unsubscribe(&mut self, listener: ListenerId);
}

/// A placed measurement marker and its popup content
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureMarker {
    pub position: Point,
    /// Click counter value shown in the popup
    pub label: u64,
    /// Distance from the previous click in metres, if any
    pub distance: Option<f64>,
}

/// Overlay primitives the tools draw through
pub trait OverlaySink {
    /// Replace the in-progress polygon outline
    fn show_pending_outline(&mut self, vertices: &[Point]);

    /// Replace the committed multi-polygon
    fn show_finalized_shape(&mut self, rings: &[Vec<Point>]);

    /// Add a measurement marker with an open popup
    fn place_measure_marker(&mut self, marker: MeasureMarker);
}

/// Everything the arbiter needs from the map
pub trait MapSurface: ClickStream + OverlaySink {}

impl<T: ClickStream + OverlaySink> MapSurface for T {}
