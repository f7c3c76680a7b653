//! Map session: everything that exists once the map is ready

use uuid::Uuid;

use crate::{
    CURRENT_POSITION_POPUP, CapitalMarker, FeatureCollection, FeatureStyle, HoverTracker,
    HoverTransition, ListenerId, MapError, MapEvent, MapSurface, Point, ShapeStyles, StateShape,
    ToolArbiter, ToolOutcome, ToolState, build_capital_markers,
};

/// Marker placed at the position the map was opened on
#[derive(Debug, Clone, PartialEq)]
pub struct PositionMarker {
    pub position: Point,
    pub popup: String,
}

/// Interaction state for one map session
#[derive(Debug)]
pub struct MapSession {
    center: Point,
    current_position: PositionMarker,
    tools: ToolArbiter,
    capitals: Vec<CapitalMarker>,
    shapes: Vec<StateShape>,
    styles: ShapeStyles,
    hover: HoverTracker,
}

impl MapSession {
    /// Start a session centred on `home`.
    ///
    /// Without a usable position there is no map, and so no session.
    pub fn start<S: MapSurface + ?Sized>(
        home: Option<Point>,
        surface: &mut S,
    ) -> Result<Self, MapError> {
        let center = home
            .filter(Point::is_valid)
            .ok_or(MapError::LocationUnavailable)?;
        tracing::info!("Map ready at {}", center);

        Ok(Self {
            center,
            current_position: PositionMarker {
                position: center,
                popup: CURRENT_POSITION_POPUP.to_string(),
            },
            tools: ToolArbiter::attach(surface),
            capitals: Vec::new(),
            shapes: Vec::new(),
            styles: ShapeStyles::new(),
            hover: HoverTracker::new(),
        })
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn current_position(&self) -> &PositionMarker {
        &self.current_position
    }

    pub fn tools(&self) -> &ToolArbiter {
        &self.tools
    }

    pub fn tool_state(&self) -> ToolState {
        self.tools.state()
    }

    /// Press of the draw toggle control
    pub fn toggle_draw<S: MapSurface + ?Sized>(&mut self, surface: &mut S) -> ToolState {
        self.tools.toggle_draw(surface)
    }

    pub fn handle_event<S: MapSurface + ?Sized>(
        &mut self,
        listener: ListenerId,
        event: MapEvent,
        surface: &mut S,
    ) -> Option<ToolOutcome> {
        self.tools.handle_event(listener, event, surface)
    }

    /// Replace the capital markers with a freshly fetched batch
    pub fn load_capitals(&mut self, collection: &FeatureCollection) -> usize {
        let capitals = collection.capitals();
        self.capitals = build_capital_markers(&capitals);
        tracing::info!("Loaded {} capital markers", self.capitals.len());
        self.capitals.len()
    }

    /// Replace the state shapes with a freshly fetched batch
    pub fn load_state_shapes(&mut self, collection: &FeatureCollection) -> usize {
        self.shapes = collection.state_shapes();
        self.styles.clear();
        self.hover = HoverTracker::new();
        for shape in &self.shapes {
            self.styles.insert(shape.id);
        }
        tracing::info!("Loaded {} state shapes", self.shapes.len());
        self.shapes.len()
    }

    pub fn capitals(&self) -> &[CapitalMarker] {
        &self.capitals
    }

    /// Shapes with their current style, in draw order
    pub fn state_shapes(&self) -> impl Iterator<Item = (&StateShape, FeatureStyle)> {
        self.shapes
            .iter()
            .filter_map(|shape| self.styles.get(shape.id).map(|style| (shape, *style)))
    }

    /// Topmost shape containing the point
    pub fn shape_at(&self, point: Point) -> Option<Uuid> {
        self.shapes
            .iter()
            .rev()
            .find(|shape| shape.contains(point))
            .map(|shape| shape.id)
    }

    /// Update hover styling for the pointer position (`None` when off the map)
    pub fn pointer_moved(&mut self, point: Option<Point>) -> Vec<HoverTransition> {
        let under_pointer = point.and_then(|p| self.shape_at(p));
        let transitions = self.hover.update(under_pointer);
        for transition in &transitions {
            self.styles.apply_transition(*transition);
        }
        transitions
    }

    /// Give up the click stream, e.g. when the map view is closed
    pub fn close<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        self.tools.suspend(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::RecordingSurface;
    use crate::{HoverState, style_for};

    fn p(lat: f64, lon: f64) -> Point {
        Point::new(lat, lon)
    }

    fn capitals_json(pops: &[u32]) -> FeatureCollection {
        let features: Vec<String> = pops
            .iter()
            .enumerate()
            .map(|(i, pop)| {
                format!(
                    r#"{{"geometry": {{"type": "Point", "coordinates": [{}, 40.0]}},
                        "properties": {{"name": "C{}", "state": "S{}", "population": {}}}}}"#,
                    -100.0 + i as f64,
                    i,
                    i,
                    pop
                )
            })
            .collect();
        FeatureCollection::from_json_str(&format!(r#"{{"features": [{}]}}"#, features.join(",")))
            .unwrap()
    }

    const TWO_SQUARES: &str = r#"{"features": [
        {"properties": {"name": "West"}, "geometry": {"type": "Polygon",
            "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]}},
        {"properties": {"name": "East"}, "geometry": {"type": "Polygon",
            "coordinates": [[[10, 0], [20, 0], [20, 10], [10, 10], [10, 0]]]}}
    ]}"#;

    #[test]
    fn test_no_location_means_no_map() {
        let mut surface = RecordingSurface::default();
        let err = MapSession::start(None, &mut surface).unwrap_err();
        assert_eq!(err, MapError::LocationUnavailable);
        assert_eq!(surface.listener_count(), 0);

        let err = MapSession::start(Some(p(f64::NAN, 0.0)), &mut surface).unwrap_err();
        assert_eq!(err, MapError::LocationUnavailable);
    }

    #[test]
    fn test_session_starts_measuring_with_position_marker() {
        let mut surface = RecordingSurface::default();
        let session = MapSession::start(Some(p(38.9, -77.0)), &mut surface).unwrap();

        assert_eq!(session.tool_state(), ToolState::Measuring);
        assert_eq!(session.current_position().position, p(38.9, -77.0));
        assert_eq!(session.current_position().popup, CURRENT_POSITION_POPUP);
        assert_eq!(surface.listener_count(), 1);
    }

    #[test]
    fn test_capital_radii_end_to_end() {
        let mut surface = RecordingSurface::default();
        let mut session = MapSession::start(Some(p(40.0, -100.0)), &mut surface).unwrap();

        session.load_capitals(&capitals_json(&[100, 50]));

        let radii: Vec<f64> = session.capitals().iter().map(|m| m.radius).collect();
        assert_eq!(radii, vec![20.0, 10.0]);
    }

    #[test]
    fn test_empty_fetch_renders_nothing() {
        let mut surface = RecordingSurface::default();
        let mut session = MapSession::start(Some(p(40.0, -100.0)), &mut surface).unwrap();

        assert_eq!(session.load_capitals(&FeatureCollection::default()), 0);
        assert_eq!(session.load_state_shapes(&FeatureCollection::default()), 0);
        assert!(session.pointer_moved(Some(p(1.0, 1.0))).is_empty());
    }

    #[test]
    fn test_draw_then_double_click_end_to_end() {
        let mut surface = RecordingSurface::default();
        let mut session = MapSession::start(Some(p(15.0, 15.0)), &mut surface).unwrap();
        session.toggle_draw(&mut surface);

        // A double-click's second press arrives as a click before the double-click
        let events = [
            MapEvent::Click(p(10.0, 10.0)),
            MapEvent::Click(p(20.0, 20.0)),
            MapEvent::Click(p(20.0, 20.0)),
            MapEvent::DoubleClick(p(20.0, 20.0)),
        ];
        let mut last = Vec::new();
        for event in events {
            let ids: Vec<_> = surface.listeners.iter().map(|(id, _)| *id).collect();
            last = ids
                .into_iter()
                .filter_map(|id| session.handle_event(id, event, &mut surface))
                .collect();
        }

        assert_eq!(
            last,
            vec![ToolOutcome::PolygonFinalized {
                ring: vec![p(10.0, 10.0), p(20.0, 20.0)]
            }]
        );
        assert_eq!(session.tool_state(), ToolState::Measuring);
        assert!(!session.tools().draw_control_active());
    }

    #[test]
    fn test_hover_highlights_only_the_shape_under_pointer() {
        let mut surface = RecordingSurface::default();
        let mut session = MapSession::start(Some(p(5.0, 5.0)), &mut surface).unwrap();
        session.load_state_shapes(&FeatureCollection::from_json_str(TWO_SQUARES).unwrap());

        let transitions = session.pointer_moved(Some(p(5.0, 5.0)));
        assert_eq!(transitions.len(), 1);

        let styles: Vec<(String, FeatureStyle)> = session
            .state_shapes()
            .map(|(shape, style)| (shape.name.clone(), style))
            .collect();
        assert_eq!(styles[0], ("West".to_string(), style_for(HoverState::Hover)));
        assert_eq!(styles[1], ("East".to_string(), style_for(HoverState::Default)));

        session.pointer_moved(Some(p(5.0, 15.0)));
        session.pointer_moved(None);
        assert!(
            session
                .state_shapes()
                .all(|(_, style)| style == style_for(HoverState::Default))
        );
    }

    #[test]
    fn test_close_releases_click_stream() {
        let mut surface = RecordingSurface::default();
        let mut session = MapSession::start(Some(p(5.0, 5.0)), &mut surface).unwrap();
        session.close(&mut surface);
        assert_eq!(surface.listener_count(), 0);
        assert_eq!(session.tool_state(), ToolState::Idle);
    }
}
