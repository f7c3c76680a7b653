//! Map canvas: view transform, overlays and pointer input
//!
//! The canvas is the map surface the core talks to. It keeps the click
//! subscriptions and the overlay data the tools push, and turns egui
//! pointer input into [`MapEvent`]s.

use std::collections::HashMap;

use egui::{Color32, Pos2, Rect, Sense, Shape, Stroke};
use glam::DVec2;
use uuid::Uuid;

use geotrace_core::{
    ClickConsumer, ClickStream, FeatureStyle, ListenerId, MapEvent, MapSession, MeasureMarker,
    OverlaySink, Point, Rgb, format_distance,
};

use crate::tessellate::{PolygonMesh, triangulate_shape};

/// Colors for map overlays
pub mod map_colors {
    use egui::Color32;

    pub const BACKGROUND: Color32 = Color32::from_rgb(170, 211, 223);
    pub const PENDING: Color32 = Color32::from_rgb(128, 0, 128); // Purple
    pub const FINALIZED: Color32 = Color32::from_rgb(128, 128, 128); // Grey
    pub const CAPITAL: Color32 = Color32::from_rgb(51, 136, 255);
    pub const MEASURE: Color32 = Color32::from_rgb(220, 60, 60);
    pub const POSITION: Color32 = Color32::from_rgb(30, 90, 200);
    pub const POPUP_BG: Color32 = Color32::from_rgba_premultiplied(255, 255, 255, 235);
    pub const POPUP_TEXT: Color32 = Color32::from_rgb(20, 20, 20);
}

/// Tile size the zoom levels are defined against
const TILE_SIZE: f64 = 256.0;

/// Linear degrees-to-pixels view over the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: Point,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl MapView {
    pub fn new(center: Point, zoom: f64, min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
        }
    }

    /// Screen pixels per degree at the current zoom
    pub fn pixels_per_degree(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom) / 360.0
    }

    /// Map point to screen position within `rect`
    pub fn to_screen(&self, rect: Rect, point: Point) -> Pos2 {
        let offset = DVec2::new(
            point.longitude - self.center.longitude,
            self.center.latitude - point.latitude,
        ) * self.pixels_per_degree();
        rect.center() + egui::vec2(offset.x as f32, offset.y as f32)
    }

    /// Screen position within `rect` to map point
    pub fn to_map(&self, rect: Rect, pos: Pos2) -> Point {
        let delta = pos - rect.center();
        let offset = DVec2::new(delta.x as f64, delta.y as f64) / self.pixels_per_degree();
        Point::new(
            self.center.latitude - offset.y,
            self.center.longitude + offset.x,
        )
    }

    /// Move the view by a screen-space drag
    pub fn pan(&mut self, drag: egui::Vec2) {
        let offset = DVec2::new(drag.x as f64, drag.y as f64) / self.pixels_per_degree();
        self.center.longitude -= offset.x;
        self.center.latitude = (self.center.latitude + offset.y).clamp(-90.0, 90.0);
    }

    /// Screen rectangle covering the map box from `south_west` to `north_east`
    pub fn screen_rect(&self, rect: Rect, south_west: Point, north_east: Point) -> Rect {
        Rect::from_two_pos(
            self.to_screen(rect, south_west),
            self.to_screen(rect, north_east),
        )
    }

    /// Change zoom while keeping the map point under `anchor` fixed
    pub fn zoom_at(&mut self, rect: Rect, anchor: Pos2, delta: f64) {
        let before = self.to_map(rect, anchor);
        self.zoom = (self.zoom + delta).clamp(self.min_zoom, self.max_zoom);
        let after = self.to_map(rect, anchor);
        self.center.latitude += before.latitude - after.latitude;
        self.center.longitude += before.longitude - after.longitude;
    }
}

fn color(rgb: Rgb, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(rgb.0, rgb.1, rgb.2, alpha)
}

/// What the pointer did on the canvas this frame
#[derive(Debug, Default)]
pub struct CanvasInput {
    pub events: Vec<MapEvent>,
    /// Map position under the pointer, if it is over the canvas
    pub hover: Option<Point>,
}

/// Fill triangles and bounding box of one state shape, built when shapes load
struct ShapeGeometry {
    bounds: (Point, Point),
    meshes: Vec<PolygonMesh>,
}

/// The map surface shown in the central panel
pub struct MapCanvas {
    pub view: MapView,
    listeners: Vec<(ListenerId, ClickConsumer)>,
    pending_outline: Vec<Point>,
    finalized: Vec<Vec<Point>>,
    measure_markers: Vec<MeasureMarker>,
    shapes: HashMap<Uuid, ShapeGeometry>,
}

impl MapCanvas {
    pub fn new(view: MapView) -> Self {
        Self {
            view,
            listeners: Vec::new(),
            pending_outline: Vec::new(),
            finalized: Vec::new(),
            measure_markers: Vec::new(),
            shapes: HashMap::new(),
        }
    }

    /// Ids of the current subscriptions, in subscription order
    pub fn listener_ids(&self) -> Vec<ListenerId> {
        self.listeners.iter().map(|(id, _)| *id).collect()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn last_distance(&self) -> Option<f64> {
        self.measure_markers.last().and_then(|m| m.distance)
    }

    /// Rebuild fill meshes after the state shapes changed
    pub fn rebuild_shape_meshes(&mut self, session: &MapSession) {
        self.shapes = session
            .state_shapes()
            .map(|(shape, _)| {
                let geometry = ShapeGeometry {
                    bounds: shape.bounds(),
                    meshes: triangulate_shape(shape),
                };
                (shape.id, geometry)
            })
            .collect();
    }

    /// Whether any part of shape `id` can land inside `rect`.
    /// Shapes without built geometry count as visible.
    pub fn is_shape_visible(&self, rect: Rect, id: Uuid, stroke: f32) -> bool {
        self.shapes.get(&id).is_none_or(|geometry| {
            let (south_west, north_east) = geometry.bounds;
            self.view
                .screen_rect(rect, south_west, north_east)
                .expand(stroke)
                .intersects(rect)
        })
    }

    /// Allocate the canvas, handle pan/zoom and collect map events
    pub fn interact(&mut self, ui: &mut egui::Ui) -> (egui::Response, egui::Painter, CanvasInput) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;
        let mut input = CanvasInput::default();

        if response.dragged() {
            self.view.pan(response.drag_delta());
        }

        if let Some(pointer) = response.hover_pos() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.view.zoom_at(rect, pointer, scroll as f64 * 0.005);
            }
            input.hover = Some(self.view.to_map(rect, pointer));
        }

        if let Some(pos) = response.interact_pointer_pos() {
            let point = self.view.to_map(rect, pos);
            if response.clicked() {
                input.events.push(MapEvent::Click(point));
            }
            if response.double_clicked() {
                input.events.push(MapEvent::DoubleClick(point));
            }
        }

        (response, painter, input)
    }

    /// Draw the map and every overlay
    pub fn paint(&self, painter: &egui::Painter, rect: Rect, session: Option<&MapSession>) {
        painter.rect_filled(rect, 0.0, map_colors::BACKGROUND);

        let Some(session) = session else {
            return;
        };

        for (shape, style) in session.state_shapes() {
            if !self.is_shape_visible(rect, shape.id, style.weight) {
                continue;
            }
            if let Some(geometry) = self.shapes.get(&shape.id) {
                self.paint_fill(painter, rect, &geometry.meshes, &style);
            }
            for ring in shape.polygons.iter().flatten() {
                let points = self.project(rect, ring);
                painter.add(Shape::closed_line(
                    points,
                    Stroke::new(style.weight, color(style.color, style.opacity)),
                ));
            }
        }

        for ring in &self.finalized {
            if ring.len() >= 2 {
                painter.add(Shape::closed_line(
                    self.project(rect, ring),
                    Stroke::new(3.0, map_colors::FINALIZED),
                ));
            }
        }

        if !self.pending_outline.is_empty() {
            let points = self.project(rect, &self.pending_outline);
            painter.add(Shape::closed_line(
                points.clone(),
                Stroke::new(3.0, map_colors::PENDING),
            ));
            for p in points {
                painter.circle_filled(p, 3.0, map_colors::PENDING);
            }
        }

        for marker in session.capitals() {
            let center = self.view.to_screen(rect, marker.position);
            painter.circle(
                center,
                marker.radius as f32,
                map_colors::CAPITAL.gamma_multiply(0.2),
                Stroke::new(3.0, map_colors::CAPITAL),
            );
        }

        for marker in &self.measure_markers {
            let pos = self.view.to_screen(rect, marker.position);
            painter.circle_filled(pos, 5.0, map_colors::MEASURE);
            let label = match marker.distance {
                Some(d) => format!("{} ({})", marker.label, format_distance(d)),
                None => marker.label.to_string(),
            };
            paint_popup(painter, pos, &label);
        }

        let position = session.current_position();
        let pos = self.view.to_screen(rect, position.position);
        painter.circle(pos, 7.0, map_colors::POSITION, Stroke::new(2.0, Color32::WHITE));
        paint_popup(painter, pos, &position.popup);
    }

    /// Popup for the capital under the pointer
    pub fn paint_capital_popup(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        session: &MapSession,
        pointer: Pos2,
    ) {
        let hit = session.capitals().iter().find(|marker| {
            let center = self.view.to_screen(rect, marker.position);
            center.distance(pointer) <= (marker.radius as f32).max(4.0)
        });
        if let Some(marker) = hit {
            paint_popup(painter, self.view.to_screen(rect, marker.position), &marker.popup);
        }
    }

    fn project(&self, rect: Rect, ring: &[Point]) -> Vec<Pos2> {
        ring.iter().map(|p| self.view.to_screen(rect, *p)).collect()
    }

    fn paint_fill(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        meshes: &[PolygonMesh],
        style: &FeatureStyle,
    ) {
        let fill = color(style.fill_color, style.fill_opacity);
        for polygon in meshes {
            let mut mesh = egui::Mesh::default();
            for vertex in &polygon.vertices {
                mesh.colored_vertex(self.view.to_screen(rect, *vertex), fill);
            }
            for triangle in polygon.indices.chunks_exact(3) {
                mesh.add_triangle(triangle[0] as u32, triangle[1] as u32, triangle[2] as u32);
            }
            painter.add(Shape::mesh(mesh));
        }
    }
}

/// Small always-open popup anchored above a marker
fn paint_popup(painter: &egui::Painter, anchor: Pos2, text: &str) {
    let galley = painter.layout_no_wrap(
        text.to_string(),
        egui::FontId::proportional(12.0),
        map_colors::POPUP_TEXT,
    );
    let size = galley.size() + egui::vec2(12.0, 8.0);
    let popup = Rect::from_min_size(
        anchor - egui::vec2(size.x / 2.0, size.y + 12.0),
        size,
    );
    painter.rect_filled(popup, 4.0, map_colors::POPUP_BG);
    painter.galley(popup.min + egui::vec2(6.0, 4.0), galley, map_colors::POPUP_TEXT);
}

impl ClickStream for MapCanvas {
    fn subscribe(&mut self, consumer: ClickConsumer) -> ListenerId {
        let id = ListenerId::new();
        tracing::debug!("Subscribed {} as {:?}", consumer.name(), id);
        self.listeners.push((id, consumer));
        id
    }

    fn unsubscribe(&mut self, listener: ListenerId) {
        self.listeners.retain(|(id, _)| *id != listener);
    }
}

impl OverlaySink for MapCanvas {
    fn show_pending_outline(&mut self, vertices: &[Point]) {
        self.pending_outline = vertices.to_vec();
    }

    fn show_finalized_shape(&mut self, rings: &[Vec<Point>]) {
        self.finalized = rings.to_vec();
    }

    fn place_measure_marker(&mut self, marker: MeasureMarker) {
        self.measure_markers.push(marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect() -> Rect {
        Rect::from_min_size(Pos2::ZERO, egui::vec2(800.0, 600.0))
    }

    #[test]
    fn test_center_maps_to_rect_center() {
        let view = MapView::new(Point::new(40.0, -100.0), 5.0, 3.0, 18.0);
        assert_eq!(view.to_screen(rect(), view.center), rect().center());
    }

    #[test]
    fn test_screen_map_roundtrip() {
        let view = MapView::new(Point::new(40.0, -100.0), 6.0, 3.0, 18.0);
        let point = Point::new(41.5, -98.25);
        let back = view.to_map(rect(), view.to_screen(rect(), point));
        assert_relative_eq!(back.latitude, point.latitude, epsilon = 1e-3);
        assert_relative_eq!(back.longitude, point.longitude, epsilon = 1e-3);
    }

    #[test]
    fn test_north_is_up() {
        let view = MapView::new(Point::new(0.0, 0.0), 4.0, 3.0, 18.0);
        let north = view.to_screen(rect(), Point::new(1.0, 0.0));
        assert!(north.y < rect().center().y);
    }

    #[test]
    fn test_zoom_is_clamped_and_keeps_anchor() {
        let mut view = MapView::new(Point::new(10.0, 10.0), 5.0, 3.0, 18.0);
        let anchor = Pos2::new(600.0, 100.0);
        let before = view.to_map(rect(), anchor);

        view.zoom_at(rect(), anchor, 1.0);
        let after = view.to_map(rect(), anchor);
        assert_relative_eq!(before.latitude, after.latitude, epsilon = 1e-6);
        assert_relative_eq!(before.longitude, after.longitude, epsilon = 1e-6);

        view.zoom_at(rect(), anchor, 100.0);
        assert_eq!(view.zoom, 18.0);
        view.zoom_at(rect(), anchor, -100.0);
        assert_eq!(view.zoom, 3.0);
    }

    #[test]
    fn test_canvas_keeps_one_listener_through_session() {
        let view = MapView::new(Point::new(0.0, 0.0), 5.0, 3.0, 18.0);
        let mut canvas = MapCanvas::new(view);
        let mut session = MapSession::start(Some(Point::new(0.0, 0.0)), &mut canvas).unwrap();
        assert_eq!(canvas.listener_count(), 1);

        session.toggle_draw(&mut canvas);
        assert_eq!(canvas.listener_count(), 1);

        for event in [
            MapEvent::Click(Point::new(1.0, 1.0)),
            MapEvent::Click(Point::new(2.0, 1.0)),
            MapEvent::Click(Point::new(2.0, 2.0)),
            MapEvent::Click(Point::new(2.0, 2.0)),
            MapEvent::DoubleClick(Point::new(2.0, 2.0)),
        ] {
            for id in canvas.listener_ids() {
                session.handle_event(id, event, &mut canvas);
            }
        }

        assert_eq!(canvas.listener_count(), 1);
        assert_eq!(canvas.finalized.len(), 1);
        assert_eq!(canvas.finalized[0].len(), 3);
        assert!(canvas.pending_outline.is_empty());
    }

    #[test]
    fn test_offscreen_shapes_are_culled() {
        let view = MapView::new(Point::new(5.0, 5.0), 5.0, 3.0, 18.0);
        let mut canvas = MapCanvas::new(view);
        let mut session = MapSession::start(Some(Point::new(5.0, 5.0)), &mut canvas).unwrap();
        let collection = geotrace_core::FeatureCollection::from_json_str(
            r#"{"features": [
                {"properties": {"name": "Near"}, "geometry": {"type": "Polygon",
                    "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]}},
                {"properties": {"name": "Far"}, "geometry": {"type": "Polygon",
                    "coordinates": [[[170, 0], [179, 0], [179, 10], [170, 10], [170, 0]]]}}
            ]}"#,
        )
        .unwrap();
        session.load_state_shapes(&collection);
        canvas.rebuild_shape_meshes(&session);

        let visible: Vec<String> = session
            .state_shapes()
            .filter(|(shape, style)| canvas.is_shape_visible(rect(), shape.id, style.weight))
            .map(|(shape, _)| shape.name.clone())
            .collect();
        assert_eq!(visible, vec!["Near".to_string()]);

        canvas.view.center = Point::new(5.0, 175.0);
        let far = session
            .state_shapes()
            .find(|(shape, _)| shape.name == "Far")
            .map(|(shape, _)| shape.id)
            .unwrap();
        assert!(canvas.is_shape_visible(rect(), far, 3.0));
    }

    #[test]
    fn test_closing_session_releases_canvas_listeners() {
        let view = MapView::new(Point::new(0.0, 0.0), 5.0, 3.0, 18.0);
        let mut canvas = MapCanvas::new(view);
        let mut session = MapSession::start(Some(Point::new(0.0, 0.0)), &mut canvas).unwrap();
        session.toggle_draw(&mut canvas);
        session.handle_event(
            canvas.listener_ids()[0],
            MapEvent::Click(Point::new(1.0, 1.0)),
            &mut canvas,
        );

        session.close(&mut canvas);
        assert_eq!(canvas.listener_count(), 0);
        assert!(canvas.pending_outline.is_empty());
        assert!(!session.tools().draw_control_active());
    }
}
