//! In-memory map surface for tests

use crate::{
    ClickConsumer, ClickStream, ListenerId, MapEvent, MeasureMarker, OverlaySink, Point,
    ToolArbiter, ToolOutcome,
};

/// Records subscriptions and overlay updates instead of drawing them
#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub listeners: Vec<(ListenerId, ClickConsumer)>,
    pub pending_outline: Vec<Point>,
    pub finalized: Vec<Vec<Point>>,
    pub markers: Vec<MeasureMarker>,
}

impl RecordingSurface {
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn consumers(&self) -> Vec<ClickConsumer> {
        self.listeners.iter().map(|(_, c)| *c).collect()
    }

    /// Deliver an event to every listener subscribed at the time of the event
    pub fn fire(&mut self, arbiter: &mut ToolArbiter, event: MapEvent) -> Vec<ToolOutcome> {
        let ids: Vec<ListenerId> = self.listeners.iter().map(|(id, _)| *id).collect();
        ids.into_iter()
            .filter_map(|id| arbiter.handle_event(id, event, self))
            .collect()
    }
}

impl ClickStream for RecordingSurface {
    fn subscribe(&mut self, consumer: ClickConsumer) -> ListenerId {
        let id = ListenerId::new();
        self.listeners.push((id, consumer));
        id
    }

    fn unsubscribe(&mut self, listener: ListenerId) {
        self.listeners.retain(|(id, _)| *id != listener);
    }
}

impl OverlaySink for RecordingSurface {
    fn show_pending_outline(&mut self, vertices: &[Point]) {
        self.pending_outline = vertices.to_vec();
    }

    fn show_finalized_shape(&mut self, rings: &[Vec<Point>]) {
        self.finalized = rings.to_vec();
    }

    fn place_measure_marker(&mut self, marker: MeasureMarker) {
        self.markers.push(marker);
    }
}
