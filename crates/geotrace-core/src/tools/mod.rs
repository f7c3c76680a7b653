//! Tool arbitration
//!
//! Polygon drawing, polygon finalization and distance measurement all
//! listen to the same click stream. [`ToolArbiter`] keeps a single
//! subscription slot; every transition goes through one swap that
//! unsubscribes the outgoing consumer before subscribing the next one.

mod state;
#[cfg(test)]
pub(crate) mod testing;

pub use state::{ToolOutcome, ToolState};

use crate::{
    ClickConsumer, ClickStream, DistanceSampler, GeometryAccumulator, ListenerId, MapEvent,
    MapSurface, MeasureMarker,
};

/// The current subscription
#[derive(Debug, Clone, Copy)]
struct Registration {
    consumer: ClickConsumer,
    listener: ListenerId,
}

/// Owns the click-stream slot and the tool data the consumers write to
#[derive(Debug)]
pub struct ToolArbiter {
    slot: Option<Registration>,
    geometry: GeometryAccumulator,
    sampler: DistanceSampler,
    /// Visual state of the "draw polygon" toggle control
    draw_control_active: bool,
}

impl ToolArbiter {
    /// Take over the click stream of a ready map, starting in `Measuring`
    pub fn attach<S: ClickStream + ?Sized>(surface: &mut S) -> Self {
        let mut arbiter = Self {
            slot: None,
            geometry: GeometryAccumulator::new(),
            sampler: DistanceSampler::new(),
            draw_control_active: false,
        };
        arbiter.swap_consumer(ToolState::Measuring, surface);
        arbiter
    }

    pub fn state(&self) -> ToolState {
        ToolState::from_consumer(self.active_consumer())
    }

    pub fn active_consumer(&self) -> Option<ClickConsumer> {
        self.slot.map(|r| r.consumer)
    }

    pub fn active_listener(&self) -> Option<ListenerId> {
        self.slot.map(|r| r.listener)
    }

    /// Whether the draw toggle control should render as active
    pub fn draw_control_active(&self) -> bool {
        self.draw_control_active
    }

    pub fn geometry(&self) -> &GeometryAccumulator {
        &self.geometry
    }

    pub fn sampler(&self) -> &DistanceSampler {
        &self.sampler
    }

    /// Handle a press of the draw toggle control
    pub fn toggle_draw<S: MapSurface + ?Sized>(&mut self, surface: &mut S) -> ToolState {
        if self.state() == ToolState::Drawing {
            self.stop_drawing(surface);
        } else {
            self.start_drawing(surface);
        }
        self.state()
    }

    /// Enter `Drawing`. Calling this while already drawing changes nothing.
    pub fn start_drawing<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        self.swap_consumer(ToolState::Drawing, surface);
        self.draw_control_active = true;
    }

    /// Leave `Drawing` without finalizing; the unfinished trace is discarded
    pub fn stop_drawing<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        if self.state() != ToolState::Drawing {
            return;
        }
        self.discard_pending(surface);
        self.swap_consumer(ToolState::Measuring, surface);
        self.draw_control_active = false;
    }

    /// Release the click stream entirely
    pub fn suspend<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        self.discard_pending(surface);
        self.swap_consumer(ToolState::Idle, surface);
        self.draw_control_active = false;
    }

    /// Dispatch an event delivered to `listener`.
    ///
    /// Events for anything but the current subscription are stale and dropped.
    pub fn handle_event<S: MapSurface + ?Sized>(
        &mut self,
        listener: ListenerId,
        event: MapEvent,
        surface: &mut S,
    ) -> Option<ToolOutcome> {
        let Some(registration) = self.slot else {
            tracing::warn!("Map event {:?} with no active consumer", event);
            return None;
        };
        if registration.listener != listener {
            tracing::warn!("Ignoring {:?} for stale listener {:?}", event, listener);
            return None;
        }

        match (registration.consumer, event) {
            (ClickConsumer::PolygonDrawer, MapEvent::Click(point)) => {
                self.geometry.append_vertex(point);
                surface.show_pending_outline(self.geometry.pending());
                Some(ToolOutcome::VertexAdded {
                    vertices: self.geometry.pending().len(),
                })
            }
            (ClickConsumer::PolygonDrawer, MapEvent::DoubleClick(_)) => {
                let ring = self.geometry.finalize();
                tracing::debug!("Finalized polygon with {} vertices", ring.len());
                surface.show_pending_outline(&[]);
                surface.show_finalized_shape(self.geometry.finalized());
                self.swap_consumer(ToolState::Measuring, surface);
                self.draw_control_active = false;
                Some(ToolOutcome::PolygonFinalized { ring })
            }
            (ClickConsumer::DistanceMeasurer, MapEvent::Click(point)) => {
                let sample = self.sampler.record_click(point);
                if let Some(distance) = sample.distance {
                    tracing::debug!("Measured {:.1} m", distance);
                }
                surface.place_measure_marker(MeasureMarker {
                    position: point,
                    label: sample.count,
                    distance: sample.distance,
                });
                Some(ToolOutcome::Measured(sample))
            }
            // Both presses of the double-click were already measured as clicks
            (ClickConsumer::DistanceMeasurer, MapEvent::DoubleClick(_)) => None,
        }
    }

    fn discard_pending<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        if self.geometry.has_pending() {
            tracing::debug!("Discarding unfinished polygon");
            self.geometry.reset();
            surface.show_pending_outline(&[]);
        }
    }

    /// The only place the click stream is touched
    fn swap_consumer<S: ClickStream + ?Sized>(&mut self, next: ToolState, stream: &mut S) {
        let next_consumer = next.consumer();
        if self.active_consumer() == next_consumer {
            return;
        }

        if let Some(previous) = self.slot.take() {
            stream.unsubscribe(previous.listener);
        }
        self.slot = next_consumer.map(|consumer| Registration {
            consumer,
            listener: stream.subscribe(consumer),
        });

        tracing::debug!("Tool state -> {}", next.name());
    }
}
