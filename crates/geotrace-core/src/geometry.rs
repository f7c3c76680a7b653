//! Polygon tracing state

use crate::Point;

/// Holds the polygon being traced and every trace committed so far.
///
/// The finalized shape is append-only for the lifetime of the session.
#[derive(Debug, Clone, Default)]
pub struct GeometryAccumulator {
    /// Vertices of the in-progress trace, in drawing order
    pending: Vec<Point>,
    /// One ring per completed trace
    finalized: Vec<Vec<Point>>,
}

impl GeometryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex to the in-progress trace
    pub fn append_vertex(&mut self, point: Point) {
        self.pending.push(point);
    }

    /// Commit the in-progress trace and start a new one.
    ///
    /// A double-click delivers its second press as a regular click first, so
    /// the last vertex is a duplicate and is dropped before committing.
    /// Finalizing an empty trace commits an empty ring.
    pub fn finalize(&mut self) -> Vec<Point> {
        let mut ring = std::mem::take(&mut self.pending);
        ring.pop();
        self.finalized.push(ring.clone());
        ring
    }

    /// Discard the in-progress trace without committing it
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    pub fn pending(&self) -> &[Point] {
        &self.pending
    }

    pub fn finalized(&self) -> &[Vec<Point>] {
        &self.finalized
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
