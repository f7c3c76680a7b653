//! Tool state types

use crate::{ClickConsumer, ClickSample, Point};

/// Which tool currently interprets map clicks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolState {
    /// No consumer subscribed; clicks mean nothing to the tools
    Idle,
    /// Polygon tracing
    Drawing,
    /// Distance measurement (the state the map starts in)
    #[default]
    Measuring,
}

impl ToolState {
    /// Get the display name of the state
    pub fn name(&self) -> &'static str {
        match self {
            ToolState::Idle => "Idle",
            ToolState::Drawing => "Drawing",
            ToolState::Measuring => "Measuring",
        }
    }

    pub(crate) fn from_consumer(consumer: Option<ClickConsumer>) -> Self {
        match consumer {
            None => ToolState::Idle,
            Some(ClickConsumer::PolygonDrawer) => ToolState::Drawing,
            Some(ClickConsumer::DistanceMeasurer) => ToolState::Measuring,
        }
    }

    pub(crate) fn consumer(&self) -> Option<ClickConsumer> {
        match self {
            ToolState::Idle => None,
            ToolState::Drawing => Some(ClickConsumer::PolygonDrawer),
            ToolState::Measuring => Some(ClickConsumer::DistanceMeasurer),
        }
    }
}

/// What a dispatched event did
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// A vertex was appended to the in-progress polygon
    VertexAdded { vertices: usize },
    /// The in-progress polygon was committed; drawing has ended
    PolygonFinalized { ring: Vec<Point> },
    /// A measurement click was recorded
    Measured(ClickSample),
}
