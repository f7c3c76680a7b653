//! UI panels around the map canvas

pub mod toolbar;

pub use toolbar::{ToolbarAction, ToolbarState, render_status_bar, render_toolbar};
