//! Toolbar and status bar

use geotrace_core::{ToolState, format_distance};

use crate::fetch::Dataset;

/// Action triggered from the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    /// The "Draw a polygon" control was pressed
    ToggleDraw,
    /// Re-fetch both datasets from their configured sources
    ReloadData,
    /// Pick a local GeoJSON file for a dataset
    OpenDataset(Dataset),
    /// Store the current view center as the home position
    SaveHome,
    /// Move the view back to the current-position marker
    Recenter,
    /// Restore and save the default settings
    ResetSettings,
}

/// What the toolbar needs to render
#[derive(Debug, Clone, Copy)]
pub struct ToolbarState {
    pub draw_active: bool,
    /// `None` until the map is ready
    pub tool_state: Option<ToolState>,
    pub loading: bool,
    pub last_distance: Option<f64>,
}

/// Render the top toolbar and return any triggered action
pub fn render_toolbar(ctx: &egui::Context, state: ToolbarState) -> Option<ToolbarAction> {
    let mut action = None;

    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Capitals GeoJSON...").clicked() {
                    action = Some(ToolbarAction::OpenDataset(Dataset::Capitals));
                    ui.close();
                }
                if ui.button("Open States GeoJSON...").clicked() {
                    action = Some(ToolbarAction::OpenDataset(Dataset::StateShapes));
                    ui.close();
                }
                ui.separator();
                if ui.button("Reload Data").clicked() {
                    action = Some(ToolbarAction::ReloadData);
                    ui.close();
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Recenter on Current Position").clicked() {
                    action = Some(ToolbarAction::Recenter);
                    ui.close();
                }
                if ui.button("Use Current View as Home").clicked() {
                    action = Some(ToolbarAction::SaveHome);
                    ui.close();
                }
                ui.separator();
                if ui.button("Reset Settings").clicked() {
                    action = Some(ToolbarAction::ResetSettings);
                    ui.close();
                }
            });

            ui.separator();

            let draw_button = egui::Button::new("Draw a polygon").selected(state.draw_active);
            if ui
                .add(draw_button)
                .on_hover_text("Click to add vertices, double-click to finish")
                .clicked()
            {
                action = Some(ToolbarAction::ToggleDraw);
            }

            ui.separator();
            match state.tool_state {
                Some(tool_state) => ui.label(format!("Tool: {}", tool_state.name())),
                None => ui.weak("Map not ready"),
            };

            if let Some(distance) = state.last_distance {
                ui.separator();
                ui.label(format!("Last distance: {}", format_distance(distance)));
            }

            if state.loading {
                ui.separator();
                ui.spinner();
            }
        });
    });

    action
}

/// Render the bottom status line
pub fn render_status_bar(ctx: &egui::Context, status: &str) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.weak(status);
    });
}
