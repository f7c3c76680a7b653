//! Main application

use geotrace_core::{MapError, MapSession, Point, ToolState};

use crate::config::{DataSource, SharedConfig, UiTheme, create_shared_config};
use crate::fetch::{Dataset, FetchResult, FetchService};
use crate::map_view::{MapCanvas, MapView};
use crate::panels::{ToolbarAction, ToolbarState, render_status_bar, render_toolbar};

/// Geotrace application
pub struct GeotraceApp {
    config: SharedConfig,
    canvas: MapCanvas,
    /// `None` when the map could not be initialized
    session: Option<MapSession>,
    fetch: FetchService,
    status: String,
}

impl GeotraceApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = create_shared_config();
        let (map_config, theme) = {
            let cfg = config.read();
            (cfg.config().map.clone(), cfg.config().ui.theme)
        };

        match theme {
            UiTheme::Light => cc.egui_ctx.set_visuals(egui::Visuals::light()),
            UiTheme::Dark => cc.egui_ctx.set_visuals(egui::Visuals::dark()),
        }

        let center = map_config.home.unwrap_or(Point::new(0.0, 0.0));
        let mut canvas = MapCanvas::new(MapView::new(
            center,
            map_config.zoom,
            map_config.min_zoom,
            map_config.max_zoom,
        ));

        let (session, status) = match MapSession::start(map_config.home, &mut canvas) {
            Ok(session) => (Some(session), "Map ready".to_string()),
            Err(e) => {
                tracing::warn!("No map shown: {}", e);
                (None, e.to_string())
            }
        };

        let mut app = Self {
            config,
            canvas,
            session,
            fetch: FetchService::new(),
            status,
        };

        if app.session.is_some() {
            app.request_all(&cc.egui_ctx);
        }
        app
    }

    fn request_all(&mut self, ctx: &egui::Context) {
        let data = self.config.read().config().data.clone();
        self.fetch
            .request(Dataset::Capitals, data.capitals, Some(ctx.clone()));
        self.fetch
            .request(Dataset::StateShapes, data.states, Some(ctx.clone()));
    }

    /// Apply finished fetches on the UI thread
    fn apply_fetch_results(&mut self) {
        for FetchResult {
            dataset,
            source,
            result,
        } in self.fetch.poll()
        {
            let Some(session) = self.session.as_mut() else {
                continue;
            };
            match result {
                Ok(collection) => match dataset {
                    Dataset::Capitals => {
                        let count = session.load_capitals(&collection);
                        self.status = format!("Loaded {} capitals", count);
                    }
                    Dataset::StateShapes => {
                        let count = session.load_state_shapes(&collection);
                        self.canvas.rebuild_shape_meshes(session);
                        self.status = format!("Loaded {} states", count);
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        "Failed to load {} from {}: {}",
                        dataset.name(),
                        source.describe(),
                        e
                    );
                    self.status = format!("Could not load {}: {}", dataset.name(), e);
                }
            }
        }
    }

    fn toggle_draw(&mut self) -> Result<ToolState, MapError> {
        let session = self.session.as_mut().ok_or(MapError::MapNotReady)?;
        Ok(session.toggle_draw(&mut self.canvas))
    }

    fn handle_toolbar_action(&mut self, ctx: &egui::Context, action: ToolbarAction) {
        match action {
            ToolbarAction::ToggleDraw => match self.toggle_draw() {
                Ok(ToolState::Drawing) => {
                    self.status = "Click to add vertices, double-click to finish".to_string()
                }
                Ok(state) => self.status = format!("Tool: {}", state.name()),
                Err(e) => self.status = e.to_string(),
            },
            ToolbarAction::ReloadData => {
                if self.session.is_some() {
                    self.request_all(ctx);
                } else {
                    self.status = MapError::MapNotReady.to_string();
                }
            }
            ToolbarAction::OpenDataset(dataset) => self.open_dataset(ctx, dataset),
            ToolbarAction::Recenter => match &self.session {
                Some(session) => self.canvas.view.center = session.center(),
                None => self.status = MapError::MapNotReady.to_string(),
            },
            ToolbarAction::ResetSettings => {
                let mut config = self.config.write();
                config.reset_to_defaults();
                self.status = match config.save() {
                    Ok(()) => format!(
                        "Settings reset, saved to {}",
                        config.config_file_path().display()
                    ),
                    Err(e) => format!("Could not save config: {}", e),
                };
            }
            ToolbarAction::SaveHome => {
                let center = self.canvas.view.center;
                let zoom = self.canvas.view.zoom;
                let mut config = self.config.write();
                config.config_mut().map.home = Some(center);
                config.config_mut().map.zoom = zoom;
                self.status = match config.save() {
                    Ok(()) => format!("Home set to {}", center),
                    Err(e) => format!("Could not save config: {}", e),
                };
            }
        }
    }

    fn open_dataset(&mut self, ctx: &egui::Context, dataset: Dataset) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("GeoJSON", &["geojson", "json"])
            .pick_file()
        else {
            return;
        };

        let source = DataSource::File(path);
        {
            let mut config = self.config.write();
            let data = &mut config.config_mut().data;
            match dataset {
                Dataset::Capitals => data.capitals = source.clone(),
                Dataset::StateShapes => data.states = source.clone(),
            }
            if let Err(e) = config.save() {
                tracing::warn!("Could not save config: {}", e);
            }
        }

        if self.session.is_some() {
            self.fetch.request(dataset, source, Some(ctx.clone()));
        }
    }

    fn show_map(&mut self, ui: &mut egui::Ui) {
        let (response, painter, input) = self.canvas.interact(ui);
        let rect = response.rect;

        if let Some(session) = self.session.as_mut() {
            for event in input.events {
                for listener in self.canvas.listener_ids() {
                    if let Some(outcome) = session.handle_event(listener, event, &mut self.canvas)
                    {
                        tracing::debug!("{:?}", outcome);
                    }
                }
            }
            session.pointer_moved(input.hover);
        }

        self.canvas.paint(&painter, rect, self.session.as_ref());

        match (&self.session, response.hover_pos()) {
            (Some(session), Some(pointer)) => {
                self.canvas
                    .paint_capital_popup(&painter, rect, session, pointer);
            }
            (None, _) => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    &self.status,
                    egui::FontId::proportional(18.0),
                    egui::Color32::DARK_GRAY,
                );
            }
            _ => {}
        }
    }
}

impl eframe::App for GeotraceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_fetch_results();

        let toolbar_state = ToolbarState {
            draw_active: self
                .session
                .as_ref()
                .is_some_and(|s| s.tools().draw_control_active()),
            tool_state: self.session.as_ref().map(|s| s.tool_state()),
            loading: self.fetch.is_busy(),
            last_distance: self.canvas.last_distance(),
        };
        if let Some(action) = render_toolbar(ctx, toolbar_state) {
            self.handle_toolbar_action(ctx, action);
        }

        render_status_bar(ctx, &self.status);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.show_map(ui));
    }

    fn on_exit(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.close(&mut self.canvas);
        }
        tracing::debug!("Closed map with {} listeners left", self.canvas.listener_count());
    }
}
