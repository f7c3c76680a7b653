//! GeoJSON data fetch service
//!
//! Each request runs on its own thread. Results come back through a channel
//! that the app drains on the UI thread, so loaded data is only ever written
//! from the event loop.

use std::sync::mpsc::{self, Receiver, Sender};

use geotrace_core::{FeatureCollection, MapError};
use thiserror::Error;

use crate::config::DataSource;

/// Fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    #[error(transparent)]
    GeoJson(#[from] MapError),
}

/// The datasets the map loads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Capitals,
    StateShapes,
}

impl Dataset {
    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Capitals => "capitals",
            Dataset::StateShapes => "state shapes",
        }
    }
}

/// A completed request
#[derive(Debug)]
pub struct FetchResult {
    pub dataset: Dataset,
    pub source: DataSource,
    pub result: Result<FeatureCollection, FetchError>,
}

/// Read and parse a feature collection, blocking
pub fn fetch_collection(source: &DataSource) -> Result<FeatureCollection, FetchError> {
    match source {
        DataSource::File(path) => {
            let bytes = std::fs::read(path)?;
            Ok(FeatureCollection::from_slice(&bytes)?)
        }
        DataSource::Url(url) => {
            let mut response = ureq::get(url.as_str()).call()?;
            let text = response.body_mut().read_to_string()?;
            Ok(FeatureCollection::from_json_str(&text)?)
        }
    }
}

/// Background fetcher with a single result channel
pub struct FetchService {
    sender: Sender<FetchResult>,
    receiver: Receiver<FetchResult>,
    in_flight: usize,
}

impl FetchService {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Start loading a dataset; `ctx` is repainted when it completes
    pub fn request(&mut self, dataset: Dataset, source: DataSource, ctx: Option<egui::Context>) {
        tracing::info!("Fetching {} from {}", dataset.name(), source.describe());
        let sender = self.sender.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("fetch-{}", dataset.name()))
            .spawn(move || {
                let result = fetch_collection(&source);
                // The receiver only disappears when the app is shutting down
                let _ = sender.send(FetchResult {
                    dataset,
                    source,
                    result,
                });
                if let Some(ctx) = ctx {
                    ctx.request_repaint();
                }
            });

        match spawned {
            Ok(_) => self.in_flight += 1,
            Err(e) => tracing::warn!("Failed to start fetch thread: {}", e),
        }
    }

    /// Drain completed requests without blocking
    pub fn poll(&mut self) -> Vec<FetchResult> {
        let results: Vec<FetchResult> = self.receiver.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(results.len());
        results
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }
}

impl Default for FetchService {
    fn default() -> Self {
        Self::new()
    }
}
