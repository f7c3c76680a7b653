//! Capital markers sized by population

use crate::{Capital, Point};

/// Radius in pixels of the most populous capital's marker
pub const MAX_MARKER_RADIUS: f64 = 20.0;

/// Popup text for the "you are here" marker
pub const CURRENT_POSITION_POPUP: &str = "working!";

/// Marker radius proportional to population.
///
/// A zero `max_population` (no populated capitals) gives a zero radius.
pub fn scaled_radius(population: f64, max_population: f64) -> f64 {
    if max_population <= 0.0 {
        return 0.0;
    }
    MAX_MARKER_RADIUS * (population / max_population)
}

/// Largest population in the batch, never below 0
pub fn max_population(capitals: &[Capital]) -> f64 {
    capitals
        .iter()
        .map(|c| c.population)
        .fold(0.0, f64::max)
}

/// A circle marker for one capital
#[derive(Debug, Clone, PartialEq)]
pub struct CapitalMarker {
    pub position: Point,
    pub radius: f64,
    pub popup: String,
}

/// Popup content for a capital
pub fn capital_popup(capital: &Capital) -> String {
    format!(
        "Capital: {}\nState: {}\nPopulation: {}",
        capital.name, capital.state, capital.population
    )
}

/// Build markers for a whole batch; an empty batch gives no markers
pub fn build_capital_markers(capitals: &[Capital]) -> Vec<CapitalMarker> {
    let max = max_population(capitals);
    tracing::debug!("Max capital population: {}", max);

    capitals
        .iter()
        .map(|capital| CapitalMarker {
            position: capital.position,
            radius: scaled_radius(capital.population, max),
            popup: capital_popup(capital),
        })
        .collect()
}
