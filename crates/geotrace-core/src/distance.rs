//! Two-point distance measurement

use std::collections::VecDeque;

use crate::Point;

/// Mean Earth radius in metres used by the map surface's own distance query
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Number of points kept for a measurement
const WINDOW: usize = 2;

/// Great-circle distance in metres between two points (haversine, spherical Earth)
pub fn haversine_distance(a: Point, b: Point) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let sin_d_lat = ((b.latitude - a.latitude).to_radians() / 2.0).sin();
    let sin_d_lon = ((b.longitude - a.longitude).to_radians() / 2.0).sin();

    let h = sin_d_lat * sin_d_lat + lat1.cos() * lat2.cos() * sin_d_lon * sin_d_lon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Format a distance in metres with one decimal place
pub fn format_distance(metres: f64) -> String {
    format!("{:.1} m", metres)
}

/// Result of recording one measurement click
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickSample {
    /// Running click counter, used for marker labels only
    pub count: u64,
    /// Distance to the previous click, once two clicks are buffered
    pub distance: Option<f64>,
}

/// Sliding window over the last two measurement clicks
#[derive(Debug, Clone, Default)]
pub struct DistanceSampler {
    buffer: VecDeque<Point>,
    count: u64,
}

impl DistanceSampler {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(WINDOW),
            count: 0,
        }
    }

    /// Record a click, evicting the oldest buffered point when full.
    ///
    /// After [A, B] the next click C leaves [B, C], so consecutive clicks
    /// always measure consecutive segments.
    pub fn record_click(&mut self, point: Point) -> ClickSample {
        self.count += 1;
        if self.buffer.len() == WINDOW {
            self.buffer.pop_front();
        }
        self.buffer.push_back(point);

        let distance = match (self.buffer.front(), self.buffer.get(1)) {
            (Some(&a), Some(&b)) => Some(haversine_distance(a, b)),
            _ => None,
        };

        ClickSample {
            count: self.count,
            distance,
        }
    }

    pub fn click_count(&self) -> u64 {
        self.count
    }

    pub fn buffered(&self) -> impl Iterator<Item = &Point> {
        self.buffer.iter()
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_haversine_one_degree_on_equator() {
        let d = haversine_distance(Point::new(0.0, 0.0), Point::new(0.0, 1.0));
        assert_relative_eq!(d, EARTH_RADIUS_M * std::f64::consts::PI / 180.0, epsilon = 1e-6);
    }

    #[test]
    fn test_haversine_is_symmetric_and_zero_on_same_point() {
        let a = Point::new(38.9, -77.03);
        let b = Point::new(40.71, -74.0);
        assert_relative_eq!(haversine_distance(a, b), haversine_distance(b, a), epsilon = 1e-9);
        assert_eq!(haversine_distance(a, a), 0.0);
    }

    #[test]
    fn test_first_click_has_no_distance() {
        let mut sampler = DistanceSampler::new();
        let sample = sampler.record_click(Point::new(10.0, 10.0));
        assert_eq!(sample.count, 1);
        assert_eq!(sample.distance, None);
    }

    #[test]
    fn test_fifo_window_measures_consecutive_pairs() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(0.0, 1.0);
        let c = Point::new(0.0, 3.0);
        let mut sampler = DistanceSampler::new();

        sampler.record_click(a);
        let second = sampler.record_click(b);
        let third = sampler.record_click(c);

        assert_relative_eq!(second.distance.unwrap(), haversine_distance(a, b));
        assert_relative_eq!(third.distance.unwrap(), haversine_distance(b, c));
        assert!((third.distance.unwrap() - haversine_distance(a, c)).abs() > 1.0);
        assert_eq!(third.count, 3);
    }

    #[test]
    fn test_buffer_never_exceeds_two() {
        let mut sampler = DistanceSampler::new();
        for i in 0..10 {
            sampler.record_click(Point::new(0.0, i as f64));
            assert!(sampler.buffered_len() <= 2);
        }
        let kept: Vec<_> = sampler.buffered().copied().collect();
        assert_eq!(kept, vec![Point::new(0.0, 8.0), Point::new(0.0, 9.0)]);
        assert_eq!(sampler.click_count(), 10);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(1234.567), "1234.6 m");
    }
}
