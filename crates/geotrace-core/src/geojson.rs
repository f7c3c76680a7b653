//! GeoJSON feature collections and their validated forms
//!
//! Collections are parsed loosely, then each feature is validated into a
//! [`Capital`] or [`StateShape`]. Features that cannot be used are skipped
//! with a warning; the rest of the batch still loads.

use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{MapError, Point};

/// A GeoJSON `FeatureCollection` as delivered by the data service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// One feature, geometry still unvalidated
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

/// Geometry types the map understands
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Point {
        coordinates: Vec<f64>,
    },
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

impl FeatureCollection {
    pub fn from_json_str(text: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, MapError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Validate every point feature into a capital
    pub fn capitals(&self) -> Vec<Capital> {
        self.features
            .iter()
            .enumerate()
            .filter_map(|(index, feature)| {
                let capital = Capital::from_feature(feature);
                if capital.is_none() {
                    tracing::warn!("Skipping capital feature {}: no usable point geometry", index);
                }
                capital
            })
            .collect()
    }

    /// Validate every polygon feature into a state shape
    pub fn state_shapes(&self) -> Vec<StateShape> {
        self.features
            .iter()
            .enumerate()
            .filter_map(|(index, feature)| {
                let shape = StateShape::from_feature(feature);
                if shape.is_none() {
                    tracing::warn!("Skipping state feature {}: no usable polygon geometry", index);
                }
                shape
            })
            .collect()
    }
}

impl Feature {
    fn geometry(&self) -> Option<Geometry> {
        let value = self.geometry.clone()?;
        match serde_json::from_value(value) {
            Ok(geometry) => Some(geometry),
            Err(e) => {
                tracing::warn!("Malformed geometry: {}", e);
                None
            }
        }
    }

    fn property(&self, keys: &[&str]) -> Option<&Value> {
        let properties = self.properties.as_ref()?;
        keys.iter().find_map(|key| properties.get(*key))
    }

    fn string_property(&self, keys: &[&str]) -> String {
        match self.property(keys) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    /// Population as a non-negative number; missing or non-numeric values are 0
    fn population(&self) -> f64 {
        let value = match self.property(&["population", "POPULATION"]) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        };
        if value.is_finite() && value > 0.0 {
            value
        } else {
            0.0
        }
    }
}

fn position(coords: &[f64]) -> Option<Point> {
    match coords {
        [lon, lat, ..] => {
            let point = Point::from_lon_lat([*lon, *lat]);
            point.is_valid().then_some(point)
        }
        _ => None,
    }
}

fn ring(coords: &[Vec<f64>]) -> Option<Vec<Point>> {
    let points: Option<Vec<Point>> = coords.iter().map(|c| position(c)).collect();
    points.filter(|p| p.len() >= 3)
}

/// A state capital
#[derive(Debug, Clone, PartialEq)]
pub struct Capital {
    pub name: String,
    pub state: String,
    pub position: Point,
    pub population: f64,
}

impl Capital {
    fn from_feature(feature: &Feature) -> Option<Self> {
        let Geometry::Point { coordinates } = feature.geometry()? else {
            return None;
        };
        Some(Self {
            name: feature.string_property(&["name", "NAME"]),
            state: feature.string_property(&["state", "STATE"]),
            position: position(&coordinates)?,
            population: feature.population(),
        })
    }
}

/// A state boundary, read-only apart from its display style
#[derive(Debug, Clone, PartialEq)]
pub struct StateShape {
    pub id: Uuid,
    pub name: String,
    pub population: f64,
    pub density: Option<f64>,
    /// Polygons as `[outer, holes...]` ring lists
    pub polygons: Vec<Vec<Vec<Point>>>,
}

impl StateShape {
    fn from_feature(feature: &Feature) -> Option<Self> {
        let polygons = match feature.geometry()? {
            Geometry::Polygon { coordinates } => vec![coordinates],
            Geometry::MultiPolygon { coordinates } => coordinates,
            Geometry::Point { .. } | Geometry::Unsupported => return None,
        };

        let polygons: Vec<Vec<Vec<Point>>> = polygons
            .iter()
            .filter_map(|rings| {
                let mut rings = rings.iter();
                let mut polygon = vec![ring(rings.next()?)?];
                polygon.extend(rings.filter_map(|r| ring(r)));
                Some(polygon)
            })
            .collect();
        if polygons.is_empty() {
            return None;
        }

        Some(Self {
            id: Uuid::new_v4(),
            name: feature.string_property(&["name", "NAME"]),
            population: feature.population(),
            density: feature.property(&["density"]).and_then(Value::as_f64),
            polygons,
        })
    }

    /// South-west and north-east corners of the bounding box
    pub fn bounds(&self) -> (Point, Point) {
        let mut points = self.polygons.iter().flatten().flatten();
        let Some(&first) = points.next() else {
            return (Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        };
        points.fold((first, first), |(sw, ne), p| {
            (
                Point::new(sw.latitude.min(p.latitude), sw.longitude.min(p.longitude)),
                Point::new(ne.latitude.max(p.latitude), ne.longitude.max(p.longitude)),
            )
        })
    }

    /// Even-odd point-in-polygon test over every ring, so holes are excluded
    pub fn contains(&self, point: Point) -> bool {
        let (x, y) = (point.longitude, point.latitude);
        let mut inside = false;
        for ring in self.polygons.iter().flatten() {
            let mut j = ring.len() - 1;
            for i in 0..ring.len() {
                let (xi, yi) = (ring[i].longitude, ring[i].latitude);
                let (xj, yj) = (ring[j].longitude, ring[j].latitude);
                if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }
}
