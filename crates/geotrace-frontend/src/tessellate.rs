//! Polygon triangulation for filled state shapes
//!
//! egui only fills convex paths, so state boundaries are triangulated once
//! when loaded and drawn as meshes.

use geotrace_core::{Point, StateShape};

/// Triangles of one polygon (outer ring plus holes)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonMesh {
    pub vertices: Vec<Point>,
    /// Triangle list into `vertices`
    pub indices: Vec<usize>,
}

/// GeoJSON rings repeat their first vertex at the end; earcut expects open rings
fn open_ring(ring: &[Point]) -> &[Point] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Triangulate `[outer, holes...]`. Returns `None` if earcut rejects the rings.
pub fn triangulate(polygon: &[Vec<Point>]) -> Option<PolygonMesh> {
    let mut vertices = Vec::new();
    let mut coords: Vec<f64> = Vec::new();
    let mut hole_starts = Vec::new();

    for (i, ring) in polygon.iter().enumerate() {
        let ring = open_ring(ring);
        if i > 0 {
            hole_starts.push(vertices.len());
        }
        for point in ring {
            coords.push(point.longitude);
            coords.push(point.latitude);
            vertices.push(*point);
        }
    }

    let indices = earcutr::earcut(&coords, &hole_starts, 2).ok()?;
    if indices.len() < 3 || indices.len() % 3 != 0 {
        return None;
    }

    Some(PolygonMesh { vertices, indices })
}

/// Triangulate every polygon of a shape, skipping ones that fail
pub fn triangulate_shape(shape: &StateShape) -> Vec<PolygonMesh> {
    shape
        .polygons
        .iter()
        .filter_map(|polygon| {
            let mesh = triangulate(polygon);
            if mesh.is_none() {
                tracing::warn!("Could not triangulate a polygon of {}", shape.name);
            }
            mesh
        })
        .collect()
}
