use std::f32::consts::TAU;

use glam::Vec2;

use crate::device::Vertex;

/// Unit quad, top-left origin, drawn as a triangle fan.
pub(crate) const QUAD_VERTICES: [Vertex; 4] = [
    Vertex::new(0.0, 0.0),
    Vertex::new(0.0, 1.0),
    Vertex::new(1.0, 1.0),
    Vertex::new(1.0, 0.0),
];

/// Texture coordinates matching [`QUAD_VERTICES`].
pub(crate) const QUAD_UVS: [Vertex; 4] = QUAD_VERTICES;

/// `segments` points evenly spaced on a circle, counter-clockwise from
/// `start_angle` (radians).
pub fn circle_to_polygon(center: Vec2, radius: f32, segments: u32, start_angle: f32) -> Vec<Vec2> {
    let step = TAU / segments.max(1) as f32;
    (0..segments)
        .map(|i| {
            let angle = start_angle + step * i as f32;
            center + Vec2::from_angle(angle) * radius
        })
        .collect()
}

/// Closed outline of a regular polygon inscribed in a circle of diameter 1
/// centred on the local origin, so the shape spins in place around its
/// position.
///
/// The first point is repeated to close the loop. With `show_rotation` the
/// strip ends at the center, drawing a radius that shows the current angle.
pub(crate) fn polygon_outline(segments: u32, show_rotation: bool) -> Vec<Vertex> {
    let mut points = circle_to_polygon(Vec2::ZERO, 0.5, segments, 0.0);
    if let Some(first) = points.first().copied() {
        points.push(first);
    }
    if show_rotation {
        points.push(Vec2::ZERO);
    }
    points.into_iter().map(|p| Vertex::new(p.x, p.y)).collect()
}
