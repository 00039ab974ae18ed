//! Derives segment edges and the collision map from the point graph.
//!
//! Rebuilding is a pure function of the points, segments and widths: running
//! it twice on an unchanged track gives the same result.

use crate::config::SandboxConfig;
use crate::game_logic::{
    CANVAS_HEIGHT, CANVAS_WIDTH, CELL_SIZE, COLLISION_MARGIN, CollisionMap, EDGE_SAMPLES,
    offset_normal, quadratic_bezier_tangent, sample_quadratic_bezier,
};
use crate::track::{Edges, PointArena, Segment, Track};
use bevy::log::{debug, trace};
use bevy::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackBuilder {
    pub samples: usize,
    pub cell_size: f32,
    /// Rasterized area, margin included.
    pub bounds: Vec2,
}

impl Default for TrackBuilder {
    fn default() -> Self {
        Self {
            samples: EDGE_SAMPLES,
            cell_size: CELL_SIZE,
            bounds: Vec2::new(CANVAS_WIDTH + COLLISION_MARGIN, CANVAS_HEIGHT + COLLISION_MARGIN),
        }
    }
}

impl From<&SandboxConfig> for TrackBuilder {
    fn from(config: &SandboxConfig) -> Self {
        Self {
            samples: config.edge_samples.max(1),
            cell_size: config.cell_size,
            bounds: Vec2::new(
                config.canvas_width + config.collision_margin,
                config.canvas_height + config.collision_margin,
            ),
        }
    }
}

/// Sample the curve `p0 -> p1 -> p2` and offset each sample by half the
/// width along the analytic normal. Right is `+normal`, left is `-normal`.
pub fn build_curve_edges(p0: Vec2, p1: Vec2, p2: Vec2, width: f32, samples: usize) -> Edges {
    let half = width / 2.0;
    let mut edges = Edges {
        left: Vec::with_capacity(samples + 1),
        right: Vec::with_capacity(samples + 1),
    };
    for (point, t) in sample_quadratic_bezier(p0, p1, p2, samples) {
        let normal = offset_normal(quadratic_bezier_tangent(p0, p1, p2, t));
        edges.right.push(point + normal * half);
        edges.left.push(point - normal * half);
    }
    edges
}

pub fn build_segment_edges(points: &PointArena, segment: &Segment, width: f32, samples: usize) -> Edges {
    build_curve_edges(
        points.position(segment.start),
        points.position(segment.control),
        points.position(segment.end),
        width,
        samples,
    )
}

// average the touching ends of `a` (its last sample) and `b` (its first)
fn average_join(a: &mut Edges, b: &mut Edges) {
    if a.is_empty() || b.is_empty() {
        return;
    }
    let (al, ar) = (a.left.len() - 1, a.right.len() - 1);
    let left = (a.left[al] + b.left[0]) / 2.0;
    let right = (a.right[ar] + b.right[0]) / 2.0;
    a.left[al] = left;
    b.left[0] = left;
    a.right[ar] = right;
    b.right[0] = right;
}

/// Average edge endpoints wherever consecutive segments meet at the same
/// anchor position, including the wraparound join of a closed track.
pub fn smooth_segment_joins(track: &mut Track) {
    let count = track.segments.len();
    if count < 2 {
        return;
    }

    let joins = |a: &Segment, b: &Segment| {
        a.end == b.start || track.points.position(a.end) == track.points.position(b.start)
    };
    let mut pairs: Vec<(usize, usize)> = (0..count - 1)
        .filter(|&i| joins(&track.segments[i], &track.segments[i + 1]))
        .map(|i| (i, i + 1))
        .collect();
    if joins(&track.segments[count - 1], &track.segments[0]) {
        pairs.push((count - 1, 0));
    }

    for (i, j) in pairs {
        let (a, b) = if i < j {
            let (head, tail) = track.segments.split_at_mut(j);
            (&mut head[i], &mut tail[0])
        } else {
            let (head, tail) = track.segments.split_at_mut(i);
            (&mut tail[0], &mut head[j])
        };
        average_join(&mut a.edges, &mut b.edges);
    }
}

impl TrackBuilder {
    pub fn new(samples: usize, cell_size: f32, bounds: Vec2) -> Self {
        Self {
            samples: samples.max(1),
            cell_size,
            bounds,
        }
    }

    /// Recompute every segment's edges and smooth the joins. Leaves the
    /// collision map alone, for live point drags.
    pub fn rebuild_edges(&self, track: &mut Track) {
        for i in 0..track.segments.len() {
            let width = track.effective_width(&track.segments[i]);
            let edges = build_segment_edges(&track.points, &track.segments[i], width, self.samples);
            track.segments[i].edges = edges;
        }
        smooth_segment_joins(track);
    }

    /// Rasterize the union of all segment ribbons.
    pub fn build_collision_map(&self, track: &Track) -> CollisionMap {
        let mut map = CollisionMap::empty(self.bounds.x, self.bounds.y, self.cell_size);
        for (i, segment) in track.segments.iter().enumerate() {
            if segment.edges.is_degenerate() {
                debug!(segment = i, "skipping degenerate segment polygon");
                continue;
            }
            map.fill_polygon(&segment.edges.polygon());
        }
        map
    }

    /// Edges, joins and collision map.
    pub fn rebuild(&self, track: &mut Track) {
        self.rebuild_edges(track);
        track.collision_map = self.build_collision_map(track);
        trace!(
            segments = track.segments.len(),
            occupied = track.collision_map.occupied_count(),
            "track rebuilt"
        );
    }
}
