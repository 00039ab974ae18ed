use crate::game_logic::{
    BASE_COLOR, BASE_WIDTH, CollisionMap, EdgeBoundary, Pose, distinct_vertex_count, midpoint,
    signed_area,
};
use crate::track::{PointArena, PointId};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Offset boundaries of one segment. Both sides have one entry per curve
/// sample, in the same order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Edges {
    pub left: Vec<Vec2>,
    pub right: Vec<Vec2>,
}

impl Edges {
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() || self.right.is_empty()
    }

    /// Left edge forward then right edge backward: the closed ribbon outline.
    pub fn polygon(&self) -> Vec<Vec2> {
        self.left
            .iter()
            .chain(self.right.iter().rev())
            .copied()
            .collect()
    }

    /// Rasterizable only with at least 3 distinct vertices.
    pub fn is_degenerate(&self) -> bool {
        distinct_vertex_count(&self.polygon()) < 3
    }
}

/// One quadratic Bezier between two anchors. `edges` is a cache derived from
/// the three points and the effective width.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub start: PointId,
    pub control: PointId,
    pub end: PointId,
    pub color: Option<String>,
    pub width: Option<f32>,
    pub edges: Edges,
}

impl Segment {
    pub fn new(start: PointId, control: PointId, end: PointId) -> Self {
        Self {
            start,
            control,
            end,
            color: None,
            width: None,
            edges: Edges::default(),
        }
    }

    pub fn references(&self, id: PointId) -> bool {
        self.start == id || self.control == id || self.end == id
    }

    pub fn point_ids(&self) -> [PointId; 3] {
        [self.start, self.control, self.end]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawOptions {
    pub dot_outline: bool,
    pub fill_track: bool,
    pub stroke_track: bool,
    pub draw_controls: bool,
    /// Overrides every other option: draw the collision map only.
    pub draw_collision_map: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            dot_outline: true,
            fill_track: true,
            stroke_track: true,
            draw_controls: true,
            draw_collision_map: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawOption {
    DotOutline,
    FillTrack,
    StrokeTrack,
    DrawControls,
    DrawCollisionMap,
}

impl DrawOptions {
    /// Flip one toggle and return its new value.
    pub fn toggle(&mut self, option: DrawOption) -> bool {
        let flag = match option {
            DrawOption::DotOutline => &mut self.dot_outline,
            DrawOption::FillTrack => &mut self.fill_track,
            DrawOption::StrokeTrack => &mut self.stroke_track,
            DrawOption::DrawControls => &mut self.draw_controls,
            DrawOption::DrawCollisionMap => &mut self.draw_collision_map,
        };
        *flag = !*flag;
        *flag
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub points: PointArena,
    pub segments: Vec<Segment>,
    pub base_width: f32,
    pub base_color: String,
    pub collision_map: CollisionMap,
    pub draw_options: DrawOptions,
    pub name: String,
    pub id: String,
    /// Unix milliseconds.
    pub created_at: u64,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            points: PointArena::new(),
            segments: Vec::new(),
            base_width: BASE_WIDTH,
            base_color: BASE_COLOR.to_string(),
            collision_map: CollisionMap::default(),
            draw_options: DrawOptions::default(),
            name: String::new(),
            id: String::new(),
            created_at: crate::now_millis(),
        }
    }
}

impl Track {
    pub fn new(base_width: f32, base_color: impl Into<String>) -> Self {
        Self {
            base_width,
            base_color: base_color.into(),
            ..Default::default()
        }
    }

    pub fn position(&self, id: PointId) -> Vec2 {
        self.points.position(id)
    }

    pub fn effective_width(&self, segment: &Segment) -> f32 {
        segment.width.unwrap_or(self.base_width)
    }

    /// Indices of every segment that uses `id` as start, control or end.
    pub fn segments_of(&self, id: PointId) -> Vec<usize> {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.references(id))
            .map(|(i, _)| i)
            .collect()
    }

    /// Drop points no segment refers to. Returns the removed ids.
    pub fn prune_orphans(&mut self) -> Vec<PointId> {
        let orphans: Vec<PointId> = self
            .points
            .ids()
            .into_iter()
            .filter(|id| !self.segments.iter().any(|s| s.references(*id)))
            .collect();
        for id in &orphans {
            self.points.remove(*id);
        }
        orphans
    }

    /// Every segment point is present in the arena.
    pub fn is_consistent(&self) -> bool {
        self.segments
            .iter()
            .flat_map(|s| s.point_ids())
            .all(|id| self.points.contains(id))
    }

    /// Closed when the last segment ends on the first segment's start point.
    pub fn is_closed(&self) -> bool {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => self.segments.len() > 1 && last.end == first.start,
            _ => false,
        }
    }

    /// Outer/inner rings of a closed track, built from the chained left and
    /// right edges. The ring enclosing the larger area is the outer one.
    pub fn edge_boundary(&self) -> Option<EdgeBoundary> {
        if !self.is_closed() || self.segments.iter().any(|s| s.edges.is_empty()) {
            return None;
        }
        let left: Vec<Vec2> = self.segments.iter().flat_map(|s| s.edges.left.iter().copied()).collect();
        let right: Vec<Vec2> = self.segments.iter().flat_map(|s| s.edges.right.iter().copied()).collect();
        let (outer, inner) = if signed_area(&left).abs() >= signed_area(&right).abs() {
            (left, right)
        } else {
            (right, left)
        };
        Some(EdgeBoundary { outer, inner })
    }

    /// Midpoint of the first left/right edge pair, facing the midpoint of the
    /// second pair.
    pub fn start_pose(&self) -> Option<Pose> {
        let edges = &self.segments.first()?.edges;
        if edges.left.len() < 2 || edges.right.len() < 2 {
            return None;
        }
        let first = midpoint(edges.left[0], edges.right[0]);
        let second = midpoint(edges.left[1], edges.right[1]);
        let heading = second - first;
        Some(Pose::new(first, heading.y.atan2(heading.x)))
    }
}
