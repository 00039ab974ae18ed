use bevy::prelude::*;
use std::collections::BTreeMap;

/// Stable handle to a point in a [`PointArena`]. Ids are never reused within
/// one arena, so ordering by id is insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(pub u32);

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackPoint {
    pub position: Vec2,
    pub is_control: bool,
}

impl TrackPoint {
    pub fn anchor(position: Vec2) -> Self {
        Self {
            position,
            is_control: false,
        }
    }

    pub fn control(position: Vec2) -> Self {
        Self {
            position,
            is_control: true,
        }
    }
}

/// Owns every point of a track graph. Segments refer to points by id, so
/// moving a point here moves it in every segment that uses it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointArena {
    points: BTreeMap<PointId, TrackPoint>,
    next_id: u32,
}

impl PointArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, point: TrackPoint) -> PointId {
        let id = PointId(self.next_id);
        self.next_id += 1;
        self.points.insert(id, point);
        id
    }

    pub fn get(&self, id: PointId) -> Option<&TrackPoint> {
        self.points.get(&id)
    }

    pub fn get_mut(&mut self, id: PointId) -> Option<&mut TrackPoint> {
        self.points.get_mut(&id)
    }

    /// Position of `id`, or the origin for a dangling id.
    pub fn position(&self, id: PointId) -> Vec2 {
        self.points.get(&id).map_or(Vec2::ZERO, |p| p.position)
    }

    pub fn remove(&mut self, id: PointId) -> Option<TrackPoint> {
        self.points.remove(&id)
    }

    pub fn contains(&self, id: PointId) -> bool {
        self.points.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PointId, &TrackPoint)> {
        self.points.iter().map(|(id, p)| (*id, p))
    }

    pub fn ids(&self) -> Vec<PointId> {
        self.points.keys().copied().collect()
    }

    /// Point at exactly `position`, else the nearest one closer than
    /// `tolerance`.
    pub fn find_at(&self, position: Vec2, tolerance: f32) -> Option<PointId> {
        if let Some((id, _)) = self.iter().find(|(_, p)| p.position == position) {
            return Some(id);
        }
        self.iter()
            .map(|(id, p)| (id, p.position.distance(position)))
            .filter(|(_, d)| *d < tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }
}
