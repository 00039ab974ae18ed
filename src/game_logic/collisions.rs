use crate::game_logic::{CollisionMap, point_in_polygon};
use bevy::prelude::*;

/// Anything that can say whether a world position is drivable.
pub trait TrackBoundary {
    fn contains(&self, point: Vec2) -> bool;
}

impl TrackBoundary for CollisionMap {
    fn contains(&self, point: Vec2) -> bool {
        self.is_occupied(point)
    }
}

/// Polygon model of a closed track: drivable means inside the outer ring and
/// outside the inner ring.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeBoundary {
    pub outer: Vec<Vec2>,
    pub inner: Vec<Vec2>,
}

impl TrackBoundary for EdgeBoundary {
    fn contains(&self, point: Vec2) -> bool {
        point_in_polygon(point, &self.outer) && !point_in_polygon(point, &self.inner)
    }
}

/// Corners of an oriented `width x height` box centred on `position`:
/// front right, front left, back left, back right.
pub fn car_corners(position: Vec2, angle: f32, size: Vec2) -> [Vec2; 4] {
    let hw = size.x / 2.0;
    let hh = size.y / 2.0;
    let (dy, dx) = angle.sin_cos();

    [
        position + Vec2::new(dx * hw - dy * hh, dy * hw + dx * hh),
        position + Vec2::new(-dx * hw - dy * hh, -dy * hw + dx * hh),
        position + Vec2::new(-dx * hw + dy * hh, -dy * hw - dx * hh),
        position + Vec2::new(dx * hw + dy * hh, dy * hw - dx * hh),
    ]
}

/// True only when every corner is drivable.
pub fn is_on_track<B: TrackBoundary + ?Sized>(corners: &[Vec2], boundary: &B) -> bool {
    corners.iter().all(|corner| boundary.contains(*corner))
}

// Returns true if the car is clear of the boundary, otherwise damps velocity
// for this tick and returns false
pub fn handle_collision<B: TrackBoundary + ?Sized>(
    position: Vec2,
    angle: f32,
    size: Vec2,
    velocity: &mut Vec2,
    boundary: &B,
    damping: f32,
) -> bool {
    let corners = car_corners(position, angle, size);
    if is_on_track(&corners, boundary) {
        return true;
    }
    *velocity *= damping;
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(center: Vec2, half: f32) -> Vec<Vec2> {
        vec![
            center + Vec2::new(-half, -half),
            center + Vec2::new(half, -half),
            center + Vec2::new(half, half),
            center + Vec2::new(-half, half),
        ]
    }

    fn boundary() -> EdgeBoundary {
        EdgeBoundary {
            outer: ring(Vec2::new(200.0, 200.0), 150.0),
            inner: ring(Vec2::new(200.0, 200.0), 80.0),
        }
    }

    #[test]
    fn test_corners_axis_aligned() {
        let corners = car_corners(Vec2::new(10.0, 10.0), 0.0, Vec2::new(4.0, 2.0));
        assert_eq!(corners[0], Vec2::new(12.0, 11.0));
        assert_eq!(corners[1], Vec2::new(8.0, 11.0));
        assert_eq!(corners[2], Vec2::new(8.0, 9.0));
        assert_eq!(corners[3], Vec2::new(12.0, 9.0));
    }

    #[test]
    fn test_corners_rotated_quarter_turn() {
        let corners = car_corners(Vec2::ZERO, std::f32::consts::FRAC_PI_2, Vec2::new(4.0, 2.0));
        // front right now sits at (-hh, hw)
        assert!((corners[0] - Vec2::new(-1.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn test_on_track_between_rings() {
        let b = boundary();
        let corners = car_corners(Vec2::new(200.0, 85.0), 0.0, Vec2::new(20.0, 10.0));
        assert!(is_on_track(&corners, &b));
    }

    #[test]
    fn test_corner_inside_inner_ring_is_off_track() {
        let b = boundary();
        // Straddles the inner ring's top edge at y = 120: still inside the outer ring.
        let corners = car_corners(Vec2::new(200.0, 118.0), 0.0, Vec2::new(20.0, 10.0));
        assert!(corners.iter().all(|c| point_in_polygon(*c, &b.outer)));
        assert!(!is_on_track(&corners, &b));
    }

    #[test]
    fn test_corner_outside_outer_ring_is_off_track() {
        let b = boundary();
        let corners = car_corners(Vec2::new(200.0, 52.0), 0.0, Vec2::new(20.0, 10.0));
        assert!(!is_on_track(&corners, &b));
    }

    #[test]
    fn test_collision_damps_velocity() {
        let b = boundary();
        let mut velocity = Vec2::new(3.0, 0.0);
        let clear = handle_collision(Vec2::new(200.0, 118.0), 0.0, Vec2::new(20.0, 10.0), &mut velocity, &b, 0.9);
        assert!(!clear);
        assert!((velocity.x - 2.7).abs() < 1e-5);

        let mut velocity = Vec2::new(3.0, 0.0);
        let clear = handle_collision(Vec2::new(200.0, 85.0), 0.0, Vec2::new(20.0, 10.0), &mut velocity, &b, 0.9);
        assert!(clear);
        assert_eq!(velocity, Vec2::new(3.0, 0.0));
    }

    #[test]
    fn test_collision_map_boundary() {
        let mut map = CollisionMap::empty(100.0, 100.0, 4.0);
        map.fill_polygon(&ring(Vec2::new(50.0, 50.0), 30.0));
        let inside = car_corners(Vec2::new(50.0, 50.0), 0.3, Vec2::new(20.0, 10.0));
        assert!(is_on_track(&inside, &map));
        let edge = car_corners(Vec2::new(78.0, 50.0), 0.0, Vec2::new(20.0, 10.0));
        assert!(!is_on_track(&edge, &map));
    }
}
