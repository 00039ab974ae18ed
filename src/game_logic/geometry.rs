use crate::game_logic::POLYGON_EPSILON;
use bevy::prelude::*;

/// Ray-casting parity test.
///
/// The ring is implicitly closed (last vertex connects back to the first).
/// The epsilon in the denominator keeps the crossing test finite for
/// horizontal edges.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        let crosses = (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y + POLYGON_EPSILON) + pi.x;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Point on the quadratic Bezier `p0 -> p1 -> p2` at parameter `t`.
pub fn quadratic_bezier_point(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

/// Analytic derivative of the quadratic Bezier at `t`.
pub fn quadratic_bezier_tangent(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    (p1 - p0) * (2.0 * (1.0 - t)) + (p2 - p1) * (2.0 * t)
}

/// Evenly spaced samples of a quadratic Bezier, `t` running 0..=1.
///
/// Yields `sample_count + 1` `(point, t)` pairs. The iterator is `Clone`, so
/// it can be restarted from the beginning at any time.
#[derive(Clone, Debug)]
pub struct BezierSamples {
    p0: Vec2,
    p1: Vec2,
    p2: Vec2,
    sample_count: usize,
    next: usize,
}

impl Iterator for BezierSamples {
    type Item = (Vec2, f32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.sample_count {
            return None;
        }
        let i = self.next;
        self.next += 1;

        // Pin the endpoints so the first and last samples are exact.
        let point = if i == 0 {
            self.p0
        } else if i == self.sample_count {
            self.p2
        } else {
            let t = i as f32 / self.sample_count as f32;
            quadratic_bezier_point(self.p0, self.p1, self.p2, t)
        };
        let t = if self.sample_count == 0 {
            0.0
        } else {
            i as f32 / self.sample_count as f32
        };
        Some((point, t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.sample_count + 1).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BezierSamples {}

pub fn sample_quadratic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, sample_count: usize) -> BezierSamples {
    BezierSamples {
        p0,
        p1,
        p2,
        sample_count,
        next: 0,
    }
}

/// Unit normal of a tangent, rotated 90 degrees.
///
/// A zero-length tangent is treated as having length 1 so nothing downstream
/// sees NaN.
pub fn offset_normal(tangent: Vec2) -> Vec2 {
    let len = tangent.length();
    let len = if len > 0.0 { len } else { 1.0 };
    Vec2::new(-tangent.y / len, tangent.x / len)
}

pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) / 2.0
}

/// Signed shoelace area, positive for counter-clockwise rings in a y-up frame.
pub fn signed_area(ring: &[Vec2]) -> f32 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        area += ring[j].x * ring[i].y - ring[i].x * ring[j].y;
        j = i;
    }
    area / 2.0
}

/// Number of vertices in a ring that differ from every earlier vertex.
pub fn distinct_vertex_count(ring: &[Vec2]) -> usize {
    let mut seen: Vec<Vec2> = Vec::with_capacity(ring.len());
    for p in ring {
        if !seen.contains(p) {
            seen.push(*p);
        }
    }
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_point_in_polygon_inside_and_outside() {
        let poly = square();
        assert!(point_in_polygon(Vec2::new(5.0, 5.0), &poly));
        assert!(point_in_polygon(Vec2::new(0.5, 9.5), &poly));
        assert!(!point_in_polygon(Vec2::new(15.0, 5.0), &poly));
        assert!(!point_in_polygon(Vec2::new(-1.0, -1.0), &poly));
        assert!(!point_in_polygon(Vec2::new(5.0, 20.0), &poly));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // U shape with the notch open at the top
        let poly = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 0.0),
            Vec2::new(30.0, 30.0),
            Vec2::new(20.0, 30.0),
            Vec2::new(20.0, 10.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(10.0, 30.0),
            Vec2::new(0.0, 30.0),
        ];
        assert!(point_in_polygon(Vec2::new(5.0, 20.0), &poly));
        assert!(point_in_polygon(Vec2::new(25.0, 20.0), &poly));
        assert!(!point_in_polygon(Vec2::new(15.0, 20.0), &poly));
    }

    #[test]
    fn test_degenerate_polygon_contains_nothing() {
        let line = vec![Vec2::ZERO, Vec2::new(10.0, 10.0)];
        assert!(!point_in_polygon(Vec2::new(5.0, 5.0), &line));
    }

    #[test]
    fn test_bezier_sample_count_and_endpoints() {
        let p0 = Vec2::new(3.0, -7.0);
        let p1 = Vec2::new(40.0, 12.5);
        let p2 = Vec2::new(-9.0, 81.0);

        for n in [1, 2, 10, 40, 50] {
            let samples: Vec<_> = sample_quadratic_bezier(p0, p1, p2, n).collect();
            assert_eq!(samples.len(), n + 1);
            assert_eq!(samples[0], (p0, 0.0));
            assert_eq!(samples[n].0, p2);
            assert_eq!(samples[n].1, 1.0);
        }
    }

    #[test]
    fn test_bezier_samples_restart() {
        let samples = sample_quadratic_bezier(Vec2::ZERO, Vec2::new(5.0, 5.0), Vec2::new(10.0, 0.0), 4);
        let first: Vec<_> = samples.clone().collect();
        let second: Vec<_> = samples.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_straight_bezier_midpoint() {
        let mid = quadratic_bezier_point(Vec2::ZERO, Vec2::new(50.0, 0.0), Vec2::new(100.0, 0.0), 0.5);
        assert!((mid - Vec2::new(50.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_offset_normal_unit_and_degenerate() {
        let n = offset_normal(Vec2::new(3.0, 0.0));
        assert!((n - Vec2::new(0.0, 1.0)).length() < 1e-6);

        let n = offset_normal(Vec2::new(0.0, -2.0));
        assert!((n - Vec2::new(1.0, 0.0)).length() < 1e-6);

        let n = offset_normal(Vec2::ZERO);
        assert!(n.x.is_finite() && n.y.is_finite());
        assert_eq!(n, Vec2::ZERO);
    }

    #[test]
    fn test_signed_area() {
        let poly = square();
        assert!((signed_area(&poly) - 100.0).abs() < 1e-4);
        let reversed: Vec<_> = poly.iter().rev().copied().collect();
        assert!((signed_area(&reversed) + 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_distinct_vertex_count() {
        let ring = vec![Vec2::ZERO, Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::ZERO];
        assert_eq!(distinct_vertex_count(&ring), 2);
    }
}
