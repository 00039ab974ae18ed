use crate::game_logic::point_in_polygon;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Rasterized drivable-area mask. A cell holds 1 when its center lies inside
/// any segment ribbon, else 0.
///
/// Cell `(x, y)` covers world `[x * cell_size, (x + 1) * cell_size)` on each
/// axis, with the canvas origin at the top-left.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionMap {
    pub cell_size: f32,
    pub cells: Vec<Vec<u8>>,
}

impl Default for CollisionMap {
    fn default() -> Self {
        Self {
            cell_size: crate::game_logic::CELL_SIZE,
            cells: Vec::new(),
        }
    }
}

impl CollisionMap {
    /// All-zero map covering `width x height` world units.
    pub fn empty(width: f32, height: f32, cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        let cols = (width / cell_size).ceil().max(0.0) as usize;
        let rows = (height / cell_size).ceil().max(0.0) as usize;
        Self {
            cell_size,
            cells: vec![vec![0; cols]; rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, |row| row.len())
    }

    pub fn occupied_count(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|&&c| c == 1).count())
            .sum()
    }

    /// World-space center of cell `(x, y)`.
    pub fn cell_center(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            x as f32 * self.cell_size + self.cell_size / 2.0,
            y as f32 * self.cell_size + self.cell_size / 2.0,
        )
    }

    // get cell index from a world position, None outside the grid
    pub fn cell_at(&self, world: Vec2) -> Option<(usize, usize)> {
        if !world.x.is_finite() || !world.y.is_finite() || world.x < 0.0 || world.y < 0.0 {
            return None;
        }
        let x = (world.x / self.cell_size).floor() as usize;
        let y = (world.y / self.cell_size).floor() as usize;
        if y < self.rows() && x < self.cols() {
            Some((x, y))
        } else {
            None
        }
    }

    /// Off-grid positions count as off-road.
    pub fn is_occupied(&self, world: Vec2) -> bool {
        self.cell_at(world)
            .is_some_and(|(x, y)| self.cells[y][x] == 1)
    }

    /// Mark every cell whose center falls inside `polygon`.
    ///
    /// Only the polygon's bounding box (clamped to the grid) is scanned.
    pub fn fill_polygon(&mut self, polygon: &[Vec2]) {
        let (rows, cols) = (self.rows(), self.cols());
        if rows == 0 || cols == 0 || polygon.len() < 3 {
            return;
        }

        let (min, max) = polygon.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );
        if !min.is_finite() || !max.is_finite() {
            return;
        }

        let cell = self.cell_size;
        let clamp = |v: f32, limit: usize| v.clamp(0.0, (limit - 1) as f32) as usize;
        let (min_x, max_x) = (clamp((min.x / cell).floor(), cols), clamp((max.x / cell).ceil(), cols));
        let (min_y, max_y) = (clamp((min.y / cell).floor(), rows), clamp((max.y / cell).ceil(), rows));

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if self.cells[y][x] == 1 {
                    continue;
                }
                if point_in_polygon(self.cell_center(x, y), polygon) {
                    self.cells[y][x] = 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_map_dimensions() {
        let map = CollisionMap::empty(100.0, 60.0, 4.0);
        assert_eq!(map.cols(), 25);
        assert_eq!(map.rows(), 15);
        assert_eq!(map.occupied_count(), 0);
    }

    #[test]
    fn test_cell_lookup() {
        let map = CollisionMap::empty(100.0, 100.0, 4.0);
        assert_eq!(map.cell_at(Vec2::new(0.0, 0.0)), Some((0, 0)));
        assert_eq!(map.cell_at(Vec2::new(9.0, 5.0)), Some((2, 1)));
        assert_eq!(map.cell_at(Vec2::new(-1.0, 5.0)), None);
        assert_eq!(map.cell_at(Vec2::new(5000.0, 5.0)), None);
        assert_eq!(map.cell_at(Vec2::new(f32::NAN, 5.0)), None);
    }

    #[test]
    fn test_fill_rectangle() {
        let mut map = CollisionMap::empty(100.0, 100.0, 4.0);
        let rect = [
            Vec2::new(10.0, 10.0),
            Vec2::new(30.0, 10.0),
            Vec2::new(30.0, 20.0),
            Vec2::new(10.0, 20.0),
        ];
        map.fill_polygon(&rect);

        // cell centers sit at 4k + 2
        assert!(map.is_occupied(Vec2::new(20.0, 15.0)));
        assert!(!map.is_occupied(Vec2::new(40.0, 15.0)));
        assert!(!map.is_occupied(Vec2::new(20.0, 30.0)));
        assert!(map.occupied_count() > 0);
    }

    #[test]
    fn test_fill_clips_to_grid() {
        let mut map = CollisionMap::empty(10.0, 10.0, 4.0);
        let huge = [
            Vec2::new(-500.0, -500.0),
            Vec2::new(500.0, -500.0),
            Vec2::new(500.0, 500.0),
            Vec2::new(-500.0, 500.0),
        ];
        map.fill_polygon(&huge);
        assert_eq!(map.occupied_count(), map.rows() * map.cols());
    }
}
