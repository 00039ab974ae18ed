//! Read-only views handed to whatever draws the sandbox.
//!
//! A sink only ever sees borrowed geometry; nothing here can mutate the
//! track or the cars.

use crate::car::{Car, Trail};
use crate::game_logic::CollisionMap;
use crate::track::{DrawOptions, Edges, PointId, PreviewSegment, Track};
use bevy::log::trace;
use bevy::prelude::*;

pub struct SegmentView<'a> {
    pub edges: &'a Edges,
    pub color: &'a str,
    pub width: f32,
}

pub struct PointView {
    pub id: PointId,
    pub position: Vec2,
    pub is_control: bool,
    pub selected: bool,
}

pub struct TrackView<'a> {
    pub segments: Vec<SegmentView<'a>>,
    pub points: Vec<PointView>,
    pub base_color: &'a str,
    pub draw_options: DrawOptions,
    pub collision_map: &'a CollisionMap,
}

impl<'a> TrackView<'a> {
    pub fn new(track: &'a Track, selected: Option<PointId>) -> Self {
        Self {
            segments: track
                .segments
                .iter()
                .map(|s| SegmentView {
                    edges: &s.edges,
                    color: s.color.as_deref().unwrap_or(track.base_color.as_str()),
                    width: track.effective_width(s),
                })
                .collect(),
            points: track
                .points
                .iter()
                .map(|(id, p)| PointView {
                    id,
                    position: p.position,
                    is_control: p.is_control,
                    selected: selected == Some(id),
                })
                .collect(),
            base_color: &track.base_color,
            draw_options: track.draw_options,
            collision_map: &track.collision_map,
        }
    }

    /// The collision map toggle overrides every other option.
    pub fn collision_map_only(&self) -> bool {
        self.draw_options.draw_collision_map
    }
}

pub struct CarView<'a> {
    pub position: Vec2,
    pub angle: f32,
    pub size: Vec2,
    pub color: &'a str,
    pub trail: &'a Trail,
}

impl<'a> From<&'a Car> for CarView<'a> {
    fn from(car: &'a Car) -> Self {
        Self {
            position: car.position,
            angle: car.orientation.angle,
            size: car.size,
            color: car.color(),
            trail: &car.trail,
        }
    }
}

pub trait RenderSink {
    fn begin_frame(&mut self) {}
    fn draw_track(&mut self, track: &TrackView<'_>);
    fn draw_preview(&mut self, _preview: &PreviewSegment) {}
    fn draw_car(&mut self, car: &CarView<'_>);
    fn end_frame(&mut self) {}
}

/// Sink for headless runs: traces what would have been drawn.
#[derive(Default)]
pub struct TraceSink {
    pub frames: u64,
}

impl RenderSink for TraceSink {
    fn draw_track(&mut self, track: &TrackView<'_>) {
        trace!(
            segments = track.segments.len(),
            collision_map_only = track.collision_map_only(),
            "draw track"
        );
    }

    fn draw_car(&mut self, car: &CarView<'_>) {
        trace!(x = car.position.x, y = car.position.y, color = car.color, trail = car.trail.len(), "draw car");
    }

    fn end_frame(&mut self) {
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackEditor;

    #[test]
    fn test_segment_color_falls_back_to_base() {
        let mut editor = TrackEditor::default();
        editor.add_segment(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0)).unwrap();
        editor.add_segment(Vec2::new(300.0, 100.0), Vec2::new(300.0, 300.0)).unwrap();
        editor.set_segment_color(1, Some("#00ff00".to_string())).unwrap();
        editor.set_segment_width(1, Some(30.0)).unwrap();

        let view = TrackView::new(&editor.track, editor.selected());
        assert_eq!(view.segments[0].color, "#222222");
        assert_eq!(view.segments[1].color, "#00ff00");
        assert_eq!(view.segments[0].width, 70.0);
        assert_eq!(view.segments[1].width, 30.0);
        assert_eq!(view.points.len(), 5);
        assert_eq!(view.points.iter().filter(|p| p.selected).count(), 1);
        assert!(!view.collision_map_only());
    }

    #[test]
    fn test_car_view() {
        let car = Car::default();
        let view = CarView::from(&car);
        assert_eq!(view.size, Vec2::new(50.0, 30.0));
        assert_eq!(view.color, "#0091FF");
        assert!(view.trail.is_empty());
    }
}
