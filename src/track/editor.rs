//! Interactive editing of the track graph.
//!
//! The editor owns the track while editing. Every structural change leaves
//! the graph consistent (all segment points live in the arena, no orphans)
//! and rebuilds edges before returning. Rejected operations change nothing,
//! log a warning and return the reason.

use crate::config::SandboxConfig;
use crate::error::{Result, SandboxError};
use crate::game_logic::{CONTROL_RADIUS, midpoint};
use crate::input::{InputEvent, is_segment_modifier_key};
use crate::track::{
    DrawOption, Edges, PointId, Segment, Track, TrackBuilder, TrackPoint, build_curve_edges,
    generate_track_id,
};
use bevy::log::{debug, info, warn};
use bevy::prelude::*;

/// Where a pending segment starts: an existing anchor, or a spot that only
/// becomes a point once the segment is committed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PendingStart {
    Existing(PointId),
    New(Vec2),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum EditorMode {
    #[default]
    Idle,
    PlacingSegment(PendingStart),
    DraggingPoint(PointId),
}

/// Notifications for whoever mirrors the editor (UI lists, renderers).
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    PointAdded(PointId),
    PointMoved(PointId),
    PointDeleted(PointId),
    PointSelected(Option<PointId>),
    PointUpdated(PointId),
    SegmentAdded(usize),
    SegmentDeleted(usize),
}

/// The not-yet-committed segment under the cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewSegment {
    pub start: Vec2,
    pub control: Vec2,
    pub end: Vec2,
    pub edges: Edges,
}

pub struct TrackEditor {
    pub track: Track,
    builder: TrackBuilder,
    control_radius: f32,
    base_width: f32,
    base_color: String,
    mode: EditorMode,
    selected: Option<PointId>,
    cursor: Option<Vec2>,
    events: Vec<EditorEvent>,
}

impl Default for TrackEditor {
    fn default() -> Self {
        Self::new(&SandboxConfig::default())
    }
}

impl TrackEditor {
    pub fn new(config: &SandboxConfig) -> Self {
        let builder = TrackBuilder::from(config);
        let mut track = Track::new(config.base_width, config.base_color.clone());
        builder.rebuild(&mut track);
        Self {
            track,
            builder,
            control_radius: if config.control_radius > 0.0 {
                config.control_radius
            } else {
                CONTROL_RADIUS
            },
            base_width: config.base_width,
            base_color: config.base_color.clone(),
            mode: EditorMode::Idle,
            selected: None,
            cursor: None,
            events: Vec::new(),
        }
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn selected(&self) -> Option<PointId> {
        self.selected
    }

    pub fn builder(&self) -> &TrackBuilder {
        &self.builder
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Back to an empty base track with no gesture in progress.
    pub fn reset(&mut self) {
        self.track = Track::new(self.base_width, self.base_color.clone());
        self.builder.rebuild(&mut self.track);
        self.clear_gesture();
        self.selected = None;
    }

    pub fn load_track(&mut self, mut track: Track) {
        self.builder.rebuild(&mut track);
        self.track = track;
        self.clear_gesture();
        self.selected = None;
    }

    /// Drop any pending segment or drag without touching the graph.
    pub fn cancel_gesture(&mut self) {
        if let EditorMode::DraggingPoint(_) = self.mode {
            self.builder.rebuild(&mut self.track);
        }
        self.clear_gesture();
    }

    fn clear_gesture(&mut self) {
        self.mode = EditorMode::Idle;
        self.cursor = None;
    }

    pub fn set_selected(&mut self, point: Option<PointId>) {
        self.selected = point;
        self.events.push(EditorEvent::PointSelected(point));
    }

    /// Any point (anchor or control) under `pos`.
    pub fn point_at(&self, pos: Vec2) -> Option<PointId> {
        self.track.points.find_at(pos, self.control_radius)
    }

    // anchors only: segment endpoints must never be control points
    fn anchor_at(&self, pos: Vec2) -> Option<PointId> {
        self.track
            .points
            .iter()
            .filter(|(_, p)| !p.is_control)
            .map(|(id, p)| (id, p.position.distance(pos)))
            .filter(|(_, d)| *d == 0.0 || *d < self.control_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// A new anchor may not land exactly on a control point: the older
    /// point would always win the hit test and hide it.
    fn resolve(&self, pos: Vec2) -> Result<PendingStart> {
        if let Some(id) = self.anchor_at(pos) {
            return Ok(PendingStart::Existing(id));
        }
        match self.track.points.iter().find(|(_, p)| p.position == pos) {
            Some((id, _)) => self.reject("add_segment", SandboxError::PositionTaken(id)),
            None => Ok(PendingStart::New(pos)),
        }
    }

    fn pending_position(&self, pending: PendingStart) -> Vec2 {
        match pending {
            PendingStart::Existing(id) => self.track.position(id),
            PendingStart::New(pos) => pos,
        }
    }

    fn coincide(&self, a: PendingStart, b: PendingStart) -> bool {
        match (a, b) {
            (PendingStart::Existing(x), PendingStart::Existing(y)) => {
                x == y || self.track.position(x) == self.track.position(y)
            }
            _ => {
                let (pa, pb) = (self.pending_position(a), self.pending_position(b));
                pa == pb || pa.distance(pb) < self.control_radius
            }
        }
    }

    fn commit(&mut self, pending: PendingStart) -> PointId {
        match pending {
            PendingStart::Existing(id) => id,
            PendingStart::New(pos) => {
                let id = self.track.points.insert(TrackPoint::anchor(pos));
                self.events.push(EditorEvent::PointAdded(id));
                id
            }
        }
    }

    fn reject<T>(&self, operation: &str, err: SandboxError) -> Result<T> {
        warn!(operation, error = %err, "track edit rejected");
        Err(err)
    }

    /// Route one input record. Returns the error of a rejected edit, if the
    /// event triggered one.
    pub fn handle_event(&mut self, event: &InputEvent) -> Result<()> {
        match event {
            InputEvent::KeyDown { key } if is_segment_modifier_key(key) => {
                if let (EditorMode::Idle, Some(selected)) = (self.mode, self.selected) {
                    if self.track.points.get(selected).is_some_and(|p| !p.is_control) {
                        self.mode = EditorMode::PlacingSegment(PendingStart::Existing(selected));
                    }
                }
            }
            InputEvent::KeyUp { key } if is_segment_modifier_key(key) => {
                if let EditorMode::PlacingSegment(_) = self.mode {
                    debug!("pending segment cancelled");
                    self.mode = EditorMode::Idle;
                }
            }
            InputEvent::Click { pos, modifiers } => {
                if modifiers.segment() {
                    self.place_segment_point(*pos)?;
                } else {
                    let hit = self.point_at(*pos);
                    self.set_selected(hit);
                }
            }
            InputEvent::MouseDown { pos, modifiers } => {
                if !modifiers.segment() && self.mode == EditorMode::Idle {
                    if let Some(id) = self.point_at(*pos) {
                        self.set_selected(Some(id));
                        self.mode = EditorMode::DraggingPoint(id);
                    }
                }
            }
            InputEvent::MouseMove { pos, .. } => {
                self.cursor = Some(*pos);
                if let EditorMode::DraggingPoint(id) = self.mode {
                    self.move_point(id, *pos)?;
                }
            }
            InputEvent::MouseUp { .. } => {
                if let EditorMode::DraggingPoint(_) = self.mode {
                    self.mode = EditorMode::Idle;
                    self.builder.rebuild(&mut self.track);
                }
            }
            InputEvent::ContextMenu { pos, .. } => {
                debug!(x = pos.x, y = pos.y, "canvas right-clicked");
            }
            _ => {}
        }
        Ok(())
    }

    /// One modifier-click: start a pending segment, or finish the pending one.
    /// Returns the new segment's index once a segment is committed.
    pub fn place_segment_point(&mut self, pos: Vec2) -> Result<Option<usize>> {
        match self.mode {
            EditorMode::PlacingSegment(start) => {
                let end = self.resolve(pos)?;
                if self.coincide(start, end) {
                    return self.reject("add_segment", SandboxError::SelfConnectingSegment);
                }
                let index = self.connect(start, end);
                self.mode = EditorMode::Idle;
                Ok(Some(index))
            }
            EditorMode::Idle | EditorMode::DraggingPoint(_) => {
                self.mode = EditorMode::PlacingSegment(self.resolve(pos)?);
                Ok(None)
            }
        }
    }

    /// Add a segment between two positions, reusing anchors within the hit
    /// radius.
    pub fn add_segment(&mut self, start: Vec2, end: Vec2) -> Result<usize> {
        let (start, end) = (self.resolve(start)?, self.resolve(end)?);
        if self.coincide(start, end) {
            return self.reject("add_segment", SandboxError::SelfConnectingSegment);
        }
        Ok(self.connect(start, end))
    }

    fn connect(&mut self, start: PendingStart, end: PendingStart) -> usize {
        let start = self.commit(start);
        let end = self.commit(end);
        let control_pos = midpoint(self.track.position(start), self.track.position(end));
        let control = self.track.points.insert(TrackPoint::control(control_pos));
        self.events.push(EditorEvent::PointAdded(control));

        self.track.segments.push(Segment::new(start, control, end));
        let index = self.track.segments.len() - 1;
        self.events.push(EditorEvent::SegmentAdded(index));
        self.set_selected(Some(end));

        self.builder.rebuild(&mut self.track);
        index
    }

    /// Live drag: moves the point and rebuilds edges, not the collision map.
    pub fn move_point(&mut self, id: PointId, pos: Vec2) -> Result<()> {
        let Some(point) = self.track.points.get_mut(id) else {
            return self.reject("move_point", SandboxError::PointNotFound(id));
        };
        point.position = pos;
        self.builder.rebuild_edges(&mut self.track);
        self.events.push(EditorEvent::PointMoved(id));
        Ok(())
    }

    /// Remove a point, every segment using it, and any point left orphaned.
    pub fn delete_point(&mut self, id: PointId) -> Result<()> {
        if self.track.points.remove(id).is_none() {
            return self.reject("delete_point", SandboxError::PointNotFound(id));
        }
        self.events.push(EditorEvent::PointDeleted(id));

        for index in self.track.segments_of(id).into_iter().rev() {
            self.track.segments.remove(index);
            self.events.push(EditorEvent::SegmentDeleted(index));
        }
        self.prune();

        if self.selected.is_some_and(|s| !self.track.points.contains(s)) {
            self.set_selected(None);
        }
        if let EditorMode::PlacingSegment(PendingStart::Existing(s)) | EditorMode::DraggingPoint(s) = self.mode {
            if !self.track.points.contains(s) {
                self.mode = EditorMode::Idle;
            }
        }

        self.builder.rebuild(&mut self.track);
        Ok(())
    }

    pub fn delete_selected(&mut self) -> Result<()> {
        match self.selected {
            Some(id) => self.delete_point(id),
            None => self.reject("delete_selected", SandboxError::NoSelection),
        }
    }

    fn prune(&mut self) {
        for orphan in self.track.prune_orphans() {
            self.events.push(EditorEvent::PointDeleted(orphan));
        }
    }

    /// Merge the two segments meeting at anchor `id` into one segment that
    /// uses `id` as its control point.
    ///
    /// `A - C - P - C - B` becomes `A - P - B`.
    pub fn make_control(&mut self, id: PointId) -> Result<()> {
        let Some(point) = self.track.points.get(id) else {
            return self.reject("make_control", SandboxError::PointNotFound(id));
        };
        if point.is_control {
            return self.reject("make_control", SandboxError::AlreadyControl(id));
        }
        let owners = self.track.segments_of(id);
        if owners.len() != 2 {
            return self.reject(
                "make_control",
                SandboxError::WrongSegmentCount {
                    point: id,
                    expected: 2,
                    found: owners.len(),
                },
            );
        }

        let (a, b) = (&self.track.segments[owners[0]], &self.track.segments[owners[1]]);
        // Keep the direction of travel when one segment arrives at the point
        // and the other leaves it.
        let (incoming, outgoing) = if a.end == id && b.start == id {
            (a, b)
        } else if b.end == id && a.start == id {
            (b, a)
        } else {
            (a, b)
        };
        let start = if incoming.start == id { incoming.end } else { incoming.start };
        let end = if outgoing.end == id { outgoing.start } else { outgoing.end };
        if start == end {
            return self.reject("make_control", SandboxError::SelfConnectingSegment);
        }

        let mut merged = Segment::new(start, id, end);
        merged.color = incoming.color.clone();
        merged.width = incoming.width;

        self.track.segments.remove(owners[1]);
        self.track.segments.remove(owners[0]);
        self.events.push(EditorEvent::SegmentDeleted(owners[1]));
        self.events.push(EditorEvent::SegmentDeleted(owners[0]));
        self.track.segments.insert(owners[0], merged);
        self.events.push(EditorEvent::SegmentAdded(owners[0]));

        if let Some(point) = self.track.points.get_mut(id) {
            point.is_control = true;
        }
        self.prune();
        self.builder.rebuild(&mut self.track);
        self.events.push(EditorEvent::PointUpdated(id));
        Ok(())
    }

    /// Split the single segment controlled by `id` in two at `id`, which
    /// becomes a shared anchor with a fresh midpoint control on each side.
    ///
    /// `A - P - B` becomes `A - C - P - C - B`.
    pub fn make_anchor(&mut self, id: PointId) -> Result<()> {
        let Some(point) = self.track.points.get(id) else {
            return self.reject("make_anchor", SandboxError::PointNotFound(id));
        };
        if !point.is_control {
            return self.reject("make_anchor", SandboxError::AlreadyAnchor(id));
        }
        let owners = self.track.segments_of(id);
        if owners.len() != 1 {
            return self.reject(
                "make_anchor",
                SandboxError::WrongSegmentCount {
                    point: id,
                    expected: 1,
                    found: owners.len(),
                },
            );
        }

        let index = owners[0];
        let original = self.track.segments.remove(index);
        self.events.push(EditorEvent::SegmentDeleted(index));

        let at = self.track.position(id);
        let first_control = self.track.points.insert(TrackPoint::control(midpoint(
            self.track.position(original.start),
            at,
        )));
        let second_control = self.track.points.insert(TrackPoint::control(midpoint(
            at,
            self.track.position(original.end),
        )));
        self.events.push(EditorEvent::PointAdded(first_control));
        self.events.push(EditorEvent::PointAdded(second_control));

        let mut first = Segment::new(original.start, first_control, id);
        let mut second = Segment::new(id, second_control, original.end);
        for half in [&mut first, &mut second] {
            half.color = original.color.clone();
            half.width = original.width;
        }
        self.track.segments.insert(index, second);
        self.track.segments.insert(index, first);
        self.events.push(EditorEvent::SegmentAdded(index));
        self.events.push(EditorEvent::SegmentAdded(index + 1));

        if let Some(point) = self.track.points.get_mut(id) {
            point.is_control = false;
        }
        self.builder.rebuild(&mut self.track);
        self.events.push(EditorEvent::PointUpdated(id));
        Ok(())
    }

    /// Control -> anchor or anchor -> control on the selected point.
    pub fn transform_selected(&mut self) -> Result<()> {
        let Some(id) = self.selected else {
            return self.reject("transform_selected", SandboxError::NoSelection);
        };
        match self.track.points.get(id) {
            Some(p) if p.is_control => self.make_anchor(id),
            Some(_) => self.make_control(id),
            None => self.reject("transform_selected", SandboxError::PointNotFound(id)),
        }
    }

    pub fn set_track_width(&mut self, width: f32) {
        self.track.base_width = width;
        self.builder.rebuild(&mut self.track);
    }

    pub fn set_track_color(&mut self, color: impl Into<String>) {
        self.track.base_color = color.into();
    }

    pub fn set_segment_width(&mut self, index: usize, width: Option<f32>) -> Result<()> {
        let Some(segment) = self.track.segments.get_mut(index) else {
            return self.reject("set_segment_width", SandboxError::SegmentNotFound(index));
        };
        segment.width = width;
        self.builder.rebuild(&mut self.track);
        Ok(())
    }

    pub fn set_segment_color(&mut self, index: usize, color: Option<String>) -> Result<()> {
        let Some(segment) = self.track.segments.get_mut(index) else {
            return self.reject("set_segment_color", SandboxError::SegmentNotFound(index));
        };
        segment.color = color;
        Ok(())
    }

    pub fn toggle_draw_option(&mut self, option: DrawOption) -> bool {
        self.track.draw_options.toggle(option)
    }

    /// Segment being placed, from its start to the cursor.
    pub fn preview_segment(&self) -> Option<PreviewSegment> {
        let EditorMode::PlacingSegment(start) = self.mode else {
            return None;
        };
        let end = self.cursor?;
        let start = self.pending_position(start);
        let control = midpoint(start, end);
        Some(PreviewSegment {
            start,
            control,
            end,
            edges: build_curve_edges(start, control, end, self.track.base_width, self.builder.samples),
        })
    }

    /// Finalize the track for the library: needs at least one segment; gets
    /// an id and a name if it has none. The editor keeps its copy.
    pub fn save(&mut self) -> Result<Track> {
        if self.track.points.is_empty() || self.track.segments.is_empty() {
            return self.reject("save", SandboxError::EmptyTrack);
        }
        if self.track.id.is_empty() {
            self.track.id = generate_track_id();
        }
        if self.track.name.is_empty() {
            self.track.name = "Unnamed Track".to_string();
        }
        self.builder.rebuild(&mut self.track);
        info!(id = %self.track.id, name = %self.track.name, "track finalized");
        Ok(self.track.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    fn click(editor: &mut TrackEditor, x: f32, y: f32) -> Result<()> {
        editor.handle_event(&InputEvent::Click {
            pos: Vec2::new(x, y),
            modifiers: Modifiers::CTRL,
        })
    }

    /// A -> B -> C as two segments.
    fn two_segments() -> (TrackEditor, PointId) {
        let mut editor = TrackEditor::default();
        editor.add_segment(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0)).unwrap();
        editor.add_segment(Vec2::new(300.0, 100.0), Vec2::new(300.0, 300.0)).unwrap();
        let b = editor.track.points.find_at(Vec2::new(300.0, 100.0), 0.0).unwrap();
        (editor, b)
    }

    fn endpoints(editor: &TrackEditor) -> Vec<(Vec2, Vec2)> {
        editor
            .track
            .segments
            .iter()
            .map(|s| (editor.track.position(s.start), editor.track.position(s.end)))
            .collect()
    }

    #[test]
    fn test_click_flow_adds_segment() {
        let mut editor = TrackEditor::default();
        click(&mut editor, 100.0, 100.0).unwrap();
        assert!(matches!(editor.mode(), EditorMode::PlacingSegment(PendingStart::New(_))));
        assert!(editor.track.points.is_empty());

        click(&mut editor, 300.0, 100.0).unwrap();
        assert_eq!(editor.mode(), EditorMode::Idle);
        assert_eq!(editor.track.segments.len(), 1);
        assert_eq!(editor.track.points.len(), 3);

        let seg = &editor.track.segments[0];
        let control = editor.track.points.get(seg.control).unwrap();
        assert!(control.is_control);
        assert_eq!(control.position, Vec2::new(200.0, 100.0));
        assert!(!seg.edges.is_empty());
        assert!(editor.track.collision_map.occupied_count() > 0);
        assert_eq!(editor.selected(), Some(seg.end));

        let events = editor.drain_events();
        assert!(events.contains(&EditorEvent::SegmentAdded(0)));
        assert_eq!(events.iter().filter(|e| matches!(e, EditorEvent::PointAdded(_))).count(), 3);
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut editor = TrackEditor::default();
        click(&mut editor, 100.0, 100.0).unwrap();
        let err = click(&mut editor, 105.0, 100.0);
        assert!(matches!(err, Err(SandboxError::SelfConnectingSegment)));
        assert!(matches!(editor.mode(), EditorMode::PlacingSegment(_)));
        assert!(editor.track.segments.is_empty());
        assert!(editor.track.points.is_empty());

        assert!(matches!(
            editor.add_segment(Vec2::new(10.0, 10.0), Vec2::new(10.0, 10.0)),
            Err(SandboxError::SelfConnectingSegment)
        ));
    }

    #[test]
    fn test_modifier_release_cancels() {
        let mut editor = TrackEditor::default();
        editor.handle_event(&InputEvent::key_down("Control")).unwrap();
        click(&mut editor, 100.0, 100.0).unwrap();
        editor.handle_event(&InputEvent::key_up("Control")).unwrap();
        assert_eq!(editor.mode(), EditorMode::Idle);
        assert!(editor.track.points.is_empty());
        assert!(editor.track.segments.is_empty());
    }

    #[test]
    fn test_reuses_existing_anchor() {
        let (editor, b) = two_segments();
        assert_eq!(editor.track.segments[0].end, b);
        assert_eq!(editor.track.segments[1].start, b);
        assert_eq!(editor.track.points.len(), 5);
    }

    #[test]
    fn test_endpoint_on_control_rejected() {
        let mut editor = TrackEditor::default();
        click(&mut editor, 100.0, 100.0).unwrap();
        click(&mut editor, 300.0, 100.0).unwrap();
        let control = editor.track.segments[0].control;
        let on_control = editor.track.position(control);

        let err = click(&mut editor, on_control.x, on_control.y);
        assert!(matches!(err, Err(SandboxError::PositionTaken(id)) if id == control));
        assert_eq!(editor.mode(), EditorMode::Idle);
        assert!(matches!(
            editor.add_segment(Vec2::new(200.0, 300.0), on_control),
            Err(SandboxError::PositionTaken(_))
        ));

        // a finished pending segment cannot end there either
        click(&mut editor, 200.0, 300.0).unwrap();
        assert!(click(&mut editor, on_control.x, on_control.y).is_err());
        assert!(matches!(editor.mode(), EditorMode::PlacingSegment(_)));

        assert_eq!(editor.track.points.len(), 3);
        let positions: Vec<Vec2> = editor.track.points.iter().map(|(_, p)| p.position).collect();
        for (i, a) in positions.iter().enumerate() {
            assert!(positions[i + 1..].iter().all(|b| b != a));
        }
        assert_eq!(editor.point_at(on_control), Some(control));
    }

    #[test]
    fn test_modifier_press_starts_from_selection() {
        let (mut editor, b) = two_segments();
        editor.handle_event(&InputEvent::Click {
            pos: Vec2::new(302.0, 98.0),
            modifiers: Modifiers::NONE,
        })
        .unwrap();
        assert_eq!(editor.selected(), Some(b));
        editor.handle_event(&InputEvent::key_down("Meta")).unwrap();
        assert_eq!(editor.mode(), EditorMode::PlacingSegment(PendingStart::Existing(b)));

        editor.handle_event(&InputEvent::MouseMove {
            pos: Vec2::new(500.0, 100.0),
            modifiers: Modifiers::NONE,
        })
        .unwrap();
        let preview = editor.preview_segment().unwrap();
        assert_eq!(preview.start, Vec2::new(300.0, 100.0));
        assert_eq!(preview.control, Vec2::new(400.0, 100.0));
        assert_eq!(preview.edges.left.len(), editor.builder().samples + 1);

        click(&mut editor, 500.0, 100.0).unwrap();
        assert_eq!(editor.track.segments.len(), 3);
        assert_eq!(editor.track.segments[2].start, b);
    }

    #[test]
    fn test_drag_rebuilds_on_release() {
        let (mut editor, b) = two_segments();
        let before = editor.track.collision_map.clone();

        editor.handle_event(&InputEvent::MouseDown {
            pos: Vec2::new(300.0, 100.0),
            modifiers: Modifiers::NONE,
        })
        .unwrap();
        assert_eq!(editor.mode(), EditorMode::DraggingPoint(b));

        editor.handle_event(&InputEvent::MouseMove {
            pos: Vec2::new(350.0, 50.0),
            modifiers: Modifiers::NONE,
        })
        .unwrap();
        assert_eq!(editor.track.position(b), Vec2::new(350.0, 50.0));
        // edges follow the drag, the collision map waits for release
        let last = editor.track.segments[0].edges.left.last().copied().unwrap();
        assert!(last.distance(Vec2::new(350.0, 50.0)) < 60.0);
        assert_eq!(editor.track.collision_map, before);

        editor.handle_event(&InputEvent::MouseUp {
            pos: Vec2::new(350.0, 50.0),
            modifiers: Modifiers::NONE,
        })
        .unwrap();
        assert_eq!(editor.mode(), EditorMode::Idle);
        assert_ne!(editor.track.collision_map, before);
    }

    #[test]
    fn test_delete_point_cascades() {
        let (mut editor, b) = two_segments();
        editor.delete_point(b).unwrap();

        assert!(editor.track.segments.is_empty());
        assert!(editor.track.points.is_empty());
        assert!(editor.track.is_consistent());

        assert!(matches!(editor.delete_point(b), Err(SandboxError::PointNotFound(_))));
    }

    #[test]
    fn test_delete_endpoint_keeps_other_segment() {
        let (mut editor, _) = two_segments();
        let a = editor.track.segments[0].start;
        editor.delete_point(a).unwrap();

        assert_eq!(editor.track.segments.len(), 1);
        assert_eq!(editor.track.points.len(), 3);
        assert!(editor.track.is_consistent());
        for seg in &editor.track.segments {
            assert!(!seg.references(a));
        }
    }

    #[test]
    fn test_make_control_merges() {
        let (mut editor, b) = two_segments();
        editor.make_control(b).unwrap();

        assert_eq!(editor.track.segments.len(), 1);
        let seg = &editor.track.segments[0];
        assert_eq!(seg.control, b);
        assert_eq!(editor.track.position(seg.start), Vec2::new(100.0, 100.0));
        assert_eq!(editor.track.position(seg.end), Vec2::new(300.0, 300.0));
        assert!(editor.track.points.get(b).unwrap().is_control);
        // the two old controls are gone
        assert_eq!(editor.track.points.len(), 3);
        assert!(editor.track.is_consistent());
    }

    #[test]
    fn test_make_control_wrong_count() {
        let mut editor = TrackEditor::default();
        editor.add_segment(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0)).unwrap();
        let a = editor.track.segments[0].start;
        let snapshot = editor.track.clone();

        let err = editor.make_control(a);
        assert!(matches!(
            err,
            Err(SandboxError::WrongSegmentCount { expected: 2, found: 1, .. })
        ));
        assert_eq!(editor.track, snapshot);

        let c = editor.track.segments[0].control;
        assert!(matches!(editor.make_control(c), Err(SandboxError::AlreadyControl(_))));
        assert!(matches!(editor.make_anchor(a), Err(SandboxError::AlreadyAnchor(_))));
    }

    #[test]
    fn test_make_control_rejects_three_way_anchor() {
        let (mut editor, _b) = two_segments();
        editor.add_segment(Vec2::new(300.0, 100.0), Vec2::new(500.0, 100.0)).unwrap();
        let b = editor.track.points.find_at(Vec2::new(300.0, 100.0), 0.0).unwrap();
        assert!(matches!(
            editor.make_control(b),
            Err(SandboxError::WrongSegmentCount { found: 3, .. })
        ));
        assert_eq!(editor.track.segments.len(), 3);
    }

    #[test]
    fn test_make_anchor_splits() {
        let mut editor = TrackEditor::default();
        editor.add_segment(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0)).unwrap();
        let c = editor.track.segments[0].control;
        editor.make_anchor(c).unwrap();

        assert_eq!(editor.track.segments.len(), 2);
        let (first, second) = (&editor.track.segments[0], &editor.track.segments[1]);
        assert_eq!(first.end, c);
        assert_eq!(second.start, c);
        assert_eq!(editor.track.position(first.control), Vec2::new(150.0, 100.0));
        assert_eq!(editor.track.position(second.control), Vec2::new(250.0, 100.0));
        assert!(!editor.track.points.get(c).unwrap().is_control);
        assert_eq!(editor.track.points.len(), 5);
        assert!(editor.track.is_consistent());
    }

    #[test]
    fn test_anchor_control_round_trip_keeps_endpoints() {
        let (mut editor, b) = two_segments();
        let before = endpoints(&editor);

        editor.make_control(b).unwrap();
        editor.make_anchor(b).unwrap();

        assert_eq!(endpoints(&editor), before);
        assert!(editor.track.is_consistent());
    }

    #[test]
    fn test_transform_selected() {
        let (mut editor, b) = two_segments();
        editor.set_selected(None);
        assert!(matches!(editor.transform_selected(), Err(SandboxError::NoSelection)));

        editor.set_selected(Some(b));
        editor.transform_selected().unwrap();
        assert_eq!(editor.track.segments.len(), 1);
        editor.transform_selected().unwrap();
        assert_eq!(editor.track.segments.len(), 2);
    }

    #[test]
    fn test_width_changes_rebuild_map() {
        let (mut editor, _) = two_segments();
        let narrow = editor.track.collision_map.occupied_count();
        editor.set_track_width(120.0);
        assert!(editor.track.collision_map.occupied_count() > narrow);

        editor.set_segment_width(0, Some(10.0)).unwrap();
        let left = &editor.track.segments[0].edges.left;
        assert!((left[left.len() / 2].y - 95.0).abs() < 1e-3);
        assert!(matches!(editor.set_segment_width(9, None), Err(SandboxError::SegmentNotFound(9))));
    }

    #[test]
    fn test_save_requires_segments() {
        let mut editor = TrackEditor::default();
        assert!(matches!(editor.save(), Err(SandboxError::EmptyTrack)));

        editor.add_segment(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0)).unwrap();
        let saved = editor.save().unwrap();
        assert_eq!(saved.id.len(), 36);
        assert_eq!(saved.name, "Unnamed Track");
        assert!(editor.toggle_draw_option(DrawOption::DrawCollisionMap));

        editor.reset();
        assert!(editor.track.segments.is_empty());
        assert!(editor.track.id.is_empty());
        assert!(!editor.track.draw_options.draw_collision_map);
    }
}
