//! Saved tracks, favourites and the default track.
//!
//! On disk a track is plain nested records: segment points are stored
//! inline as `{x, y, control}` copies and re-linked to arena points by
//! coordinates when loaded.

use crate::error::{Result, SandboxError};
use crate::game_logic::CollisionMap;
use crate::track::{DrawOptions, PointId, Segment, Track, TrackBuilder, TrackPoint};
use bevy::log::{debug, info};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Fresh random (v4) id for a new or imported track.
pub fn generate_track_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub control: bool,
}

impl From<&TrackPoint> for PointRecord {
    fn from(point: &TrackPoint) -> Self {
        Self {
            x: point.position.x,
            y: point.position.y,
            control: point.is_control,
        }
    }
}

impl PointRecord {
    fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub start: PointRecord,
    pub control: PointRecord,
    pub end: PointRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub created_at: u64,
    pub base_width: f32,
    pub base_color: String,
    #[serde(default)]
    pub draw_options: DrawOptions,
    pub points: Vec<PointRecord>,
    pub segments: Vec<SegmentRecord>,
    #[serde(default)]
    pub collision_map: CollisionMap,
}

impl TrackRecord {
    pub fn from_track(track: &Track) -> Self {
        let record = |id: PointId| {
            track
                .points
                .get(id)
                .map(PointRecord::from)
                .unwrap_or(PointRecord {
                    x: 0.0,
                    y: 0.0,
                    control: false,
                })
        };
        Self {
            id: track.id.clone(),
            name: track.name.clone(),
            created_at: track.created_at,
            base_width: track.base_width,
            base_color: track.base_color.clone(),
            draw_options: track.draw_options,
            points: track.points.iter().map(|(_, p)| PointRecord::from(p)).collect(),
            segments: track
                .segments
                .iter()
                .map(|s| SegmentRecord {
                    start: record(s.start),
                    control: record(s.control),
                    end: record(s.end),
                    color: s.color.clone(),
                    width: s.width,
                })
                .collect(),
            collision_map: track.collision_map.clone(),
        }
    }

    /// Rebuild the point graph. Segment points are matched to stored points
    /// by coordinates and role; unmatched ones are added. Edges and the
    /// collision map are rebuilt rather than trusted.
    pub fn into_track(self, builder: &TrackBuilder) -> Track {
        let mut track = Track::new(self.base_width, self.base_color);
        track.id = self.id;
        track.name = self.name;
        track.created_at = self.created_at;
        track.draw_options = self.draw_options;

        let link = |track: &mut Track, record: &PointRecord| -> PointId {
            let pos = record.position();
            let found = track
                .points
                .iter()
                .find(|(_, p)| p.position == pos && p.is_control == record.control)
                .map(|(id, _)| id);
            found.unwrap_or_else(|| {
                track.points.insert(TrackPoint {
                    position: pos,
                    is_control: record.control,
                })
            })
        };

        for point in &self.points {
            link(&mut track, point);
        }
        for record in &self.segments {
            let start = link(&mut track, &record.start);
            let control = link(&mut track, &record.control);
            let end = link(&mut track, &record.end);
            let mut segment = Segment::new(start, control, end);
            segment.color = record.color.clone();
            segment.width = record.width;
            track.segments.push(segment);
        }

        let pruned = track.prune_orphans();
        if !pruned.is_empty() {
            debug!(pruned = pruned.len(), "dropped unreferenced stored points");
        }
        builder.rebuild(&mut track);
        track
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    #[serde(default)]
    pub tracks: BTreeMap<String, TrackRecord>,
    #[serde(default)]
    pub favourites: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_track: Option<String>,
}

/// Summary row for track lists.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackListing {
    pub id: String,
    pub name: String,
    pub created_at: u64,
    pub favourite: bool,
    pub is_default: bool,
}

impl SaveData {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Missing file means a first run: start with an empty library.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "creating initial save");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json_string()?)?;
        info!(path = %path.display(), tracks = self.tracks.len(), "save data written");
        Ok(())
    }

    /// Insert or replace by id. Tracks without an id get one.
    pub fn save_track(&mut self, track: &mut Track) -> String {
        if track.id.is_empty() {
            track.id = generate_track_id();
        }
        self.tracks.insert(track.id.clone(), TrackRecord::from_track(track));
        info!(id = %track.id, name = %track.name, "track saved");
        track.id.clone()
    }

    pub fn get_track(&self, id: &str, builder: &TrackBuilder) -> Result<Track> {
        self.tracks
            .get(id)
            .cloned()
            .map(|record| record.into_track(builder))
            .ok_or_else(|| SandboxError::TrackNotInLibrary(id.to_string()))
    }

    pub fn delete_track(&mut self, id: &str) -> Result<()> {
        if self.tracks.remove(id).is_none() {
            return Err(SandboxError::TrackNotInLibrary(id.to_string()));
        }
        self.favourites.retain(|f| f != id);
        if self.default_track.as_deref() == Some(id) {
            self.default_track = None;
        }
        Ok(())
    }

    /// Returns whether the track is a favourite afterwards.
    pub fn toggle_favourite(&mut self, id: &str) -> Result<bool> {
        if !self.tracks.contains_key(id) {
            return Err(SandboxError::TrackNotInLibrary(id.to_string()));
        }
        if let Some(index) = self.favourites.iter().position(|f| f == id) {
            self.favourites.remove(index);
            Ok(false)
        } else {
            self.favourites.push(id.to_string());
            Ok(true)
        }
    }

    pub fn set_default(&mut self, id: Option<&str>) -> Result<()> {
        if let Some(id) = id {
            if !self.tracks.contains_key(id) {
                return Err(SandboxError::TrackNotInLibrary(id.to_string()));
            }
        }
        self.default_track = id.map(str::to_string);
        Ok(())
    }

    pub fn default_track(&self, builder: &TrackBuilder) -> Option<Track> {
        let id = self.default_track.as_deref()?;
        self.get_track(id, builder).ok()
    }

    /// Newest first, ties broken by id.
    pub fn list(&self) -> Vec<TrackListing> {
        let mut listings: Vec<TrackListing> = self
            .tracks
            .values()
            .map(|t| TrackListing {
                id: t.id.clone(),
                name: t.name.clone(),
                created_at: t.created_at,
                favourite: self.favourites.contains(&t.id),
                is_default: self.default_track.as_deref() == Some(t.id.as_str()),
            })
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        listings
    }
}
