use crate::config::CarConfig;
use crate::game_logic::{
    CarSettings, Orientation, PhysicsInput, Pose, TrackBoundary, Velocity, apply_physics,
    handle_collision,
};
use bevy::log::trace;
use bevy::prelude::*;
use std::collections::VecDeque;

/// Poses left behind while drifting, oldest first. Cleared as soon as the
/// car stops drifting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trail {
    poses: VecDeque<Pose>,
    max_size: usize,
}

impl Trail {
    pub fn new(max_size: usize) -> Self {
        Self {
            poses: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    pub fn push(&mut self, pose: Pose) {
        self.poses.push_back(pose);
        if self.poses.len() > self.max_size {
            self.poses.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.poses.clear();
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pose> {
        self.poses.iter()
    }
}

/// Speed, heading and position for the HUD.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Telemetry {
    pub speed: f32,
    /// Heading in degrees, wrapped with a truncating remainder so it keeps
    /// the sign of the raw angle.
    pub angle_degrees: f32,
    pub position: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Car {
    pub position: Vec2,
    pub orientation: Orientation,
    pub velocity: Velocity,
    pub settings: CarSettings,
    /// Body length along the heading, then width.
    pub size: Vec2,
    pub spawn: Pose,
    pub controls: PhysicsInput,
    pub trail: Trail,
    base_color: String,
    collision_color: String,
    speed: f32,
    drifting: bool,
    colliding: bool,
}

impl Default for Car {
    fn default() -> Self {
        Self::from_config(&CarConfig::default())
    }
}

impl Car {
    pub fn from_config(config: &CarConfig) -> Self {
        let spawn = Pose::new(Vec2::new(config.spawn_x, config.spawn_y), config.spawn_angle);
        Self {
            position: spawn.position,
            orientation: spawn.orientation(),
            velocity: Velocity::ZERO,
            settings: config.settings,
            size: Vec2::new(config.width, config.height),
            spawn,
            controls: PhysicsInput::default(),
            trail: Trail::new(config.trail_length),
            base_color: config.color.clone(),
            collision_color: config.collision_color.clone(),
            speed: 0.0,
            drifting: false,
            colliding: false,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.orientation.angle)
    }

    pub fn is_drifting(&self) -> bool {
        self.drifting
    }

    pub fn is_colliding(&self) -> bool {
        self.colliding
    }

    /// Body color: the collision color while any corner is off the track.
    pub fn color(&self) -> &str {
        if self.colliding {
            &self.collision_color
        } else {
            &self.base_color
        }
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            speed: self.speed,
            angle_degrees: self.orientation.degrees(),
            position: self.position,
        }
    }

    /// One tick: physics from the held controls, then the 4-corner check.
    /// Leaving the track damps velocity for the next tick but does not undo
    /// this tick's move.
    pub fn update<B: TrackBoundary + ?Sized>(&mut self, boundary: &B) {
        let before = self.pose();
        let outcome = apply_physics(
            &mut self.position,
            &mut self.velocity,
            &mut self.orientation,
            &self.controls,
            &self.settings,
        );

        self.drifting = outcome.drifting;
        if outcome.drifting {
            self.trail.push(before);
        } else {
            self.trail.clear();
        }

        let on_track = handle_collision(
            self.position,
            self.orientation.angle,
            self.size,
            &mut self.velocity,
            boundary,
            self.settings.collision_damping,
        );
        if on_track == self.colliding {
            trace!(on_track, x = self.position.x, y = self.position.y, "car boundary state changed");
        }
        self.colliding = !on_track;
        self.speed = self.velocity.length();
    }

    /// Back to `pose`, stationary, with no trail and no collision tint.
    pub fn reset(&mut self, pose: Pose) {
        self.position = pose.position;
        self.orientation = pose.orientation();
        self.velocity = Velocity::ZERO;
        self.controls = PhysicsInput::default();
        self.trail.clear();
        self.speed = 0.0;
        self.drifting = false;
        self.colliding = false;
    }

    pub fn reset_to_spawn(&mut self) {
        self.reset(self.spawn);
    }
}
