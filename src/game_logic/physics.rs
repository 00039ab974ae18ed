use crate::game_logic::{
    ACCEL_RATE, BRAKE_DECELERATION, COLLISION_DAMPING, DRIFT_LATERAL_FRICTION, FRICTION,
    LATERAL_FRICTION, Orientation, PLAYER_SPEED, TURNING_RATE, Velocity,
};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Control state for one car, sampled once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhysicsInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl PhysicsInput {
    pub fn turning(&self) -> bool {
        self.left || self.right
    }

    /// Handbrake turn: throttle, brake and steering all held at once.
    pub fn drifting(&self) -> bool {
        self.forward && self.turning() && self.backward
    }
}

/// Per-car tuning. All rates are per tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarSettings {
    pub acceleration: f32,
    pub brake_deceleration: f32,
    pub max_speed: f32,
    pub turn_speed: f32,
    /// Velocity kept per tick while coasting.
    pub friction: f32,
    /// Share of lateral velocity kept per tick with full grip.
    pub lateral_grip_friction: f32,
    /// Share of lateral velocity kept per tick while drifting.
    pub drift_friction: f32,
    /// Velocity kept per tick while any corner is off the track.
    pub collision_damping: f32,
}

impl Default for CarSettings {
    fn default() -> Self {
        Self {
            acceleration: ACCEL_RATE,
            brake_deceleration: BRAKE_DECELERATION,
            max_speed: PLAYER_SPEED,
            turn_speed: TURNING_RATE,
            friction: FRICTION,
            lateral_grip_friction: LATERAL_FRICTION,
            drift_friction: DRIFT_LATERAL_FRICTION,
            collision_damping: COLLISION_DAMPING,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsOutcome {
    pub drifting: bool,
    pub speed: f32,
}

/// Rescale `velocity` down to `max_speed` if it is faster, keeping direction.
pub fn clamp_speed(velocity: Vec2, max_speed: f32) -> Vec2 {
    let speed = velocity.length();
    if speed > max_speed {
        velocity / speed * max_speed
    } else {
        velocity
    }
}

/// Advance one car by one tick, without collision response.
pub fn apply_physics(
    position: &mut Vec2,
    velocity: &mut Velocity,
    orientation: &mut Orientation,
    input: &PhysicsInput,
    settings: &CarSettings,
) -> PhysicsOutcome {
    // Turning (y points down, so "left" is a negative rotation)
    if input.left {
        orientation.turn(-settings.turn_speed);
    }
    if input.right {
        orientation.turn(settings.turn_speed);
    }

    let forward = orientation.forward_vector();

    // Throttle, brake/reverse, or coast
    if input.forward {
        **velocity += forward * settings.acceleration;
    } else if input.backward {
        **velocity -= forward * settings.brake_deceleration;
    } else {
        **velocity *= settings.friction;
    }

    // Bleed the sideways slip according to grip
    let drifting = input.drifting();
    let kept = if drifting {
        settings.drift_friction
    } else {
        settings.lateral_grip_friction
    };
    velocity.bleed_lateral(orientation, kept);

    **velocity = clamp_speed(**velocity, settings.max_speed);

    *position += **velocity;

    PhysicsOutcome {
        drifting,
        speed: velocity.length(),
    }
}
