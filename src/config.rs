use crate::error::Result;
use crate::game_logic::{
    BASE_COLOR, BASE_WIDTH, CANVAS_HEIGHT, CANVAS_WIDTH, CAR_COLLISION_COLOR, CAR_COLOR,
    CAR_HEIGHT, CAR_SPAWN_X, CAR_SPAWN_Y, CAR_WIDTH, CELL_SIZE, COLLISION_MARGIN, CONTROL_RADIUS,
    CarSettings, EDGE_SAMPLES, TRAIL_LENGTH,
};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Body, spawn and tuning for one car.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarConfig {
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub spawn_angle: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
    pub collision_color: String,
    pub trail_length: usize,
    pub settings: CarSettings,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            spawn_x: CAR_SPAWN_X,
            spawn_y: CAR_SPAWN_Y,
            spawn_angle: 0.0,
            width: CAR_WIDTH,
            height: CAR_HEIGHT,
            color: CAR_COLOR.to_string(),
            collision_color: CAR_COLLISION_COLOR.to_string(),
            trail_length: TRAIL_LENGTH,
            settings: CarSettings::default(),
        }
    }
}

/// Everything tunable about the sandbox. Missing fields fall back to the
/// compiled-in defaults.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub collision_margin: f32,
    pub cell_size: f32,
    pub edge_samples: usize,
    pub control_radius: f32,
    pub base_width: f32,
    pub base_color: String,
    pub car: CarConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            collision_margin: COLLISION_MARGIN,
            cell_size: CELL_SIZE,
            edge_samples: EDGE_SAMPLES,
            control_radius: CONTROL_RADIUS,
            base_width: BASE_WIDTH,
            base_color: BASE_COLOR.to_string(),
            car: CarConfig::default(),
        }
    }
}

impl SandboxConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
