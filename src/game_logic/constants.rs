// Frame driver timing
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0; // one logical tick per animation frame

// Car physics (per tick, not per second)
pub const ACCEL_RATE: f32 = 0.2;
pub const BRAKE_DECELERATION: f32 = 0.3;
pub const PLAYER_SPEED: f32 = 5.0;
pub const TURNING_RATE: f32 = 0.05;
pub const FRICTION: f32 = 0.95;
pub const LATERAL_FRICTION: f32 = 0.5; // share of lateral velocity kept with full grip
pub const DRIFT_LATERAL_FRICTION: f32 = 0.9; // share kept while drifting
pub const COLLISION_DAMPING: f32 = 0.9;
pub const TRAIL_LENGTH: usize = 15;

// Car body
pub const CAR_WIDTH: f32 = 50.0;
pub const CAR_HEIGHT: f32 = 30.0;
pub const CAR_SPAWN_X: f32 = 100.0;
pub const CAR_SPAWN_Y: f32 = 100.0;
pub const CAR_COLOR: &str = "#0091FF";
pub const CAR_COLLISION_COLOR: &str = "#FF0000";

// Track geometry
pub const EDGE_SAMPLES: usize = 50;
pub const BASE_WIDTH: f32 = 70.0;
pub const BASE_COLOR: &str = "#222222";
pub const CELL_SIZE: f32 = 4.0;
pub const COLLISION_MARGIN: f32 = 100.0;
pub const POLYGON_EPSILON: f32 = 1e-9;

// Editor
pub const CONTROL_RADIUS: f32 = 20.0;
pub const CANVAS_WIDTH: f32 = 800.0;
pub const CANVAS_HEIGHT: f32 = 600.0;
