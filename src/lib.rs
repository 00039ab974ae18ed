pub mod car;
pub mod config;
pub mod context;
pub mod error;
pub mod game_logic;
pub mod input;
pub mod render;
pub mod simulation;
pub mod track;

pub use config::SandboxConfig;
pub use context::AppContext;
pub use error::{Result, SandboxError};
pub use simulation::{FrameSnapshot, SimulationPlugin, Simulator};

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall clock in Unix milliseconds, 0 if the clock is before the epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
