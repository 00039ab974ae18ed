pub mod constants;
pub mod components;
pub mod geometry;
pub mod physics;
pub mod collisions;
pub mod map;

pub use constants::*;
pub use components::*;
pub use geometry::*;
pub use physics::*;
pub use collisions::*;
pub use map::*;
