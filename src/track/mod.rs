pub mod arena;
pub mod model;
pub mod builder;
pub mod editor;
pub mod library;

pub use arena::*;
pub use model::*;
pub use builder::*;
pub use editor::*;
pub use library::*;
