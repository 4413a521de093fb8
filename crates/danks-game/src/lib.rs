pub mod authority;
pub mod controls;
pub mod entities;
pub mod sim;
pub mod terrain;

pub use authority::is_authority;
pub use entities::GameState;

/// Playfield width in world units.
pub const CANVAS_WIDTH: f32 = 1200.0;
/// Playfield height in world units. The y axis points down.
pub const CANVAS_HEIGHT: f32 = 600.0;
