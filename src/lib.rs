//! ASCII Donut - a rotating torus rendered to the terminal
//!
//! The torus is described by a signed distance field and rendered by sphere
//! tracing one primary ray per character cell, then quantized to a six-step
//! character ramp.

pub mod config;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod terminal;

pub use config::AppConfig;
pub use renderer::Renderer;
pub use scene::Scene;
pub use terminal::TerminalDisplay;

/// Full turn in radians
pub const TAU: f64 = std::f64::consts::TAU;

/// Logical image width in pixels (each pixel is printed as two columns)
pub const IMG_WIDTH: usize = 32;

/// Logical image height in pixels
pub const IMG_HEIGHT: usize = 32;

/// Rotation added to the scene after every frame (100 frames per turn)
pub const ANGLE_STEP: f64 = 0.01 * TAU;

/// Character ramp from background to brightest highlight
pub const ASCII_GRADIENT: [char; 6] = [' ', '.', '+', '*', '#', '@'];
