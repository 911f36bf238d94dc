//! Interactive layer for cloudsketch
//!
//! This crate turns input into camera and point store updates and draws the
//! result through a backend-agnostic bridge:
//! - Input events, commands and key bindings
//! - The session (interaction controller)
//! - Render bridge and point renderers
//! - Frame telemetry
//! - TOML configuration

pub mod config;
pub mod error;
pub mod input;
pub mod render;
pub mod session;
pub mod telemetry;

pub use config::*;
pub use error::*;
pub use input::*;
pub use render::*;
pub use session::*;
pub use telemetry::*;
