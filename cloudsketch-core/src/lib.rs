//! Core data structures for cloudsketch
//!
//! This crate provides the rendering-independent model behind the point
//! cloud sketcher: colored points, the orbit camera, screen/world
//! projection and the point store with its fallback template.

pub mod point;
pub mod point_store;
pub mod camera;
pub mod projection;
pub mod error;

pub use point::*;
pub use point_store::*;
pub use camera::*;
pub use projection::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, Vector3, Vector4};

/// Depth along the view ray, normalized to `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Depth(f64);

impl Depth {
    /// Clamp into `[0, 1]`; NaN becomes the midpoint
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(0.5)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Depth {
    fn default() -> Self {
        Self(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_clamps() {
        assert_eq!(Depth::new(1.5).value(), 1.0);
        assert_eq!(Depth::new(-0.5).value(), 0.0);
        assert_eq!(Depth::new(f64::NAN).value(), 0.5);
        assert_eq!(Depth::new(0.25).value(), 0.25);
    }
}
