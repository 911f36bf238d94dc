//! Viewer configuration with TOML file support
//!
//! Every section uses `#[serde(default)]`, so a file that only overrides
//! `[interaction]` leaves the camera and projection at their defaults.

use crate::error::{Result, VisualizationError};
use crate::input::KeyBindings;
use crate::render::BrushKind;
use cloudsketch_core::{CameraLimits, OrbitCamera, Projection, ProjectionMode, Rgba};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Initial orbit and its limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub radius: f64,
    /// Polar angle in radians
    pub theta: f64,
    /// Azimuth in radians
    pub phi: f64,
    pub limits: CameraLimits,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            radius: OrbitCamera::DEFAULT_RADIUS,
            theta: OrbitCamera::DEFAULT_THETA,
            phi: OrbitCamera::DEFAULT_PHI,
            limits: CameraLimits::default(),
        }
    }
}

impl CameraConfig {
    pub fn build(&self) -> OrbitCamera {
        OrbitCamera::new(self.radius, self.theta, self.phi, self.limits)
    }
}

/// Projection parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectionConfig {
    pub mode: ProjectionMode,
    pub fov_y_degrees: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub ortho_half_height: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            mode: ProjectionMode::Perspective,
            fov_y_degrees: 45.0,
            aspect: 4.0 / 3.0,
            near: 0.1,
            far: 100.0,
            ortho_half_height: 5.0,
        }
    }
}

impl ProjectionConfig {
    /// Build and validate the projection
    pub fn build(&self) -> Result<Projection> {
        let projection = Projection {
            mode: self.mode,
            fov_y: self.fov_y_degrees.to_radians(),
            aspect: self.aspect,
            near: self.near,
            far: self.far,
            ortho_half_height: self.ortho_half_height,
        };
        projection
            .validate()
            .map_err(|e| VisualizationError::Config(e.to_string()))?;
        Ok(projection)
    }
}

/// Where placed points take their color from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// The current color picker value
    #[default]
    Picker,
    /// A fresh random opaque color per point
    Random,
}

/// Pointer, wheel and recording behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    /// Radians of orbit per NDC unit of drag
    pub orbit_sensitivity: f64,
    /// Radius change per wheel delta unit
    pub zoom_sensitivity: f64,
    /// Drags only orbit while the pointer is at or below this NDC y
    pub control_region_top: f64,
    /// `#RRGGBB` color for new points
    pub initial_color: String,
    pub color_mode: ColorMode,
    pub save_file_name: String,
    pub fallback_file: String,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            orbit_sensitivity: 2.0,
            zoom_sensitivity: 0.01,
            control_region_top: 0.9,
            initial_color: "#C70000".to_string(),
            color_mode: ColorMode::Picker,
            save_file_name: cloudsketch_io::DEFAULT_SAVE_FILE_NAME.to_string(),
            fallback_file: cloudsketch_io::DEFAULT_FALLBACK_FILE_NAME.to_string(),
        }
    }
}

impl InteractionConfig {
    pub fn initial_rgba(&self) -> Result<Rgba> {
        Rgba::from_hex(&self.initial_color).map_err(|e| VisualizationError::Config(e.to_string()))
    }
}

/// Scene drawing options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub axis_length: f64,
    pub brush: BrushKind,
    pub brush_radius: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            axis_length: 50.0,
            brush: BrushKind::Sphere,
            brush_radius: 0.05,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,
    pub interaction: InteractionConfig,
    pub render: RenderConfig,
    pub keybindings: KeyBindings,
}

impl ViewerConfig {
    /// Parse from TOML text. Missing fields use defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| VisualizationError::ConfigParse(e.to_string()))
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save to a TOML file (pretty-printed)
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| VisualizationError::ConfigSerialize(e.to_string()))
    }
}
