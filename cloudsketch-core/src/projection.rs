//! Projection matrices and screen/world conversion
//!
//! Clip space follows the OpenGL convention: normalized device coordinates
//! span `[-1, 1]` on every axis. The user-facing depth scalar lives in
//! `[0, 1]` and maps linearly onto NDC z, so both directions of the
//! conversion agree on what a given depth means.

use crate::error::{Error, Result};
use crate::point::Point3d;
use nalgebra::{Matrix4, Orthographic3, Perspective3, Vector4};
use serde::{Deserialize, Serialize};

/// Smallest homogeneous `w` accepted for the perspective division
pub const W_EPSILON: f64 = 1e-12;

/// Smallest aspect ratio, clip range or orthographic half-extent accepted
pub const MIN_EXTENT: f64 = 1e-9;

/// Perspective or orthographic projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

impl ProjectionMode {
    pub fn toggled(self) -> Self {
        match self {
            ProjectionMode::Perspective => ProjectionMode::Orthographic,
            ProjectionMode::Orthographic => ProjectionMode::Perspective,
        }
    }
}

/// Fixed projection parameters, configured once at startup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub mode: ProjectionMode,
    /// Vertical field of view in radians
    pub fov_y: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    /// Half of the visible height in orthographic mode
    pub ortho_half_height: f64,
}

impl Projection {
    pub fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Self {
        Self {
            mode: ProjectionMode::Perspective,
            fov_y,
            aspect,
            near,
            far,
            ortho_half_height: 5.0,
        }
    }

    pub fn with_mode(mut self, mode: ProjectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Same parameters, other mode
    pub fn toggled(self) -> Self {
        let mode = self.mode.toggled();
        self.with_mode(mode)
    }

    /// Check the parameters describe a usable frustum.
    ///
    /// Both modes are checked regardless of the active one, since toggling
    /// never revalidates.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.fov_y, self.aspect, self.near, self.far, self.ortho_half_height]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(Error::InvalidTransform("non-finite projection parameter".to_string()));
        }
        if self.aspect < MIN_EXTENT {
            return Err(Error::InvalidTransform(format!("aspect ratio {} must be positive", self.aspect)));
        }
        if self.near <= 0.0 || self.far - self.near < MIN_EXTENT {
            return Err(Error::InvalidTransform(format!(
                "clip planes must satisfy 0 < near < far (near = {}, far = {})",
                self.near, self.far
            )));
        }
        if self.fov_y <= 0.0 || self.fov_y >= std::f64::consts::PI {
            return Err(Error::InvalidTransform(format!("field of view {} out of range", self.fov_y)));
        }
        let half_width = self.ortho_half_height * self.aspect;
        if self.ortho_half_height < MIN_EXTENT || !half_width.is_finite() || half_width < MIN_EXTENT {
            return Err(Error::InvalidTransform(format!(
                "orthographic extent {half_width} x {} is degenerate",
                self.ortho_half_height
            )));
        }
        Ok(())
    }

    /// Projection matrix for the current mode
    pub fn matrix(&self) -> Result<Matrix4<f64>> {
        self.validate()?;
        let matrix = match self.mode {
            ProjectionMode::Perspective => {
                Perspective3::new(self.aspect, self.fov_y, self.near, self.far).into_inner()
            }
            ProjectionMode::Orthographic => {
                let half_height = self.ortho_half_height;
                let half_width = half_height * self.aspect;
                Orthographic3::new(-half_width, half_width, -half_height, half_height, self.near, self.far)
                    .into_inner()
            }
        };
        Ok(matrix)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::perspective(std::f64::consts::FRAC_PI_4, 4.0 / 3.0, 0.1, 100.0)
    }
}

/// Position on screen: NDC x/y plus the normalized depth scalar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

/// Map `depth` in `[0, 1]` onto clip-space z in `[-1, 1]`
pub fn depth_to_clip_z(depth: f64) -> f64 {
    depth * 2.0 - 1.0
}

/// Inverse of [`depth_to_clip_z`]
pub fn clip_z_to_depth(clip_z: f64) -> f64 {
    (clip_z + 1.0) / 2.0
}

/// Unproject a screen position into world space.
///
/// Fails with [`Error::InvalidTransform`] when `projection * view` is not
/// invertible or the homogeneous divisor vanishes.
pub fn screen_to_world(
    ndc_x: f64,
    ndc_y: f64,
    depth: f64,
    view: &Matrix4<f64>,
    projection: &Matrix4<f64>,
) -> Result<Point3d> {
    let view_projection = projection * view;
    if !is_finite_matrix(&view_projection) {
        return Err(Error::InvalidTransform("view-projection matrix is not finite".to_string()));
    }
    let inverse = view_projection
        .try_inverse()
        .filter(is_finite_matrix)
        .ok_or_else(|| Error::InvalidTransform("view-projection matrix is singular".to_string()))?;

    let clip = Vector4::new(ndc_x, ndc_y, depth_to_clip_z(depth), 1.0);
    let world = inverse * clip;
    let point = perspective_divide(&world)?;

    if point.coords.iter().all(|c| c.is_finite()) {
        Ok(point)
    } else {
        Err(Error::InvalidTransform(format!(
            "unprojection of ({ndc_x}, {ndc_y}, {depth}) is not finite"
        )))
    }
}

/// Project a world position onto the screen
pub fn world_to_screen(
    point: &Point3d,
    view: &Matrix4<f64>,
    projection: &Matrix4<f64>,
) -> Result<ScreenPoint> {
    let clip = projection * view * point.to_homogeneous();
    let ndc = perspective_divide(&clip)?;

    if !ndc.coords.iter().all(|c| c.is_finite()) {
        return Err(Error::InvalidTransform(format!("projection of {point} is not finite")));
    }

    Ok(ScreenPoint {
        x: ndc.x,
        y: ndc.y,
        depth: clip_z_to_depth(ndc.z),
    })
}

fn perspective_divide(homogeneous: &Vector4<f64>) -> Result<Point3d> {
    let w = homogeneous.w;
    if !w.is_finite() || w.abs() < W_EPSILON {
        return Err(Error::InvalidTransform(format!("perspective divisor {w} is degenerate")));
    }
    Ok(Point3d::new(homogeneous.x / w, homogeneous.y / w, homogeneous.z / w))
}

fn is_finite_matrix(matrix: &Matrix4<f64>) -> bool {
    matrix.iter().all(|v| v.is_finite())
}

/// Pixel dimensions of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Pixel position (origin top-left, y down) to NDC (y up)
    pub fn to_ndc(&self, pixel_x: f64, pixel_y: f64) -> (f64, f64) {
        (pixel_x / self.width * 2.0 - 1.0, 1.0 - pixel_y / self.height * 2.0)
    }

    /// NDC back to pixel position
    pub fn to_pixels(&self, ndc_x: f64, ndc_y: f64) -> (f64, f64) {
        ((ndc_x + 1.0) / 2.0 * self.width, (1.0 - ndc_y) / 2.0 * self.height)
    }
}
