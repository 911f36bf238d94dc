//! Rendering seam between the session and a concrete graphics backend
//!
//! The session never talks to a graphics API directly. Each frame it pushes
//! the camera matrices, asks for the axes, hands every point to the
//! configured [`PointRenderer`] and finally presents. A backend only has to
//! implement [`RenderBridge`].

use cloudsketch_core::{ColoredPoint, Matrix4, Point3d, Result, Rgba};
use serde::{Deserialize, Serialize};

/// Geometry a point is drawn with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointShape {
    Sphere { radius: f64 },
}

/// Drawing surface implemented by a rendering backend
pub trait RenderBridge {
    /// Camera matrices for the frame about to be drawn
    fn set_camera(&mut self, view: &Matrix4<f64>, projection: &Matrix4<f64>);

    /// Draw the coordinate axes, each half-axis `length` long
    fn draw_axes(&mut self, length: f64);

    fn draw_point(&mut self, point: &ColoredPoint, shape: PointShape);

    /// Finish the frame
    fn present_frame(&mut self) -> Result<()>;
}

/// How a single point is turned into bridge draw calls
pub trait PointRenderer {
    fn name(&self) -> &'static str;

    fn draw(&self, bridge: &mut dyn RenderBridge, point: &ColoredPoint);
}

/// Draws each point as a solid sphere in the point's color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereBrush {
    pub radius: f64,
}

impl PointRenderer for SphereBrush {
    fn name(&self) -> &'static str {
        "sphere"
    }

    fn draw(&self, bridge: &mut dyn RenderBridge, point: &ColoredPoint) {
        bridge.draw_point(point, PointShape::Sphere { radius: self.radius });
    }
}

/// Point renderer selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushKind {
    #[default]
    Sphere,
}

impl BrushKind {
    pub fn build(self, radius: f64) -> Box<dyn PointRenderer> {
        match self {
            BrushKind::Sphere => Box::new(SphereBrush { radius }),
        }
    }
}

/// One half-axis drawn from the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSegment {
    pub end: Point3d,
    pub color: Rgba,
}

/// The six half-axes: +X/+Y/+Z in full red/green/blue, the negative
/// halves in darker shades.
pub fn axis_segments(length: f64) -> [AxisSegment; 6] {
    let dark = 128.0_f32 / 255.0;
    [
        AxisSegment { end: Point3d::new(length, 0.0, 0.0), color: Rgba::rgb(1.0, 0.0, 0.0) },
        AxisSegment { end: Point3d::new(0.0, length, 0.0), color: Rgba::rgb(0.0, 1.0, 0.0) },
        AxisSegment { end: Point3d::new(0.0, 0.0, length), color: Rgba::rgb(0.0, 0.0, 1.0) },
        AxisSegment { end: Point3d::new(-length, 0.0, 0.0), color: Rgba::rgb(dark, 0.0, 0.0) },
        AxisSegment { end: Point3d::new(0.0, -length, 0.0), color: Rgba::rgb(0.0, dark, 0.0) },
        AxisSegment { end: Point3d::new(0.0, 0.0, -length), color: Rgba::rgb(0.0, 0.0, dark) },
    ]
}

/// Bridge that records what would have been drawn.
///
/// Used when running without a window, and as a test double.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBridge {
    pub frames_presented: usize,
    pub axis_segments_drawn: usize,
    /// Points drawn during the frame in progress
    pub points_in_frame: usize,
    /// Points drawn during the last presented frame
    pub points_last_frame: usize,
    pub last_view: Option<Matrix4<f64>>,
    pub last_projection: Option<Matrix4<f64>>,
    pub last_shape: Option<PointShape>,
}

impl RenderBridge for HeadlessBridge {
    fn set_camera(&mut self, view: &Matrix4<f64>, projection: &Matrix4<f64>) {
        self.last_view = Some(*view);
        self.last_projection = Some(*projection);
        self.points_in_frame = 0;
    }

    fn draw_axes(&mut self, length: f64) {
        self.axis_segments_drawn += axis_segments(length).len();
    }

    fn draw_point(&mut self, _point: &ColoredPoint, shape: PointShape) {
        self.points_in_frame += 1;
        self.last_shape = Some(shape);
    }

    fn present_frame(&mut self) -> Result<()> {
        self.frames_presented += 1;
        self.points_last_frame = self.points_in_frame;
        log::trace!("Presented frame {} with {} points", self.frames_presented, self.points_last_frame);
        Ok(())
    }
}
