//! Point types and related functionality

use crate::error::{Error, Result};
use bytemuck::{Pod, Zeroable};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// Normalized RGBA color, every channel in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba([f32; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba([1.0, 1.0, 1.0, 1.0]);

    /// Create a color, clamping each channel into `[0, 1]`
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([clamp_unit(r), clamp_unit(g), clamp_unit(b), clamp_unit(a)])
    }

    /// Opaque color from three channels
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Build from a 3 or 4 element channel slice. Missing alpha defaults to 1.0.
    pub fn from_channels(channels: &[f32]) -> Result<Self> {
        if channels.iter().any(|c| !c.is_finite()) {
            return Err(Error::MalformedSnapshot(
                "color channels must be finite numbers".to_string(),
            ));
        }
        match *channels {
            [r, g, b] => Ok(Self::rgb(r, g, b)),
            [r, g, b, a] => Ok(Self::new(r, g, b, a)),
            _ => Err(Error::MalformedSnapshot(format!(
                "color must have 3 or 4 channels, got {}",
                channels.len()
            ))),
        }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !(digits.len() == 6 || digits.len() == 8) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidData(format!("invalid hex color: {hex}")));
        }

        let mut channels = [255u8; 4];
        for (i, channel) in channels.iter_mut().enumerate().take(digits.len() / 2) {
            *channel = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
                .map_err(|_| Error::InvalidData(format!("invalid hex color: {hex}")))?;
        }

        Ok(Self(channels.map(|c| c as f32 / 255.0)))
    }

    /// Format as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.0.map(|c| (c * 255.0).round() as u8);
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    pub fn r(&self) -> f32 {
        self.0[0]
    }

    pub fn g(&self) -> f32 {
        self.0[1]
    }

    pub fn b(&self) -> f32 {
        self.0[2]
    }

    pub fn a(&self) -> f32 {
        self.0[3]
    }

    /// Channels as `[r, g, b, a]`
    pub fn to_array(&self) -> [f32; 4] {
        self.0
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

fn clamp_unit(channel: f32) -> f32 {
    if channel.is_nan() {
        0.0
    } else {
        channel.clamp(0.0, 1.0)
    }
}

/// A placed sample: world position and color.
///
/// The position is fixed at construction; only membership in a
/// [`PointStore`](crate::PointStore) changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoredPoint {
    position: Point3d,
    color: Rgba,
}

impl ColoredPoint {
    pub fn new(position: Point3d, color: Rgba) -> Self {
        Self { position, color }
    }

    pub fn position(&self) -> &Point3d {
        &self.position
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    /// Independent serializable copy of this point
    pub fn to_serialized(&self) -> SerializedPoint {
        SerializedPoint {
            x: self.position.x,
            y: self.position.y,
            z: self.position.z,
            color: ColorValue::Channels(self.color.to_array().to_vec()),
        }
    }

    /// Pack into the interleaved vertex layout used by GPU bridges
    pub fn to_vertex(&self) -> PointVertex {
        PointVertex {
            position: [
                self.position.x as f32,
                self.position.y as f32,
                self.position.z as f32,
            ],
            color: self.color.to_array(),
        }
    }
}

/// Color as it appears in a cloud file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    /// `[r, g, b]` or `[r, g, b, a]`, normalized
    Channels(Vec<f32>),
    /// `#RRGGBB` / `#RRGGBBAA`
    Hex(String),
}

impl ColorValue {
    pub fn to_rgba(&self) -> Result<Rgba> {
        match self {
            ColorValue::Channels(channels) => Rgba::from_channels(channels),
            ColorValue::Hex(hex) => Rgba::from_hex(hex)
                .map_err(|e| Error::MalformedSnapshot(e.to_string())),
        }
    }
}

/// One entry of a fallback dataset or saved cloud: `{x, y, z, color}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub color: ColorValue,
}

impl SerializedPoint {
    /// Validate and convert into a [`ColoredPoint`]
    pub fn to_point(&self) -> Result<ColoredPoint> {
        if !(self.x.is_finite() && self.y.is_finite() && self.z.is_finite()) {
            return Err(Error::MalformedSnapshot(format!(
                "non-finite coordinates ({}, {}, {})",
                self.x, self.y, self.z
            )));
        }
        let color = self.color.to_rgba()?;
        Ok(ColoredPoint::new(Point3d::new(self.x, self.y, self.z), color))
    }
}

impl TryFrom<&SerializedPoint> for ColoredPoint {
    type Error = Error;

    fn try_from(value: &SerializedPoint) -> Result<Self> {
        value.to_point()
    }
}

/// Interleaved vertex: position followed by RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}
