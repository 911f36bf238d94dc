//! Orbit camera driven by spherical coordinates

use crate::point::{Point3d, Vector3d};
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Below this, the eye direction is treated as collinear with the up vector
const UP_COLLINEAR_EPSILON: f64 = 1e-9;

/// Keeps a clamped polar angle strictly inside the open bound
const POLAR_MARGIN: f64 = 1e-9;

/// Bounds applied to every camera update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraLimits {
    pub min_radius: f64,
    pub max_radius: f64,
    /// Keeps the polar angle strictly inside `(polar_epsilon, PI - polar_epsilon)`
    pub polar_epsilon: f64,
}

impl CameraLimits {
    /// Repair limits that would make clamping meaningless
    pub fn sanitized(self) -> Self {
        let min_radius = if self.min_radius.is_finite() && self.min_radius > 0.0 {
            self.min_radius
        } else {
            Self::default().min_radius
        };
        let max_radius = if self.max_radius.is_finite() && self.max_radius >= min_radius {
            self.max_radius
        } else {
            min_radius.max(Self::default().max_radius)
        };
        let polar_epsilon = if self.polar_epsilon.is_finite()
            && self.polar_epsilon > 0.0
            && self.polar_epsilon + POLAR_MARGIN < FRAC_PI_2
        {
            self.polar_epsilon
        } else {
            Self::default().polar_epsilon
        };

        Self {
            min_radius,
            max_radius,
            polar_epsilon,
        }
    }

    fn clamp_radius(&self, radius: f64) -> f64 {
        radius.clamp(self.min_radius, self.max_radius)
    }

    fn clamp_polar(&self, theta: f64) -> f64 {
        let bound = self.polar_epsilon + POLAR_MARGIN;
        theta.clamp(bound, PI - bound)
    }
}

impl Default for CameraLimits {
    fn default() -> Self {
        Self {
            min_radius: 1.0,
            max_radius: 20.0,
            polar_epsilon: 0.1,
        }
    }
}

/// Camera orbiting a target point.
///
/// `theta` is the polar angle measured from +Z, `phi` the azimuth in the XY
/// plane. The view matrix is derived from these on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    radius: f64,
    theta: f64,
    phi: f64,
    target: Point3d,
    limits: CameraLimits,
}

impl OrbitCamera {
    pub const DEFAULT_RADIUS: f64 = 5.0;
    pub const DEFAULT_THETA: f64 = FRAC_PI_4;
    pub const DEFAULT_PHI: f64 = FRAC_PI_4;

    /// Create a camera looking at the origin. Out-of-range values are clamped.
    pub fn new(radius: f64, theta: f64, phi: f64, limits: CameraLimits) -> Self {
        let limits = limits.sanitized();
        let radius = if radius.is_finite() { radius } else { Self::DEFAULT_RADIUS };
        let theta = if theta.is_finite() { theta } else { Self::DEFAULT_THETA };
        let phi = if phi.is_finite() { phi } else { Self::DEFAULT_PHI };

        Self {
            radius: limits.clamp_radius(radius),
            theta: limits.clamp_polar(theta),
            phi,
            target: Point3d::origin(),
            limits,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    pub fn target(&self) -> &Point3d {
        &self.target
    }

    pub fn limits(&self) -> &CameraLimits {
        &self.limits
    }

    /// Rotate around the target. The polar angle is clamped, the azimuth wraps
    /// through the trigonometric functions.
    pub fn orbit(&mut self, delta_azimuth: f64, delta_polar: f64) {
        if delta_azimuth.is_finite() {
            self.phi += delta_azimuth;
        }
        if delta_polar.is_finite() {
            self.theta = self.limits.clamp_polar(self.theta + delta_polar);
        }
    }

    /// Move towards (negative) or away from (positive) the target
    pub fn zoom(&mut self, delta_radius: f64) {
        if delta_radius.is_finite() {
            self.radius = self.limits.clamp_radius(self.radius + delta_radius);
        }
    }

    /// Retarget the orbit without touching radius or angles
    pub fn focus(&mut self, target: Point3d) {
        if target.coords.iter().all(|c| c.is_finite()) {
            self.target = target;
        }
    }

    pub fn focus_origin(&mut self) {
        self.focus(Point3d::origin());
    }

    /// Offset of the eye from the target
    pub fn offset(&self) -> Vector3d {
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        Vector3d::new(
            self.radius * sin_theta * cos_phi,
            self.radius * sin_theta * sin_phi,
            self.radius * cos_theta,
        )
    }

    /// World-space eye position
    pub fn eye(&self) -> Point3d {
        self.target + self.offset()
    }

    /// Right-handed look-at transform from the eye towards the target.
    ///
    /// Up is +Y, except when the eye sits on the Y axis relative to the
    /// target, where +Z is used instead.
    pub fn view_matrix(&self) -> Matrix4<f64> {
        let eye = self.eye();
        let direction = self.offset() / self.radius;
        let up = if direction.cross(&Vector3d::y()).norm() < UP_COLLINEAR_EPSILON {
            Vector3d::z()
        } else {
            Vector3d::y()
        };
        Matrix4::look_at_rh(&eye, &self.target, &up)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_RADIUS,
            Self::DEFAULT_THETA,
            Self::DEFAULT_PHI,
            CameraLimits::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_default_camera_position() {
        let camera = OrbitCamera::default();
        let eye = camera.eye();
        assert_relative_eq!(eye.coords.norm(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(eye.x, 2.5, epsilon = 1e-12);
        assert_relative_eq!(eye.y, 2.5, epsilon = 1e-12);
        assert_relative_eq!(eye.z, 5.0 * FRAC_PI_4.cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_view_matrix_maps_eye_to_origin() {
        let camera = OrbitCamera::default();
        let view = camera.view_matrix();
        let eye_in_view = view.transform_point(&camera.eye());
        assert_relative_eq!(eye_in_view.coords.norm(), 0.0, epsilon = 1e-12);

        // Target sits straight ahead on -Z at the orbit radius
        let target_in_view = view.transform_point(camera.target());
        assert_relative_eq!(target_in_view.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(target_in_view.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(target_in_view.z, -5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_view_matrix_finite_on_up_axis() {
        let camera = OrbitCamera::new(5.0, FRAC_PI_2, FRAC_PI_2, CameraLimits::default());
        let view = camera.view_matrix();
        assert!(view.iter().all(|v| v.is_finite()));
        assert!(view.try_inverse().is_some());
    }

    #[test]
    fn test_orbit_clamps_polar_angle() {
        let mut camera = OrbitCamera::default();
        camera.orbit(0.0, 100.0);
        assert!(camera.theta() < PI - 0.1);
        assert_relative_eq!(camera.theta(), PI - 0.1, epsilon = 1e-6);
        camera.orbit(0.0, -100.0);
        assert!(camera.theta() > 0.1);
        assert_relative_eq!(camera.theta(), 0.1, epsilon = 1e-6);

        let pinned = OrbitCamera::new(5.0, 0.0, 0.0, CameraLimits::default());
        assert!(pinned.theta() > 0.1);
    }

    #[test]
    fn test_orbit_leaves_azimuth_unbounded() {
        let mut camera = OrbitCamera::default();
        camera.orbit(10.0 * PI, 0.0);
        assert_relative_eq!(camera.phi(), FRAC_PI_4 + 10.0 * PI);
    }

    #[test]
    fn test_random_orbit_and_zoom_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut camera = OrbitCamera::default();
        let limits = *camera.limits();

        for _ in 0..2000 {
            camera.orbit(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
            camera.zoom(rng.gen_range(-50.0..50.0));

            assert!(camera.theta() > limits.polar_epsilon);
            assert!(camera.theta() < PI - limits.polar_epsilon);
            assert!(camera.theta() > 0.0 && camera.theta() < PI);
            assert!(camera.radius() >= limits.min_radius);
            assert!(camera.radius() <= limits.max_radius);
        }
    }

    #[test]
    fn test_large_negative_zoom_clamps_to_min_radius() {
        let mut camera = OrbitCamera::default();
        assert_eq!(camera.radius(), 5.0);
        camera.zoom(-1000.0);
        assert_eq!(camera.radius(), 1.0);
        camera.zoom(1000.0);
        assert_eq!(camera.radius(), 20.0);
    }

    #[test]
    fn test_non_finite_deltas_are_ignored() {
        let mut camera = OrbitCamera::default();
        let before = camera.clone();
        camera.orbit(f64::NAN, f64::INFINITY);
        camera.zoom(f64::NEG_INFINITY);
        assert_eq!(camera, before);
    }

    #[test]
    fn test_focus_keeps_orbit_parameters() {
        let mut camera = OrbitCamera::default();
        camera.focus(Point3d::new(1.0, 2.0, 3.0));
        assert_eq!(camera.radius(), 5.0);
        assert_relative_eq!((camera.eye() - camera.target()).norm(), 5.0, epsilon = 1e-12);

        camera.focus_origin();
        assert_eq!(*camera.target(), Point3d::origin());
    }

    #[test]
    fn test_invalid_limits_are_repaired() {
        let limits = CameraLimits {
            min_radius: -1.0,
            max_radius: f64::NAN,
            polar_epsilon: 3.0,
        }
        .sanitized();
        assert_eq!(limits, CameraLimits::default());
    }
}
