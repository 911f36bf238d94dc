//! Ordered store of placed points plus the fallback template it can be reset to

use crate::error::Result;
use crate::point::{ColoredPoint, PointVertex, Rgba, SerializedPoint};
use crate::projection::screen_to_world;
use nalgebra::Matrix4;
use std::ops::Index;

/// Outcome of loading a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// The session's working set of points.
///
/// Points are only ever appended or removed all at once. The fallback
/// template is replaced by [`load_snapshot`](Self::load_snapshot) and copied
/// back into the working set by [`restore_fallback`](Self::restore_fallback).
#[derive(Debug, Clone, Default)]
pub struct PointStore {
    points: Vec<ColoredPoint>,
    fallback: Vec<ColoredPoint>,
}

impl PointStore {
    /// Create an empty store with no fallback template
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose working set and template both hold `points`
    pub fn with_fallback(points: Vec<ColoredPoint>) -> Self {
        Self {
            points: points.clone(),
            fallback: points,
        }
    }

    /// Number of points in the working set
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points in the fallback template
    pub fn fallback_len(&self) -> usize {
        self.fallback.len()
    }

    pub fn points(&self) -> &[ColoredPoint] {
        &self.points
    }

    pub fn fallback(&self) -> &[ColoredPoint] {
        &self.fallback
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColoredPoint> {
        self.points.iter()
    }

    /// Append a point unconditionally
    pub fn push(&mut self, point: ColoredPoint) {
        self.points.push(point);
    }

    /// Resolve a screen position into world space and append the result.
    ///
    /// Nothing is appended when the transform fails.
    pub fn place(
        &mut self,
        ndc: (f64, f64),
        depth: f64,
        color: Rgba,
        view: &Matrix4<f64>,
        projection: &Matrix4<f64>,
    ) -> Result<&ColoredPoint> {
        let position = screen_to_world(ndc.0, ndc.1, depth, view, projection)?;
        self.points.push(ColoredPoint::new(position, color));
        Ok(&self.points[self.points.len() - 1])
    }

    /// Remove every point from the working set
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Replace the working set with a fresh copy of the fallback template
    pub fn restore_fallback(&mut self) {
        self.points.clone_from(&self.fallback);
    }

    /// Serializable copy of the working set
    pub fn snapshot(&self) -> Vec<SerializedPoint> {
        self.points.iter().map(ColoredPoint::to_serialized).collect()
    }

    /// Replace the fallback template with the valid entries of `entries`.
    ///
    /// Malformed entries are skipped and counted; the working set is left alone.
    pub fn load_snapshot(&mut self, entries: &[SerializedPoint]) -> LoadReport {
        let mut report = LoadReport::default();
        let mut template = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            match entry.to_point() {
                Ok(point) => {
                    template.push(point);
                    report.loaded += 1;
                }
                Err(e) => {
                    log::warn!("Skipping snapshot entry {index}: {e}");
                    report.skipped += 1;
                }
            }
        }

        self.fallback = template;
        report
    }

    /// Load `entries` as the template and copy it into the working set
    pub fn seed(&mut self, entries: &[SerializedPoint]) -> LoadReport {
        let report = self.load_snapshot(entries);
        self.restore_fallback();
        report
    }

    /// Interleaved position/color vertices for the working set
    pub fn vertex_data(&self) -> Vec<PointVertex> {
        self.points.iter().map(ColoredPoint::to_vertex).collect()
    }

    /// Approximate heap usage of the working set and template
    pub fn memory_bytes(&self) -> usize {
        (self.points.capacity() + self.fallback.capacity()) * std::mem::size_of::<ColoredPoint>()
    }
}

impl Index<usize> for PointStore {
    type Output = ColoredPoint;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a PointStore {
    type Item = &'a ColoredPoint;
    type IntoIter = std::slice::Iter<'a, ColoredPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl Extend<ColoredPoint> for PointStore {
    fn extend<I: IntoIterator<Item = ColoredPoint>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrbitCamera;
    use crate::error::Error;
    use crate::point::{ColorValue, Point3d};
    use crate::projection::Projection;
    use approx::assert_relative_eq;

    fn sample_entries(count: usize) -> Vec<SerializedPoint> {
        (0..count)
            .map(|i| {
                let t = i as f64 / count as f64;
                SerializedPoint {
                    x: (t * 40.0).sin() * 10.0,
                    y: t * 5.0 - 2.5,
                    z: (t * 40.0).cos() * 10.0,
                    color: ColorValue::Channels(vec![t as f32, 0.5, 1.0 - t as f32, 1.0]),
                }
            })
            .collect()
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = PointStore::new();
        assert!(store.is_empty());
        assert_eq!(store.fallback_len(), 0);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut store = PointStore::new();
        store.seed(&sample_entries(10));

        store.clear();
        let once = store.snapshot();
        store.clear();
        assert_eq!(store.snapshot(), once);
        assert!(store.is_empty());
        assert_eq!(store.fallback_len(), 10);
    }

    #[test]
    fn test_fallback_lifecycle() {
        let entries = sample_entries(500);
        let mut store = PointStore::new();
        let report = store.seed(&entries);
        assert_eq!(report, LoadReport { loaded: 500, skipped: 0 });
        assert_eq!(store.len(), 500);

        store.clear();
        assert_eq!(store.len(), 0);

        store.restore_fallback();
        assert_eq!(store.len(), 500);
        for (point, entry) in store.iter().zip(&entries) {
            assert_relative_eq!(point.position().x, entry.x, epsilon = 1e-12);
            assert_relative_eq!(point.position().y, entry.y, epsilon = 1e-12);
            assert_relative_eq!(point.position().z, entry.z, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_restore_ignores_mutation_history() {
        let mut store = PointStore::new();
        store.seed(&sample_entries(20));
        let template: Vec<_> = store.fallback().to_vec();

        store.push(ColoredPoint::new(Point3d::new(9.0, 9.0, 9.0), Rgba::WHITE));
        store.clear();
        store.push(ColoredPoint::new(Point3d::new(1.0, 1.0, 1.0), Rgba::WHITE));
        store.restore_fallback();
        assert_eq!(store.points(), template.as_slice());

        store.restore_fallback();
        assert_eq!(store.points(), template.as_slice());
    }

    #[test]
    fn test_load_snapshot_replaces_template_only() {
        let mut store = PointStore::new();
        store.push(ColoredPoint::new(Point3d::new(1.0, 2.0, 3.0), Rgba::WHITE));

        let report = store.load_snapshot(&sample_entries(3));
        assert_eq!(report.loaded, 3);
        assert_eq!(store.len(), 1);
        assert_eq!(store.fallback_len(), 3);
    }

    #[test]
    fn test_load_snapshot_skips_malformed_entries() {
        let mut entries = sample_entries(4);
        entries[1].color = ColorValue::Channels(vec![0.5, 0.5]);
        entries[2].z = f64::INFINITY;
        entries[3].color = ColorValue::Hex("not a color".to_string());

        let mut store = PointStore::new();
        let report = store.seed(&entries);
        assert_eq!(report, LoadReport { loaded: 1, skipped: 3 });
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut store = PointStore::new();
        store.push(ColoredPoint::new(Point3d::new(1.0, 0.0, 0.0), Rgba::rgb(1.0, 0.0, 0.0)));
        store.push(ColoredPoint::new(Point3d::new(0.0, 1.0, 0.0), Rgba::rgb(0.0, 1.0, 0.0)));

        let snapshot = store.snapshot();
        store.clear();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].y, 1.0);
        for entry in &snapshot {
            let ColorValue::Channels(channels) = &entry.color else {
                panic!("snapshot colors are channel arrays");
            };
            assert_eq!(channels.len(), 4);
            assert!(channels.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }

    #[test]
    fn test_place_appends_resolved_point() {
        let camera = OrbitCamera::default();
        let projection = Projection::default();
        let mut store = PointStore::new();

        let point = *store
            .place((0.0, 0.0), 0.5, Rgba::WHITE, &camera.view_matrix(), &projection.matrix().unwrap())
            .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store[0], point);
    }

    #[test]
    fn test_place_failure_leaves_store_untouched() {
        let camera = OrbitCamera::default();
        let mut store = PointStore::new();

        let result = store.place((0.0, 0.0), 0.5, Rgba::WHITE, &camera.view_matrix(), &Matrix4::zeros());
        assert!(matches!(result, Err(Error::InvalidTransform(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_vertex_data_matches_points() {
        let mut store = PointStore::new();
        store.seed(&sample_entries(5));
        let vertices = store.vertex_data();
        assert_eq!(vertices.len(), 5);
        assert_eq!(vertices[2].color, store[2].color().to_array());
        assert!(store.memory_bytes() >= 10 * std::mem::size_of::<ColoredPoint>());
    }
}
