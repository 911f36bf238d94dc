//! Integration tests for the cloudsketch session
//!
//! These drive a session end to end: fallback loading, recording, snapshots
//! and persistence through the JSON writer.

use approx::assert_relative_eq;
use cloudsketch_core::{ColorValue, SerializedPoint};
use cloudsketch_io::{CloudReader, DecodedCloud, JsonCloud};
use cloudsketch_visualization::*;

/// Fallback dataset with points spread over a sphere of radius 3
fn fallback_cloud(count: usize) -> DecodedCloud {
    let golden_angle = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    let entries = (0..count)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / count as f64;
            let ring = (1.0 - y * y).sqrt();
            let angle = golden_angle * i as f64;
            SerializedPoint {
                x: 3.0 * ring * angle.cos(),
                y: 3.0 * y,
                z: 3.0 * ring * angle.sin(),
                color: ColorValue::Channels(vec![0.78, 0.75, 0.55, 1.0]),
            }
        })
        .collect();

    DecodedCloud {
        entries,
        undecodable: 0,
    }
}

fn new_session() -> Session {
    Session::new(&ViewerConfig::default()).unwrap().with_rng_seed(11)
}

#[test]
fn test_fallback_clear_and_restore() {
    let mut session = new_session();
    let loaded = fallback_cloud(500);
    let report = session.seed_fallback(Ok(loaded.clone()));
    assert_eq!(report.loaded, 500);
    assert_eq!(session.store().len(), 500);

    session.handle_event(InputEvent::Key('c'));
    assert_eq!(session.store().len(), 0);

    session.handle_event(InputEvent::Key('l'));
    assert_eq!(session.store().len(), 500);
    for (point, entry) in session.store().iter().zip(&loaded.entries) {
        assert_relative_eq!(point.position().x, entry.x, epsilon = 1e-9);
        assert_relative_eq!(point.position().y, entry.y, epsilon = 1e-9);
        assert_relative_eq!(point.position().z, entry.z, epsilon = 1e-9);
    }
}

#[test]
fn test_pointer_moves_without_recording_append_nothing() {
    let mut session = new_session();
    assert!(!session.is_recording());

    for (x, y) in [(0.0, 0.0), (0.3, -0.2), (-0.5, 0.4)] {
        session.handle_event(InputEvent::PointerMoved { x, y });
    }
    assert_eq!(session.store().len(), 0);
}

#[test]
fn test_recorded_point_lies_between_clip_planes() {
    let mut session = new_session();
    session.handle_event(InputEvent::Key('r'));
    session.handle_event(InputEvent::DepthChanged(0.5));
    session.handle_event(InputEvent::PointerMoved { x: 0.0, y: 0.0 });

    assert_eq!(session.store().len(), 1);
    let view = session.camera().view_matrix();
    let eye_depth = -view.transform_point(session.store()[0].position()).z;
    assert!(eye_depth > session.projection().near);
    assert!(eye_depth < session.projection().far);
}

#[test]
fn test_snapshot_survives_clear() {
    let mut session = new_session();
    session.handle_event(InputEvent::Key('r'));
    session.handle_event(InputEvent::PointerMoved { x: -0.2, y: 0.1 });
    session.handle_event(InputEvent::PointerMoved { x: 0.3, y: -0.4 });
    assert_eq!(session.store().len(), 2);

    let Some(Effect::Persist { points, .. }) = session.handle_event(InputEvent::Key('s')).effect else {
        panic!("save produces a persist effect");
    };
    session.handle_event(InputEvent::Key('c'));

    assert_eq!(points.len(), 2);
    for entry in &points {
        let ColorValue::Channels(channels) = &entry.color else {
            panic!("saved colors are channel arrays");
        };
        assert!(channels.iter().all(|c| (0.0..=1.0).contains(c)));
    }
    assert!(session.store().is_empty());
}

#[test]
fn test_large_negative_zoom_clamps() {
    let mut session = new_session();
    assert_eq!(session.camera().radius(), 5.0);
    session.handle_event(InputEvent::Wheel { delta_y: -100_000.0 });
    assert_eq!(session.camera().radius(), session.camera().limits().min_radius);
    assert_eq!(session.camera().radius(), 1.0);
}

#[test]
fn test_save_then_reload_as_fallback() {
    let dir = std::env::temp_dir().join("cloudsketch_session_save_reload");
    std::fs::create_dir_all(&dir).unwrap();

    let mut session = new_session();
    session.execute(Command::ToggleRecord);
    for i in 0..10 {
        let t = i as f64 / 10.0;
        session.handle_event(InputEvent::PointerMoved { x: t - 0.5, y: 0.5 - t });
    }
    let effect = session.execute(Command::Save).unwrap();
    let path = effect.write_to(&dir).unwrap();
    assert!(path.ends_with("custom_cloud.json"));

    let mut restored = new_session();
    let report = restored.seed_fallback(JsonCloud::read_cloud(&path));
    assert_eq!(report.loaded, 10);
    assert_eq!(report.skipped, 0);
    for (a, b) in restored.store().iter().zip(session.store().iter()) {
        assert_relative_eq!(a.position().x, b.position().x, epsilon = 1e-9);
        assert_relative_eq!(a.position().y, b.position().y, epsilon = 1e-9);
        assert_relative_eq!(a.position().z, b.position().z, epsilon = 1e-9);
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_fallback_file_is_not_fatal() {
    let mut session = new_session();
    let report = session.load_fallback_file("no/such/dir/cloud_500.json");
    assert_eq!(report.loaded, 0);
    assert!(session.store().is_empty());

    let mut bridge = HeadlessBridge::default();
    session.frame(0.0, &mut bridge).unwrap();
    assert_eq!(bridge.frames_presented, 1);
}

#[test]
fn test_orthographic_recording() {
    let mut session = new_session();
    session.execute(Command::ToggleProjection);
    session.execute(Command::ToggleRecord);
    session.handle_event(InputEvent::PointerMoved { x: 0.5, y: 0.5 });
    session.handle_event(InputEvent::PointerMoved { x: -0.5, y: -0.5 });
    assert_eq!(session.store().len(), 2);
    assert_eq!(session.projection_mode(), cloudsketch_core::ProjectionMode::Orthographic);
}

#[test]
fn test_recording_while_dragging_places_and_orbits() {
    let mut session = new_session();
    let phi = session.camera().phi();
    session.execute(Command::ToggleRecord);
    session.handle_event(InputEvent::PointerMoved { x: 0.0, y: 0.0 });
    session.handle_event(InputEvent::PointerButton { pressed: true });
    session.handle_event(InputEvent::PointerMoved { x: 0.25, y: 0.0 });
    session.handle_event(InputEvent::PointerButton { pressed: false });
    session.handle_event(InputEvent::PointerMoved { x: 0.5, y: 0.0 });

    assert_eq!(session.store().len(), 3);
    assert_relative_eq!(session.camera().phi(), phi + 0.5, epsilon = 1e-12);
}
