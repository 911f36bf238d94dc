//! Interaction controller
//!
//! A [`Session`] owns everything that changes while the sketcher runs: the
//! camera, projection, point store, depth, color and recording flag. Input
//! arrives as [`InputEvent`]s, key presses are resolved to [`Command`]s and
//! dispatched with an exhaustive match, and [`Session::frame`] draws the
//! current state through a [`RenderBridge`].

use crate::config::{ColorMode, InteractionConfig, ViewerConfig};
use crate::error::Result;
use crate::input::{Command, InputEvent, KeyBindings};
use crate::render::{PointRenderer, RenderBridge};
use crate::telemetry::{FrameTelemetry, TelemetrySample};
use cloudsketch_core::{
    world_to_screen, Depth, Error, LoadReport, OrbitCamera, Point3d, PointStore, Projection,
    ProjectionMode, Rgba, SerializedPoint, Viewport,
};
use cloudsketch_io::DecodedCloud;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

/// Work the host has to carry out on the session's behalf
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Persist `points` under `file_name`
    Persist {
        file_name: String,
        points: Vec<SerializedPoint>,
    },
}

impl Effect {
    /// Carry out the effect with the JSON writer, placing files in `dir`
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        match self {
            Effect::Persist { file_name, points } => {
                let path = cloudsketch_io::save_path(dir, file_name);
                cloudsketch_io::write_cloud(points, &path)?;
                Ok(path)
            }
        }
    }
}

/// What handling an event produced
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventOutcome {
    /// The host should not propagate the event further (e.g. page scroll)
    pub consumed: bool,
    pub effect: Option<Effect>,
}

impl EventOutcome {
    fn ignored() -> Self {
        Self::default()
    }

    fn consumed() -> Self {
        Self {
            consumed: true,
            effect: None,
        }
    }
}

/// Single-user sketching session
pub struct Session {
    camera: OrbitCamera,
    projection: Projection,
    store: PointStore,
    depth: Depth,
    color: Rgba,
    recording: bool,
    pointer: Option<(f64, f64)>,
    dragging: bool,
    interaction: InteractionConfig,
    key_bindings: KeyBindings,
    renderer: Box<dyn PointRenderer>,
    axis_length: f64,
    telemetry: FrameTelemetry,
    rng: StdRng,
}

impl Session {
    /// Create a session with an empty store. Recording starts off.
    pub fn new(config: &ViewerConfig) -> Result<Self> {
        let camera = config.camera.build();
        let projection = config.projection.build()?;
        let color = config.interaction.initial_rgba()?;
        let depth = origin_depth(&camera, &projection);

        log::debug!(
            "Session created: radius {:.2}, {:?} projection, initial depth {:.3}, brush {:?}",
            camera.radius(),
            projection.mode,
            depth.value(),
            config.render.brush
        );

        Ok(Self {
            camera,
            projection,
            store: PointStore::new(),
            depth,
            color,
            recording: false,
            pointer: None,
            dragging: false,
            interaction: config.interaction.clone(),
            key_bindings: config.keybindings.clone(),
            renderer: config.render.brush.build(config.render.brush_radius),
            axis_length: config.render.axis_length,
            telemetry: FrameTelemetry::new(),
            rng: StdRng::from_entropy(),
        })
    }

    /// Use a fixed seed for random point colors
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Accept the result of the one-shot fallback load.
    ///
    /// On success the dataset becomes both the fallback template and the
    /// working set. On failure the session continues with an empty store.
    pub fn seed_fallback(&mut self, loaded: cloudsketch_io::Result<DecodedCloud>) -> LoadReport {
        match loaded {
            Ok(cloud) => {
                let mut report = self.store.seed(&cloud.entries);
                report.skipped += cloud.undecodable;
                if report.skipped > 0 {
                    log::warn!("Fallback dataset: skipped {} malformed entries", report.skipped);
                }
                log::info!("Loaded {} fallback points", report.loaded);
                report
            }
            Err(e) => {
                log::warn!("Fallback dataset unavailable, starting empty: {e}");
                self.store = PointStore::new();
                LoadReport::default()
            }
        }
    }

    /// Read the fallback dataset from `path` and seed the session with it
    pub fn load_fallback_file<P: AsRef<Path>>(&mut self, path: P) -> LoadReport {
        let loaded = cloudsketch_io::read_cloud(path);
        self.seed_fallback(loaded)
    }

    /// Feed one input event to the controller
    pub fn handle_event(&mut self, event: InputEvent) -> EventOutcome {
        match event {
            InputEvent::PointerMoved { x, y } => {
                self.pointer_moved(x, y);
                EventOutcome::consumed()
            }
            InputEvent::PointerButton { pressed } => {
                self.dragging = pressed;
                EventOutcome::consumed()
            }
            InputEvent::Wheel { delta_y } => {
                self.camera.zoom(delta_y * self.interaction.zoom_sensitivity);
                EventOutcome::consumed()
            }
            InputEvent::Key(key) => match self.key_bindings.lookup(key) {
                Some(command) => EventOutcome {
                    consumed: true,
                    effect: self.execute(command),
                },
                None => EventOutcome::ignored(),
            },
            InputEvent::DepthChanged(value) => {
                self.depth = Depth::new(value);
                EventOutcome::consumed()
            }
            InputEvent::ColorChanged(color) => {
                self.color = color;
                EventOutcome::consumed()
            }
        }
    }

    /// Run a command directly, bypassing key bindings
    pub fn execute(&mut self, command: Command) -> Option<Effect> {
        match command {
            Command::Clear => {
                self.store.clear();
                None
            }
            Command::Load => {
                self.store.restore_fallback();
                log::debug!("Restored {} fallback points", self.store.len());
                None
            }
            Command::ToggleProjection => {
                self.projection = self.projection.toggled();
                log::info!("Projection switched to {:?}", self.projection.mode);
                None
            }
            Command::ToggleRecord => {
                self.recording = !self.recording;
                log::info!("Recording {}", if self.recording { "on" } else { "off" });
                None
            }
            Command::Save => {
                let points = self.store.snapshot();
                log::info!("Saving {} points as {}", points.len(), self.interaction.save_file_name);
                Some(Effect::Persist {
                    file_name: self.interaction.save_file_name.clone(),
                    points,
                })
            }
            Command::Focus => {
                self.camera.focus_origin();
                None
            }
        }
    }

    /// Draw the current state and advance telemetry.
    ///
    /// `now_ms` is the host's monotonic frame timestamp.
    pub fn frame(&mut self, now_ms: f64, bridge: &mut dyn RenderBridge) -> Result<Option<TelemetrySample>> {
        let view = self.camera.view_matrix();
        let projection = self.projection.matrix()?;

        bridge.set_camera(&view, &projection);
        bridge.draw_axes(self.axis_length);
        for point in self.store.iter() {
            self.renderer.draw(bridge, point);
        }
        bridge.present_frame()?;

        let sample = self.telemetry.tick(now_ms, self.store.len(), self.store.memory_bytes());
        if let Some(sample) = &sample {
            log::debug!("{sample}");
        }
        Ok(sample)
    }

    /// Update the projection aspect ratio after a resize.
    ///
    /// A viewport that would collapse the frustum is ignored and the previous
    /// aspect ratio kept.
    pub fn resize(&mut self, viewport: Viewport) {
        let resized = Projection {
            aspect: viewport.aspect(),
            ..self.projection
        };
        match resized.validate() {
            Ok(()) => self.projection = resized,
            Err(e) => log::warn!("Ignoring viewport {}x{}: {e}", viewport.width, viewport.height),
        }
    }

    fn pointer_moved(&mut self, x: f64, y: f64) {
        let previous = self.pointer.replace((x, y));

        if self.dragging && y <= self.interaction.control_region_top {
            if let Some((last_x, last_y)) = previous {
                let k = self.interaction.orbit_sensitivity;
                // NDC y grows upwards; dragging down tilts the camera down
                self.camera.orbit((x - last_x) * k, -(y - last_y) * k);
            }
        }

        match self.record_point(x, y) {
            Ok(()) => {}
            Err(e) if e.is_benign() => {}
            Err(e) => log::warn!("Point not placed: {e}"),
        }
    }

    fn record_point(&mut self, x: f64, y: f64) -> cloudsketch_core::Result<()> {
        if !self.recording {
            return Err(Error::NotRecording);
        }

        let color = match self.interaction.color_mode {
            ColorMode::Picker => self.color,
            ColorMode::Random => Rgba::rgb(self.rng.gen(), self.rng.gen(), self.rng.gen()),
        };
        let view = self.camera.view_matrix();
        let projection = self.projection.matrix()?;
        self.store
            .place((x, y), self.depth.value(), color, &view, &projection)
            .map(|_| ())
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn projection_mode(&self) -> ProjectionMode {
        self.projection.mode
    }

    pub fn store(&self) -> &PointStore {
        &self.store
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn key_bindings(&self) -> &KeyBindings {
        &self.key_bindings
    }

    pub fn renderer_name(&self) -> &'static str {
        self.renderer.name()
    }

    pub fn telemetry(&self) -> &FrameTelemetry {
        &self.telemetry
    }
}

/// Depth at which the world origin sits on screen, so the slider starts there
fn origin_depth(camera: &OrbitCamera, projection: &Projection) -> Depth {
    let screen = projection
        .matrix()
        .and_then(|matrix| world_to_screen(&Point3d::origin(), &camera.view_matrix(), &matrix));
    match screen {
        Ok(screen) => Depth::new(screen.depth),
        Err(e) => {
            log::warn!("Could not project the origin, using default depth: {e}");
            Depth::default()
        }
    }
}
