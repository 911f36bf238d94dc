//! Frame rate and point count telemetry
//!
//! Purely observational: nothing here feeds back into session state.

use std::fmt;

/// Length of one measurement window in milliseconds
const WINDOW_MS: f64 = 1000.0;

/// Values published once per measurement window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    pub fps: f64,
    pub points: usize,
    pub max_points: usize,
    pub memory_bytes: usize,
}

impl fmt::Display for TelemetrySample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FPS: {:.2} | Points: {} | Max Points: {} | Memory: {:.2} MB",
            self.fps,
            self.points,
            self.max_points,
            self.memory_bytes as f64 / 1024.0 / 1024.0
        )
    }
}

/// Counts frames and recomputes FPS once per second
#[derive(Debug, Clone, Default)]
pub struct FrameTelemetry {
    window_start_ms: Option<f64>,
    frame_count: u32,
    max_points: usize,
    last_sample: Option<TelemetrySample>,
}

impl FrameTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame at `now_ms`.
    ///
    /// Returns a sample when a full window has elapsed since the last one.
    pub fn tick(&mut self, now_ms: f64, points: usize, memory_bytes: usize) -> Option<TelemetrySample> {
        self.frame_count += 1;
        let Some(start) = self.window_start_ms else {
            self.window_start_ms = Some(now_ms);
            return None;
        };

        let elapsed = now_ms - start;
        if elapsed < WINDOW_MS {
            return None;
        }

        self.max_points = self.max_points.max(points);
        let sample = TelemetrySample {
            fps: self.frame_count as f64 / (elapsed / 1000.0),
            points,
            max_points: self.max_points,
            memory_bytes,
        };

        self.window_start_ms = Some(now_ms);
        self.frame_count = 0;
        self.last_sample = Some(sample);
        Some(sample)
    }

    /// Most recently published sample
    pub fn last_sample(&self) -> Option<TelemetrySample> {
        self.last_sample
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }
}
