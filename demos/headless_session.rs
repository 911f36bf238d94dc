//! Headless sketching session
//!
//! Loads the fallback dataset, replays a scripted gesture (orbit, record a
//! spiral, zoom, save) against a bridge that only counts draw calls, and
//! writes the saved cloud to the output directory.
//!
//! ```text
//! RUST_LOG=info cargo run --bin headless_session -- --fallback cloud_500.json --out /tmp
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use cloudsketch_core::Viewport;
use cloudsketch_visualization::{Command, HeadlessBridge, InputEvent, Session, ViewerConfig};
use std::path::PathBuf;

const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Parser, Debug)]
#[command(about = "Replay a scripted sketching session without a window")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fallback dataset (defaults to the configured fallback file)
    #[arg(long)]
    fallback: Option<PathBuf>,

    /// Directory the saved cloud is written to
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Viewport size in pixels, used to normalize the scripted pointer
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Number of points placed along the recorded spiral
    #[arg(long, default_value_t = 120)]
    samples: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    let fallback = args
        .fallback
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.interaction.fallback_file));

    let viewport = Viewport::new(args.width, args.height);
    let mut session = Session::new(&config)?;
    session.resize(viewport);

    let report = session.load_fallback_file(&fallback);
    println!(
        "Fallback {}: {} points loaded, {} skipped",
        fallback.display(),
        report.loaded,
        report.skipped
    );

    let mut bridge = HeadlessBridge::default();
    let mut now = 0.0;

    // Orbit: drag from the centre towards the lower right
    let (x, y) = viewport.to_ndc(args.width / 2.0, args.height / 2.0);
    session.handle_event(InputEvent::PointerMoved { x, y });
    session.handle_event(InputEvent::PointerButton { pressed: true });
    for step in 1..=30 {
        let px = args.width / 2.0 + step as f64 * 4.0;
        let py = args.height / 2.0 + step as f64 * 2.0;
        let (x, y) = viewport.to_ndc(px, py);
        session.handle_event(InputEvent::PointerMoved { x, y });
        render(&mut session, &mut bridge, &mut now)?;
    }
    session.handle_event(InputEvent::PointerButton { pressed: false });

    // Record a spiral on a fresh canvas
    session.execute(Command::Clear);
    session.handle_event(InputEvent::Key('r'));
    for i in 0..args.samples {
        let t = i as f64 / args.samples.max(1) as f64;
        let angle = t * std::f64::consts::TAU * 3.0;
        let radius = 0.1 + 0.6 * t;
        session.handle_event(InputEvent::DepthChanged(0.9 + 0.09 * t));
        session.handle_event(InputEvent::PointerMoved {
            x: radius * angle.cos(),
            y: radius * angle.sin(),
        });
        render(&mut session, &mut bridge, &mut now)?;
    }
    session.handle_event(InputEvent::Key('r'));

    // Zoom out and idle long enough for telemetry to report
    session.handle_event(InputEvent::Wheel { delta_y: 300.0 });
    for _ in 0..90 {
        render(&mut session, &mut bridge, &mut now)?;
    }

    if let Some(effect) = session.handle_event(InputEvent::Key('s')).effect {
        let path = effect.write_to(&args.out)?;
        println!("Saved {} points to {}", session.store().len(), path.display());
    }

    println!(
        "Presented {} frames; camera radius {:.2}, brush '{}'",
        bridge.frames_presented,
        session.camera().radius(),
        session.renderer_name()
    );
    Ok(())
}

fn render(session: &mut Session, bridge: &mut HeadlessBridge, now: &mut f64) -> Result<()> {
    if let Some(sample) = session.frame(*now, bridge)? {
        println!("{sample}");
    }
    *now += FRAME_MS;
    Ok(())
}
