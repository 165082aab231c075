// The live runner: wires the zone_trigger engine to a camera, the keyboard, a
// key injector, toggle sounds, and an optional preview window.

mod camera;
mod emitter;
mod hotkeys;
mod notifier;
mod preview;

use anyhow::{Context, Result};
use camera::CameraGrabber;
use clap::Parser;
use emitter::KeyPresser;
use enigo::Key;
use hotkeys::KeyboardHotkeys;
use notifier::SoundNotifier;
use preview::PreviewWindow;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zone_trigger::PipelineConfig;
use zone_trigger::core_modules::frame_slot::FrameSlot;
use zone_trigger::core_modules::frame_source::FrameSource;
use zone_trigger::core_modules::interfaces::{SilentNotifier, StateNotifier};
use zone_trigger::orchestrator::Orchestrator;

#[derive(Parser, Debug)]
#[command(version, about = "Presses a key whenever the cursor touches a stable target zone")]
struct Args {
    /// YAML file overriding the built-in pipeline settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera device index.
    #[arg(long, default_value_t = 0)]
    camera: i32,

    /// Key to press on a hit: a name like `space` or `enter`, or a single character.
    #[arg(long, default_value = "space", value_parser = emitter::parse_key)]
    key: Key,

    /// Show the annotated preview window.
    #[arg(long)]
    preview: bool,

    /// Directory holding `on.wav` and `off.wav`.
    #[arg(long, default_value = "./sounds")]
    sounds: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("live_trigger=info,zone_trigger=info")),
        )
        .init();

    // --- 1. Argument Parsing & Configuration ---
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    // --- 2. Device Initialization ---
    let grabber = CameraGrabber::open(args.camera, config.capture_width, config.capture_height)?;
    let emitter = KeyPresser::new(args.key)?;
    let notifier: Box<dyn StateNotifier> = match SoundNotifier::load(&args.sounds) {
        Ok(sounds) => Box::new(sounds),
        Err(err) => {
            warn!("toggle sounds unavailable, continuing without them: {err:#}");
            Box::new(SilentNotifier)
        }
    };

    // --- 3. Frame Acquisition ---
    let slot = Arc::new(FrameSlot::new());
    let stop = Arc::new(AtomicBool::new(false));
    let source = FrameSource::spawn(grabber, Arc::clone(&slot), Arc::clone(&stop))
        .context("failed to start the acquisition thread")?;

    // --- 4. Tick Loop ---
    let mut orchestrator = Orchestrator::new(
        &config,
        slot,
        stop,
        Box::new(KeyboardHotkeys::new()),
        Box::new(emitter),
        notifier,
    );
    if args.preview {
        orchestrator = orchestrator.with_observer(Box::new(PreviewWindow::open(config.cursor_radius)?));
    }

    println!("Zone Trigger - Live Runner");
    println!(
        "Press {} to toggle the trigger (starts off), {} to exit.",
        hotkeys::TOGGLE_HINT,
        hotkeys::EXIT_HINT
    );

    let stats = orchestrator.run().await;

    // --- 5. Shutdown ---
    let failed_reads = source.shutdown();
    info!(
        ticks = stats.ticks,
        fired = stats.fired,
        rejected = stats.rejected,
        failed_reads,
        "shut down"
    );
    println!("Exiting.");
    Ok(())
}
