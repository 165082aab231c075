// THEORY:
// This file is the main entry point for the `zone_trigger` library crate.
// It exposes the engine that watches a live video feed, finds a colored cursor
// and gray target zones in every frame, keeps only the zones that have held
// still for a while, and fires a cooldown-gated action whenever the cursor
// touches one of them.
//
// The public surface is intentionally small:
// - `config::PipelineConfig`: every tunable, loadable from YAML.
// - `pipeline::ZonePipeline`: one frame in, one `FrameAnalysis` out.
// - `orchestrator::Orchestrator`: the tick loop that owns the action state and
//   talks to the outside world through the traits in `core_modules::interfaces`.
// - `core_modules::frame_source::FrameSource`: the acquisition thread feeding
//   the latest-frame slot.
//
// Everything else under `core_modules` is the machinery behind these.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod orchestrator;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{Result, TriggerError};
