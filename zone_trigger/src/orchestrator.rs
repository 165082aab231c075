// THEORY:
// The `Orchestrator` is the single-threaded cooperative loop that drives the
// engine. It is the only owner of `ActionState`, the only caller of the
// pipeline, and the only place where the outside world (hotkeys, the action
// emitter, the notifier, the preview) is touched. The acquisition thread is its
// one concurrent partner, and the two meet only at the `FrameSlot`.
//
// One loop iteration:
// 1.  Poll the exit combination. On exit, raise the shared stop flag so the
//     acquisition thread winds down too, and leave the loop.
// 2.  Poll the toggle key. On toggle, flip `enabled`, emit the cue, and sleep a
//     fixed debounce so a held key does not toggle again on the next iteration.
// 3.  Tick: take the latest frame, run the pipeline, and let the trigger
//     decide whether to fire. A tick is skipped if nothing was ever published
//     or if the latest frame was already seen: each captured frame enters the
//     zone history at most once, so the history always spans N distinct frames.
// 4.  Pace: sleep the rest of the tick budget, if any. The debounce sleep is
//     not charged to the tick budget.
//
// Failures of the notifier or the emitter are logged and never change state.

use crate::config::PipelineConfig;
use crate::core_modules::action_trigger::{ActionState, ActionTrigger, TriggerOutcome};
use crate::core_modules::frame_slot::FrameSlot;
use crate::core_modules::interfaces::{ActionEmitter, HotkeyPoller, StateNotifier, TickObserver};
use crate::core_modules::pacer::TickPacer;
use crate::pipeline::{FrameAnalysis, ZonePipeline};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickReport {
    /// Nothing has been published yet.
    NoFrame,
    /// The latest frame was already handled on an earlier tick.
    Stale { seq: u64 },
    /// The frame had an unexpected layout and was dropped.
    Rejected { seq: u64 },
    Processed {
        seq: u64,
        analysis: FrameAnalysis,
        outcome: TriggerOutcome,
    },
}

/// Counters accumulated over the lifetime of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub processed: u64,
    pub stale: u64,
    pub rejected: u64,
    pub fired: u64,
    pub toggles: u64,
    /// Ticks whose work outran the tick period.
    pub overruns: u64,
}

pub struct Orchestrator {
    slot: Arc<FrameSlot>,
    stop: Arc<AtomicBool>,
    pipeline: ZonePipeline,
    trigger: ActionTrigger,
    state: ActionState,
    last_seq: Option<u64>,
    hotkeys: Box<dyn HotkeyPoller>,
    emitter: Box<dyn ActionEmitter>,
    notifier: Box<dyn StateNotifier>,
    observer: Option<Box<dyn TickObserver>>,
    tick_period: Duration,
    toggle_debounce: Duration,
    stats: LoopStats,
}

impl Orchestrator {
    /// The trigger starts disabled, as after a fresh launch.
    pub fn new(
        config: &PipelineConfig,
        slot: Arc<FrameSlot>,
        stop: Arc<AtomicBool>,
        hotkeys: Box<dyn HotkeyPoller>,
        emitter: Box<dyn ActionEmitter>,
        notifier: Box<dyn StateNotifier>,
    ) -> Self {
        Self {
            slot,
            stop,
            pipeline: ZonePipeline::new(config),
            trigger: ActionTrigger::new(config.cooldown()),
            state: ActionState::default(),
            last_seq: None,
            hotkeys,
            emitter,
            notifier,
            observer: None,
            tick_period: config.tick_period(),
            toggle_debounce: config.toggle_debounce(),
            stats: LoopStats::default(),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn TickObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn state(&self) -> &ActionState {
        &self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Flips the enabled flag and emits the cue. Returns the new flag.
    pub fn toggle(&mut self) -> bool {
        self.state.enabled = !self.state.enabled;
        self.stats.toggles += 1;
        let enabled = self.state.enabled;
        info!(enabled, "trigger switched {}", if enabled { "on" } else { "off" });

        if let Err(err) = self.notifier.notify(enabled) {
            warn!(%err, "toggle cue failed");
        }
        enabled
    }

    /// Runs one pipeline tick against the latest published frame.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        self.stats.ticks += 1;

        let Some(frame) = self.slot.latest() else {
            return TickReport::NoFrame;
        };
        let seq = frame.seq();
        if self.last_seq == Some(seq) {
            self.stats.stale += 1;
            return TickReport::Stale { seq };
        }
        // Marked before processing so a malformed frame is rejected only once.
        self.last_seq = Some(seq);

        let analysis = match self.pipeline.process(&frame) {
            Ok(analysis) => analysis,
            Err(err) => {
                self.stats.rejected += 1;
                warn!(seq, %err, "dropping frame");
                return TickReport::Rejected { seq };
            }
        };
        self.stats.processed += 1;

        let outcome = self.trigger.evaluate(&mut self.state, analysis.hit, now);
        if outcome == TriggerOutcome::Fired {
            self.stats.fired += 1;
            info!(seq, "zone hit, pressing");
            if let Err(err) = self.emitter.press() {
                warn!(%err, "action emitter failed");
            }
        }
        debug!(
            seq,
            cursors = analysis.detections.cursor_points.len(),
            zones = analysis.detections.zone_rects.len(),
            trigger_zones = analysis.stability.trigger_zones.len(),
            hit = analysis.hit,
            ?outcome,
            "tick"
        );

        if let Some(observer) = self.observer.as_mut() {
            observer.on_tick(&frame, &analysis, &self.state, outcome);
        }

        TickReport::Processed {
            seq,
            analysis,
            outcome,
        }
    }

    /// Drives the loop until the exit combination is held or the stop flag is raised.
    pub async fn run(&mut self) -> LoopStats {
        let mut pacer = TickPacer::new(self.tick_period);
        info!(period = ?self.tick_period, "tick loop started");

        loop {
            if self.stop.load(Ordering::Acquire) {
                info!("stop requested");
                break;
            }
            if self.hotkeys.exit_held() {
                info!("exit combination pressed");
                self.stop.store(true, Ordering::Release);
                break;
            }
            if self.hotkeys.toggle_held() {
                self.toggle();
                tokio::time::sleep(self.toggle_debounce).await;
                pacer.restart();
            }

            self.tick(tokio::time::Instant::now().into_std());
            pacer.pace().await;
        }
        self.stats.overruns = pacer.overruns();

        info!(
            ticks = self.stats.ticks,
            fired = self.stats.fired,
            stale = self.stats.stale,
            rejected = self.stats.rejected,
            overruns = self.stats.overruns,
            "tick loop finished"
        );
        self.stats
    }
}
