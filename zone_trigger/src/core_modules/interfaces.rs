// THEORY:
// The engine reaches the outside world through a handful of narrow seams. Each
// one is a trait so the orchestrator can be driven by real devices in the
// runner binary and by scripted fakes in tests.
//
// - `HotkeyPoller`: instantaneous samples of "is the toggle key held" and "is
//   the exit combination held". Polled, never event-driven.
// - `ActionEmitter`: inject one press of the designated key. Fire-and-forget.
// - `StateNotifier`: an audible (or otherwise perceptible) cue on toggle.
//   Best-effort: a failure is logged and otherwise ignored.
// - `TickObserver`: receives each processed frame with its analysis, for the
//   preview window. Purely presentational.

use crate::core_modules::action_trigger::{ActionState, TriggerOutcome};
use crate::core_modules::frame::Frame;
use crate::pipeline::FrameAnalysis;

pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

pub trait HotkeyPoller {
    fn toggle_held(&mut self) -> bool;
    fn exit_held(&mut self) -> bool;
}

pub trait ActionEmitter {
    fn press(&mut self) -> Result<(), CollaboratorError>;
}

pub trait StateNotifier {
    fn notify(&mut self, enabled: bool) -> Result<(), CollaboratorError>;
}

pub trait TickObserver {
    fn on_tick(&mut self, frame: &Frame, analysis: &FrameAnalysis, state: &ActionState, outcome: TriggerOutcome);
}

/// A notifier for setups without any cue device.
pub struct SilentNotifier;

impl StateNotifier for SilentNotifier {
    fn notify(&mut self, _enabled: bool) -> Result<(), CollaboratorError> {
        Ok(())
    }
}
