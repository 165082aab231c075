// THEORY:
// The `action_trigger` turns a stream of per-tick hit/no-hit answers into at
// most one action per cooldown interval. It is a tiny state machine whose whole
// state lives in `ActionState`, a value owned by the orchestrator and lent to
// the trigger for each evaluation. Nothing else ever writes to it.
//
// States:
// - `Disabled`: toggled off from outside. Hits are ignored.
// - `Armed`: the next hit fires, stamps `last_fire`, and moves to `Cooling`.
// - `Cooling`: hits keep being evaluated but firing is suppressed until the
//   cooldown has elapsed since `last_fire`; then the trigger is `Armed` again.
//
// The phase is derived from the state and the current time rather than stored,
// so "returning to Armed" happens lazily the first time it matters. A hit that
// stays true forever fires at t = 0, c, 2c, ... (bounded by tick granularity),
// and suppressed hits are never replayed later.

use std::time::{Duration, Instant};
use tracing::debug;

/// The only mutable state shared by the toggle handler and the trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionState {
    pub enabled: bool,
    pub last_fire: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPhase {
    Disabled,
    Armed,
    Cooling,
}

/// What the trigger decided for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Disabled,
    NoHit,
    /// A hit arrived inside the cooldown window and was dropped.
    CoolingDown,
    Fired,
}

pub struct ActionTrigger {
    cooldown: Duration,
}

impl ActionTrigger {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn phase(&self, state: &ActionState, now: Instant) -> TriggerPhase {
        if !state.enabled {
            return TriggerPhase::Disabled;
        }
        match state.last_fire {
            Some(last) if now.saturating_duration_since(last) < self.cooldown => TriggerPhase::Cooling,
            _ => TriggerPhase::Armed,
        }
    }

    /// Evaluates one tick. Stamps `last_fire` only when the action fires.
    pub fn evaluate(&self, state: &mut ActionState, hit: bool, now: Instant) -> TriggerOutcome {
        match (self.phase(state, now), hit) {
            (TriggerPhase::Disabled, _) => TriggerOutcome::Disabled,
            (_, false) => TriggerOutcome::NoHit,
            (TriggerPhase::Cooling, true) => TriggerOutcome::CoolingDown,
            (TriggerPhase::Armed, true) => {
                state.last_fire = Some(now);
                debug!("action armed and hit, firing");
                TriggerOutcome::Fired
            }
        }
    }
}
