// THEORY:
// The `stabilizer` is the memory of the engine. Raw zone detections flicker:
// lighting changes and compression noise make a zone vanish for a frame, or
// conjure a phantom one. Instead of tracking zones with identities, the
// stabilizer keeps a short window of "what did each tick see" and votes.
//
// Key architectural principles:
// 1.  **Bounded History**: `ZoneHistoryWindow` is a FIFO of per-tick rectangle
//     sets with a fixed capacity N. Appending beyond N evicts the oldest tick, so
//     the window never grows past N.
// 2.  **K-of-N Voting**: Once the window is full, a rectangle in slot `i` earns
//     one vote for itself plus one for every *other* slot holding at least one
//     similar rectangle (per-field tolerance). Rectangles with at least K votes
//     are stable in slot `i`.
// 3.  **Fixed Lag**: The rectangles fed to the intersection test come from one
//     chosen slot. The reference choice is the oldest slot, which means a zone
//     must survive the whole window before it can trigger anything. The newest
//     slot's stable subset is exposed separately for display.
// 4.  **Pass-Through While Filling**: Until the window is full there is not
//     enough history to vote, so the current tick's raw rectangles are used as-is.

use crate::config::TriggerSlot;
use crate::core_modules::geometry::{DetectedRect, similar};
use std::collections::VecDeque;
use tracing::trace;

/// Fixed-capacity FIFO of per-tick zone sets, oldest first.
#[derive(Debug, Clone)]
pub struct ZoneHistoryWindow {
    capacity: usize,
    slots: VecDeque<Vec<DetectedRect>>,
}

impl ZoneHistoryWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, rects: Vec<DetectedRect>) {
        self.slots.push_back(rects);
        while self.slots.len() > self.capacity {
            self.slots.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    /// Slot `0` is the oldest retained tick.
    pub fn slot(&self, index: usize) -> Option<&[DetectedRect]> {
        self.slots.get(index).map(Vec::as_slice)
    }

    pub fn newest(&self) -> Option<&[DetectedRect]> {
        self.slots.back().map(Vec::as_slice)
    }
}

/// The stabilizer's decision for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StabilityVerdict {
    /// Zones handed to the intersection test (the lagged slot's stable subset).
    pub trigger_zones: Vec<DetectedRect>,
    /// Stable subset of the newest slot. Presentation only.
    pub newest_stable: Vec<DetectedRect>,
    /// False while the window is still filling and rectangles pass through raw.
    pub window_full: bool,
}

pub struct TemporalStabilizer {
    window: ZoneHistoryWindow,
    stable_min_count: usize,
    tolerance: i32,
    trigger_slot: TriggerSlot,
}

impl TemporalStabilizer {
    pub fn new(history_length: usize, stable_min_count: usize, tolerance: i32, trigger_slot: TriggerSlot) -> Self {
        Self {
            window: ZoneHistoryWindow::new(history_length),
            stable_min_count,
            tolerance,
            trigger_slot,
        }
    }

    pub fn window(&self) -> &ZoneHistoryWindow {
        &self.window
    }

    /// Appends this tick's detections and classifies the window.
    pub fn observe(&mut self, rects: Vec<DetectedRect>) -> StabilityVerdict {
        self.window.push(rects);

        if !self.window.is_full() {
            let current = self.window.newest().map(<[_]>::to_vec).unwrap_or_default();
            return StabilityVerdict {
                trigger_zones: current.clone(),
                newest_stable: current,
                window_full: false,
            };
        }

        let newest_index = self.window.len() - 1;
        let trigger_index = match self.trigger_slot {
            TriggerSlot::Oldest => 0,
            TriggerSlot::FramesAgo(n) => newest_index.saturating_sub(n),
        };

        let trigger_zones = self.stable_subset(trigger_index);
        let newest_stable = self.stable_subset(newest_index);
        trace!(
            trigger_slot = trigger_index,
            trigger = trigger_zones.len(),
            newest = newest_stable.len(),
            "zone stability evaluated"
        );

        StabilityVerdict {
            trigger_zones,
            newest_stable,
            window_full: true,
        }
    }

    /// Rectangles of slot `index` that gather at least the threshold of votes.
    pub fn stable_subset(&self, index: usize) -> Vec<DetectedRect> {
        let Some(slot) = self.window.slot(index) else {
            return Vec::new();
        };
        slot.iter()
            .filter(|rect| self.votes(index, rect) >= self.stable_min_count)
            .copied()
            .collect()
    }

    /// Stable subsets for every slot, oldest first.
    pub fn stable_subsets(&self) -> Vec<Vec<DetectedRect>> {
        (0..self.window.len()).map(|i| self.stable_subset(i)).collect()
    }

    /// One vote for `rect` itself plus one for each other slot holding a similar rectangle.
    fn votes(&self, index: usize, rect: &DetectedRect) -> usize {
        let others = (0..self.window.len())
            .filter(|&j| j != index)
            .filter_map(|j| self.window.slot(j))
            .filter(|slot| slot.iter().any(|other| similar(rect, other, self.tolerance)))
            .count();
        1 + others
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONE: DetectedRect = DetectedRect::new(100, 100, 20, 20);

    fn reference() -> TemporalStabilizer {
        TemporalStabilizer::new(10, 7, 15, TriggerSlot::Oldest)
    }

    #[test]
    fn window_never_exceeds_capacity() {
        let mut window = ZoneHistoryWindow::new(3);
        for i in 0..10 {
            window.push(vec![DetectedRect::new(i, 0, 1, 1)]);
            assert!(window.len() <= 3);
        }
        assert_eq!(window.slot(0), Some(&[DetectedRect::new(7, 0, 1, 1)][..]));
        assert_eq!(window.newest(), Some(&[DetectedRect::new(9, 0, 1, 1)][..]));
    }

    #[test]
    fn zone_present_in_every_tick_is_stable() {
        let mut stabilizer = reference();
        let mut verdict = StabilityVerdict::default();
        for _ in 0..10 {
            verdict = stabilizer.observe(vec![ZONE]);
        }
        assert!(verdict.window_full);
        assert_eq!(verdict.trigger_zones, vec![ZONE]);
        assert_eq!(verdict.newest_stable, vec![ZONE]);
    }

    #[test]
    fn zone_present_in_half_the_ticks_is_not_stable() {
        let mut stabilizer = reference();
        let mut verdict = StabilityVerdict::default();
        for tick in 0..10 {
            let rects = if tick % 2 == 0 { vec![ZONE] } else { Vec::new() };
            verdict = stabilizer.observe(rects);
        }
        assert!(verdict.window_full);
        assert!(verdict.trigger_zones.is_empty());
        assert!(stabilizer.stable_subsets().iter().all(Vec::is_empty));
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut stabilizer = reference();
        // Seven of ten ticks, counting itself: exactly the threshold.
        for tick in 0..10 {
            let rects = if tick < 7 { vec![ZONE] } else { Vec::new() };
            stabilizer.observe(rects);
        }
        assert_eq!(stabilizer.stable_subset(0), vec![ZONE]);

        let mut stabilizer = reference();
        for tick in 0..10 {
            let rects = if tick < 6 { vec![ZONE] } else { Vec::new() };
            stabilizer.observe(rects);
        }
        assert!(stabilizer.stable_subset(0).is_empty());
    }

    #[test]
    fn jitter_within_tolerance_still_votes() {
        let mut stabilizer = reference();
        let mut verdict = StabilityVerdict::default();
        for tick in 0..10 {
            let jitter = (tick % 3) * 4;
            verdict = stabilizer.observe(vec![DetectedRect::new(100 + jitter, 100 - jitter, 20 + jitter, 20)]);
        }
        assert_eq!(verdict.trigger_zones, vec![DetectedRect::new(100, 100, 20, 20)]);
    }

    #[test]
    fn passes_raw_rects_through_while_filling() {
        let mut stabilizer = reference();
        for tick in 0..9 {
            let rects = vec![DetectedRect::new(tick, 0, 10, 10)];
            let verdict = stabilizer.observe(rects.clone());
            assert!(!verdict.window_full);
            assert_eq!(verdict.trigger_zones, rects);
            assert_eq!(verdict.newest_stable, rects);
        }
    }

    #[test]
    fn trigger_zones_come_from_the_oldest_slot() {
        let mut stabilizer = reference();
        let far = DetectedRect::new(400, 50, 30, 30);
        // The first slot alone holds an extra zone that never repeats.
        stabilizer.observe(vec![ZONE, far]);
        for _ in 0..9 {
            stabilizer.observe(vec![ZONE]);
        }
        // Only slot 0 is inspected for the trigger, so a stable zone that only
        // exists in newer slots would not count yet. Shift the window by one
        // and add a zone that appears in the newest seven slots.
        let late = DetectedRect::new(250, 250, 12, 12);
        let mut verdict = StabilityVerdict::default();
        for _ in 0..7 {
            verdict = stabilizer.observe(vec![ZONE, late]);
        }
        assert!(verdict.newest_stable.contains(&late));
        assert!(!verdict.trigger_zones.contains(&late));
        assert!(verdict.trigger_zones.contains(&ZONE));
        assert!(!verdict.trigger_zones.contains(&far));
    }

    #[test]
    fn zone_reaches_trigger_only_after_full_lag() {
        let mut stabilizer = reference();
        for _ in 0..10 {
            stabilizer.observe(Vec::new());
        }
        let mut first_trigger = None;
        for tick in 0..30 {
            let verdict = stabilizer.observe(vec![ZONE]);
            if first_trigger.is_none() && !verdict.trigger_zones.is_empty() {
                first_trigger = Some(tick);
            }
        }
        // The zone must occupy the oldest slot, i.e. the whole window.
        assert_eq!(first_trigger, Some(9));
    }

    #[test]
    fn frames_ago_selects_a_shorter_lag() {
        let mut stabilizer = TemporalStabilizer::new(10, 7, 15, TriggerSlot::FramesAgo(0));
        for _ in 0..10 {
            stabilizer.observe(Vec::new());
        }
        let mut first_trigger = None;
        for tick in 0..30 {
            let verdict = stabilizer.observe(vec![ZONE]);
            if first_trigger.is_none() && !verdict.trigger_zones.is_empty() {
                first_trigger = Some(tick);
            }
        }
        assert_eq!(first_trigger, Some(6));
    }
}
