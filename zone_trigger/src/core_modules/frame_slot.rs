// THEORY:
// The `FrameSlot` is the single point of contact between the acquisition thread
// and the tick loop. It is a one-element mailbox with last-write-wins
// semantics: there is no queue and no back-pressure. The producer replaces
// whatever is there; the consumer takes a reference to whatever is there.
//
// The lock protects only the hand-off of an `Arc<Frame>`. No pixel processing
// ever happens while it is held, so neither side can stall the other for more
// than a pointer swap. Reading does not clear the slot, so a consumer that runs
// faster than the camera will see the same frame on consecutive ticks, and a
// producer that runs faster than the consumer silently overwrites frames nobody
// looked at.

use crate::core_modules::frame::Frame;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct SlotState {
    latest: Option<Arc<Frame>>,
    published: u64,
}

/// A lock-guarded single-frame hand-off shared by the producer and the consumer.
#[derive(Default)]
pub struct FrameSlot {
    state: Mutex<SlotState>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps the next capture sequence number on `frame` and makes it the latest.
    pub fn publish(&self, mut frame: Frame) {
        let mut state = self.lock();
        frame.set_seq(state.published);
        state.published += 1;
        state.latest = Some(Arc::new(frame));
    }

    /// The most recently published frame, or `None` if nothing was ever published.
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.lock().latest.clone()
    }

    /// How many frames have been published so far.
    pub fn published(&self) -> u64 {
        self.lock().published
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        // A panic on the other side of the hand-off leaves the slot itself intact.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(fill: u8) -> Frame {
        Frame::from_raw(2, 2, 3, vec![fill; 12])
    }

    #[test]
    fn empty_slot_has_no_frame() {
        let slot = FrameSlot::new();
        assert!(slot.latest().is_none());
        assert_eq!(slot.published(), 0);
    }

    #[test]
    fn last_write_wins() {
        let slot = FrameSlot::new();
        slot.publish(frame(1));
        slot.publish(frame(2));
        slot.publish(frame(3));

        let latest = slot.latest().unwrap();
        assert_eq!(latest.data()[0], 3);
        assert_eq!(latest.seq(), 2);
        assert_eq!(slot.published(), 3);
    }

    #[test]
    fn reading_does_not_consume() {
        let slot = FrameSlot::new();
        slot.publish(frame(7));
        let first = slot.latest().unwrap();
        let second = slot.latest().unwrap();
        assert_eq!(first.seq(), second.seq());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn held_frame_survives_overwrite() {
        let slot = FrameSlot::new();
        slot.publish(frame(1));
        let held = slot.latest().unwrap();
        slot.publish(frame(2));
        assert_eq!(held.data()[0], 1);
        assert_eq!(slot.latest().unwrap().data()[0], 2);
    }

    #[test]
    fn concurrent_publishers_never_duplicate_sequence_numbers() {
        let slot = Arc::new(FrameSlot::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let slot = Arc::clone(&slot);
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        slot.publish(frame(0));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(slot.published(), 1000);
        assert_eq!(slot.latest().unwrap().seq(), 999);
    }
}
