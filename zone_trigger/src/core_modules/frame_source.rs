// THEORY:
// The `FrameSource` owns the capture device and runs an unbounded acquisition
// loop on its own OS thread. Every successful read is published to the shared
// `FrameSlot`; every failed read is dropped on the floor and retried on the next
// iteration. Nothing about a failed read ever reaches the tick loop, which only
// notices that no newer frame has appeared.
//
// Shutdown is cooperative. A shared `AtomicBool` is checked at the top of every
// iteration; once it is set the loop exits and the grabber (and with it the
// device handle) is dropped on the acquisition thread. An in-flight device read
// is never interrupted.

use crate::core_modules::frame::Frame;
use crate::core_modules::frame_slot::FrameSlot;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pause after a failed read so an unplugged device does not pin a core.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(1);

/// A device that can be asked for its next frame.
///
/// `grab` returns `None` for a transient failure (no frame ready, a dropped
/// packet, a decoder hiccup). It must not block indefinitely.
pub trait FrameGrabber: Send + 'static {
    fn grab(&mut self) -> Option<Frame>;
}

/// Handle to the running acquisition thread.
pub struct FrameSource {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<u64>>,
}

impl FrameSource {
    /// Starts the acquisition loop. `stop` is shared with the tick loop.
    pub fn spawn<G: FrameGrabber>(
        mut grabber: G,
        slot: Arc<FrameSlot>,
        stop: Arc<AtomicBool>,
    ) -> std::io::Result<Self> {
        let thread_stop = Arc::clone(&stop);
        let handle = std::thread::Builder::new()
            .name("frame-acquisition".into())
            .spawn(move || {
                info!("frame acquisition started");
                let mut failed_reads: u64 = 0;
                while !thread_stop.load(Ordering::Acquire) {
                    match grabber.grab() {
                        Some(frame) => slot.publish(frame),
                        None => {
                            failed_reads += 1;
                            debug!(failed_reads, "frame read failed, retrying");
                            std::thread::sleep(RETRY_BACKOFF);
                        }
                    }
                }
                drop(grabber);
                info!(published = slot.published(), failed_reads, "frame acquisition stopped");
                failed_reads
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Asks the acquisition loop to exit after its current read.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Stops the loop and waits for the device to be released.
    /// Returns the number of failed reads seen over the source's lifetime.
    pub fn shutdown(mut self) -> u64 {
        self.stop();
        self.join().unwrap_or(0)
    }

    fn join(&mut self) -> Option<u64> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(failed_reads) => Some(failed_reads),
            Err(_) => {
                warn!("frame acquisition thread panicked");
                None
            }
        }
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    /// Fails every other read and records when it is dropped.
    struct FlakyGrabber {
        reads: u64,
        released: Arc<AtomicBool>,
    }

    impl FrameGrabber for FlakyGrabber {
        fn grab(&mut self) -> Option<Frame> {
            self.reads += 1;
            if self.reads % 2 == 0 {
                return None;
            }
            std::thread::sleep(Duration::from_millis(1));
            Some(Frame::from_raw(1, 1, 3, vec![self.reads as u8; 3]))
        }
    }

    impl Drop for FlakyGrabber {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    struct DeadGrabber;

    impl FrameGrabber for DeadGrabber {
        fn grab(&mut self) -> Option<Frame> {
            None
        }
    }

    #[test]
    fn failed_reads_are_throttled() {
        let slot = Arc::new(FrameSlot::new());
        let stop = Arc::new(AtomicBool::new(false));
        let started = Instant::now();
        let source = FrameSource::spawn(DeadGrabber, Arc::clone(&slot), stop).unwrap();

        std::thread::sleep(Duration::from_millis(50));
        let failed_reads = source.shutdown();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        // At most one read per backoff interval, plus the read in flight at stop.
        assert!(failed_reads >= 1);
        assert!(failed_reads <= elapsed_ms + 1, "{failed_reads} reads in {elapsed_ms} ms");
        assert!(slot.latest().is_none());
    }

    fn wait_for(slot: &FrameSlot, count: u64) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while slot.published() < count {
            assert!(Instant::now() < deadline, "acquisition thread never published");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn publishes_frames_and_retries_failures() {
        let slot = Arc::new(FrameSlot::new());
        let stop = Arc::new(AtomicBool::new(false));
        let released = Arc::new(AtomicBool::new(false));
        let grabber = FlakyGrabber {
            reads: 0,
            released: Arc::clone(&released),
        };

        let source = FrameSource::spawn(grabber, Arc::clone(&slot), Arc::clone(&stop)).unwrap();
        wait_for(&slot, 3);

        let failed_reads = source.shutdown();
        assert!(failed_reads >= 2);
        assert!(stop.load(Ordering::SeqCst));
        assert!(released.load(Ordering::SeqCst), "device must be released on shutdown");
        assert!(slot.latest().is_some());
    }

    #[test]
    fn external_stop_flag_ends_the_loop() {
        let slot = Arc::new(FrameSlot::new());
        let stop = Arc::new(AtomicBool::new(false));
        let released = Arc::new(AtomicBool::new(false));
        let grabber = FlakyGrabber {
            reads: 0,
            released: Arc::clone(&released),
        };

        let source = FrameSource::spawn(grabber, Arc::clone(&slot), Arc::clone(&stop)).unwrap();
        wait_for(&slot, 1);
        stop.store(true, Ordering::SeqCst);
        assert!(source.is_stopped());
        drop(source);
        assert!(released.load(Ordering::SeqCst));

        let published = slot.published();
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(slot.published(), published, "no frames after shutdown");
    }
}
