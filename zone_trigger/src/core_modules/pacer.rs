// THEORY:
// The `TickPacer` is a soft rate cap for the tick loop. Each tick has a fixed
// time budget; if the work finished early, the pacer sleeps away the rest of the
// budget, measured on the monotonic clock from the start of the tick. If the
// work overran, it does not sleep at all and does not try to catch up later.
// The sleep itself is never assumed to be exact.

use std::time::Duration;
use tokio::time::Instant;

pub struct TickPacer {
    period: Duration,
    tick_start: Instant,
    overruns: u64,
}

impl TickPacer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            tick_start: Instant::now(),
            overruns: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks whose work took longer than the period.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Budget left in the current tick at `now`, or `None` if it is spent.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.tick_start);
        self.period.checked_sub(elapsed).filter(|left| !left.is_zero())
    }

    /// Starts a fresh budget now, discarding time spent outside the tick.
    pub fn restart(&mut self) {
        self.tick_start = Instant::now();
    }

    /// Sleeps for whatever is left of the budget, then starts the next tick.
    pub async fn pace(&mut self) {
        match self.remaining(Instant::now()) {
            Some(left) => tokio::time::sleep(left).await,
            None => self.overruns += 1,
        }
        self.tick_start = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sleeps_only_the_remainder() {
        let mut pacer = TickPacer::new(Duration::from_millis(10));
        let start = Instant::now();

        tokio::time::advance(Duration::from_millis(3)).await;
        pacer.pace().await;

        assert_eq!(start.elapsed(), Duration::from_millis(10));
        assert_eq!(pacer.overruns(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn overrun_does_not_sleep_or_catch_up() {
        let mut pacer = TickPacer::new(Duration::from_millis(10));
        let start = Instant::now();

        tokio::time::advance(Duration::from_millis(25)).await;
        pacer.pace().await;
        assert_eq!(start.elapsed(), Duration::from_millis(25));
        assert_eq!(pacer.overruns(), 1);

        // The next tick gets a full, fresh budget.
        pacer.pace().await;
        assert_eq!(start.elapsed(), Duration::from_millis(35));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_discards_time_spent_between_ticks() {
        let mut pacer = TickPacer::new(Duration::from_millis(10));
        tokio::time::advance(Duration::from_millis(300)).await;
        pacer.restart();

        let start = Instant::now();
        pacer.pace().await;
        assert_eq!(start.elapsed(), Duration::from_millis(10));
        assert_eq!(pacer.overruns(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_shrinks_with_elapsed_time() {
        let pacer = TickPacer::new(Duration::from_millis(10));
        let now = Instant::now();
        assert_eq!(pacer.remaining(now), Some(Duration::from_millis(10)));
        assert_eq!(pacer.remaining(now + Duration::from_millis(4)), Some(Duration::from_millis(6)));
        assert_eq!(pacer.remaining(now + Duration::from_millis(10)), None);
    }
}
