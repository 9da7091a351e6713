//! Reconciliation timer that only exists while it is wanted

use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::debug;

#[derive(Default)]
pub struct PollTimer {
    interval: Option<Interval>,
}

impl PollTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or stop the timer to match `wanted`
    ///
    /// A running timer is left alone, so calling this after every command
    /// does not push the next tick back.
    pub fn sync(&mut self, wanted: bool, period: Duration) {
        match (wanted, self.interval.is_some()) {
            (true, false) => {
                debug!("Starting reconcile timer ({:?})", period);
                let mut interval = time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.interval = Some(interval);
            }
            (false, true) => {
                debug!("Stopping reconcile timer");
                self.interval = None;
            }
            _ => {}
        }
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next tick; never completes while stopped
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let mut timer = PollTimer::new();
        timer.sync(true, Duration::from_secs(1));

        let start = Instant::now();
        timer.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        timer.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_timer_never_fires() {
        let mut timer = PollTimer::new();
        timer.sync(true, Duration::from_secs(1));
        timer.sync(false, Duration::from_secs(1));
        assert!(!timer.is_running());

        let fired = time::timeout(Duration::from_secs(10), timer.tick()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn resync_keeps_schedule() {
        let mut timer = PollTimer::new();
        timer.sync(true, Duration::from_secs(1));
        let start = Instant::now();

        time::advance(Duration::from_millis(600)).await;
        timer.sync(true, Duration::from_secs(1));
        timer.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }
}
