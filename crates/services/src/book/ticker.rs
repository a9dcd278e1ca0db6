use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Publishes the remaining cooldown once per period until it reaches zero.
///
/// The task stops itself at zero and is aborted when the ticker is dropped,
/// so a cancelled book never leaves a recurring callback behind.
#[derive(Debug)]
pub struct CooldownTicker {
    handle: JoinHandle<()>,
    rx: watch::Receiver<Duration>,
}

impl CooldownTicker {
    /// Start ticking. Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(remaining: Duration, period: Duration) -> Self {
        let (tx, rx) = watch::channel(remaining);
        let deadline = Instant::now() + remaining;
        let period = period.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            if remaining.is_zero() {
                return;
            }
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let left = deadline.saturating_duration_since(Instant::now());
                if tx.send(left).is_err() || left.is_zero() {
                    break;
                }
            }
        });

        Self { handle, rx }
    }

    /// A receiver that observes every published remaining duration.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Duration> {
        self.rx.clone()
    }

    #[must_use]
    pub fn remaining(&self) -> Duration {
        *self.rx.borrow()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for CooldownTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
