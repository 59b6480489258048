//! Lockout countdown scheduler
//!
//! [`Countdown`] is the pure recompute step; [`CountdownHandle`] drives it on
//! a Tokio task until the deadline passes. Dropping the handle cancels the
//! task, so an owner holding at most one `Option<CountdownHandle>` can never
//! leak a timer.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Result of one countdown step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Whole seconds left; only reported when the value changes
    Remaining(u64),
    /// Same whole-second value as the last report
    Unchanged,
    /// The deadline has passed
    Expired,
}

/// Tracks the seconds-remaining value shown for a lockout deadline
#[derive(Clone, Debug)]
pub struct Countdown {
    deadline: Instant,
    shown: Option<u64>,
}

impl Countdown {
    /// Start counting down to `deadline`
    pub fn new(deadline: Instant) -> Self {
        Self {
            deadline,
            shown: None,
        }
    }

    /// Recompute the remaining time at `now`
    pub fn tick(&mut self, now: Instant) -> Tick {
        let remaining = self.deadline.saturating_duration_since(now);
        if remaining.is_zero() {
            return Tick::Expired;
        }

        let secs = ceil_seconds(remaining);
        if self.shown == Some(secs) {
            Tick::Unchanged
        } else {
            self.shown = Some(secs);
            Tick::Remaining(secs)
        }
    }
}

/// Round a duration up to whole seconds
pub fn ceil_seconds(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

/// A running countdown task, aborted on drop
#[derive(Debug)]
pub struct CountdownHandle {
    deadline: Instant,
    task: JoinHandle<()>,
}

impl CountdownHandle {
    /// Spawn a countdown to `deadline`, waking every `period`
    ///
    /// `notify` receives every [`Tick::Remaining`] and the final
    /// [`Tick::Expired`]. Returning `false` from it stops the task early.
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(deadline: Instant, period: Duration, mut notify: F) -> Self
    where
        F: FnMut(Tick) -> bool + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut countdown = Countdown::new(deadline);
            loop {
                match countdown.tick(Instant::now()) {
                    Tick::Unchanged => {}
                    Tick::Expired => {
                        notify(Tick::Expired);
                        break;
                    }
                    tick @ Tick::Remaining(_) => {
                        if !notify(tick) {
                            break;
                        }
                    }
                }

                let next = (Instant::now() + period).min(deadline);
                tokio::time::sleep_until(next).await;
            }
            tracing::trace!("Countdown task finished");
        });

        Self { deadline, task }
    }

    /// The deadline this task counts down to
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Whether the task has stopped
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_ceil_seconds() {
        assert_eq!(ceil_seconds(Duration::ZERO), 0);
        assert_eq!(ceil_seconds(Duration::from_millis(1)), 1);
        assert_eq!(ceil_seconds(Duration::from_millis(1000)), 1);
        assert_eq!(ceil_seconds(Duration::from_millis(29_001)), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_reports_only_changes() {
        let start = Instant::now();
        let mut countdown = Countdown::new(start + Duration::from_secs(3));

        assert_eq!(countdown.tick(start), Tick::Remaining(3));
        assert_eq!(countdown.tick(start + Duration::from_millis(100)), Tick::Unchanged);
        assert_eq!(countdown.tick(start + Duration::from_millis(1_500)), Tick::Remaining(2));
        assert_eq!(countdown.tick(start + Duration::from_secs(3)), Tick::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_counts_down_and_expires() {
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&ticks);
        let deadline = Instant::now() + Duration::from_secs(3);

        let handle = CountdownHandle::spawn(deadline, Duration::from_millis(100), move |tick| {
            sink.lock().unwrap().push(tick);
            true
        });

        tokio::time::sleep(Duration::from_secs(4)).await;

        assert!(handle.is_finished());
        assert_eq!(
            *ticks.lock().unwrap(),
            vec![
                Tick::Remaining(3),
                Tick::Remaining(2),
                Tick::Remaining(1),
                Tick::Expired
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_task() {
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&ticks);
        let deadline = Instant::now() + Duration::from_secs(3);

        let handle = CountdownHandle::spawn(deadline, Duration::from_millis(100), move |tick| {
            sink.lock().unwrap().push(tick);
            true
        });
        tokio::time::sleep(Duration::from_millis(500)).await;
        drop(handle);
        tokio::time::sleep(Duration::from_secs(5)).await;

        let ticks = ticks.lock().unwrap();
        assert!(!ticks.contains(&Tick::Expired));
    }
}
