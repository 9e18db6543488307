//! Live deadline countdown.
//!
//! The refresh loop recomputes the remaining time and urgency tier on a fixed interval
//! (default: once per second) and publishes each [`CountdownSnapshot`] on a `watch` channel.
//!
//! - All per-deadline state lives in a [`CountdownState`] owned by the caller; the loop takes it
//!   by value and hands it back when it stops.
//! - The [`Clock`] is read exactly once per tick and the value is passed into the pure
//!   [`CountdownState::tick`].
//! - Stopping is cooperative through a `CancellationToken`. Snapshots already published stay
//!   valid.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::models::Instant;
use crate::time::remaining;
use crate::urgency::{RemainingParts, UrgencyTier, classify};

/// Source of "now" for the refresh loop.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Utc::now()
    }
}

/// A settable clock with millisecond resolution. Clones share the same time.
#[derive(Debug, Clone)]
pub struct FixedClock {
    millis: Arc<AtomicI64>,
}

impl FixedClock {
    pub fn new(now: Instant) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(now.timestamp_millis())),
        }
    }

    pub fn set(&self, now: Instant) {
        self.millis.store(now.timestamp_millis(), Ordering::SeqCst);
    }

    /// Moves the clock by `by`, saturating at chrono's representable bounds.
    pub fn advance(&self, by: TimeDelta) {
        let next = self.now().checked_add_signed(by).unwrap_or(if by < TimeDelta::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });
        self.set(next);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Instant {
        // Only `set` writes the millis, always from a valid instant, so the epoch fallback is
        // never taken.
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct CountdownConfig {
    /// Interval between recomputations (default: 1 second).
    pub refresh: Duration,
    /// End the loop after publishing the first overdue snapshot (default: true).
    pub stop_when_overdue: bool,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            refresh: Duration::from_secs(1),
            stop_when_overdue: true,
        }
    }
}

impl From<&common::config::Config> for CountdownConfig {
    fn from(config: &common::config::Config) -> Self {
        Self {
            refresh: Duration::from_millis(config.countdown_refresh_ms),
            ..Self::default()
        }
    }
}

/// One recomputation of a deadline countdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountdownSnapshot {
    pub now: Instant,
    pub remaining: TimeDelta,
    pub parts: RemainingParts,
    pub tier: UrgencyTier,
    /// The tier differs from the previous snapshot (always true for the first one).
    pub tier_changed: bool,
}

/// Caller-owned countdown state for one deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownState {
    due: Instant,
    last: Option<CountdownSnapshot>,
    ticks: u64,
}

impl CountdownState {
    pub fn new(due: Instant) -> Self {
        Self {
            due,
            last: None,
            ticks: 0,
        }
    }

    pub fn due(&self) -> Instant {
        self.due
    }

    pub fn last(&self) -> Option<&CountdownSnapshot> {
        self.last.as_ref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Recomputes the countdown for `now` and remembers the result.
    pub fn tick(&mut self, now: Instant) -> CountdownSnapshot {
        let left = remaining(self.due, now);
        let tier = classify(left);
        let snapshot = CountdownSnapshot {
            now,
            remaining: left,
            parts: RemainingParts::from(left),
            tier,
            tier_changed: self.last.is_none_or(|prev| prev.tier != tier),
        };
        self.last = Some(snapshot);
        self.ticks += 1;
        snapshot
    }
}

/// Runs the refresh loop until cancelled, until every receiver is gone, or (when configured)
/// until the deadline passes. Returns the state so the caller keeps ownership of it.
pub async fn run_countdown<C: Clock>(
    mut state: CountdownState,
    clock: C,
    updates: watch::Sender<Option<CountdownSnapshot>>,
    config: CountdownConfig,
    cancel: CancellationToken,
) -> CountdownState {
    let mut ticker = interval(config.refresh);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    debug!(
        "countdown to {} started (refresh {} ms)",
        state.due,
        config.refresh.as_millis()
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("countdown to {} cancelled after {} ticks", state.due, state.ticks);
                break;
            }
            _ = ticker.tick() => {
                let snapshot = state.tick(clock.now());
                if snapshot.tier_changed {
                    info!("deadline {} is now {}", state.due, snapshot.tier);
                }
                if updates.send(Some(snapshot)).is_err() {
                    debug!("countdown to {} has no listeners, stopping", state.due);
                    break;
                }
                if config.stop_when_overdue && snapshot.tier == UrgencyTier::Overdue {
                    break;
                }
            }
        }
    }

    state
}

/// Handle to a spawned countdown loop.
pub struct CountdownHandle {
    pub updates: watch::Receiver<Option<CountdownSnapshot>>,
    cancel: CancellationToken,
    task: JoinHandle<CountdownState>,
}

impl CountdownHandle {
    /// Cancels the loop and waits for it to hand the state back.
    pub async fn stop(self) -> Result<CountdownState, JoinError> {
        self.cancel.cancel();
        self.task.await
    }

    /// Waits for the loop to end on its own (overdue or no listeners).
    pub async fn finished(self) -> Result<CountdownState, JoinError> {
        self.task.await
    }
}

/// Spawns [`run_countdown`] on the current runtime.
pub fn spawn_countdown<C: Clock + 'static>(
    state: CountdownState,
    clock: C,
    config: CountdownConfig,
) -> CountdownHandle {
    let cancel = CancellationToken::new();
    let (tx, rx) = watch::channel(None);
    let task = tokio::spawn(run_countdown(state, clock, tx, config, cancel.clone()));

    CountdownHandle {
        updates: rx,
        cancel,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn due() -> Instant {
        Utc.with_ymd_and_hms(2025, 4, 15, 23, 59, 59).unwrap()
    }

    #[test]
    fn test_tick_reports_tier_changes() {
        let mut state = CountdownState::new(due());

        let first = state.tick(due() - TimeDelta::hours(30));
        assert_eq!(first.tier, UrgencyTier::Urgent);
        assert!(first.tier_changed);
        assert_eq!(first.parts.days, 1);
        assert_eq!(first.parts.hours, 6);

        let second = state.tick(due() - TimeDelta::hours(29));
        assert_eq!(second.tier, UrgencyTier::Urgent);
        assert!(!second.tier_changed);

        let third = state.tick(due() - TimeDelta::hours(24));
        assert_eq!(third.tier, UrgencyTier::Critical);
        assert!(third.tier_changed);

        assert_eq!(state.ticks(), 3);
        assert_eq!(state.last(), Some(&third));
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(due());
        clock.advance(TimeDelta::seconds(90));
        assert_eq!(clock.now(), due() + TimeDelta::seconds(90));

        let shared = clock.clone();
        shared.set(due());
        assert_eq!(clock.now(), due());
    }

    #[test]
    fn test_fixed_clock_advance_saturates() {
        let clock = FixedClock::new(due());
        clock.advance(TimeDelta::days(365 * 1_000_000));
        assert_eq!(
            clock.now().timestamp_millis(),
            DateTime::<Utc>::MAX_UTC.timestamp_millis()
        );

        clock.set(due());
        clock.advance(TimeDelta::days(-365 * 1_000_000));
        assert_eq!(
            clock.now().timestamp_millis(),
            DateTime::<Utc>::MIN_UTC.timestamp_millis()
        );
    }

    #[test]
    fn test_system_clock_reads_wall_time() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
        assert!(now - before < TimeDelta::seconds(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_publishes_and_returns_state_on_cancel() {
        let clock = FixedClock::new(due() - TimeDelta::hours(25));
        let mut handle = spawn_countdown(
            CountdownState::new(due()),
            clock.clone(),
            CountdownConfig::default(),
        );

        handle.updates.changed().await.unwrap();
        let first = (*handle.updates.borrow_and_update()).unwrap();
        assert_eq!(first.tier, UrgencyTier::Urgent);

        clock.advance(TimeDelta::hours(2));
        handle.updates.changed().await.unwrap();
        let second = (*handle.updates.borrow_and_update()).unwrap();
        assert_eq!(second.tier, UrgencyTier::Critical);
        assert!(second.tier_changed);

        let state = handle.stop().await.unwrap();
        assert!(state.ticks() >= 2);
        assert_eq!(state.last().map(|s| s.tier), Some(UrgencyTier::Critical));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_stops_once_overdue() {
        let clock = FixedClock::new(due() + TimeDelta::seconds(1));
        let handle = spawn_countdown(
            CountdownState::new(due()),
            clock,
            CountdownConfig::default(),
        );

        let state = handle.finished().await.unwrap();
        assert_eq!(state.ticks(), 1);
        assert_eq!(state.last().map(|s| s.tier), Some(UrgencyTier::Overdue));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_stops_without_listeners() {
        let clock = FixedClock::new(due() - TimeDelta::days(10));
        let handle = spawn_countdown(
            CountdownState::new(due()),
            clock,
            CountdownConfig::default(),
        );
        let CountdownHandle { updates, task, .. } = handle;
        drop(updates);

        let state = task.await.unwrap();
        assert_eq!(state.ticks(), 1);
        assert_eq!(state.last().map(|s| s.tier), Some(UrgencyTier::Normal));
    }

    #[test]
    fn test_config_from_engine_config() {
        let engine = common::config::Config {
            countdown_refresh_ms: 250,
            ..Default::default()
        };
        let config = CountdownConfig::from(&engine);
        assert_eq!(config.refresh, Duration::from_millis(250));
        assert!(config.stop_when_overdue);
    }
}
