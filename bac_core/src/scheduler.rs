//! Periodic recomputation of the live BAC.
//!
//! [`RecomputeScheduler`] is the IDLE/TICKING state machine; it can be driven
//! by hand with [`RecomputeScheduler::tick`]. [`start_scheduler`] runs it on a
//! dedicated thread at a fixed cadence and returns a [`SchedulerHandle`] that
//! owns the timer. Dropping or stopping the handle always ends the loop.

use crate::{compute_session_bac, validate, BacSnapshot, Result, TrackingSession, UserProfile};
use chrono::{DateTime, Utc};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const DEFAULT_CADENCE: Duration = Duration::from_secs(1);
pub const DEFAULT_EPSILON: f64 = 0.001;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// No live session, or no usable profile. No timer is armed.
    Idle,
    /// Live session active; re-evaluating every cadence
    Ticking,
}

/// State machine deciding when to recompute and when to publish
#[derive(Debug)]
pub struct RecomputeScheduler {
    profile: Option<UserProfile>,
    epsilon: f64,
    state: SchedulerState,
    last_published: Option<BacSnapshot>,
}

impl RecomputeScheduler {
    /// An invalid profile counts as incomplete and keeps the scheduler idle
    pub fn new(profile: Option<UserProfile>, epsilon: f64) -> Self {
        let profile = profile.filter(|p| match validate::validate_profile(p) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Scheduler profile rejected: {}", e);
                false
            }
        });

        Self {
            profile,
            epsilon,
            state: SchedulerState::Idle,
            last_published: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_ticking(&self) -> bool {
        self.state == SchedulerState::Ticking
    }

    pub fn last_published(&self) -> Option<&BacSnapshot> {
        self.last_published.as_ref()
    }

    fn wants_ticking(&self, session: &TrackingSession) -> bool {
        self.profile.is_some()
            && session.mode == crate::TrackingMode::Live
            && (!session.drinks.is_empty() || session.start_time.is_some())
    }

    /// Run one evaluation against an immutable session snapshot
    ///
    /// Returns the snapshot to publish, if any. Leaving TICKING publishes a
    /// final zero snapshot when the last published value was non-zero.
    pub fn tick(&mut self, session: &TrackingSession, now: DateTime<Utc>) -> Option<BacSnapshot> {
        let active = self.wants_ticking(session);

        match (self.state, active) {
            (SchedulerState::Idle, false) => None,
            (SchedulerState::Ticking, false) => {
                tracing::info!("Recompute scheduler: TICKING -> IDLE");
                self.state = SchedulerState::Idle;
                match self.last_published.take() {
                    Some(last) if last.value > 0.0 => Some(BacSnapshot::zero(now)),
                    _ => None,
                }
            }
            (SchedulerState::Idle, true) => {
                tracing::info!("Recompute scheduler: IDLE -> TICKING");
                self.state = SchedulerState::Ticking;
                self.last_published = None;
                self.evaluate(session, now)
            }
            (SchedulerState::Ticking, true) => self.evaluate(session, now),
        }
    }

    fn evaluate(&mut self, session: &TrackingSession, now: DateTime<Utc>) -> Option<BacSnapshot> {
        let profile = self.profile.as_ref()?;
        let snapshot = compute_session_bac(profile, session, now);

        let publish = match &self.last_published {
            None => true,
            Some(last) => {
                (snapshot.value - last.value).abs() > self.epsilon
                    || snapshot.level != last.level
                    || (snapshot.value == 0.0) != (last.value == 0.0)
            }
        };

        if publish {
            tracing::debug!("Publishing BAC {:.4} ({:?})", snapshot.value, snapshot.level);
            self.last_published = Some(snapshot.clone());
            Some(snapshot)
        } else {
            None
        }
    }
}

/// Timing for the background loop
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerOptions {
    pub cadence: Duration,
    pub epsilon: f64,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            cadence: DEFAULT_CADENCE,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

enum Control {
    /// The drink log changed; recompute now
    Notify,
    Stop,
}

/// Owned handle to a running recompute loop
pub struct SchedulerHandle {
    tx: Sender<Control>,
    thread: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Wake the loop after a drink-log mutation
    pub fn notify_changed(&self) {
        // A send error means the loop already exited; nothing to wake.
        let _ = self.tx.send(Control::Notify);
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel the timer and wait for the loop to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.tx.send(Control::Stop);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("Recompute loop panicked");
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Start the recompute loop
///
/// `session_provider` is called once per evaluation and must return a complete
/// snapshot of the session; `on_snapshot` receives every published reading.
pub fn start_scheduler<P, F>(
    profile: Option<UserProfile>,
    mut session_provider: P,
    mut on_snapshot: F,
    options: SchedulerOptions,
) -> Result<SchedulerHandle>
where
    P: FnMut() -> TrackingSession + Send + 'static,
    F: FnMut(BacSnapshot) + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<Control>();

    let thread = thread::Builder::new()
        .name("bac-recompute".into())
        .spawn(move || {
            let mut scheduler = RecomputeScheduler::new(profile, options.epsilon);

            loop {
                let session = session_provider();
                if let Some(snapshot) = scheduler.tick(&session, Utc::now()) {
                    on_snapshot(snapshot);
                }

                let control = if scheduler.is_ticking() {
                    match rx.recv_timeout(options.cadence) {
                        Ok(control) => control,
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => Control::Stop,
                    }
                } else {
                    // Idle: no timer, wait for a mutation or teardown
                    rx.recv().unwrap_or(Control::Stop)
                };

                if let Control::Stop = control {
                    break;
                }
            }

            tracing::debug!("Recompute loop stopped");
        })?;

    Ok(SchedulerHandle {
        tx,
        thread: Some(thread),
    })
}

/// Stop a running loop. Equivalent to dropping the handle.
pub fn stop_scheduler(handle: SchedulerHandle) {
    handle.stop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DrinkEvent, Gender, ImpairmentLevel, SharedSession, TrackingMode};
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn profile() -> UserProfile {
        UserProfile {
            gender: Gender::Male,
            weight_lbs: 180.0,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 21, 0, 0).unwrap()
    }

    fn session_with_beer(at: DateTime<Utc>) -> TrackingSession {
        let mut session = TrackingSession::default();
        session.log_drink(DrinkEvent::from_volume("Beer", 12.0, 5.0, at));
        session
    }

    #[test]
    fn test_idle_without_drinks() {
        let mut scheduler = RecomputeScheduler::new(Some(profile()), DEFAULT_EPSILON);
        assert_eq!(scheduler.tick(&TrackingSession::default(), t0()), None);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_idle_without_profile() {
        let mut scheduler = RecomputeScheduler::new(None, DEFAULT_EPSILON);
        assert_eq!(scheduler.tick(&session_with_beer(t0()), t0()), None);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_invalid_profile_keeps_idle() {
        let bad = UserProfile {
            gender: Gender::Female,
            weight_lbs: -10.0,
        };
        let mut scheduler = RecomputeScheduler::new(Some(bad), DEFAULT_EPSILON);
        assert_eq!(scheduler.tick(&session_with_beer(t0()), t0()), None);
        assert!(!scheduler.is_ticking());
    }

    #[test]
    fn test_estimate_mode_does_not_tick() {
        let mut session = session_with_beer(t0());
        session.switch_mode(TrackingMode::Estimate);
        let mut scheduler = RecomputeScheduler::new(Some(profile()), DEFAULT_EPSILON);
        assert_eq!(scheduler.tick(&session, t0()), None);
        assert!(!scheduler.is_ticking());
    }

    #[test]
    fn test_first_tick_publishes() {
        let mut scheduler = RecomputeScheduler::new(Some(profile()), DEFAULT_EPSILON);
        let snapshot = scheduler.tick(&session_with_beer(t0()), t0()).unwrap();

        assert_eq!(scheduler.state(), SchedulerState::Ticking);
        assert_eq!(snapshot.level, ImpairmentLevel::Mild);
        assert_eq!(scheduler.last_published(), Some(&snapshot));
    }

    #[test]
    fn test_imperceptible_change_is_not_published() {
        let session = session_with_beer(t0());
        let mut scheduler = RecomputeScheduler::new(Some(profile()), DEFAULT_EPSILON);
        scheduler.tick(&session, t0()).unwrap();

        // One second of decay is ~0.000004, well under epsilon
        assert_eq!(scheduler.tick(&session, t0() + ChronoDuration::seconds(1)), None);

        // Five minutes is 0.00125, above epsilon
        let later = scheduler
            .tick(&session, t0() + ChronoDuration::minutes(5))
            .unwrap();
        assert!(later.value < 0.0252);
    }

    #[test]
    fn test_reaching_zero_is_published() {
        let session = session_with_beer(t0());
        let mut scheduler = RecomputeScheduler::new(Some(profile()), DEFAULT_EPSILON);
        scheduler.tick(&session, t0()).unwrap();
        scheduler.tick(&session, t0() + ChronoDuration::minutes(100));

        let sober = scheduler
            .tick(&session, t0() + ChronoDuration::minutes(102))
            .unwrap();
        assert_eq!(sober.value, 0.0);
        assert_eq!(sober.level, ImpairmentLevel::Sober);
    }

    #[test]
    fn test_clearing_log_returns_to_idle_with_zero() {
        let mut session = session_with_beer(t0());
        let mut scheduler = RecomputeScheduler::new(Some(profile()), DEFAULT_EPSILON);
        scheduler.tick(&session, t0()).unwrap();

        session.clear();
        let last = scheduler.tick(&session, t0()).unwrap();
        assert_eq!(last, BacSnapshot::zero(t0()));
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        // Stays idle and silent
        assert_eq!(scheduler.tick(&session, t0()), None);
    }

    #[test]
    fn test_background_loop_publishes_and_stops() {
        let shared = SharedSession::new(session_with_beer(Utc::now()));
        let (tx, rx) = mpsc::channel();

        let provider = shared.clone();
        let handle = start_scheduler(
            Some(profile()),
            move || provider.snapshot(),
            move |snapshot| {
                let _ = tx.send(snapshot);
            },
            SchedulerOptions {
                cadence: Duration::from_millis(10),
                epsilon: DEFAULT_EPSILON,
            },
        )
        .unwrap();

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(first.value > 0.0);
        assert!(handle.is_running());

        shared.update(|s| s.clear());
        handle.notify_changed();
        let cleared = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(cleared.value, 0.0);

        stop_scheduler(handle);
        // The loop owned the only sender; it is gone once the thread exits.
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_idle_loop_wakes_on_notify() {
        let shared = SharedSession::default();
        let (tx, rx) = mpsc::channel();

        let provider = shared.clone();
        let handle = start_scheduler(
            Some(profile()),
            move || provider.snapshot(),
            move |snapshot| {
                let _ = tx.send(snapshot);
            },
            SchedulerOptions {
                cadence: Duration::from_millis(10),
                epsilon: DEFAULT_EPSILON,
            },
        )
        .unwrap();

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

        shared.update(|s| s.log_drink(DrinkEvent::standard(Utc::now())));
        handle.notify_changed();
        let snapshot = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(snapshot.value > 0.0);

        drop(handle);
    }
}
