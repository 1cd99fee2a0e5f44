//! Tracking session store: the drink log and the folds derived from it.
//!
//! The engine never mutates a session. Everything here is the collaborator
//! side: logging and removing drinks, switching modes, and folding observed
//! snapshots into the "has been impaired" flag and peak BAC.

use crate::{
    validate, BacSnapshot, DrinkEvent, Metabolism, Result, TrackingMode, TrackingSession,
};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

impl TrackingSession {
    pub fn new(metabolism: Metabolism) -> Self {
        Self {
            metabolism,
            ..Self::default()
        }
    }

    /// Append a drink; the first drink starts the session clock
    pub fn log_drink(&mut self, drink: DrinkEvent) {
        if self.drinks.is_empty() || self.start_time.is_none() {
            self.start_time = drink.timestamp.or(self.start_time);
        }
        tracing::debug!("Logged drink {} ({})", drink.id, drink.name);
        self.drinks.push(drink);
    }

    /// Remove a drink by id. Returns the removed drink, if any.
    pub fn remove_drink(&mut self, id: Uuid) -> Option<DrinkEvent> {
        let idx = self.drinks.iter().position(|d| d.id == id)?;
        let removed = self.drinks.remove(idx);
        if self.drinks.is_empty() {
            self.start_time = None;
        }
        Some(removed)
    }

    /// Remove the most recently logged drink
    pub fn undo_last(&mut self) -> Option<DrinkEvent> {
        let removed = self.drinks.pop();
        if self.drinks.is_empty() {
            self.start_time = None;
        }
        removed
    }

    /// Drop every drink and reset the session clock and impairment fold
    pub fn clear(&mut self) {
        self.drinks.clear();
        self.start_time = None;
        self.has_been_impaired = false;
        self.peak_bac = 0.0;
    }

    /// Store validated one-shot estimate inputs and switch to estimate mode
    pub fn set_estimate(&mut self, drinks: f64, hours: f64) -> Result<()> {
        validate::validate_estimate(drinks, hours)?;
        self.estimate_drinks = Some(drinks);
        self.estimate_hours = Some(hours);
        self.mode = TrackingMode::Estimate;
        Ok(())
    }

    pub fn switch_mode(&mut self, mode: TrackingMode) {
        if self.mode != mode {
            tracing::info!("Switching tracking mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Whether a live recompute loop has anything to track
    pub fn is_live_active(&self) -> bool {
        self.mode == TrackingMode::Live && !self.drinks.is_empty()
    }

    /// Fold an observed snapshot into the monotone impairment flag and peak
    pub fn record(&mut self, snapshot: &BacSnapshot) {
        if snapshot.level.is_over_legal_limit() && !self.has_been_impaired {
            tracing::info!("BAC {:.3} reached the legal limit", snapshot.value);
            self.has_been_impaired = true;
        }
        if snapshot.value > self.peak_bac {
            self.peak_bac = snapshot.value;
        }
    }

    pub fn total_standard_drinks(&self) -> f64 {
        self.drinks
            .iter()
            .map(|d| d.standard_drinks)
            .filter(|n| n.is_finite() && *n > 0.0)
            .sum()
    }
}

/// A session shared between a drink-logging flow and the recompute loop
///
/// Mutations hold the write lock for their whole duration, so a tick only
/// ever sees a complete drink list.
#[derive(Clone, Debug, Default)]
pub struct SharedSession {
    inner: Arc<RwLock<TrackingSession>>,
}

impl SharedSession {
    pub fn new(session: TrackingSession) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Clone of the current session
    pub fn snapshot(&self) -> TrackingSession {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Apply one mutation atomically and return its result
    pub fn update<T>(&self, f: impl FnOnce(&mut TrackingSession) -> T) -> T {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{classify::classify, Gender, UserProfile};
    use chrono::{Duration, Utc};

    fn snapshot(value: f64) -> BacSnapshot {
        BacSnapshot {
            value,
            level: classify(value),
            sober_at: None,
            computed_at: Utc::now(),
        }
    }

    #[test]
    fn test_first_drink_sets_start_time() {
        let mut session = TrackingSession::default();
        let at = Utc::now() - Duration::minutes(20);
        session.log_drink(DrinkEvent::standard(at));
        session.log_drink(DrinkEvent::standard(at + Duration::minutes(10)));

        assert_eq!(session.start_time, Some(at));
        assert_eq!(session.drinks.len(), 2);
    }

    #[test]
    fn test_undo_removes_last_and_resets_clock_when_empty() {
        let mut session = TrackingSession::default();
        let first = DrinkEvent::standard(Utc::now());
        let second = DrinkEvent::standard(Utc::now());
        session.log_drink(first.clone());
        session.log_drink(second.clone());

        assert_eq!(session.undo_last(), Some(second));
        assert!(session.start_time.is_some());
        assert_eq!(session.undo_last(), Some(first));
        assert!(session.start_time.is_none());
        assert_eq!(session.undo_last(), None);
    }

    #[test]
    fn test_remove_by_id() {
        let mut session = TrackingSession::default();
        let keep = DrinkEvent::standard(Utc::now());
        let drop = DrinkEvent::standard(Utc::now());
        session.log_drink(keep.clone());
        session.log_drink(drop.clone());

        assert_eq!(session.remove_drink(drop.id), Some(drop));
        assert_eq!(session.remove_drink(Uuid::new_v4()), None);
        assert_eq!(session.drinks, vec![keep]);
    }

    #[test]
    fn test_impairment_flag_is_monotone_until_clear() {
        let mut session = TrackingSession::default();
        session.record(&snapshot(0.05));
        assert!(!session.has_been_impaired);

        session.record(&snapshot(0.09));
        session.record(&snapshot(0.02));
        session.record(&snapshot(0.0));
        assert!(session.has_been_impaired);
        assert_eq!(session.peak_bac, 0.09);

        session.clear();
        assert!(!session.has_been_impaired);
        assert_eq!(session.peak_bac, 0.0);
        assert!(session.drinks.is_empty());
    }

    #[test]
    fn test_set_estimate_validates() {
        let mut session = TrackingSession::default();
        assert!(session.set_estimate(60.0, 2.0).is_err());
        assert_eq!(session.mode, TrackingMode::Live);

        session.set_estimate(4.0, 2.0).unwrap();
        assert_eq!(session.mode, TrackingMode::Estimate);
        assert_eq!(session.estimate_drinks, Some(4.0));
    }

    #[test]
    fn test_shared_session_snapshot_is_detached() {
        let shared = SharedSession::default();
        shared.update(|s| s.log_drink(DrinkEvent::standard(Utc::now())));

        let before = shared.snapshot();
        shared.update(|s| s.clear());

        assert_eq!(before.drinks.len(), 1);
        assert!(shared.snapshot().drinks.is_empty());
    }

    #[test]
    fn test_total_standard_drinks_skips_invalid() {
        let mut session = TrackingSession::default();
        let now = Utc::now();
        session.log_drink(DrinkEvent::from_volume("Wine", 5.0, 12.0, now));
        session.log_drink(DrinkEvent::from_volume("Broken", 0.0, 12.0, now));
        assert!((session.total_standard_drinks() - 1.0).abs() < 0.01);

        let profile = UserProfile {
            gender: Gender::Female,
            weight_lbs: 130.0,
        };
        assert!(crate::compute_session_bac(&profile, &session, now).value > 0.0);
    }
}
