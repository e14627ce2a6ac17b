//! The display session and its single writer.
//!
//! [`SessionManager`] owns the current [`ModeSession`] and is the only code
//! that changes it. Each tick asks the pure mode functions for a
//! recommendation, commits at most one change, and broadcasts the result to
//! subscribers as an immutable [`SessionSnapshot`]. Readers never touch the
//! session directly.

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::core::mode::{
    DisplayMode, ModeChange, ModeWindowConfig, calculate_display_mode, detect_mode_change,
    has_mode_expired, log_mode_change, mode_duration, should_transition_mode,
};
use crate::prayer::{PrayerName, PrayerSlot};
use crate::state::{DisplayEvent, SessionSnapshot};

/// Who put the display into its current mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOrigin {
    /// The mode calculator
    #[default]
    Scheduled,
    /// A manual override; the calculator is not consulted until it ends
    Manual,
}

/// The mode currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSession {
    pub mode: DisplayMode,
    pub previous_mode: Option<DisplayMode>,
    pub started_at: Option<NaiveDateTime>,
    /// Nominal duration of `mode` under the current window config.
    pub duration: Option<ChronoDuration>,
    pub active_prayer: Option<PrayerName>,
    pub origin: SessionOrigin,
}

impl Default for ModeSession {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Default,
            previous_mode: None,
            started_at: None,
            duration: None,
            active_prayer: None,
            origin: SessionOrigin::Scheduled,
        }
    }
}

impl ModeSession {
    /// When the expiration checker will first consider this session expired.
    pub fn expires_at(&self) -> Option<NaiveDateTime> {
        Some(self.started_at? + self.duration?)
    }

    pub fn is_pinned(&self) -> bool {
        self.origin == SessionOrigin::Manual
    }
}

/// Owner of the display session.
pub struct SessionManager {
    session: ModeSession,
    config: ModeWindowConfig,
    subscribers: Vec<Sender<SessionSnapshot>>,
}

impl SessionManager {
    pub fn new(config: ModeWindowConfig) -> Self {
        Self {
            session: ModeSession::default(),
            config,
            subscribers: Vec::new(),
        }
    }

    pub fn session(&self) -> &ModeSession {
        &self.session
    }

    pub fn config(&self) -> &ModeWindowConfig {
        &self.config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&self.session)
    }

    /// Receive a snapshot now and after every committed change.
    pub fn subscribe(&mut self) -> Receiver<SessionSnapshot> {
        let (sender, receiver) = channel();
        self.add_subscriber(sender);
        receiver
    }

    /// Register an existing channel; the current snapshot is sent right away.
    pub fn add_subscriber(&mut self, sender: Sender<SessionSnapshot>) {
        if sender.send(self.snapshot()).is_ok() {
            self.subscribers.push(sender);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Advance the session to `now`.
    ///
    /// The transition detector runs first; the expiration checker only runs
    /// when no transition was committed. A pinned override skips the detector.
    pub fn tick(&mut self, prayers: &[PrayerSlot], now: NaiveDateTime) -> Vec<DisplayEvent> {
        if !self.session.is_pinned() {
            let decision = should_transition_mode(self.session.mode, prayers, now, &self.config);
            if decision.should_transition
                && let Some(new_mode) = decision.new_mode
            {
                let reason = calculate_display_mode(prayers, now, &self.config).reason;
                let from = self.session.mode;
                self.commit(new_mode, decision.active_prayer, now, SessionOrigin::Scheduled);

                return vec![DisplayEvent::ModeChanged {
                    from,
                    to: new_mode,
                    active_prayer: decision.active_prayer,
                    reason,
                    at: now,
                }];
            }
        }

        if has_mode_expired(self.session.mode, self.session.started_at, now, &self.config) {
            let expired = self.session.mode;
            let prayer = self.session.active_prayer;

            log_pipe!();
            log_info!(
                "{} mode exceeded its {} minute window",
                expired.display_name(),
                self.session
                    .duration
                    .map(|d| d.num_minutes())
                    .unwrap_or_default()
            );
            self.commit(DisplayMode::Default, None, now, SessionOrigin::Scheduled);

            return vec![DisplayEvent::ModeExpired {
                mode: expired,
                active_prayer: prayer,
                at: now,
            }];
        }

        Vec::new()
    }

    /// Force a mode by hand. Non-default modes stay pinned until they expire
    /// or [`SessionManager::force_default`] is called.
    pub fn override_mode(
        &mut self,
        mode: DisplayMode,
        prayer: Option<PrayerName>,
        now: NaiveDateTime,
    ) -> Vec<DisplayEvent> {
        let origin = if mode.is_timed() {
            SessionOrigin::Manual
        } else {
            SessionOrigin::Scheduled
        };
        let prayer = if mode.is_timed() { prayer } else { None };

        log_block_start!("Manual override: {} {}", mode.display_name(), mode.symbol());
        self.commit_quiet(mode, prayer, now, origin);

        vec![DisplayEvent::OverrideApplied {
            mode,
            active_prayer: prayer,
            at: now,
        }]
    }

    /// Drop any override and return to the default screen.
    pub fn force_default(&mut self, now: NaiveDateTime) -> Vec<DisplayEvent> {
        self.override_mode(DisplayMode::Default, None, now)
    }

    /// Replace the window configuration; the current session's duration
    /// follows the new values.
    pub fn reconfigure(&mut self, config: ModeWindowConfig) {
        if config == self.config {
            return;
        }
        self.config = config;
        self.session.duration = mode_duration(self.session.mode, &self.config);
        self.broadcast();
    }

    fn commit(
        &mut self,
        mode: DisplayMode,
        prayer: Option<PrayerName>,
        now: NaiveDateTime,
        origin: SessionOrigin,
    ) {
        let change = detect_mode_change(self.session.mode, mode);
        if change != ModeChange::None {
            log_mode_change(&change, prayer);
        }
        self.commit_quiet(mode, prayer, now, origin);
    }

    fn commit_quiet(
        &mut self,
        mode: DisplayMode,
        prayer: Option<PrayerName>,
        now: NaiveDateTime,
        origin: SessionOrigin,
    ) {
        self.session = ModeSession {
            mode,
            previous_mode: Some(self.session.mode),
            started_at: Some(now),
            duration: mode_duration(mode, &self.config),
            active_prayer: prayer,
            origin,
        };
        self.broadcast();
    }

    fn broadcast(&mut self) {
        let snapshot = self.snapshot();
        self.subscribers
            .retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::logger::Log;
    use crate::prayer::{IqamaAdjustments, PrayerSchedule};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn prayers() -> Vec<PrayerSlot> {
        PrayerSchedule::from_strings(
            at(0, 0, 0).date(),
            &[
                (PrayerName::Fajr, "05:00"),
                (PrayerName::Dhuhr, "12:30"),
                (PrayerName::Asr, "15:45"),
                (PrayerName::Maghrib, "18:30"),
                (PrayerName::Isha, "19:45"),
            ],
            IqamaAdjustments::default(),
        )
        .unwrap()
        .slots()
        .to_vec()
    }

    fn manager() -> SessionManager {
        Log::set_enabled(false);
        SessionManager::new(ModeWindowConfig::default())
    }

    #[test]
    fn test_tick_walks_dhuhr_cycle() {
        let mut manager = manager();
        let prayers = prayers();
        let mut modes = Vec::new();

        let mut now = at(12, 27, 0);
        while now <= at(12, 40, 0) {
            for event in manager.tick(&prayers, now) {
                modes.extend(event.resulting_mode());
            }
            now += ChronoDuration::seconds(1);
        }

        assert_eq!(
            modes,
            vec![
                DisplayMode::PrePrayer,
                DisplayMode::Adhan,
                DisplayMode::PostPrayer,
                DisplayMode::Default,
            ]
        );
        assert_eq!(manager.session().previous_mode, Some(DisplayMode::PostPrayer));
    }

    #[test]
    fn test_tick_records_session_start_and_prayer() {
        let mut manager = manager();
        let events = manager.tick(&prayers(), at(12, 30, 10));
        assert!(matches!(
            events.as_slice(),
            [DisplayEvent::ModeChanged { to: DisplayMode::Adhan, .. }]
        ));

        let session = manager.session();
        assert_eq!(session.started_at, Some(at(12, 30, 10)));
        assert_eq!(session.active_prayer, Some(PrayerName::Dhuhr));
        assert_eq!(session.duration, Some(ChronoDuration::minutes(3)));
        assert_eq!(session.expires_at(), Some(at(12, 33, 10)));
    }

    #[test]
    fn test_no_events_when_nothing_changes() {
        let mut manager = manager();
        assert!(manager.tick(&prayers(), at(9, 0, 0)).is_empty());
        assert!(manager.tick(&prayers(), at(9, 0, 1)).is_empty());
    }

    #[test]
    fn test_pinned_override_expires() {
        let mut manager = manager();
        manager.override_mode(DisplayMode::Adhan, Some(PrayerName::Asr), at(9, 0, 0));
        assert!(manager.session().is_pinned());

        // The calculator says Default, but the pin holds until expiry
        assert!(manager.tick(&prayers(), at(9, 1, 0)).is_empty());
        assert!(manager.tick(&prayers(), at(9, 3, 0)).is_empty());

        let events = manager.tick(&prayers(), at(9, 3, 1));
        assert!(matches!(
            events.as_slice(),
            [DisplayEvent::ModeExpired { mode: DisplayMode::Adhan, .. }]
        ));
        assert_eq!(manager.session().mode, DisplayMode::Default);
        assert!(!manager.session().is_pinned());
    }

    #[test]
    fn test_force_default_clears_pin() {
        let mut manager = manager();
        manager.override_mode(DisplayMode::PostPrayer, None, at(9, 0, 0));
        let events = manager.force_default(at(9, 0, 30));
        assert_eq!(events[0].resulting_mode(), Some(DisplayMode::Default));
        assert_eq!(manager.session().origin, SessionOrigin::Scheduled);
    }

    #[test]
    fn test_expiration_safety_net() {
        // Mode entered with a stale start time is force-expired even when
        // the calculator agrees with it
        let mut manager = manager();
        manager.tick(&prayers(), at(12, 30, 0));
        manager.session.started_at = Some(at(12, 20, 0));

        let events = manager.tick(&prayers(), at(12, 31, 0));
        assert!(matches!(
            events.as_slice(),
            [DisplayEvent::ModeExpired { mode: DisplayMode::Adhan, .. }]
        ));
    }

    #[test]
    fn test_subscribers_get_snapshots() {
        let mut manager = manager();
        let receiver = manager.subscribe();
        assert_eq!(receiver.recv().unwrap().mode, DisplayMode::Default);

        manager.tick(&prayers(), at(12, 29, 0));
        let snapshot = receiver.recv().unwrap();
        assert_eq!(snapshot.mode, DisplayMode::PrePrayer);
        assert_eq!(snapshot.previous_mode, Some(DisplayMode::Default));
        assert_eq!(snapshot.duration_seconds, Some(120));
    }

    #[test]
    fn test_disconnected_subscribers_are_pruned() {
        let mut manager = manager();
        let kept = manager.subscribe();
        drop(manager.subscribe());
        assert_eq!(manager.subscriber_count(), 2);

        manager.tick(&prayers(), at(12, 29, 0));
        assert_eq!(manager.subscriber_count(), 1);
        drop(kept);
    }

    #[test]
    fn test_reconfigure_updates_duration() {
        let mut manager = manager();
        manager.tick(&prayers(), at(12, 30, 0));
        manager.reconfigure(ModeWindowConfig::new(2, 5, 4));
        assert_eq!(manager.session().duration, Some(ChronoDuration::minutes(5)));
        assert_eq!(manager.session().expires_at(), Some(at(12, 35, 0)));
    }
}
