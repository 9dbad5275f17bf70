use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyEventKind, MouseEventKind};

use crate::config::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    WarningShown,
    LoggedOut,
}

/// Activity signals that keep the session alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    KeyPress,
    PointerMove,
    PointerDown,
    Scroll,
}

impl Activity {
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Some(Activity::KeyPress),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(Activity::PointerMove),
                MouseEventKind::Down(_) => Some(Activity::PointerDown),
                MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => Some(Activity::Scroll),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Deadlines for the warning and the forced logout, always armed as a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SessionTimers {
    warn_at: Instant,
    logout_at: Instant,
}

/// Outcome of polling the monitor, reported once per transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTransition {
    WarningShown,
    LoggedOut,
}

#[derive(Debug)]
pub struct SessionMonitor {
    length: Duration,
    warning_lead: Duration,
    state: SessionState,
    timers: SessionTimers,
    extend_pending: bool,
}

impl SessionMonitor {
    pub fn new(config: SessionConfig, now: Instant) -> Self {
        let mut monitor = Self {
            length: config.length,
            warning_lead: config.warning_lead,
            state: SessionState::Active,
            timers: SessionTimers {
                warn_at: now,
                logout_at: now,
            },
            extend_pending: false,
        };
        monitor.arm(now);
        monitor
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Replace both deadlines at once so a stale pair can never fire.
    fn arm(&mut self, now: Instant) {
        self.timers = SessionTimers {
            warn_at: now + self.length.saturating_sub(self.warning_lead),
            logout_at: now + self.length,
        };
    }

    /// Any activity before logout re-arms both deadlines. While the warning is
    /// up it stays up with a refreshed countdown until extended or logged out.
    pub fn record_activity(&mut self, _activity: Activity, now: Instant) {
        if self.state != SessionState::LoggedOut {
            self.arm(now);
        }
    }

    pub fn poll(&mut self, now: Instant) -> Option<SessionTransition> {
        match self.state {
            SessionState::Active | SessionState::WarningShown if now >= self.timers.logout_at => {
                self.state = SessionState::LoggedOut;
                Some(SessionTransition::LoggedOut)
            }
            SessionState::Active if now >= self.timers.warn_at => {
                self.state = SessionState::WarningShown;
                Some(SessionTransition::WarningShown)
            }
            _ => None,
        }
    }

    /// Start an extension request. Returns `false` when no request should be sent.
    pub fn begin_extend(&mut self) -> bool {
        if self.state != SessionState::WarningShown || self.extend_pending {
            return false;
        }
        self.extend_pending = true;
        true
    }

    pub fn extend_succeeded(&mut self, now: Instant) {
        self.extend_pending = false;
        if self.state == SessionState::WarningShown {
            self.state = SessionState::Active;
            self.arm(now);
        }
    }

    pub fn extend_failed(&mut self) {
        self.extend_pending = false;
    }

    /// Time left before the forced logout.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.timers.logout_at.saturating_duration_since(now)
    }
}

/// Countdown label in `m:ss`.
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SessionConfig {
        SessionConfig {
            length: Duration::from_secs(30 * 60),
            warning_lead: Duration::from_secs(5 * 60),
        }
    }

    #[test]
    fn regular_activity_never_logs_out() {
        let start = Instant::now();
        let mut monitor = SessionMonitor::new(config(), start);

        let step = Duration::from_secs(20 * 60);
        let mut now = start;
        for _ in 0..10 {
            now += step;
            assert_eq!(monitor.poll(now), None);
            monitor.record_activity(Activity::PointerMove, now);
        }
        assert_eq!(monitor.state(), SessionState::Active);
    }

    #[test]
    fn idle_session_warns_then_logs_out_at_exact_deadlines() {
        let start = Instant::now();
        let mut monitor = SessionMonitor::new(config(), start);
        let warn_at = start + Duration::from_secs(25 * 60);
        let logout_at = start + Duration::from_secs(30 * 60);

        assert_eq!(monitor.poll(warn_at - Duration::from_millis(1)), None);
        assert_eq!(monitor.poll(warn_at), Some(SessionTransition::WarningShown));
        assert_eq!(monitor.poll(warn_at + Duration::from_secs(1)), None);

        assert_eq!(monitor.poll(logout_at - Duration::from_millis(1)), None);
        assert_eq!(monitor.poll(logout_at), Some(SessionTransition::LoggedOut));
        assert_eq!(monitor.state(), SessionState::LoggedOut);
        assert_eq!(monitor.poll(logout_at + Duration::from_secs(60)), None);
    }

    #[test]
    fn late_poll_goes_straight_to_logout() {
        let start = Instant::now();
        let mut monitor = SessionMonitor::new(config(), start);
        let later = start + Duration::from_secs(31 * 60);
        assert_eq!(monitor.poll(later), Some(SessionTransition::LoggedOut));
    }

    #[test]
    fn activity_inside_warning_window_never_logs_out() {
        let start = Instant::now();
        let mut monitor = SessionMonitor::new(config(), start);

        let step = Duration::from_secs(27 * 60);
        let mut next_activity = start + step;
        let mut now = start;
        let end = start + Duration::from_secs(4 * 60 * 60);
        while now < end {
            now += Duration::from_secs(1);
            assert_ne!(monitor.poll(now), Some(SessionTransition::LoggedOut));
            if now >= next_activity {
                monitor.record_activity(Activity::KeyPress, now);
                next_activity = now + step;
            }
        }
        assert_ne!(monitor.state(), SessionState::LoggedOut);
    }

    #[test]
    fn activity_during_warning_refreshes_countdown() {
        let start = Instant::now();
        let mut monitor = SessionMonitor::new(config(), start);
        let warn_at = start + Duration::from_secs(25 * 60);
        monitor.poll(warn_at);

        let typed_at = warn_at + Duration::from_secs(10);
        monitor.record_activity(Activity::KeyPress, typed_at);
        assert_eq!(monitor.state(), SessionState::WarningShown);
        assert_eq!(monitor.remaining(typed_at), Duration::from_secs(30 * 60));
        assert_eq!(monitor.poll(start + Duration::from_secs(30 * 60)), None);
        assert_eq!(
            monitor.poll(typed_at + Duration::from_secs(30 * 60)),
            Some(SessionTransition::LoggedOut)
        );
    }

    #[test]
    fn extension_still_works_after_activity_in_warning() {
        let start = Instant::now();
        let mut monitor = SessionMonitor::new(config(), start);
        let warn_at = start + Duration::from_secs(25 * 60);
        monitor.poll(warn_at);
        monitor.record_activity(Activity::PointerDown, warn_at);

        assert!(monitor.begin_extend());
        monitor.extend_succeeded(warn_at);
        assert_eq!(monitor.state(), SessionState::Active);
    }

    #[test]
    fn activity_after_logout_is_ignored() {
        let start = Instant::now();
        let mut monitor = SessionMonitor::new(config(), start);
        let logout_at = start + Duration::from_secs(30 * 60);
        monitor.poll(logout_at);

        monitor.record_activity(Activity::KeyPress, logout_at);
        assert_eq!(monitor.state(), SessionState::LoggedOut);
        assert_eq!(monitor.poll(logout_at + Duration::from_secs(60 * 60)), None);
    }

    #[test]
    fn successful_extension_rearms_timers() {
        let start = Instant::now();
        let mut monitor = SessionMonitor::new(config(), start);
        let warn_at = start + Duration::from_secs(25 * 60);
        monitor.poll(warn_at);

        assert!(monitor.begin_extend());
        assert!(!monitor.begin_extend(), "second click while pending is ignored");
        monitor.extend_succeeded(warn_at);
        assert_eq!(monitor.state(), SessionState::Active);

        // The old logout deadline is gone.
        assert_eq!(monitor.poll(start + Duration::from_secs(30 * 60)), None);
        assert_eq!(
            monitor.poll(warn_at + Duration::from_secs(25 * 60)),
            Some(SessionTransition::WarningShown)
        );
    }

    #[test]
    fn failed_extension_keeps_warning() {
        let start = Instant::now();
        let mut monitor = SessionMonitor::new(config(), start);
        monitor.poll(start + Duration::from_secs(25 * 60));

        assert!(monitor.begin_extend());
        monitor.extend_failed();
        assert_eq!(monitor.state(), SessionState::WarningShown);
        assert!(monitor.begin_extend());
    }

    #[test]
    fn extend_is_refused_while_active() {
        let mut monitor = SessionMonitor::new(config(), Instant::now());
        assert!(!monitor.begin_extend());
    }

    #[test]
    fn countdown_formats_minutes_and_seconds() {
        assert_eq!(format_countdown(Duration::from_secs(300)), "5:00");
        assert_eq!(format_countdown(Duration::from_secs(65)), "1:05");
        assert_eq!(format_countdown(Duration::from_millis(900)), "0:00");
    }
}
