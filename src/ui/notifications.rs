use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

/// Time a toast spends faded out before it is removed.
pub const FADE_OUT: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Map a server or legacy type name onto a severity; unknown names fall back to `Info`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "success" => Severity::Success,
            "error" | "danger" | "urgent" => Severity::Error,
            "warning" => Severity::Warning,
            _ => Severity::Info,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Severity::Success => "✔",
            Severity::Error => "✖",
            Severity::Warning => "⚠",
            Severity::Info => "ℹ",
        }
    }

    /// Style class used by the renderer to pick colours.
    pub fn class(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "danger",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(u64);

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub severity: Severity,
    pub created: DateTime<Local>,
    expires_at: Instant,
}

impl Toast {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub fn is_fading(&self, now: Instant) -> bool {
        !self.is_expired(now) && self.expires_at.saturating_duration_since(now) <= FADE_OUT
    }
}

/// Transient toast stack for one page.
///
/// The stack is created on the first `present` call and lives until teardown.
#[derive(Debug)]
pub struct NotificationCenter {
    default_duration: Duration,
    container: Option<Vec<Toast>>,
    next_id: u64,
}

impl NotificationCenter {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            default_duration,
            container: None,
            next_id: 0,
        }
    }

    pub fn present(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        duration: Duration,
        now: Instant,
    ) -> ToastId {
        self.next_id += 1;
        let id = ToastId(self.next_id);
        let message = message.into();
        log::debug!("toast[{}] {}", severity.class(), message);

        self.container.get_or_insert_with(Vec::new).push(Toast {
            id,
            message,
            severity,
            created: Local::now(),
            expires_at: now + duration,
        });
        id
    }

    /// Present with the configured default duration.
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity, now: Instant) -> ToastId {
        self.present(message, severity, self.default_duration, now)
    }

    pub fn dismiss(&mut self, id: ToastId) -> bool {
        match self.container.as_mut() {
            Some(toasts) => {
                let before = toasts.len();
                toasts.retain(|toast| toast.id != id);
                toasts.len() != before
            }
            None => false,
        }
    }

    pub fn dismiss_latest(&mut self) -> bool {
        self.container
            .as_mut()
            .and_then(|toasts| toasts.pop())
            .is_some()
    }

    /// Drop every toast whose duration has elapsed.
    pub fn prune(&mut self, now: Instant) {
        if let Some(toasts) = self.container.as_mut() {
            toasts.retain(|toast| !toast.is_expired(now));
        }
    }

    /// Toasts still on screen, oldest first.
    pub fn visible(&self) -> &[Toast] {
        self.container.as_deref().unwrap_or(&[])
    }

    pub fn has_container(&self) -> bool {
        self.container.is_some()
    }

    pub fn clear(&mut self) {
        self.container = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Severity; 4] = [
        Severity::Success,
        Severity::Error,
        Severity::Warning,
        Severity::Info,
    ];

    #[test]
    fn severity_selects_icon_and_class() {
        let expected = [
            ("✔", "success"),
            ("✖", "danger"),
            ("⚠", "warning"),
            ("ℹ", "info"),
        ];
        for (severity, (icon, class)) in ALL.iter().zip(expected) {
            assert_eq!(severity.icon(), icon);
            assert_eq!(severity.class(), class);
        }
    }

    #[test]
    fn severity_names_include_legacy_aliases() {
        assert_eq!(Severity::from_name("danger"), Severity::Error);
        assert_eq!(Severity::from_name("urgent"), Severity::Error);
        assert_eq!(Severity::from_name("Warning"), Severity::Warning);
        assert_eq!(Severity::from_name("suggestion"), Severity::Info);
        assert_eq!(Severity::from_name("whatever"), Severity::Info);
    }

    #[test]
    fn every_severity_is_removed_after_its_duration() {
        let start = Instant::now();
        let duration = Duration::from_millis(4000);
        let mut center = NotificationCenter::new(duration);

        for severity in ALL {
            center.present("hello", severity, duration, start);
        }
        assert_eq!(center.visible().len(), 4);

        center.prune(start + duration - Duration::from_millis(1));
        assert_eq!(center.visible().len(), 4);

        center.prune(start + duration);
        assert!(center.visible().is_empty());
    }

    #[test]
    fn container_is_created_lazily() {
        let mut center = NotificationCenter::new(Duration::from_secs(4));
        assert!(!center.has_container());
        assert!(center.visible().is_empty());

        center.notify("first", Severity::Info, Instant::now());
        assert!(center.has_container());
    }

    #[test]
    fn dismiss_removes_before_expiry() {
        let now = Instant::now();
        let mut center = NotificationCenter::new(Duration::from_secs(4));
        let first = center.notify("first", Severity::Info, now);
        center.notify("second", Severity::Warning, now);

        assert!(center.dismiss(first));
        assert!(!center.dismiss(first));
        assert_eq!(center.visible().len(), 1);

        assert!(center.dismiss_latest());
        assert!(center.visible().is_empty());
        assert!(!center.dismiss_latest());
    }

    #[test]
    fn toast_fades_in_final_window() {
        let now = Instant::now();
        let mut center = NotificationCenter::new(Duration::from_secs(1));
        center.notify("fading", Severity::Success, now);
        let toast = &center.visible()[0];

        assert!(!toast.is_fading(now));
        assert!(toast.is_fading(now + Duration::from_millis(800)));
        assert!(!toast.is_fading(now + Duration::from_secs(1)));
    }
}
