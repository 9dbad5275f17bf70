use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::api::{ActionReply, ApiCall, QuickSettingBody};
use crate::error::Result;
use crate::storage::{PreferenceStore, THEME_KEY};

use super::notifications::Severity;

/// How long the "Switched to ... mode" toast stays up.
pub const THEME_TOAST: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current theme, mirrored to the preference store.
#[derive(Debug)]
pub struct ThemeController {
    theme: Theme,
}

impl ThemeController {
    /// Read the stored theme, falling back to light for missing or unknown values.
    pub fn load(store: &PreferenceStore) -> Self {
        let theme = store
            .get(THEME_KEY)
            .and_then(Theme::parse)
            .unwrap_or_default();
        Self { theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Flip the theme and persist it. Returns the toast text.
    pub fn toggle(&mut self, store: &mut PreferenceStore) -> Result<String> {
        self.apply(self.theme.toggled(), store)?;
        Ok(format!("Switched to {} mode", self.theme))
    }

    pub fn apply(&mut self, theme: Theme, store: &mut PreferenceStore) -> Result<()> {
        self.theme = theme;
        store.set(THEME_KEY, theme.as_str())
    }

    /// Pick up a theme written by another client. Returns true when it changed.
    pub fn sync(&mut self, store: &PreferenceStore) -> bool {
        let stored = Self::load(store).theme;
        let changed = stored != self.theme;
        self.theme = stored;
        changed
    }
}

/// Settings the server lets the client flip without a full form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickSetting {
    Theme(Theme),
    Notifications(bool),
}

impl QuickSetting {
    pub fn call(self) -> ApiCall {
        let (kind, value) = match self {
            QuickSetting::Theme(theme) => ("theme", Value::from(theme.as_str())),
            QuickSetting::Notifications(enabled) => ("notifications", Value::from(enabled)),
        };
        ApiCall::QuickSetting(QuickSettingBody {
            kind: kind.to_string(),
            value,
        })
    }

    /// Toast for the server's answer to this setting.
    pub fn report(self, reply: &Result<ActionReply>) -> (String, Severity) {
        match reply {
            Ok(reply) if reply.success => (
                reply
                    .message
                    .clone()
                    .unwrap_or_else(|| "Setting updated".to_string()),
                Severity::Success,
            ),
            Ok(reply) => (
                reply
                    .error
                    .clone()
                    .or_else(|| reply.message.clone())
                    .unwrap_or_else(|| "Failed to update setting".to_string()),
                Severity::Error,
            ),
            Err(err) => {
                log::error!("quick setting {self:?} failed: {err}");
                ("Failed to update setting".to_string(), Severity::Error)
            }
        }
    }
}
