use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::api::{ActionReply, AnalyticsSnapshot, GroceryItem, ServerNotification};
use crate::error::{AppError, Result};
use crate::ui::actions::{ActionOutcome, ActionRequest};
use crate::ui::theme::QuickSetting;

pub type EventSender = UnboundedSender<AppEvent>;
pub type EventReceiver = UnboundedReceiver<AppEvent>;

/// Results delivered back to the event loop by background work.
#[derive(Debug)]
pub enum AppEvent {
    CsrfReady(Result<Option<String>>),
    RefreshLoaded {
        items: Result<Vec<GroceryItem>>,
        analytics: Result<AnalyticsSnapshot>,
    },
    SearchResults {
        query: String,
        items: Result<Vec<GroceryItem>>,
    },
    NotificationsLoaded(Result<Vec<ServerNotification>>),
    ActionFinished(ActionOutcome),
    SessionExtended(Result<ActionReply>),
    SettingFinished {
        setting: QuickSetting,
        reply: Result<ActionReply>,
    },
    PreferencesChanged,
    /// A background task died without reporting.
    TaskFailed {
        label: &'static str,
        error: AppError,
    },
}

/// Side effects requested by the page; the controller performs them.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Re-fetch items for the current search plus the dashboard counts.
    Refresh { query: Option<String> },
    /// Replace the items in place with `/api/search/` results.
    Search(String),
    /// Fetch server-side notifications and present them as toasts.
    LoadNotifications,
    Send(ActionRequest),
    ExtendSession,
    QuickSetting(QuickSetting),
    /// Best-effort server logout, then leave.
    Logout { expired: bool },
    Quit,
}
