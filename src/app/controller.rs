use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event;
use tokio::sync::mpsc;

use crate::api::{ApiCall, ApiClient};
use crate::app::event::{AppEvent, Effect, EventReceiver, EventSender};
use crate::app::state::PageState;
use crate::error::Result;
use crate::storage::watch_preferences;
use crate::ui::{self, TerminalGuard};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Why the client stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    LoggedOut { expired: bool },
}

/// Owns the page state and performs the effects it asks for.
pub struct AppController {
    client: ApiClient,
    state: PageState,
    preferences_path: PathBuf,
    tx: EventSender,
    rx: EventReceiver,
}

impl AppController {
    pub fn new(client: ApiClient, state: PageState, preferences_path: PathBuf) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            state,
            preferences_path,
            tx,
            rx,
        }
    }

    pub async fn run(mut self) -> Result<ExitReason> {
        let watcher_tx = self.tx.clone();
        let _watcher = match watch_preferences(&self.preferences_path, move || {
            let _ = watcher_tx.send(AppEvent::PreferencesChanged);
        }) {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                log::warn!("Preference changes from other clients will not be seen: {err}");
                None
            }
        };

        let token = self.client.acquire_csrf_token().await;
        self.state
            .apply_event(AppEvent::CsrfReady(token), Instant::now());

        let startup = self.state.startup_effects();
        if let Some(reason) = self.perform_all(startup) {
            return Ok(reason);
        }

        let mut guard = TerminalGuard::new()?;
        let outcome = self.event_loop(&mut guard).await;
        self.state.teardown();
        guard.restore()?;

        if let Ok(ExitReason::LoggedOut { .. }) = outcome {
            if let Err(err) = self.client.logout().await {
                log::warn!("{err}");
            }
        }
        outcome
    }

    async fn event_loop(&mut self, guard: &mut TerminalGuard) -> Result<ExitReason> {
        loop {
            let now = Instant::now();
            while let Ok(event) = self.rx.try_recv() {
                let effects = self.state.apply_event(event, now);
                if let Some(reason) = self.perform_all(effects) {
                    return Ok(reason);
                }
            }

            let effects = self.state.tick(now);
            if let Some(reason) = self.perform_all(effects) {
                return Ok(reason);
            }

            let state = &mut self.state;
            guard.terminal_mut().draw(|f| {
                state.update_layout(f.size());
                ui::render(f, state, now);
            })?;

            if event::poll(POLL_INTERVAL)? {
                let input = event::read()?;
                let effects = self.state.handle_terminal_event(&input, Instant::now());
                if let Some(reason) = self.perform_all(effects) {
                    return Ok(reason);
                }
            }
            tokio::task::yield_now().await;
        }
    }

    fn perform_all(&self, effects: Vec<Effect>) -> Option<ExitReason> {
        for effect in effects {
            if let Some(reason) = self.perform(effect) {
                return Some(reason);
            }
        }
        None
    }

    fn perform(&self, effect: Effect) -> Option<ExitReason> {
        let client = self.client.clone();
        match effect {
            Effect::Refresh { query } => {
                self.spawn_request("refresh", async move {
                    let query = query.unwrap_or_default();
                    let (items, analytics) =
                        futures::join!(client.search(&query), client.analytics());
                    AppEvent::RefreshLoaded { items, analytics }
                });
            }
            Effect::Search(query) => {
                self.spawn_request("search", async move {
                    let items = client.search(&query).await;
                    AppEvent::SearchResults { query, items }
                });
            }
            Effect::LoadNotifications => {
                self.spawn_request("notifications", async move {
                    AppEvent::NotificationsLoaded(client.notifications().await)
                });
            }
            Effect::Send(request) => {
                log::info!("{} `{}`", request.kind.spec().label, request.subject);
                let dispatcher = self.state.dispatcher();
                self.spawn_request("action", async move {
                    AppEvent::ActionFinished(dispatcher.execute(&client, &request).await)
                });
            }
            Effect::ExtendSession => {
                self.spawn_request("extend session", async move {
                    AppEvent::SessionExtended(client.execute(&ApiCall::ExtendSession).await)
                });
            }
            Effect::QuickSetting(setting) => {
                self.spawn_request("quick setting", async move {
                    let reply = client.execute(&setting.call()).await;
                    AppEvent::SettingFinished { setting, reply }
                });
            }
            Effect::Logout { expired } => return Some(ExitReason::LoggedOut { expired }),
            Effect::Quit => return Some(ExitReason::Quit),
        }
        None
    }

    /// Run `task` on the runtime and post its event back; a panicking task
    /// is reported as `TaskFailed` instead of being lost.
    fn spawn_request<F>(&self, label: &'static str, task: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = match tokio::spawn(task).await {
                Ok(event) => event,
                Err(err) => AppEvent::TaskFailed {
                    label,
                    error: err.into(),
                },
            };
            // The receiver is gone only after the loop has exited.
            let _ = tx.send(event);
        });
    }
}
