use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::api::{ActionReply, AnalyticsSnapshot, GroceryItem, ServerNotification};
use crate::config::{Config, SearchConfig, SearchMode};
use crate::error::{AppError, Result};
use crate::storage::{PreferenceStore, ACTIVE_TAB_KEY};
use crate::ui::actions::{ActionKind, Dispatcher, SelectionSet, Step};
use crate::ui::components::toasts::{toast_at, ToastHit};
use crate::ui::components::utils::{contains, PageLayout};
use crate::ui::keymap::{self, Command};
use crate::ui::modal::{Modal, QuantityEdit};
use crate::ui::navbar::{normalize_path, NavbarController};
use crate::ui::navigation::{Screen, SettingsEntry, DASHBOARD_PATH, LOGOUT_PATH, PROFILE_PATH};
use crate::ui::notifications::{NotificationCenter, Severity};
use crate::ui::search::{navigate_path, search_param, SearchDebouncer, SearchTrigger};
use crate::ui::session::{Activity, SessionMonitor, SessionTransition};
use crate::ui::theme::{QuickSetting, ThemeController, THEME_TOAST};

use super::event::{AppEvent, Effect};

const GENERIC_FAILURE: &str = "An error occurred. Check the log for details.";
const NETWORK_FAILURE: &str = "A network error occurred.";

/// Everything one page owns. Built once at startup, torn down on exit.
pub struct PageState {
    path: String,
    screen: Screen,
    navbar: NavbarController,
    notifications: NotificationCenter,
    server_notification_duration: Duration,
    notifications_enabled: bool,
    session: Option<SessionMonitor>,
    search_config: SearchConfig,
    search: SearchDebouncer,
    search_focused: bool,
    dispatcher: Dispatcher,
    selection: SelectionSet,
    theme: ThemeController,
    preferences: PreferenceStore,
    modal: Option<Modal>,
    items: Vec<GroceryItem>,
    analytics: Option<AnalyticsSnapshot>,
    last_refresh: Option<DateTime<Local>>,
    loading: bool,
    cursor: usize,
    offset: usize,
    settings_cursor: usize,
    refresh_at: Option<Instant>,
    csrf_ready: bool,
    layout: PageLayout,
    debug: bool,
}

impl PageState {
    /// `authenticated` enables the session monitor.
    pub fn new(
        config: &Config,
        preferences: PreferenceStore,
        start_path: &str,
        authenticated: bool,
        now: Instant,
    ) -> Self {
        let navbar = NavbarController::new(
            config.navbar.tabs.clone(),
            config.navbar.compact_breakpoint,
            start_path,
            preferences.get(ACTIVE_TAB_KEY),
        );
        let theme = ThemeController::load(&preferences);
        let search = SearchDebouncer::with_initial(
            &config.search,
            &search_param(start_path).unwrap_or_default(),
        );

        Self {
            path: start_path.to_string(),
            screen: Screen::for_path(start_path),
            navbar,
            notifications: NotificationCenter::new(config.notifications.default_duration),
            server_notification_duration: config.notifications.server_duration,
            notifications_enabled: config.notifications.load_on_start,
            session: authenticated.then(|| SessionMonitor::new(config.session, now)),
            search_config: config.search,
            search,
            search_focused: false,
            dispatcher: Dispatcher::new(config.refresh_delay),
            selection: SelectionSet::default(),
            theme,
            preferences,
            modal: None,
            items: Vec::new(),
            analytics: None,
            last_refresh: None,
            loading: false,
            cursor: 0,
            offset: 0,
            settings_cursor: 0,
            refresh_at: None,
            csrf_ready: false,
            layout: PageLayout::default(),
            debug: config.debug,
        }
    }

    /// Work to kick off once the loop starts.
    pub fn startup_effects(&mut self) -> Vec<Effect> {
        self.loading = true;
        let mut effects = vec![Effect::Refresh {
            query: self.current_query(),
        }];
        if self.notifications_enabled {
            effects.push(Effect::LoadNotifications);
        }
        effects
    }

    /// Drop every timer, toast and transient selection.
    pub fn teardown(&mut self) {
        self.notifications.clear();
        self.selection.clear();
        self.search.cancel();
        self.navbar.close_all();
        self.modal = None;
        self.refresh_at = None;
        log::info!("page torn down at {}", self.path);
    }

    // --- accessors -------------------------------------------------------

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn navbar(&self) -> &NavbarController {
        &self.navbar
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifications_enabled
    }

    pub fn session(&self) -> Option<&SessionMonitor> {
        self.session.as_ref()
    }

    pub fn search(&self) -> &SearchDebouncer {
        &self.search
    }

    pub fn search_focused(&self) -> bool {
        self.search_focused
    }

    pub fn search_mode(&self) -> SearchMode {
        self.search_config.mode
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher
    }

    pub fn theme(&self) -> &ThemeController {
        &self.theme
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn items(&self) -> &[GroceryItem] {
        &self.items
    }

    pub fn analytics(&self) -> Option<AnalyticsSnapshot> {
        self.analytics
    }

    pub fn last_refresh(&self) -> Option<DateTime<Local>> {
        self.last_refresh
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn settings_cursor(&self) -> usize {
        self.settings_cursor
    }

    pub fn csrf_ready(&self) -> bool {
        self.csrf_ready
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn refresh_pending(&self) -> bool {
        self.refresh_at.is_some()
    }

    fn current_item(&self) -> Option<&GroceryItem> {
        self.items.get(self.cursor)
    }

    fn current_query(&self) -> Option<String> {
        let query = self.search.value().trim();
        (query.chars().count() >= self.search_config.min_length).then(|| query.to_string())
    }

    // --- geometry --------------------------------------------------------

    /// Recompute regions for `area` and keep the cursor row on screen.
    pub fn update_layout(&mut self, area: Rect) {
        self.layout = PageLayout::new(area);
        let tabs_area = if self.navbar.is_compact(area.width) {
            Rect {
                width: 0,
                ..self.layout.tabs
            }
        } else {
            self.layout.tabs
        };
        self.navbar.layout(tabs_area);

        let capacity = self.layout.table_capacity();
        if self.cursor >= self.offset + capacity {
            self.offset = self.cursor + 1 - capacity;
        }
        if self.cursor < self.offset {
            self.offset = self.cursor;
        }
        self.offset = self.offset.min(self.items.len().saturating_sub(capacity));
    }

    fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let table = self.layout.table;
        let first = self.layout.first_table_row();
        if !contains(table, column, row) || row < first || row + 1 >= table.bottom() {
            return None;
        }
        let index = self.offset + (row - first) as usize;
        (index < self.items.len()).then_some(index)
    }

    // --- input -----------------------------------------------------------

    pub fn handle_terminal_event(&mut self, event: &Event, now: Instant) -> Vec<Effect> {
        if let (Some(activity), Some(session)) = (Activity::from_event(event), self.session.as_mut())
        {
            session.record_activity(activity, now);
        }

        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, _) => {
                self.navbar.on_resize(*width);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> Vec<Effect> {
        if self.modal.is_some() {
            return self.handle_modal_key(key, now);
        }
        if self.search_focused && !key.modifiers.contains(KeyModifiers::CONTROL) {
            return self.handle_search_key(key, now);
        }
        if self.navbar.compact_open() {
            if let Some(effects) = self.handle_compact_key(key) {
                return effects;
            }
        }
        if self.navbar.open_menu().is_some() {
            if let Some(effects) = self.handle_menu_key(key) {
                return effects;
            }
        }

        match keymap::lookup(key) {
            Some(command) => self.run_command(command, now),
            None => Vec::new(),
        }
    }

    fn handle_modal_key(&mut self, key: &KeyEvent, now: Instant) -> Vec<Effect> {
        let Some(modal) = self.modal.take() else {
            return Vec::new();
        };

        match modal {
            Modal::Confirm { prompt, request } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    vec![Effect::Send(request)]
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    log::debug!("declined: {prompt}");
                    Vec::new()
                }
                _ => {
                    self.modal = Some(Modal::Confirm { prompt, request });
                    Vec::new()
                }
            },
            Modal::QuantityEdit(mut edit) => match key.code {
                KeyCode::Esc => Vec::new(),
                KeyCode::Enter => {
                    match self
                        .dispatcher
                        .prepare_edit(&edit.item, &edit.quantity, &edit.notes)
                    {
                        Some(step) => self.run_step(step, now),
                        None => Vec::new(),
                    }
                }
                code => {
                    match code {
                        KeyCode::Tab | KeyCode::BackTab => edit.switch_field(),
                        KeyCode::Backspace => edit.backspace(),
                        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                            edit.push(ch)
                        }
                        _ => {}
                    }
                    self.modal = Some(Modal::QuantityEdit(edit));
                    Vec::new()
                }
            },
            Modal::SessionWarning => {
                self.modal = Some(Modal::SessionWarning);
                match key.code {
                    KeyCode::Enter | KeyCode::Char('e') => self.extend_session(),
                    KeyCode::Char('l') => {
                        self.modal = None;
                        vec![Effect::Logout { expired: false }]
                    }
                    _ => Vec::new(),
                }
            }
            Modal::Logout => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    vec![Effect::Logout { expired: false }]
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Vec::new(),
                _ => {
                    self.modal = Some(Modal::Logout);
                    Vec::new()
                }
            },
        }
    }

    fn handle_search_key(&mut self, key: &KeyEvent, now: Instant) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc => {
                self.search_focused = false;
                Vec::new()
            }
            KeyCode::Enter => {
                self.search_focused = false;
                match self.search.flush() {
                    Some(trigger) => self.apply_search(trigger),
                    None => Vec::new(),
                }
            }
            KeyCode::Backspace => {
                self.search.backspace(now);
                Vec::new()
            }
            KeyCode::Char(ch) => {
                self.search.push_char(ch, now);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_compact_key(&mut self, key: &KeyEvent) -> Option<Vec<Effect>> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.navbar.move_compact_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.navbar.move_compact_cursor(1),
            KeyCode::Enter => {
                let index = self.navbar.compact_cursor();
                return Some(self.select_tab(index));
            }
            KeyCode::Esc => self.navbar.toggle_compact(),
            _ => return None,
        }
        Some(Vec::new())
    }

    fn handle_menu_key(&mut self, key: &KeyEvent) -> Option<Vec<Effect>> {
        match key.code {
            KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => self.navbar.move_menu_cursor(-1),
            KeyCode::Down | KeyCode::Right | KeyCode::Char('j') => self.navbar.move_menu_cursor(1),
            KeyCode::Enter => {
                let path = self.navbar.choose_menu_link(None)?;
                return Some(self.navigate(&path));
            }
            KeyCode::Esc => self.navbar.close_menus(),
            _ => return None,
        }
        Some(Vec::new())
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) -> Vec<Effect> {
        let (column, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved => {
                self.navbar.hover_at(column, row);
                Vec::new()
            }
            MouseEventKind::Down(MouseButton::Left) => self.handle_click(column, row),
            MouseEventKind::ScrollDown if self.modal.is_none() => {
                self.move_cursor(1);
                Vec::new()
            }
            MouseEventKind::ScrollUp if self.modal.is_none() => {
                self.move_cursor(-1);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_click(&mut self, column: u16, row: u16) -> Vec<Effect> {
        match toast_at(self.layout.body, self.notifications.visible(), column, row) {
            Some(ToastHit::Close(id)) => {
                self.notifications.dismiss(id);
                return Vec::new();
            }
            Some(ToastHit::Body) => return Vec::new(),
            None => {}
        }
        if self.modal.is_some() {
            return Vec::new();
        }

        let bounds = self.layout.area;
        if let Some(link) = self.navbar.link_at(column, row, bounds) {
            if let Some(path) = self.navbar.choose_menu_link(Some(link)) {
                return self.navigate(&path);
            }
        }
        if let Some(index) = self.navbar.compact_item_at(column, row, bounds) {
            return self.select_tab(index);
        }
        if self.navbar.click_outside(column, row, bounds) {
            return Vec::new();
        }

        if self.navbar.is_compact(bounds.width) && contains(self.layout.tabs, column, row) {
            self.navbar.toggle_compact();
            return Vec::new();
        }
        if let Some(index) = self.navbar.tab_at(column, row) {
            if self.navbar.tabs()[index].menu.is_some() {
                self.navbar.toggle_menu(index);
                return Vec::new();
            }
            return self.select_tab(index);
        }

        if self.screen == Screen::Inventory {
            if contains(self.layout.search, column, row) {
                self.search_focused = true;
            } else if let Some(index) = self.row_at(column, row) {
                self.cursor = index;
            }
        }
        Vec::new()
    }

    fn run_command(&mut self, command: Command, now: Instant) -> Vec<Effect> {
        match command {
            Command::Quit => return vec![Effect::Quit],
            Command::NextTab => return self.select_tab(self.navbar.next_index()),
            Command::PreviousTab => return self.select_tab(self.navbar.previous_index()),
            Command::JumpTab(index) => return self.select_tab(index),
            Command::ToggleMenu => {
                let active = self.navbar.active_index();
                self.navbar.toggle_menu(active);
            }
            Command::ToggleCompactMenu => {
                if self.navbar.is_compact(self.layout.area.width) {
                    self.navbar.toggle_compact();
                }
            }
            Command::ToggleTheme => self.toggle_theme(now),
            Command::FocusSearch => {
                if self.screen == Screen::Inventory {
                    self.search_focused = true;
                }
            }
            Command::Refresh => {
                self.loading = true;
                return vec![Effect::Refresh {
                    query: self.current_query(),
                }];
            }
            Command::CursorUp => self.move_cursor(-1),
            Command::CursorDown => self.move_cursor(1),
            Command::Activate => match self.screen {
                Screen::Inventory => return self.run_action(ActionKind::EditQuantity, now),
                Screen::Settings => return self.activate_setting(),
                Screen::Overview | Screen::Profile => {}
            },
            Command::Back => {
                self.navbar.close_all();
                self.search_focused = false;
            }
            Command::ToggleSelect => {
                if let Some(id) = self.current_item().map(|item| item.id.clone()) {
                    self.selection.toggle(&id);
                }
            }
            Command::SelectAll => {
                if self.screen == Screen::Inventory {
                    let ids: Vec<String> = self.items.iter().map(|item| item.id.clone()).collect();
                    self.selection.select_all(ids.iter().map(String::as_str));
                }
            }
            Command::ClearSelection => self.selection.clear(),
            Command::Action(kind) => return self.run_action(kind, now),
            Command::DismissToast => {
                self.notifications.dismiss_latest();
            }
            Command::Logout => {
                self.navbar.close_all();
                self.modal = Some(Modal::Logout);
            }
            Command::GoDashboard => return self.navigate(DASHBOARD_PATH),
            Command::GoProfile => return self.navigate(PROFILE_PATH),
        }
        Vec::new()
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.screen {
            Screen::Inventory if !self.items.is_empty() => {
                let last = self.items.len() - 1;
                self.cursor = (self.cursor as isize + delta).clamp(0, last as isize) as usize;
            }
            Screen::Settings => {
                let len = SettingsEntry::ALL.len() as isize;
                self.settings_cursor =
                    (self.settings_cursor as isize + delta).rem_euclid(len) as usize;
            }
            _ => {}
        }
    }

    fn run_action(&mut self, kind: ActionKind, now: Instant) -> Vec<Effect> {
        if self.screen != Screen::Inventory {
            return Vec::new();
        }

        let step = if kind.is_bulk() {
            self.dispatcher.prepare_bulk(kind, &self.selection)
        } else if kind == ActionKind::EditQuantity {
            if let Some(item) = self.current_item().cloned() {
                self.modal = Some(Modal::QuantityEdit(QuantityEdit::new(item)));
            }
            None
        } else {
            self.current_item()
                .and_then(|item| self.dispatcher.prepare_item(kind, item))
        };

        match step {
            Some(step) => self.run_step(step, now),
            None => Vec::new(),
        }
    }

    fn run_step(&mut self, step: Step, now: Instant) -> Vec<Effect> {
        match step {
            Step::Confirm { prompt, request } => {
                self.modal = Some(Modal::Confirm { prompt, request });
                Vec::new()
            }
            Step::Send(request) => vec![Effect::Send(request)],
            Step::Reject(notice) => {
                self.notifications.notify(notice.message, notice.severity, now);
                Vec::new()
            }
        }
    }

    fn activate_setting(&mut self) -> Vec<Effect> {
        let setting = match SettingsEntry::ALL[self.settings_cursor] {
            SettingsEntry::Theme => QuickSetting::Theme(self.theme.theme().toggled()),
            SettingsEntry::Notifications => QuickSetting::Notifications(!self.notifications_enabled),
        };
        vec![Effect::QuickSetting(setting)]
    }

    fn toggle_theme(&mut self, now: Instant) {
        match self.theme.toggle(&mut self.preferences) {
            Ok(message) => {
                self.notifications
                    .present(message, Severity::Info, THEME_TOAST, now);
            }
            Err(err) => {
                log::error!("Failed to save theme preference: {err}");
                self.notifications
                    .notify("Failed to save theme preference", Severity::Error, now);
            }
        }
    }

    fn extend_session(&mut self) -> Vec<Effect> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if session.begin_extend() {
            vec![Effect::ExtendSession]
        } else {
            Vec::new()
        }
    }

    // --- navigation ------------------------------------------------------

    fn select_tab(&mut self, index: usize) -> Vec<Effect> {
        let Some(tab) = self.navbar.tabs().get(index) else {
            return Vec::new();
        };
        if tab.path == "#" {
            self.navbar.toggle_menu(index);
            return Vec::new();
        }

        let Some(path) = self.navbar.select(index).map(str::to_string) else {
            return Vec::new();
        };
        if let Err(err) = self.preferences.set(ACTIVE_TAB_KEY, path.clone()) {
            log::warn!("Failed to store active tab: {err}");
        }
        self.navigate(&path)
    }

    /// Switch to `path` and load it. The logout link opens the logout dialog instead.
    pub fn navigate(&mut self, path: &str) -> Vec<Effect> {
        if normalize_path(path) == LOGOUT_PATH {
            self.navbar.close_all();
            self.modal = Some(Modal::Logout);
            return Vec::new();
        }

        log::info!("navigate {} -> {path}", self.path);
        self.path = path.to_string();
        self.screen = Screen::for_path(path);
        self.navbar
            .sync_with_path(path, self.preferences.get(ACTIVE_TAB_KEY));
        self.navbar.close_all();
        self.selection.clear();
        self.cursor = 0;
        self.offset = 0;
        self.search = SearchDebouncer::with_initial(
            &self.search_config,
            &search_param(path).unwrap_or_default(),
        );
        self.search_focused = false;
        self.refresh_at = None;
        self.loading = true;

        vec![Effect::Refresh {
            query: self.current_query(),
        }]
    }

    fn apply_search(&mut self, trigger: SearchTrigger) -> Vec<Effect> {
        match self.search_config.mode {
            SearchMode::Navigate => match navigate_path(&self.path, &trigger) {
                Ok(path) => {
                    let focused = self.search_focused;
                    let effects = self.navigate(&path);
                    self.search_focused = focused;
                    effects
                }
                Err(err) => {
                    log::warn!("search navigation skipped: {err}");
                    Vec::new()
                }
            },
            SearchMode::Fetch => match trigger {
                SearchTrigger::Query(query) => vec![Effect::Search(query)],
                SearchTrigger::Clear => vec![Effect::Refresh { query: None }],
            },
        }
    }

    // --- timers ----------------------------------------------------------

    /// Fire every deadline that has passed.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.notifications.prune(now);

        if let Some(session) = self.session.as_mut() {
            match session.poll(now) {
                Some(SessionTransition::WarningShown) => {
                    log::info!("session warning shown");
                    self.navbar.close_all();
                    self.search_focused = false;
                    self.modal = Some(Modal::SessionWarning);
                }
                Some(SessionTransition::LoggedOut) => {
                    log::info!("session expired");
                    self.modal = None;
                    effects.push(Effect::Logout { expired: true });
                    return effects;
                }
                None => {}
            }
        }

        if self.screen == Screen::Inventory {
            if let Some(trigger) = self.search.poll(now) {
                effects.extend(self.apply_search(trigger));
            }
        } else {
            self.search.cancel();
        }

        if self.refresh_at.map_or(false, |at| now >= at) {
            self.refresh_at = None;
            self.loading = true;
            effects.push(Effect::Refresh {
                query: self.current_query(),
            });
        }
        effects
    }

    // --- background results ----------------------------------------------

    pub fn apply_event(&mut self, event: AppEvent, now: Instant) -> Vec<Effect> {
        match event {
            AppEvent::CsrfReady(Ok(token)) => {
                self.csrf_ready = token.is_some();
                if token.is_none() {
                    log::warn!("Continuing without a CSRF token");
                }
            }
            AppEvent::CsrfReady(Err(err)) => self.background_failure("CSRF bootstrap", err, now),
            AppEvent::RefreshLoaded { items, analytics } => {
                self.loading = false;
                self.last_refresh = Some(Local::now());
                match items {
                    Ok(items) => self.replace_items(items),
                    Err(err) => self.background_failure("item load", err, now),
                }
                match analytics {
                    Ok(snapshot) => self.analytics = Some(snapshot),
                    Err(err) => self.background_failure("analytics load", err, now),
                }
            }
            AppEvent::SearchResults { query, items } => {
                self.loading = false;
                match items {
                    Ok(items) => {
                        log::debug!("search `{query}` returned {} items", items.len());
                        self.replace_items(items);
                    }
                    Err(err) => self.background_failure("search", err, now),
                }
            }
            AppEvent::NotificationsLoaded(Ok(notifications)) => {
                self.present_server_notifications(notifications, now)
            }
            AppEvent::NotificationsLoaded(Err(err)) => {
                self.background_failure("notification load", err, now)
            }
            AppEvent::ActionFinished(outcome) => {
                self.notifications
                    .notify(outcome.notice.message, outcome.notice.severity, now);
                if let Some(delay) = outcome.refresh_after {
                    self.refresh_at = Some(now + delay);
                }
            }
            AppEvent::SessionExtended(reply) => self.finish_extend(reply, now),
            AppEvent::SettingFinished { setting, reply } => {
                let (message, severity) = setting.report(&reply);
                let applied = matches!(&reply, Ok(reply) if reply.success);
                self.notifications.notify(message, severity, now);
                if applied {
                    self.apply_setting(setting, now);
                }
            }
            AppEvent::PreferencesChanged => {
                if let Err(err) = self.preferences.reload() {
                    log::warn!("Failed to reload preferences: {err}");
                } else if self.theme.sync(&self.preferences) {
                    log::info!("theme changed elsewhere: {}", self.theme.theme());
                }
            }
            AppEvent::TaskFailed { label, error } => self.background_failure(label, error, now),
        }
        Vec::new()
    }

    fn replace_items(&mut self, items: Vec<GroceryItem>) {
        self.items = items;
        self.selection.clear();
        self.cursor = self.cursor.min(self.items.len().saturating_sub(1));
    }

    fn present_server_notifications(&mut self, notifications: Vec<ServerNotification>, now: Instant) {
        if !self.notifications_enabled {
            return;
        }
        for notification in notifications {
            let message = match &notification.title {
                Some(title) if !title.is_empty() => format!("{title}: {}", notification.message),
                _ => notification.message.clone(),
            };
            self.notifications.present(
                message,
                Severity::from_name(&notification.kind),
                self.server_notification_duration,
                now,
            );
        }
    }

    fn finish_extend(&mut self, reply: Result<ActionReply>, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match reply {
            Ok(reply) if reply.success => {
                session.extend_succeeded(now);
                if matches!(self.modal, Some(Modal::SessionWarning)) {
                    self.modal = None;
                }
                self.notifications
                    .notify("Session extended successfully", Severity::Success, now);
            }
            Ok(_) => {
                session.extend_failed();
                self.notifications
                    .notify("Failed to extend session", Severity::Error, now);
            }
            Err(err) => {
                session.extend_failed();
                log::error!("extend session failed: {err}");
                self.notifications
                    .notify("Failed to extend session", Severity::Error, now);
            }
        }
    }

    fn apply_setting(&mut self, setting: QuickSetting, now: Instant) {
        match setting {
            QuickSetting::Theme(theme) => {
                if let Err(err) = self.theme.apply(theme, &mut self.preferences) {
                    log::error!("Failed to save theme preference: {err}");
                    self.notifications
                        .notify("Failed to save theme preference", Severity::Error, now);
                }
            }
            QuickSetting::Notifications(enabled) => self.notifications_enabled = enabled,
        }
    }

    /// Failures nothing else reports: logged, and surfaced in debug mode.
    fn background_failure(&mut self, context: &str, err: AppError, now: Instant) {
        log::error!("{context} failed: {err}");
        if self.debug {
            let message = if err.is_network() {
                NETWORK_FAILURE
            } else {
                GENERIC_FAILURE
            };
            self.notifications.notify(message, Severity::Error, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiCall, BulkAction, BulkBody};
    use crate::ui::actions::ActionRequest;
    use crate::ui::components::toasts::toast_rects;
    use crate::ui::session::SessionState;
    use crate::ui::theme::Theme;
    use tempfile::TempDir;

    struct Harness {
        _dir: TempDir,
        state: PageState,
        start: Instant,
    }

    fn harness_with(path: &str, authenticated: bool, adjust: impl FnOnce(&mut Config)) -> Harness {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = Config::builtin();
        adjust(&mut config);
        let prefs = PreferenceStore::open(dir.path().join("prefs.json"), "http://127.0.0.1:8000")
            .expect("prefs");
        let start = Instant::now();
        let mut state = PageState::new(&config, prefs, path, authenticated, start);
        state.update_layout(Rect::new(0, 0, 120, 40));
        Harness {
            _dir: dir,
            state,
            start,
        }
    }

    fn harness(path: &str) -> Harness {
        harness_with(path, false, |_| {})
    }

    fn press(state: &mut PageState, code: KeyCode, now: Instant) -> Vec<Effect> {
        state.handle_terminal_event(&Event::Key(KeyEvent::new(code, KeyModifiers::NONE)), now)
    }

    fn item(id: &str, name: &str) -> GroceryItem {
        GroceryItem {
            id: id.to_string(),
            name: name.to_string(),
            category: "dairy".to_string(),
            quantity: 2.0,
            unit: "l".to_string(),
            price: None,
            expiry_date: None,
        }
    }

    fn loaded(state: &mut PageState, items: Vec<GroceryItem>, now: Instant) {
        state.apply_event(
            AppEvent::RefreshLoaded {
                items: Ok(items),
                analytics: Ok(AnalyticsSnapshot::default()),
            },
            now,
        );
    }

    #[test]
    fn startup_loads_page_and_notifications() {
        let mut h = harness("/mongodb/?search=oat");
        assert_eq!(
            h.state.startup_effects(),
            vec![
                Effect::Refresh {
                    query: Some("oat".to_string())
                },
                Effect::LoadNotifications,
            ]
        );
        assert!(h.state.loading());
    }

    #[test]
    fn jumping_to_a_tab_stores_it_and_refreshes() {
        let mut h = harness("/");
        let effects = press(&mut h.state, KeyCode::Char('3'), h.start);

        assert_eq!(effects, vec![Effect::Refresh { query: None }]);
        assert_eq!(h.state.path(), "/mongodb/");
        assert_eq!(h.state.screen(), Screen::Inventory);
        assert_eq!(h.state.navbar().active_index(), 2);
        assert_eq!(h.state.preferences().get(ACTIVE_TAB_KEY), Some("/mongodb/"));
    }

    #[test]
    fn empty_bulk_delete_warns_without_request() {
        let mut h = harness("/mongodb/");
        loaded(&mut h.state, vec![item("1", "Milk")], h.start);

        let effects = press(&mut h.state, KeyCode::Char('D'), h.start);
        assert!(effects.is_empty());
        assert!(h.state.modal().is_none());
        let toast = h.state.notifications().visible().last().expect("toast");
        assert_eq!(toast.message, "No items selected");
        assert_eq!(toast.severity, Severity::Warning);
    }

    #[test]
    fn bulk_delete_confirms_selected_items() {
        let mut h = harness("/mongodb/");
        loaded(&mut h.state, vec![item("1", "Milk"), item("2", "Eggs")], h.start);

        press(&mut h.state, KeyCode::Char('a'), h.start);
        press(&mut h.state, KeyCode::Char('D'), h.start);
        assert!(matches!(
            h.state.modal(),
            Some(Modal::Confirm { prompt, .. }) if prompt == "Delete 2 items permanently?"
        ));

        let effects = press(&mut h.state, KeyCode::Char('y'), h.start);
        assert_eq!(
            effects,
            vec![Effect::Send(ActionRequest {
                kind: ActionKind::BulkDelete,
                call: ApiCall::Bulk(BulkBody {
                    action: BulkAction::Delete,
                    item_ids: vec!["1".to_string(), "2".to_string()],
                }),
                subject: "2 items".to_string(),
            })]
        );
    }

    #[test]
    fn declined_delete_sends_nothing() {
        let mut h = harness("/mongodb/");
        loaded(&mut h.state, vec![item("1", "Milk")], h.start);

        assert!(press(&mut h.state, KeyCode::Char('d'), h.start).is_empty());
        assert!(matches!(h.state.modal(), Some(Modal::Confirm { .. })));
        assert!(press(&mut h.state, KeyCode::Char('n'), h.start).is_empty());
        assert!(h.state.modal().is_none());
    }

    #[test]
    fn negative_quantity_shows_danger_toast() {
        let mut h = harness("/mongodb/");
        loaded(&mut h.state, vec![item("1", "Milk")], h.start);

        press(&mut h.state, KeyCode::Char('e'), h.start);
        press(&mut h.state, KeyCode::Backspace, h.start);
        press(&mut h.state, KeyCode::Char('-'), h.start);
        press(&mut h.state, KeyCode::Char('4'), h.start);
        let effects = press(&mut h.state, KeyCode::Enter, h.start);

        assert!(effects.is_empty());
        assert!(h.state.modal().is_none());
        let toast = h.state.notifications().visible().last().expect("toast");
        assert_eq!(toast.message, "Quantity cannot be negative");
        assert_eq!(toast.severity, Severity::Error);
    }

    #[test]
    fn typed_search_navigates_once_after_quiet_window() {
        let mut h = harness("/mongodb/");
        press(&mut h.state, KeyCode::Char('/'), h.start);
        assert!(h.state.search_focused());

        let mut now = h.start;
        for ch in "milk".chars() {
            assert!(press(&mut h.state, KeyCode::Char(ch), now).is_empty());
            assert!(h.state.tick(now).is_empty());
            now += Duration::from_millis(50);
        }

        let effects = h.state.tick(now + Duration::from_millis(300));
        assert_eq!(
            effects,
            vec![Effect::Refresh {
                query: Some("milk".to_string())
            }]
        );
        assert_eq!(h.state.path(), "/mongodb/?search=milk");
        assert!(h.state.search_focused());
        assert!(h.state.tick(now + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn clearing_search_drops_the_parameter() {
        let mut h = harness("/mongodb/?search=milk");
        assert_eq!(h.state.search().value(), "milk");

        press(&mut h.state, KeyCode::Char('/'), h.start);
        for _ in 0..4 {
            press(&mut h.state, KeyCode::Backspace, h.start);
        }
        let effects = press(&mut h.state, KeyCode::Enter, h.start);
        assert_eq!(effects, vec![Effect::Refresh { query: None }]);
        assert_eq!(h.state.path(), "/mongodb/");
    }

    #[test]
    fn fetch_mode_searches_in_place() {
        let mut h = harness_with("/mongodb/", false, |config| {
            config.search.mode = SearchMode::Fetch
        });
        press(&mut h.state, KeyCode::Char('/'), h.start);
        press(&mut h.state, KeyCode::Char('m'), h.start);
        press(&mut h.state, KeyCode::Char('i'), h.start);

        let effects = h.state.tick(h.start + Duration::from_millis(300));
        assert_eq!(effects, vec![Effect::Search("mi".to_string())]);
        assert_eq!(h.state.path(), "/mongodb/");
    }

    #[test]
    fn session_warning_blocks_until_extended() {
        let mut h = harness_with("/", true, |_| {});
        let warn_at = h.start + Duration::from_secs(25 * 60);

        assert!(h.state.tick(warn_at).is_empty());
        assert_eq!(h.state.modal(), Some(&Modal::SessionWarning));

        assert!(press(&mut h.state, KeyCode::Esc, warn_at).is_empty());
        assert_eq!(h.state.modal(), Some(&Modal::SessionWarning));

        let effects = press(&mut h.state, KeyCode::Enter, warn_at);
        assert_eq!(effects, vec![Effect::ExtendSession]);

        h.state
            .apply_event(AppEvent::SessionExtended(Ok(ActionReply::ok("ok"))), warn_at);
        assert!(h.state.modal().is_none());
        assert_eq!(
            h.state.session().map(SessionMonitor::state),
            Some(SessionState::Active)
        );
    }

    #[test]
    fn activity_under_the_warning_postpones_logout() {
        let mut h = harness_with("/", true, |_| {});
        let warn_at = h.start + Duration::from_secs(25 * 60);
        h.state.tick(warn_at);
        assert_eq!(h.state.modal(), Some(&Modal::SessionWarning));

        let moved_at = warn_at + Duration::from_secs(60);
        let pointer = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 1,
            row: 1,
            modifiers: KeyModifiers::NONE,
        });
        h.state.handle_terminal_event(&pointer, moved_at);

        assert!(h.state.tick(h.start + Duration::from_secs(30 * 60)).is_empty());
        assert_eq!(h.state.modal(), Some(&Modal::SessionWarning));
        assert_eq!(
            h.state.tick(moved_at + Duration::from_secs(30 * 60)),
            vec![Effect::Logout { expired: true }]
        );
    }

    #[test]
    fn idle_session_logs_out() {
        let mut h = harness_with("/", true, |_| {});
        let effects = h.state.tick(h.start + Duration::from_secs(30 * 60));
        assert_eq!(effects, vec![Effect::Logout { expired: true }]);
    }

    #[test]
    fn unauthenticated_page_has_no_session_monitor() {
        let mut h = harness("/");
        assert!(h.state.session().is_none());
        assert!(h.state.tick(h.start + Duration::from_secs(3600)).is_empty());
    }

    #[test]
    fn successful_action_schedules_refresh() {
        let mut h = harness("/mongodb/");
        let request = ActionRequest {
            kind: ActionKind::MarkPurchased,
            call: ApiCall::MarkPurchased {
                item_id: "1".to_string(),
            },
            subject: "Milk".to_string(),
        };
        let outcome = h
            .state
            .dispatcher()
            .outcome(&request, Ok(ActionReply::ok("Milk marked as purchased")));
        h.state.apply_event(AppEvent::ActionFinished(outcome), h.start);

        assert!(h.state.refresh_pending());
        assert!(h.state.tick(h.start + Duration::from_millis(1499)).is_empty());
        assert_eq!(
            h.state.tick(h.start + Duration::from_millis(1500)),
            vec![Effect::Refresh { query: None }]
        );
    }

    #[test]
    fn theme_toggle_persists_and_toasts() {
        let mut h = harness("/");
        press(&mut h.state, KeyCode::Char('t'), h.start);
        assert_eq!(h.state.theme().theme(), Theme::Dark);
        let toast = h.state.notifications().visible().last().expect("toast");
        assert_eq!(toast.message, "Switched to dark mode");
        assert_eq!(h.state.preferences().get("theme"), Some("dark"));
    }

    #[test]
    fn settings_screen_sends_quick_settings() {
        let mut h = harness("/accounts/settings/");
        let effects = press(&mut h.state, KeyCode::Enter, h.start);
        assert_eq!(effects, vec![Effect::QuickSetting(QuickSetting::Theme(Theme::Dark))]);

        h.state.apply_event(
            AppEvent::SettingFinished {
                setting: QuickSetting::Theme(Theme::Dark),
                reply: Ok(ActionReply::ok("Theme updated")),
            },
            h.start,
        );
        assert_eq!(h.state.theme().theme(), Theme::Dark);
    }

    #[test]
    fn logout_link_opens_dialog() {
        let mut h = harness("/");
        assert!(h.state.navigate(LOGOUT_PATH).is_empty());
        assert_eq!(h.state.modal(), Some(&Modal::Logout));
        assert_eq!(
            press(&mut h.state, KeyCode::Char('y'), h.start),
            vec![Effect::Logout { expired: false }]
        );
    }

    #[test]
    fn background_failures_toast_only_in_debug() {
        let mut quiet = harness("/");
        quiet.state.apply_event(
            AppEvent::NotificationsLoaded(Err(AppError::message("boom"))),
            quiet.start,
        );
        assert!(quiet.state.notifications().visible().is_empty());

        let mut debug = harness_with("/", false, |config| config.debug = true);
        debug.state.apply_event(
            AppEvent::TaskFailed {
                label: "refresh",
                error: AppError::message("panicked"),
            },
            debug.start,
        );
        let toast = debug.state.notifications().visible().last().expect("toast");
        assert_eq!(toast.message, GENERIC_FAILURE);
    }

    #[test]
    fn server_notifications_use_long_duration_and_mapped_severity() {
        let mut h = harness("/");
        h.state.apply_event(
            AppEvent::NotificationsLoaded(Ok(vec![ServerNotification {
                message: "Milk expires tomorrow".to_string(),
                kind: "urgent".to_string(),
                title: Some("Expiring".to_string()),
            }])),
            h.start,
        );

        let toast = &h.state.notifications().visible()[0];
        assert_eq!(toast.message, "Expiring: Milk expires tomorrow");
        assert_eq!(toast.severity, Severity::Error);
        assert!(!toast.is_expired(h.start + Duration::from_millis(9_999)));
        assert!(toast.is_expired(h.start + Duration::from_millis(10_000)));
    }

    #[test]
    fn clicks_on_a_toast_do_not_reach_the_page() {
        let mut h = harness("/mongodb/");
        press(&mut h.state, KeyCode::Char('t'), h.start);
        assert_eq!(h.state.notifications().visible().len(), 1);

        let toast = toast_rects(h.state.layout().body, 1)[0];
        assert!(toast.intersects(h.state.layout().search));
        let click = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: toast.x + 1,
            row: toast.y + 1,
            modifiers: KeyModifiers::NONE,
        });
        assert!(h.state.handle_terminal_event(&click, h.start).is_empty());
        assert!(!h.state.search_focused());
        assert_eq!(h.state.notifications().visible().len(), 1);
    }

    #[test]
    fn clicking_a_tab_with_menu_opens_it() {
        let mut h = harness("/");
        let rect = h.state.navbar().tab_rects()[3];
        let click = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: rect.x,
            row: rect.y,
            modifiers: KeyModifiers::NONE,
        });
        assert!(h.state.handle_terminal_event(&click, h.start).is_empty());
        assert_eq!(h.state.navbar().open_menu(), Some(3));

        let outside = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 0,
            row: 39,
            modifiers: KeyModifiers::NONE,
        });
        h.state.handle_terminal_event(&outside, h.start);
        assert_eq!(h.state.navbar().open_menu(), None);
    }
}
