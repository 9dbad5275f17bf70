use std::time::Instant;

use ratatui::{prelude::*, widgets::*};

use crate::app::state::PageState;
use crate::storage::ACTIVE_TAB_KEY;
use crate::ui::session::{format_countdown, SessionState};
use crate::ui::styles::Palette;

/// Account summary: server, session status and stored preferences.
pub fn render(f: &mut Frame, area: Rect, state: &PageState, palette: &Palette, now: Instant) {
    let label = |text: &str| Span::styled(format!("{text:<18}"), Style::default().fg(palette.muted));

    let session = match state.session() {
        None => "not signed in".to_string(),
        Some(monitor) => match monitor.state() {
            SessionState::Active => format!(
                "active, logout in {}",
                format_countdown(monitor.remaining(now))
            ),
            SessionState::WarningShown => format!(
                "expiring in {}",
                format_countdown(monitor.remaining(now))
            ),
            SessionState::LoggedOut => "expired".to_string(),
        },
    };
    let stored_tab = state
        .preferences()
        .get(ACTIVE_TAB_KEY)
        .unwrap_or("-")
        .to_string();

    let lines = vec![
        Line::from(vec![label("Server"), Span::raw(state.preferences().origin().to_string())]),
        Line::from(vec![label("Session"), Span::raw(session)]),
        Line::from(vec![
            label("CSRF token"),
            Span::raw(if state.csrf_ready() { "ready" } else { "missing" }),
        ]),
        Line::from(vec![label("Theme"), Span::raw(state.theme().theme().to_string())]),
        Line::from(vec![label("Last tab"), Span::raw(stored_tab)]),
        Line::default(),
        Line::from(Span::styled(
            "Ctrl+L to log out",
            Style::default().fg(palette.muted),
        )),
    ];

    f.render_widget(
        Paragraph::new(lines).style(palette.base()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.muted))
                .title("Profile")
                .padding(Padding::horizontal(1)),
        ),
        area,
    );
}
