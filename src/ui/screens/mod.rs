pub mod inventory;
pub mod overview;
pub mod profile;
pub mod settings;

use std::time::Instant;

use ratatui::{prelude::*, widgets::*};

use crate::app::state::PageState;
use crate::ui::components::dialog::render_modal;
use crate::ui::components::navbar::{render_nav_overlay, render_navbar};
use crate::ui::components::toasts::render_toasts;
use crate::ui::components::utils::split_horizontal;
use crate::ui::keymap;
use crate::ui::navigation::Screen;
use crate::ui::session::format_countdown;
use crate::ui::styles::Palette;

/// Draw one frame. `PageState::update_layout` must have run for this frame's size.
pub fn render(f: &mut Frame, state: &PageState, now: Instant) {
    let palette = Palette::for_theme(state.theme().theme());
    let layout = state.layout();
    f.render_widget(Block::default().style(palette.base()), layout.area);

    let compact = state.navbar().is_compact(layout.area.width);
    render_navbar(f, layout, state.navbar(), &palette, compact);

    match state.screen() {
        Screen::Overview => overview::render(f, layout.body, state, &palette),
        Screen::Inventory => inventory::render(f, state, &palette),
        Screen::Settings => settings::render(f, layout.body, state, &palette),
        Screen::Profile => profile::render(f, layout.body, state, &palette, now),
    }

    render_footer(f, layout.footer, state, &palette);
    render_nav_overlay(f, layout.area, state.navbar(), &palette);
    render_toasts(f, layout.body, state.notifications().visible(), &palette, now);

    if let Some(modal) = state.modal() {
        let countdown = state
            .session()
            .map(|session| format_countdown(session.remaining(now)));
        render_modal(f, layout.area, modal, countdown.as_deref(), &palette);
    }
}

fn render_footer(f: &mut Frame, area: Rect, state: &PageState, palette: &Palette) {
    let status = if state.loading() {
        "Loading…".to_string()
    } else {
        match state.last_refresh() {
            Some(at) => format!("Updated {}", at.format("%H:%M:%S")),
            None => String::new(),
        }
    };
    let status = format!("{status}  {} ", state.screen().title());
    let columns = split_horizontal(
        area,
        &[
            Constraint::Min(0),
            Constraint::Length(status.chars().count() as u16),
        ],
    );

    let hints = keymap::hints(state.screen() == Screen::Inventory);
    f.render_widget(
        Paragraph::new(hints).style(Style::default().fg(palette.muted).bg(palette.background)),
        columns[0],
    );
    f.render_widget(
        Paragraph::new(status)
            .alignment(Alignment::Right)
            .style(Style::default().fg(palette.accent).bg(palette.background)),
        columns[1],
    );
}
