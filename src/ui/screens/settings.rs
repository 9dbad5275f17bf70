use ratatui::{prelude::*, widgets::*};

use crate::app::state::PageState;
use crate::ui::navigation::SettingsEntry;
use crate::ui::styles::{secondary_line, selection_style, Palette};

pub fn render(f: &mut Frame, area: Rect, state: &PageState, palette: &Palette) {
    let items: Vec<ListItem> = SettingsEntry::ALL
        .iter()
        .map(|entry| {
            let value = match entry {
                SettingsEntry::Theme => state.theme().theme().to_string(),
                SettingsEntry::Notifications => {
                    if state.notifications_enabled() { "on" } else { "off" }.to_string()
                }
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!(" {:<16}", entry.label())),
                Span::styled(value, Style::default().fg(palette.accent)),
            ]))
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(state.settings_cursor()));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.muted))
        .title("Quick Settings")
        .title(
            block::Title::from(secondary_line(" ↑/↓ choose • Enter toggle "))
                .position(block::Position::Bottom),
        )
        .style(palette.base());
    let list = List::new(items)
        .block(block)
        .highlight_style(selection_style(palette))
        .highlight_symbol("› ");
    f.render_stateful_widget(list, area, &mut list_state);
}
