use ratatui::{prelude::*, widgets::*};

use crate::app::state::PageState;
use crate::ui::components::utils::{split_horizontal, split_vertical};
use crate::ui::styles::{secondary_line, Palette};

/// Dashboard-style summary: the analytics counts plus where the user is.
pub fn render(f: &mut Frame, area: Rect, state: &PageState, palette: &Palette) {
    let rows = split_vertical(
        area,
        &[
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(0),
        ],
    );

    let heading = state.navbar().active_tab().label.clone();
    f.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(
                heading,
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            secondary_line(state.path().to_string()),
        ])
        .style(palette.base())
        .block(Block::default().padding(Padding::horizontal(1))),
        rows[0],
    );

    let cards = split_horizontal(
        rows[1],
        &[
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ],
    );
    let (total, week, today) = match state.analytics() {
        Some(snapshot) => (
            snapshot.total_items.to_string(),
            snapshot.expiring_week.to_string(),
            snapshot.expiring_today.to_string(),
        ),
        None if state.loading() => ("…".into(), "…".into(), "…".into()),
        None => ("-".into(), "-".into(), "-".into()),
    };
    render_card(f, cards[0], "Total items", total, palette.info, palette);
    render_card(f, cards[1], "Expiring this week", week, palette.warning, palette);
    render_card(f, cards[2], "Expiring today", today, palette.danger, palette);

    let mut notes = vec![secondary_line(
        "Use Tab or 1-9 to switch sections, m to open a tab's menu.",
    )];
    if let Some(at) = state.last_refresh() {
        notes.push(secondary_line(format!(
            "Last updated {}",
            at.format("%Y-%m-%d %H:%M:%S")
        )));
    }
    f.render_widget(
        Paragraph::new(notes)
            .style(palette.base())
            .block(Block::default().padding(Padding::uniform(1))),
        rows[2],
    );
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    label: &str,
    value: String,
    color: Color,
    palette: &Palette,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .title(label.to_string())
        .style(palette.base());
    f.render_widget(
        Paragraph::new(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(block),
        area,
    );
}
