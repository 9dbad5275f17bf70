use ratatui::{prelude::*, widgets::*};

use super::utils::centered_rect;
use crate::ui::modal::{EditField, Modal, QuantityEdit};
use crate::ui::styles::Palette;

/// Draw `modal` centred over `area`. `countdown` feeds the session warning.
pub fn render_modal(
    f: &mut Frame,
    area: Rect,
    modal: &Modal,
    countdown: Option<&str>,
    palette: &Palette,
) {
    let rect = centered_rect(50, 40, area);
    let border = match modal {
        Modal::SessionWarning => palette.warning,
        Modal::Confirm { .. } | Modal::Logout => palette.danger,
        Modal::QuantityEdit(_) => palette.accent,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(format!(" {} ", modal.title()))
        .style(Style::default().fg(palette.foreground).bg(palette.surface));

    let lines = match modal {
        Modal::Confirm { prompt, .. } => vec![
            Line::from(prompt.clone()),
            Line::default(),
            hint_line("y/Enter confirm • n/Esc cancel", palette),
        ],
        Modal::QuantityEdit(edit) => quantity_lines(edit, palette),
        Modal::SessionWarning => vec![
            Line::from("Your session is about to expire due to inactivity."),
            Line::default(),
            Line::from(vec![
                Span::raw("Logging out in "),
                Span::styled(
                    countdown.unwrap_or("0:00").to_string(),
                    Style::default()
                        .fg(palette.warning)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::default(),
            hint_line("Enter/e stay signed in • l log out", palette),
        ],
        Modal::Logout => vec![
            Line::from("Are you sure you want to log out?"),
            Line::default(),
            hint_line("y/Enter log out • n/Esc cancel", palette),
        ],
    };

    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rect,
    );
}

fn quantity_lines(edit: &QuantityEdit, palette: &Palette) -> Vec<Line<'static>> {
    let field = |label: &str, value: &str, focused: bool| {
        let style = if focused {
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.foreground)
        };
        let cursor = if focused { "▏" } else { "" };
        Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().fg(palette.muted)),
            Span::styled(format!("{value}{cursor}"), style),
        ])
    };

    vec![
        Line::from(Span::styled(
            edit.item.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        field("Quantity", &edit.quantity, edit.focus == EditField::Quantity),
        field("Notes", &edit.notes, edit.focus == EditField::Notes),
        Line::default(),
        hint_line("Tab switch field • Enter save • Esc cancel", palette),
    ]
}

fn hint_line(text: &str, palette: &Palette) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(palette.muted),
    ))
}
