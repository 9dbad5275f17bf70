use ratatui::{prelude::*, widgets::*};

use super::utils::PageLayout;
use crate::config::MenuKind;
use crate::ui::navbar::NavbarController;
use crate::ui::styles::Palette;

const BRAND: &str = " Grocery Tracker ";
const HAMBURGER: &str = "☰";

/// Brand line, tab row and the underline drawn over the bottom border.
pub fn render_navbar(
    f: &mut Frame,
    layout: &PageLayout,
    navbar: &NavbarController,
    palette: &Palette,
    compact: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.muted))
        .title(Span::styled(
            BRAND,
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .style(palette.base());
    f.render_widget(block, layout.navbar);

    if compact {
        let label = format!(
            "{HAMBURGER} {}",
            NavbarController::tab_label(navbar.active_tab())
        );
        let style = if navbar.compact_open() {
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.foreground)
        };
        f.render_widget(Paragraph::new(Span::styled(label, style)), layout.tabs);
        return;
    }

    for (index, rect) in navbar.tab_rects().iter().enumerate() {
        let tab = &navbar.tabs()[index];
        let mut style = Style::default().fg(palette.foreground);
        if index == navbar.active_index() {
            style = style.fg(palette.accent).add_modifier(Modifier::BOLD);
        }
        if navbar.hovered() == Some(index) || navbar.open_menu() == Some(index) {
            style = style.bg(palette.surface);
        }
        let label = format!(" {} ", NavbarController::tab_label(tab));
        f.render_widget(Paragraph::new(Span::styled(label, style)), *rect);
    }

    if let Some(underline) = navbar.underline() {
        let x = layout.underline.x.saturating_add(underline.x);
        let width = underline
            .width
            .min(layout.underline.right().saturating_sub(x));
        let glyph = if underline.emphasized { "━" } else { "─" };
        let rect = Rect::new(x, layout.underline.y, width, 1);
        f.render_widget(
            Paragraph::new(glyph.repeat(width as usize)).style(
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            rect,
        );
    }
}

/// Open dropdown, mega menu or compact menu, drawn over the page body.
pub fn render_nav_overlay(f: &mut Frame, bounds: Rect, navbar: &NavbarController, palette: &Palette) {
    if let (Some(index), Some(rect)) = (navbar.open_menu(), navbar.menu_rect(bounds)) {
        let Some(menu) = navbar.tabs()[index].menu.as_ref() else {
            return;
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .style(Style::default().fg(palette.foreground).bg(palette.surface));
        f.render_widget(Clear, rect);

        match menu.kind {
            MenuKind::Dropdown => {
                let items: Vec<ListItem> = menu
                    .links
                    .iter()
                    .map(|link| ListItem::new(format!(" {}", link.label)))
                    .collect();
                let mut list_state = ListState::default();
                list_state.select(Some(navbar.menu_cursor()));
                let list = List::new(items)
                    .block(block)
                    .highlight_style(link_highlight(palette));
                f.render_stateful_widget(list, rect, &mut list_state);
            }
            MenuKind::Mega => {
                let inner = block.inner(rect);
                f.render_widget(block, rect);
                let column_width = rect.width.saturating_sub(1) / menu.links.len().max(1) as u16;
                for (offset, link) in menu.links.iter().enumerate() {
                    let x = inner.x + offset as u16 * column_width;
                    let cell = Rect::new(x, inner.y, column_width, 1).intersection(inner);
                    let style = if offset == navbar.menu_cursor() {
                        link_highlight(palette)
                    } else {
                        Style::default()
                    };
                    f.render_widget(
                        Paragraph::new(Span::styled(format!(" {}", link.label), style)),
                        cell,
                    );
                }
            }
        }
        return;
    }

    if let Some(rect) = navbar.compact_rect(bounds) {
        let items: Vec<ListItem> = navbar
            .tabs()
            .iter()
            .enumerate()
            .map(|(index, tab)| {
                let marker = if index == navbar.active_index() { "●" } else { " " };
                ListItem::new(format!(" {marker} {}", tab.label))
            })
            .collect();
        let mut list_state = ListState::default();
        list_state.select(Some(navbar.compact_cursor()));
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.accent))
                    .style(Style::default().fg(palette.foreground).bg(palette.surface)),
            )
            .highlight_style(link_highlight(palette));
        f.render_widget(Clear, rect);
        f.render_stateful_widget(list, rect, &mut list_state);
    }
}

fn link_highlight(palette: &Palette) -> Style {
    Style::default()
        .fg(palette.background)
        .bg(palette.accent)
        .add_modifier(Modifier::BOLD)
}
