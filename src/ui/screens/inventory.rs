use ratatui::{prelude::*, widgets::*};
use unicode_width::UnicodeWidthStr;

use crate::api::GroceryItem;
use crate::app::state::PageState;
use crate::config::SearchMode;
use crate::ui::components::{build_table, highlight_row};
use crate::ui::modal::format_quantity;
use crate::ui::styles::Palette;

/// Search box plus the items table, with the cursor row reversed.
pub fn render(f: &mut Frame, state: &PageState, palette: &Palette) {
    let layout = state.layout();
    render_search(f, layout.search, state, palette);

    let items = state.items();
    if items.is_empty() {
        let message = if state.loading() {
            "Loading items..."
        } else {
            "No items found"
        };
        f.render_widget(
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .style(Style::default().fg(palette.muted))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(palette.muted))
                        .title("Groceries"),
                ),
            layout.table,
        );
        return;
    }

    let capacity = layout.table_capacity();
    let offset = state.offset().min(items.len());
    let visible_end = (offset + capacity).min(items.len());
    let rows: Vec<Row> = items[offset..visible_end]
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let row = item_row(item, state.selection().contains(&item.id), palette);
            if offset + i == state.cursor() {
                highlight_row(row)
            } else {
                row
            }
        })
        .collect();

    let name_width = items
        .iter()
        .map(|item| item.name.width())
        .max()
        .unwrap_or(0)
        .max("Name".len()) as u16;
    let widths = vec![
        Constraint::Length(2),
        Constraint::Length(name_width.min(32)),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Min(10),
    ];
    let header = Row::new(vec!["", "Name", "Category", "Quantity", "Price", "Expires"]);

    let mut title = format!(
        "Groceries ({} items, {}-{})",
        items.len(),
        offset + 1,
        visible_end
    );
    if !state.selection().is_empty() {
        title.push_str(&format!(" • {} selected", state.selection().len()));
    }

    f.render_widget(build_table(rows, header, widths, title, palette), layout.table);
}

fn item_row<'a>(item: &'a GroceryItem, selected: bool, palette: &Palette) -> Row<'a> {
    let quantity = if item.unit.is_empty() {
        format_quantity(item.quantity)
    } else {
        format!("{} {}", format_quantity(item.quantity), item.unit)
    };
    let price = item
        .price
        .map(|price| format!("{price:.2}"))
        .unwrap_or_else(|| "-".to_string());
    let expires = item.expiry_date.as_deref().unwrap_or("-");

    let mark = if selected {
        Cell::from("✓").style(Style::default().fg(palette.success))
    } else {
        Cell::from(" ")
    };
    Row::new(vec![
        mark,
        Cell::from(item.name.as_str()),
        Cell::from(item.category.as_str()),
        Cell::from(quantity),
        Cell::from(price),
        Cell::from(expires),
    ])
}

fn render_search(f: &mut Frame, area: Rect, state: &PageState, palette: &Palette) {
    let focused = state.search_focused();
    let border = if focused { palette.accent } else { palette.muted };
    let mode = match state.search_mode() {
        SearchMode::Navigate => "",
        SearchMode::Fetch => " (live)",
    };
    let title = if state.search().is_pending() {
        format!("Search{mode} …")
    } else {
        format!("Search{mode}")
    };

    let value = state.search().value();
    let line = if value.is_empty() && !focused {
        Line::from(Span::styled(
            "Press / to search groceries",
            Style::default().fg(palette.muted),
        ))
    } else {
        let cursor = if focused { "▏" } else { "" };
        Line::from(format!("{value}{cursor}"))
    };

    f.render_widget(
        Paragraph::new(line).style(palette.base()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title),
        ),
        area,
    );
}
