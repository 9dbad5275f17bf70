use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Row, Table},
};

use ratatui::prelude::Stylize;

use crate::ui::styles::Palette;

pub fn build_table<'a>(
    rows: Vec<Row<'a>>,
    header: Row<'a>,
    widths: Vec<Constraint>,
    title: impl Into<String>,
    palette: &Palette,
) -> Table<'a> {
    Table::new(rows, widths)
        .header(header.style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.muted))
                .title(title.into()),
        )
        .style(palette.base())
        .column_spacing(2)
}

pub fn highlight_row<'a>(row: Row<'a>) -> Row<'a> {
    row.reversed()
}
