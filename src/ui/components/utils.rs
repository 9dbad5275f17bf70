use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = split_vertical(
        r,
        &[
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ],
    );
    let horizontal = split_horizontal(
        vertical[1],
        &[
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ],
    );
    horizontal[1]
}

pub fn split_vertical(area: Rect, constraints: &[Constraint]) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints.iter().copied().collect::<Vec<_>>())
        .split(area)
        .to_vec()
}

pub fn split_horizontal(area: Rect, constraints: &[Constraint]) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints.iter().copied().collect::<Vec<_>>())
        .split(area)
        .to_vec()
}

pub fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
}

/// Fixed regions of one frame. Recomputed before every draw so hit-testing
/// and rendering agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageLayout {
    pub area: Rect,
    /// Brand line, tab row, underline row.
    pub navbar: Rect,
    pub tabs: Rect,
    pub underline: Rect,
    pub body: Rect,
    pub footer: Rect,
    /// Inventory screen: search box and items table inside `body`.
    pub search: Rect,
    pub table: Rect,
}

impl PageLayout {
    pub fn new(area: Rect) -> Self {
        let rows = split_vertical(
            area,
            &[
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ],
        );
        let (navbar, body, footer) = (rows[0], rows[1], rows[2]);
        let inner_x = navbar.x.saturating_add(1);
        let inner_width = navbar.width.saturating_sub(2);
        let tabs = Rect::new(inner_x, navbar.y.saturating_add(1), inner_width, 1)
            .intersection(navbar);
        let underline = Rect::new(inner_x, navbar.y.saturating_add(2), inner_width, 1)
            .intersection(navbar);

        let inventory = split_vertical(body, &[Constraint::Length(3), Constraint::Min(3)]);

        Self {
            area,
            navbar,
            tabs,
            underline,
            body,
            footer,
            search: inventory[0],
            table: inventory[1],
        }
    }

    /// Item rows visible in the table: borders and the header row are excluded.
    pub fn table_capacity(&self) -> usize {
        (self.table.height.saturating_sub(3) as usize).max(1)
    }

    /// Screen row of the first item in the table.
    pub fn first_table_row(&self) -> u16 {
        self.table.y.saturating_add(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_layout_stacks_navbar_body_and_footer() {
        let layout = PageLayout::new(Rect::new(0, 0, 100, 30));
        assert_eq!(layout.navbar, Rect::new(0, 0, 100, 3));
        assert_eq!(layout.tabs, Rect::new(1, 1, 98, 1));
        assert_eq!(layout.underline, Rect::new(1, 2, 98, 1));
        assert_eq!(layout.footer, Rect::new(0, 29, 100, 1));
        assert_eq!(layout.search.height, 3);
        assert_eq!(layout.table.y, 6);
        assert_eq!(layout.table_capacity(), 26 - 3 - 3);
        assert_eq!(layout.first_table_row(), 8);
    }
}
