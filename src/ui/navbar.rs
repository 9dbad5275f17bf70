use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

use crate::config::{MenuKind, NavLink, NavTab};
use crate::ui::components::utils::contains;

const TAB_PADDING: u16 = 2;
const TAB_GAP: u16 = 1;
const MENU_INDICATOR: &str = " ▾";

/// Strip the query string and fragment from a path.
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = &path[..end];
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn match_len(candidate: &str, current: &str) -> Option<usize> {
    match candidate {
        "#" | "" => None,
        "/" => (current == "/").then_some(1),
        prefix if current.starts_with(prefix) => Some(prefix.len()),
        _ => None,
    }
}

fn best_match(tab: &NavTab, current: &str) -> Option<usize> {
    let links = tab.menu.iter().flat_map(|menu| menu.links.iter());
    std::iter::once(tab.path.as_str())
        .chain(links.map(|link| link.path.as_str()))
        .filter_map(|candidate| match_len(candidate, current))
        .max()
}

/// Pick the tab to mark active for `path`.
///
/// Longest-prefix match over each tab's path and its menu links; `/` only
/// matches itself. Without a match the stored tab path is used, then the first tab.
pub fn resolve_active(tabs: &[NavTab], path: &str, stored: Option<&str>) -> usize {
    let current = normalize_path(path);

    let mut best: Option<(usize, usize)> = None;
    for (index, tab) in tabs.iter().enumerate() {
        if let Some(len) = best_match(tab, current) {
            if best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((index, len));
            }
        }
    }

    if let Some((index, _)) = best {
        return index;
    }

    stored
        .and_then(|stored| tabs.iter().position(|tab| tab.path == stored))
        .unwrap_or(0)
}

/// Horizontal placement of the underline, relative to the nav bar's left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Underline {
    pub x: u16,
    pub width: u16,
    /// Set while the pointer hovers a tab rather than resting on the active one.
    pub emphasized: bool,
}

#[derive(Debug, Default, Clone)]
struct NavLayout {
    area: Rect,
    tabs: Vec<Rect>,
}

/// Active tab, underline, dropdown and compact-menu state for the nav bar.
#[derive(Debug)]
pub struct NavbarController {
    tabs: Vec<NavTab>,
    active: usize,
    hovered: Option<usize>,
    open_menu: Option<usize>,
    menu_cursor: usize,
    compact_open: bool,
    compact_cursor: usize,
    compact_breakpoint: u16,
    layout: NavLayout,
}

impl NavbarController {
    pub fn new(tabs: Vec<NavTab>, compact_breakpoint: u16, path: &str, stored: Option<&str>) -> Self {
        let active = resolve_active(&tabs, path, stored);
        Self {
            tabs,
            active,
            hovered: None,
            open_menu: None,
            menu_cursor: 0,
            compact_open: false,
            compact_cursor: active,
            compact_breakpoint,
            layout: NavLayout::default(),
        }
    }

    pub fn tabs(&self) -> &[NavTab] {
        &self.tabs
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_tab(&self) -> &NavTab {
        &self.tabs[self.active]
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Re-derive the active tab after the current path changed.
    pub fn sync_with_path(&mut self, path: &str, stored: Option<&str>) {
        self.active = resolve_active(&self.tabs, path, stored);
    }

    /// Mark `index` active and close every open menu. Returns the tab's path.
    pub fn select(&mut self, index: usize) -> Option<&str> {
        if index >= self.tabs.len() {
            return None;
        }
        self.active = index;
        self.close_all();
        Some(self.tabs[index].path.as_str())
    }

    /// Tab after the active one, wrapping around.
    pub fn next_index(&self) -> usize {
        (self.active + 1) % self.tabs.len().max(1)
    }

    pub fn previous_index(&self) -> usize {
        match self.active {
            0 => self.tabs.len().saturating_sub(1),
            active => active - 1,
        }
    }

    pub fn is_compact(&self, width: u16) -> bool {
        width < self.compact_breakpoint
    }

    /// Drop the compact menu once the terminal grows past the breakpoint.
    pub fn on_resize(&mut self, width: u16) {
        if !self.is_compact(width) {
            self.compact_open = false;
        }
    }

    // --- dropdowns -------------------------------------------------------

    pub fn open_menu(&self) -> Option<usize> {
        self.open_menu
    }

    pub fn menu_cursor(&self) -> usize {
        self.menu_cursor
    }

    /// Open the menu under `index`, closing any other; toggling the open one closes it.
    pub fn toggle_menu(&mut self, index: usize) -> bool {
        let has_menu = self
            .tabs
            .get(index)
            .map_or(false, |tab| tab.menu.is_some());
        if !has_menu {
            return false;
        }

        if self.open_menu == Some(index) {
            self.open_menu = None;
        } else {
            self.open_menu = Some(index);
            self.menu_cursor = 0;
            self.compact_open = false;
        }
        true
    }

    pub fn close_menus(&mut self) {
        self.open_menu = None;
    }

    pub fn close_all(&mut self) {
        self.open_menu = None;
        self.compact_open = false;
    }

    pub fn open_menu_links(&self) -> &[NavLink] {
        self.open_menu
            .and_then(|index| self.tabs[index].menu.as_ref())
            .map(|menu| menu.links.as_slice())
            .unwrap_or(&[])
    }

    pub fn move_menu_cursor(&mut self, delta: isize) {
        let len = self.open_menu_links().len();
        if len == 0 {
            return;
        }
        self.menu_cursor = (self.menu_cursor as isize + delta).rem_euclid(len as isize) as usize;
    }

    /// Choose the highlighted menu link, closing the menu. Returns the link path.
    pub fn choose_menu_link(&mut self, index: Option<usize>) -> Option<String> {
        let tab_index = self.open_menu?;
        let link_index = index.unwrap_or(self.menu_cursor);
        let path = self.open_menu_links().get(link_index)?.path.clone();
        self.active = tab_index;
        self.close_all();
        Some(path)
    }

    // --- compact menu ----------------------------------------------------

    pub fn compact_open(&self) -> bool {
        self.compact_open
    }

    pub fn compact_cursor(&self) -> usize {
        self.compact_cursor
    }

    /// Flip the compact menu; opening it closes every dropdown.
    pub fn toggle_compact(&mut self) {
        self.compact_open = !self.compact_open;
        if self.compact_open {
            self.open_menu = None;
            self.compact_cursor = self.active;
        }
    }

    pub fn move_compact_cursor(&mut self, delta: isize) {
        let len = self.tabs.len() as isize;
        self.compact_cursor = (self.compact_cursor as isize + delta).rem_euclid(len) as usize;
    }

    // --- geometry --------------------------------------------------------

    pub fn tab_label(tab: &NavTab) -> String {
        if tab.menu.is_some() {
            format!("{}{}", tab.label, MENU_INDICATOR)
        } else {
            tab.label.clone()
        }
    }

    /// Lay the tabs out left to right inside `area`; tabs that do not fit are dropped.
    pub fn layout(&mut self, area: Rect) {
        let mut rects = Vec::with_capacity(self.tabs.len());
        let mut x = area.x;
        let right = area.x.saturating_add(area.width);

        for tab in &self.tabs {
            let width = Self::tab_label(tab).width() as u16 + TAB_PADDING;
            if x.saturating_add(width) > right {
                break;
            }
            rects.push(Rect::new(x, area.y, width, area.height.min(1)));
            x = x.saturating_add(width + TAB_GAP);
        }

        self.layout = NavLayout { area, tabs: rects };
    }

    pub fn tab_rects(&self) -> &[Rect] {
        &self.layout.tabs
    }

    pub fn tab_at(&self, column: u16, row: u16) -> Option<usize> {
        self.layout
            .tabs
            .iter()
            .position(|rect| contains(*rect, column, row))
    }

    /// Track the pointer; returns true when the hovered tab changed.
    pub fn hover_at(&mut self, column: u16, row: u16) -> bool {
        let hovered = self.tab_at(column, row);
        let changed = hovered != self.hovered;
        self.hovered = hovered;
        changed
    }

    /// Underline aligned to the hovered tab, or the active tab when nothing is hovered.
    pub fn underline(&self) -> Option<Underline> {
        let (index, emphasized) = match self.hovered {
            Some(index) => (index, index != self.active),
            None => (self.active, false),
        };
        let rect = self.layout.tabs.get(index)?;
        Some(Underline {
            x: rect.x - self.layout.area.x,
            width: rect.width,
            emphasized,
        })
    }

    /// Area covered by the open dropdown or mega menu, below its tab.
    pub fn menu_rect(&self, bounds: Rect) -> Option<Rect> {
        let index = self.open_menu?;
        let tab_rect = self.layout.tabs.get(index)?;
        let menu = self.tabs[index].menu.as_ref()?;
        let widest = menu
            .links
            .iter()
            .map(|link| link.label.width() as u16)
            .max()
            .unwrap_or(0);

        let (width, height) = match menu.kind {
            MenuKind::Dropdown => (widest + 4, menu.links.len() as u16 + 2),
            MenuKind::Mega => ((widest + 3) * menu.links.len() as u16 + 1, 3),
        };

        let x = tab_rect.x.min(bounds.right().saturating_sub(width));
        let y = tab_rect.y + 2;
        Some(Rect::new(x, y, width, height).intersection(bounds))
    }

    /// Index of the open menu's link under the pointer.
    pub fn link_at(&self, column: u16, row: u16, bounds: Rect) -> Option<usize> {
        let rect = self.menu_rect(bounds)?;
        if !contains(rect, column, row) {
            return None;
        }
        let index = self.open_menu?;
        let menu = self.tabs[index].menu.as_ref()?;
        let link = match menu.kind {
            MenuKind::Dropdown => row.checked_sub(rect.y + 1)? as usize,
            MenuKind::Mega => {
                let column_width = rect.width.saturating_sub(1) / menu.links.len().max(1) as u16;
                (column.checked_sub(rect.x + 1)? / column_width.max(1)) as usize
            }
        };
        (link < menu.links.len()).then_some(link)
    }

    /// Area of the compact menu list, anchored under the nav bar's left edge.
    pub fn compact_rect(&self, bounds: Rect) -> Option<Rect> {
        if !self.compact_open {
            return None;
        }
        let widest = self
            .tabs
            .iter()
            .map(|tab| tab.label.width() as u16)
            .max()
            .unwrap_or(0);
        let rect = Rect::new(
            self.layout.area.x,
            self.layout.area.y + 2,
            widest + 6,
            self.tabs.len() as u16 + 2,
        );
        Some(rect.intersection(bounds))
    }

    pub fn compact_item_at(&self, column: u16, row: u16, bounds: Rect) -> Option<usize> {
        let rect = self.compact_rect(bounds)?;
        if !contains(rect, column, row) {
            return None;
        }
        let index = row.checked_sub(rect.y + 1)? as usize;
        (index < self.tabs.len()).then_some(index)
    }

    /// Mouse-down handling for the close-on-outside-click rule.
    /// Returns true when menus were closed.
    pub fn click_outside(&mut self, column: u16, row: u16, bounds: Rect) -> bool {
        if self.open_menu.is_none() && !self.compact_open {
            return false;
        }
        let in_nav = contains(self.layout.area, column, row);
        let in_menu = self
            .menu_rect(bounds)
            .or_else(|| self.compact_rect(bounds))
            .map_or(false, |rect| contains(rect, column, row));
        if in_nav || in_menu {
            return false;
        }
        self.close_all();
        true
    }
}
