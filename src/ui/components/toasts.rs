use std::time::Instant;

use ratatui::{prelude::*, widgets::*};

use super::utils::contains;
use crate::ui::notifications::{Toast, ToastId};
use crate::ui::styles::Palette;

const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 3;
const CLOSE_GLYPH: &str = "[x]";

/// Stack the toasts down the top-right corner of `body`; toasts that do not fit are not drawn.
pub fn toast_rects(body: Rect, count: usize) -> Vec<Rect> {
    let width = TOAST_WIDTH.min(body.width);
    let x = body.right().saturating_sub(width);
    let fit = (body.height / TOAST_HEIGHT) as usize;

    (0..count.min(fit))
        .map(|index| Rect::new(x, body.y + index as u16 * TOAST_HEIGHT, width, TOAST_HEIGHT))
        .collect()
}

/// The `[x]` in a toast's top border.
pub fn close_glyph_rect(toast: Rect) -> Rect {
    let width = CLOSE_GLYPH.len() as u16;
    Rect::new(toast.right().saturating_sub(width + 1), toast.y, width, 1)
}

/// What a pointer press lands on within the toast stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastHit {
    Close(ToastId),
    Body,
}

/// Toast under the pointer. Toasts sit above the page, so any hit is theirs.
pub fn toast_at(body: Rect, toasts: &[Toast], column: u16, row: u16) -> Option<ToastHit> {
    let (rect, toast) = toast_rects(body, toasts.len())
        .into_iter()
        .zip(toasts)
        .find(|(rect, _)| contains(*rect, column, row))?;
    if contains(close_glyph_rect(rect), column, row) {
        Some(ToastHit::Close(toast.id))
    } else {
        Some(ToastHit::Body)
    }
}

pub fn render_toasts(f: &mut Frame, body: Rect, toasts: &[Toast], palette: &Palette, now: Instant) {
    for (rect, toast) in toast_rects(body, toasts.len()).into_iter().zip(toasts) {
        let color = palette.severity(toast.severity);
        let mut style = Style::default().fg(color).bg(palette.surface);
        if toast.is_fading(now) {
            style = style.add_modifier(Modifier::DIM);
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(toast.created.format(" %H:%M:%S ").to_string())
            .title(block::Title::from(CLOSE_GLYPH).alignment(Alignment::Right));
        let text = Line::from(vec![
            Span::styled(format!("{} ", toast.severity.icon()), style.add_modifier(Modifier::BOLD)),
            Span::styled(toast.message.clone(), style.fg(palette.foreground)),
        ]);

        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(text).style(style).block(block).wrap(Wrap { trim: true }),
            rect,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::ui::notifications::{NotificationCenter, Severity};

    #[test]
    fn toasts_stack_in_the_top_right_corner() {
        let body = Rect::new(0, 3, 100, 10);
        let rects = toast_rects(body, 5);
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0], Rect::new(56, 3, 44, 3));
        assert_eq!(rects[1].y, 6);
    }

    #[test]
    fn close_glyph_hit_identifies_the_toast() {
        let now = Instant::now();
        let mut center = NotificationCenter::new(Duration::from_secs(4));
        center.notify("first", Severity::Info, now);
        let second = center.notify("second", Severity::Error, now);

        let body = Rect::new(0, 3, 100, 20);
        let glyph = close_glyph_rect(toast_rects(body, 2)[1]);
        assert_eq!(
            toast_at(body, center.visible(), glyph.x, glyph.y),
            Some(ToastHit::Close(second))
        );
        assert_eq!(toast_at(body, center.visible(), 0, 0), None);
    }

    #[test]
    fn toast_body_is_a_hit_without_closing() {
        let now = Instant::now();
        let mut center = NotificationCenter::new(Duration::from_secs(4));
        center.notify("only", Severity::Info, now);

        let body = Rect::new(0, 3, 100, 20);
        let rect = toast_rects(body, 1)[0];
        assert_eq!(
            toast_at(body, center.visible(), rect.x + 1, rect.y + 1),
            Some(ToastHit::Body)
        );
        assert_eq!(toast_at(body, center.visible(), rect.x - 1, rect.y + 1), None);
    }
}
