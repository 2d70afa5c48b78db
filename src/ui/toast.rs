use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Wrap},
    Frame,
};

use suraksha::notify::{NoticeKind, ToastQueue};

use super::bold;

const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 4;

/// Stack toasts in the bottom-right corner, newest at the bottom.
pub fn render(toasts: &ToastQueue, f: &mut Frame, area: Rect) {
    if toasts.is_empty() || area.width < TOAST_WIDTH + 2 {
        return;
    }

    let mut y = area.bottom().saturating_sub(1 + TOAST_HEIGHT * toasts.len() as u16);
    for toast in toasts.iter() {
        if y + TOAST_HEIGHT > area.bottom() {
            break;
        }
        let rect = Rect::new(area.right() - TOAST_WIDTH - 1, y, TOAST_WIDTH, TOAST_HEIGHT);
        let colour = match toast.kind {
            NoticeKind::Success => Color::Green,
            NoticeKind::Warning => Color::Yellow,
            NoticeKind::Error => Color::Red,
        };
        let widget = Paragraph::new(Line::from(toast.description.as_str()))
            .block(
                Block::bordered()
                    .border_style(Style::default().fg(colour))
                    .title(Span::styled(format!(" {} ", toast.title), bold().fg(colour))),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, rect);
        f.render_widget(widget, rect);
        y += TOAST_HEIGHT;
    }
}
