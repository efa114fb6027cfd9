use expenses::{NoticeLevel, Notices};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::theme::Theme;

/// Stacks visible notices in the bottom-right corner of `area`.
pub fn render(frame: &mut Frame<'_>, area: Rect, notices: &Notices, theme: &Theme) {
    let height = 3u16;
    let mut bottom = area.y + area.height;

    for notice in notices.iter() {
        if bottom < area.y + height {
            break;
        }
        let width = (notice.message.chars().count() + 4).min(area.width as usize) as u16;
        let rect = Rect {
            x: area.x + area.width.saturating_sub(width),
            y: bottom - height,
            width,
            height,
        };
        bottom -= height;

        let style = match notice.level {
            NoticeLevel::Success => Style::default().fg(theme.positive),
            NoticeLevel::Error => Style::default().fg(theme.error),
        };
        let block = Block::default().borders(Borders::ALL).border_style(style);
        let content = Paragraph::new(Line::from(notice.message.as_str())).style(style);
        frame.render_widget(Clear, rect);
        frame.render_widget(content.block(block), rect);
    }
}
