pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use expenses::Connection;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::AppState;

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

use components::hints::{KeyHint, hint_separator, hints_to_spans};

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::default();
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Min(0),    // Form + list
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(layout[1]);
    screens::form::render(frame, panes[0], state, &theme);
    screens::list::render(frame, panes[1], state, &theme);

    render_bottom_bar(frame, layout[2], &theme);
    components::toast::render(frame, layout[1], state.tracker.notices(), &theme);
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let (status, status_style) = match state.tracker.connection() {
        Connection::Ok => ("OK", Style::default().fg(theme.positive)),
        Connection::Down => ("ERR", Style::default().fg(theme.error)),
        Connection::Unknown => ("...", Style::default().fg(theme.dim)),
    };

    let filter = state.tracker.filter();
    let mut line = vec![
        Span::styled("API", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}  ", state.base_url)),
        Span::styled("Showing", Style::default().fg(theme.dim)),
        Span::raw(format!(
            ": {}, {}  ",
            state.tracker.category_label(filter.category),
            filter.sort.label()
        )),
        Span::styled(status, status_style),
    ];
    if state.tracker.is_busy() {
        line.push(Span::styled("  working…", Style::default().fg(theme.accent)));
    }

    frame.render_widget(Paragraph::new(Line::from(line)), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let mut parts = hints_to_spans(
        &[
            KeyHint::new("Tab", "next"),
            KeyHint::new("←→", "choose"),
            KeyHint::new("Enter", "add"),
        ],
        theme,
    );
    parts.push(hint_separator(theme));
    parts.extend(hints_to_spans(
        &[
            KeyHint::new("Ctrl+R", "refresh"),
            KeyHint::new("Esc", "dismiss"),
        ],
        theme,
    ));
    parts.push(hint_separator(theme));
    parts.extend(hints_to_spans(&[KeyHint::new("Ctrl+C", "quit")], theme));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}
