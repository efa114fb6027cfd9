use expenses::DraftField;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::{
    app::{AppState, Focus},
    ui::theme::Theme,
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let submitter = state.tracker.submitter();
    let draft = submitter.draft();
    let errors = submitter.errors();

    let mut lines = Vec::new();
    for field in DraftField::ALL {
        let focused = state.focus.draft_field() == Some(field);
        let label_style = if focused {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim)
        };
        lines.push(Line::from(Span::styled(field.label(), label_style)));

        let value = match field {
            DraftField::Amount => draft.amount.clone(),
            DraftField::Description => draft.description.clone(),
            DraftField::Date => draft.date.clone(),
            DraftField::Category => {
                let label = draft
                    .category
                    .map(|c| state.tracker.category_label(expenses::CategoryFilter::Only(c)))
                    .unwrap_or_else(|| "Select category".to_string());
                format!("‹ {label} ›")
            }
        };
        let cursor = if focused && field != DraftField::Category {
            "▏"
        } else {
            ""
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {value}"), Style::default().fg(theme.text)),
            Span::styled(cursor, Style::default().fg(theme.accent)),
        ]));

        if let Some(message) = errors.get(&field) {
            lines.push(Line::from(Span::styled(
                format!("  {message}"),
                Style::default().fg(theme.error),
            )));
        }
        lines.push(Line::default());
    }

    let button = if submitter.is_submitting() {
        Span::styled("[ Adding... ]", Style::default().fg(theme.dim))
    } else {
        Span::styled(
            "[ Add Expense ]",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
    };
    lines.push(Line::from(button));

    let border = if matches!(
        state.focus,
        Focus::Amount | Focus::Category | Focus::Description | Focus::Date
    ) {
        theme.accent
    } else {
        theme.border
    };
    let block = Block::default()
        .title("Add Expense")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
