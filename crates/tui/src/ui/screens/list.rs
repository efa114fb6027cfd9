use expenses::view::{EMPTY_STATE, ListView, Summary, category_breakdown};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::{
    app::{AppState, Focus},
    ui::{components::money, theme::Theme},
};

const BAR_WIDTH: usize = 16;

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let view = state.tracker.view();
    let breakdown = category_breakdown(&view.result.expenses);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                              // Filters
            Constraint::Length(3),                              // Summary
            Constraint::Length(breakdown.len().min(4) as u16 + 2), // Breakdown
            Constraint::Min(0),                                 // List
        ])
        .split(area);

    render_filters(frame, layout[0], state, theme);
    render_summary(frame, layout[1], state, theme);
    render_breakdown(frame, layout[2], state, &breakdown, theme);
    render_list(frame, layout[3], state, theme);
}

fn render_filters(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let filter = state.tracker.filter();
    let selector = |label: String, focused: bool| {
        let style = if focused {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        Span::styled(format!("‹ {label} ›"), style)
    };

    let line = Line::from(vec![
        Span::styled("Category", Style::default().fg(theme.dim)),
        Span::raw(": "),
        selector(
            state.tracker.category_label(filter.category),
            state.focus == Focus::FilterCategory,
        ),
        Span::raw("   "),
        Span::styled("Sort", Style::default().fg(theme.dim)),
        Span::raw(": "),
        selector(
            filter.sort.label().to_string(),
            state.focus == Focus::FilterSort,
        ),
    ]);

    let block = Block::default().borders(Borders::ALL).title("Filters");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_summary(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let summary = Summary::of(&state.tracker.view().result);
    let line = Line::from(vec![
        Span::raw("Total Expenses: "),
        money::styled_amount_bold(summary.total, theme),
        Span::raw("   "),
        Span::styled(summary.count_line(), Style::default().fg(theme.text)),
        Span::raw("   "),
        Span::styled(summary.average_line(), Style::default().fg(theme.dim)),
    ]);
    let block = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_breakdown(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    breakdown: &[(api_types::category::Category, api_types::Amount)],
    theme: &Theme,
) {
    let shown = state.tracker.view().result.total;
    let lines: Vec<Line> = breakdown
        .iter()
        .take(4)
        .map(|(category, amount)| {
            let filled = (money::ratio(*amount, shown) * BAR_WIDTH as f64).round() as usize;
            Line::from(vec![
                Span::styled(
                    format!("{:<14}", category.label()),
                    Style::default().fg(theme.dim),
                ),
                Span::styled("█".repeat(filled), Style::default().fg(theme.accent)),
                Span::raw(" ".repeat(BAR_WIDTH - filled.min(BAR_WIDTH) + 1)),
                money::styled_amount(*amount, theme),
            ])
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title("By Category");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_list(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let block = Block::default().borders(Borders::ALL).title("Expenses");

    let rows = match ListView::of(state.tracker.view()) {
        ListView::Loading => {
            let loading = Paragraph::new(Line::from(Span::styled(
                "Loading expenses...",
                Style::default().fg(theme.dim),
            )));
            frame.render_widget(loading.block(block), area);
            return;
        }
        ListView::Empty => {
            let empty = Paragraph::new(Line::from(Span::styled(
                EMPTY_STATE,
                Style::default().fg(theme.dim),
            )));
            frame.render_widget(empty.block(block), area);
            return;
        }
        ListView::Table(rows) => rows,
    };

    let header = Row::new(["Date", "Category", "Description", "Amount"])
        .style(Style::default().fg(theme.dim).add_modifier(Modifier::BOLD));
    let rows = rows.into_iter().map(|row| {
        Row::new([
            Cell::from(row.date),
            Cell::from(row.category),
            Cell::from(row.description),
            Cell::from(Line::from(row.amount).right_aligned()),
        ])
        .style(Style::default().fg(theme.text))
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(13),
            Constraint::Length(14),
            Constraint::Min(10),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}
