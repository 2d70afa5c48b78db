use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use suraksha::progress;

use super::{bar, bold, dim, truncate};
use crate::App;

pub fn render(app: &App, f: &mut Frame, area: Rect) {
    let modules = &app.content.modules;
    let summary = progress::summarize(modules);

    let rows = Layout::vertical([
        Constraint::Length(3), // overall gauge
        Constraint::Length(3), // counts
        Constraint::Min(4),    // list + detail
    ])
    .split(area);

    let gauge = Gauge::default()
        .block(Block::bordered().title(" Overall Progress "))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio((summary.average_progress / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}%", summary.average_progress));
    f.render_widget(gauge, rows[0]);

    let counts = Paragraph::new(Line::from(vec![
        Span::styled(format!("{} modules", summary.module_count), bold()),
        Span::raw(format!(
            "  ·  {} completed  ·  {} in progress  ·  {} not started  ·  {} lessons  ·  {} min",
            summary.completed,
            summary.in_progress,
            summary.not_started,
            summary.total_lessons,
            summary.total_minutes
        )),
    ]))
    .block(Block::bordered());
    f.render_widget(counts, rows[1]);

    let cols = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[2]);

    let visible = progress::filter_by_category(modules, app.learning.filter.as_deref());
    let title_width = cols[0].width.saturating_sub(22) as usize;
    let items: Vec<ListItem> = visible
        .iter()
        .map(|m| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<w$}", truncate(&m.title, title_width), w = title_width)),
                Span::styled(format!(" {} ", bar(m.progress as f64)), Style::default().fg(Color::Green)),
                Span::raw(format!("{:>3}%", m.progress)),
            ]))
        })
        .collect();

    let filter_label = app.learning.filter.as_deref().unwrap_or("All Categories");
    let list = List::new(items)
        .block(Block::bordered().title(format!(" Modules: {filter_label} ")))
        .highlight_style(bold().fg(Color::Yellow))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.learning.cursor));
    f.render_stateful_widget(list, cols[0], &mut state);

    let detail = match visible.get(app.learning.cursor) {
        Some(m) => {
            let mut lines = vec![
                Line::from(Span::styled(m.title.clone(), bold())),
                Line::from(Span::styled(
                    format!(
                        "{} · {} · {} lessons · {} min",
                        m.category, m.difficulty, m.lessons, m.duration_minutes
                    ),
                    dim(),
                )),
                Line::from(""),
                Line::from(m.description.clone()),
                Line::from(""),
            ];
            lines.extend(m.topics.iter().map(|t| Line::from(format!("• {t}"))));
            lines
        }
        None => vec![Line::from(Span::styled("No modules in this category.", dim()))],
    };
    let by_category = progress::by_category(modules);
    let footer = format!(" {} categories ", by_category.len());
    f.render_widget(
        Paragraph::new(detail)
            .block(Block::bordered().title(" Module ").title_bottom(footer))
            .wrap(Wrap { trim: true }),
        cols[1],
    );
}
