use chrono::Local;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, List, ListItem, Paragraph, Wrap},
    Frame,
};

use suraksha::{auth::AuthProvider, history::humanize_since, progress};

use super::{bold, dim, truncate};
use crate::App;

pub fn render(app: &App, f: &mut Frame, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(5), // welcome
        Constraint::Length(5), // overview
        Constraint::Min(3),    // recent activity
    ])
    .split(area);

    let greeting = match app.profile.current_user() {
        Some(user) => format!("Welcome back, {}!", user.display_name),
        None => "Welcome! Sign in from the Profile tab to keep your name on the record.".into(),
    };
    let welcome = Paragraph::new(vec![
        Line::from(Span::styled(
            "Disaster preparedness for every school",
            bold().fg(Color::Cyan),
        )),
        Line::from("Learn the protocols, test yourself, then practise under the clock."),
        Line::from(Span::styled(greeting, dim())),
    ])
    .block(Block::bordered().title(" Home "))
    .wrap(Wrap { trim: true });
    f.render_widget(welcome, chunks[0]);

    render_overview(app, f, chunks[1]);
    render_recent(app, f, chunks[2]);
}

fn render_overview(app: &App, f: &mut Frame, area: Rect) {
    let cols = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
    let summary = progress::summarize(&app.content.modules);
    let startable = app.content.startable_scenarios().count();

    let cards = [
        (
            "Quiz",
            format!("{} questions", app.content.questions.len()),
            format!("{} categories", app.content.categories.len()),
        ),
        (
            "Drills",
            format!("{startable} of {} available", app.content.scenarios.len()),
            "timed, step by step".to_string(),
        ),
        (
            "Learning",
            format!("{:.0}% average progress", summary.average_progress),
            format!("{} modules", summary.module_count),
        ),
    ];

    for ((title, headline, detail), col) in cards.into_iter().zip(cols.iter()) {
        let card = Paragraph::new(vec![
            Line::from(Span::styled(headline, bold())),
            Line::from(Span::styled(detail, dim())),
        ])
        .block(Block::bordered().title(format!(" {title} ")));
        f.render_widget(card, *col);
    }
}

fn render_recent(app: &App, f: &mut Frame, area: Rect) {
    let block = Block::bordered().title(" Recent Activity ");
    if app.recent.is_empty() {
        let empty = Paragraph::new(Span::styled(
            if app.history.is_some() {
                "No completed quizzes or drills yet."
            } else {
                "History is off."
            },
            dim(),
        ))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let now = Local::now();
    let width = area.width.saturating_sub(40) as usize;
    let items: Vec<ListItem> = app
        .recent
        .iter()
        .map(|run| {
            let colour = if run.percent >= 80.0 {
                Color::Green
            } else if run.percent >= 60.0 {
                Color::Yellow
            } else {
                Color::Red
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<6}", run.kind), dim()),
                Span::raw(truncate(&run.title, width)),
                Span::styled(format!("  {:.0}%", run.percent), Style::default().fg(colour)),
                Span::styled(format!("  {}", humanize_since(run.completed_at, now)), dim()),
            ]))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}
