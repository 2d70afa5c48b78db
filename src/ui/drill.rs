use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use suraksha::{
    content::{ScenarioStatus, StepKind},
    drill::{DrillRun, DrillSummary, StepAnswer},
};

use super::{bold, dim, truncate};
use crate::App;

pub fn render(app: &App, f: &mut Frame, area: Rect) {
    match app.drills.session.as_ref().map(|s| s.run()) {
        Some(run) => match run.summary() {
            Some(summary) => render_summary(run, summary, f, area),
            None => render_step(run, f, area),
        },
        None => render_scenarios(app, f, area),
    }
}

fn status_colour(status: ScenarioStatus) -> Color {
    match status {
        ScenarioStatus::Active => Color::Green,
        ScenarioStatus::Available => Color::Cyan,
        ScenarioStatus::Scheduled => Color::Yellow,
        ScenarioStatus::ComingSoon => Color::DarkGray,
    }
}

fn render_scenarios(app: &App, f: &mut Frame, area: Rect) {
    let cols = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let title_width = cols[0].width.saturating_sub(20) as usize;
    let items: Vec<ListItem> = app
        .content
        .scenarios
        .iter()
        .map(|s| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<w$}", truncate(&s.title, title_width), w = title_width)),
                Span::styled(
                    format!(" {}", s.status),
                    Style::default().fg(status_colour(s.status)),
                ),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(Block::bordered().title(" Virtual Drills "))
        .highlight_style(bold().fg(Color::Yellow))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.drills.cursor));
    f.render_stateful_widget(list, cols[0], &mut state);

    let Some(s) = app.selected_scenario() else {
        return;
    };
    let mut lines = vec![
        Line::from(Span::styled(s.title.clone(), bold())),
        Line::from(Span::styled(
            format!(
                "{} · {} · {} steps · {} pts · up to {}s",
                s.hazard,
                s.difficulty,
                s.steps.len(),
                s.max_points(),
                s.total_secs()
            ),
            dim(),
        )),
        Line::from(""),
        Line::from(s.description.clone()),
        Line::from(""),
        Line::from(Span::styled("Objectives", bold())),
    ];
    lines.extend(s.objectives.iter().map(|o| Line::from(format!("• {o}"))));
    lines.push(Line::from(""));
    lines.push(if s.status.is_startable() {
        Line::from(Span::styled(
            "Press enter to start.",
            Style::default().fg(Color::Green),
        ))
    } else {
        Line::from(Span::styled(
            format!("{}: not open for practice yet.", s.status),
            Style::default().fg(Color::Yellow),
        ))
    });

    f.render_widget(
        Paragraph::new(lines)
            .block(Block::bordered().title(" Scenario "))
            .wrap(Wrap { trim: true }),
        cols[1],
    );
}

fn render_step(run: &DrillRun, f: &mut Frame, area: Rect) {
    let (Some(index), Some(step), Some(secs_left)) =
        (run.current_index(), run.current_step(), run.remaining_secs())
    else {
        return;
    };
    let scenario = run.scenario();

    let rows = Layout::vertical([
        Constraint::Length(3), // title + score
        Constraint::Length(3), // countdown
        Constraint::Min(5),    // step
    ])
    .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(scenario.title.clone(), bold()),
        Span::styled(
            format!(
                "   Step {} of {}   Score {} / {}",
                index + 1,
                scenario.steps.len(),
                run.score(),
                scenario.max_points()
            ),
            dim(),
        ),
    ]))
    .block(Block::bordered());
    f.render_widget(title, rows[0]);

    let ratio = if step.time_limit_secs == 0 {
        0.0
    } else {
        secs_left as f64 / step.time_limit_secs as f64
    };
    let colour = if run.is_paused() {
        Color::DarkGray
    } else if secs_left <= 5 {
        Color::Red
    } else {
        Color::Green
    };
    let label = if run.is_paused() {
        format!("PAUSED · {secs_left}s")
    } else {
        format!("{secs_left}s")
    };
    let countdown = Gauge::default()
        .block(Block::bordered().title(" Time Remaining "))
        .gauge_style(Style::default().fg(colour))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(label);
    f.render_widget(countdown, rows[1]);

    let mut lines = vec![
        Line::from(Span::styled(format!("[{}]", step.kind), dim())),
        Line::from(Span::styled(step.instruction.clone(), bold())),
        Line::from(""),
    ];
    match step.kind {
        StepKind::Decision => {
            for (i, option) in step.options.iter().enumerate() {
                let letter = (b'a' + i as u8) as char;
                lines.push(Line::from(format!("  {letter}) {option}")));
            }
        }
        StepKind::Action | StepKind::Evacuation => {
            lines.push(Line::from(Span::styled(
                "Press space when done.",
                Style::default().fg(Color::Cyan),
            )));
        }
    }

    f.render_widget(
        Paragraph::new(lines)
            .block(Block::bordered().title(format!(" Step {} ", index + 1)))
            .wrap(Wrap { trim: true }),
        rows[2],
    );
}

fn render_summary(run: &DrillRun, summary: &DrillSummary, f: &mut Frame, area: Rect) {
    let rows = Layout::vertical([Constraint::Length(5), Constraint::Min(3)]).split(area);
    let scenario = run.scenario();

    let avg = summary
        .avg_response_secs
        .map_or_else(|| "n/a".to_string(), |s| format!("{s:.1}s"));
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{} complete", scenario.title),
            bold().fg(Color::Green),
        )),
        Line::from(Span::styled(
            format!(
                "{} / {} points ({:.0}%)",
                summary.score, summary.max_score, summary.percent
            ),
            bold(),
        )),
        Line::from(Span::styled(
            format!(
                "{} steps correct · {} timed out · average response {avg}",
                summary.steps_correct, summary.timeouts
            ),
            dim(),
        )),
    ])
    .block(Block::bordered().title(" Drill Summary "));
    f.render_widget(header, rows[0]);

    let mut lines = Vec::new();
    for (record, step) in run.records().iter().zip(&scenario.steps) {
        let (mark, colour) = match record.answer {
            StepAnswer::TimedOut => ("⏱", Color::Yellow),
            _ if record.correct => ("✓", Color::Green),
            _ => ("✗", Color::Red),
        };
        let answer = match record.answer {
            StepAnswer::Choice(i) => step.options.get(i).cloned().unwrap_or_default(),
            StepAnswer::Confirmed => "done".to_string(),
            StepAnswer::TimedOut => "no response".to_string(),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{mark} "), Style::default().fg(colour)),
            Span::styled(step.instruction.clone(), bold()),
        ]));
        lines.push(Line::from(Span::styled(
            format!(
                "   {answer} · +{} pts · {}s",
                record.points_awarded, record.secs_used
            ),
            dim(),
        )));
        if let Some(explanation) = &step.explanation {
            lines.push(Line::from(Span::styled(format!("   {explanation}"), dim())));
        }
    }

    f.render_widget(
        Paragraph::new(lines)
            .block(Block::bordered().title(" Steps "))
            .wrap(Wrap { trim: false }),
        rows[1],
    );
}
