use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use suraksha::{
    auth::AuthProvider,
    history::{HistorySummary, RunKind},
};

use super::{bold, dim};
use crate::App;

pub fn render(app: &App, f: &mut Frame, area: Rect) {
    let rows = Layout::vertical([Constraint::Length(7), Constraint::Min(4)]).split(area);

    let account = match (app.profile.current_user(), app.profile_input.as_deref()) {
        (_, Some(input)) => vec![
            Line::from(Span::styled("Sign in", bold())),
            Line::from(""),
            Line::from(vec![
                Span::raw("Name: "),
                Span::styled(format!("{input}▏"), Style::default().fg(Color::Yellow)),
            ]),
        ],
        (Some(user), None) => vec![
            Line::from(vec![
                Span::styled(format!("[{}] ", user.initials()), bold().fg(Color::Cyan)),
                Span::styled(user.display_name.clone(), bold()),
            ]),
            Line::from(Span::styled(
                user.school.clone().unwrap_or_else(|| "No school set".into()),
                dim(),
            )),
            Line::from(Span::styled(format!("id: {}", user.id), dim())),
        ],
        (None, None) => vec![
            Line::from(Span::styled("Not signed in", bold())),
            Line::from(Span::styled(
                "Press enter to sign in with your name.",
                dim(),
            )),
        ],
    };
    f.render_widget(
        Paragraph::new(account).block(Block::bordered().title(" Profile ")),
        rows[0],
    );

    let lines = match &app.history {
        None => vec![Line::from(Span::styled("History is off.", dim()))],
        Some(db) => [RunKind::Quiz, RunKind::Drill]
            .into_iter()
            .map(|kind| match db.summary(kind) {
                Ok(summary) => summary_line(kind, &summary),
                Err(_) => Line::from(format!("{kind}: unavailable")),
            })
            .collect(),
    };
    f.render_widget(
        Paragraph::new(lines).block(Block::bordered().title(" Your Record ")),
        rows[1],
    );
}

fn summary_line(kind: RunKind, summary: &HistorySummary) -> Line<'static> {
    if summary.runs == 0 {
        return Line::from(vec![
            Span::styled(format!("{kind:<6}"), bold()),
            Span::styled("no runs yet", dim()),
        ]);
    }
    Line::from(vec![
        Span::styled(format!("{kind:<6}"), bold()),
        Span::raw(format!(
            "{} runs · best {:.0}% · average {:.0}%",
            summary.runs,
            summary.best_percent.unwrap_or(0.0),
            summary.average_percent.unwrap_or(0.0)
        )),
    ])
}
