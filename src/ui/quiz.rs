use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use suraksha::quiz::{Grade, QuizPhase, QuizRun, QuizScore};

use super::{bold, dim};
use crate::App;

const OPTION_LETTERS: [char; 4] = ['a', 'b', 'c', 'd'];
/// Prompt, answers, explanation and a blank separator.
const REVIEW_LINES_PER_ITEM: usize = 4;

/// Last scroll position of the review list that still shows a line.
pub fn max_review_offset(run: &QuizRun) -> usize {
    (run.questions().len() * REVIEW_LINES_PER_ITEM).saturating_sub(1)
}

pub fn render(app: &App, f: &mut Frame, area: Rect) {
    match app.quiz.run.as_ref() {
        Some(run) => match run.phase() {
            QuizPhase::InProgress { .. } => render_question(run, f, area),
            QuizPhase::Completed(score) => {
                render_results(run, score, app.quiz.review_offset, f, area)
            }
            QuizPhase::NotStarted => render_categories(app, f, area),
        },
        None => render_categories(app, f, area),
    }
}

fn render_categories(app: &App, f: &mut Frame, area: Rect) {
    let rows = Layout::vertical([Constraint::Min(4), Constraint::Length(3)]).split(area);

    let all = app.content.questions.len();
    let mut items = vec![ListItem::new(Line::from(vec![
        Span::styled("All Categories", bold()),
        Span::styled(format!("  {all} questions"), dim()),
    ]))];
    items.extend(app.content.categories.iter().map(|c| {
        let count = app.content.questions_in(Some(&c.id)).len();
        ListItem::new(vec![
            Line::from(vec![
                Span::styled(c.name.clone(), bold()),
                Span::styled(format!("  {count} questions · {}", c.difficulty), dim()),
            ]),
            Line::from(Span::styled(format!("  {}", c.description), dim())),
        ])
    }));

    let list = List::new(items)
        .block(Block::bordered().title(" Choose a Quiz "))
        .highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.quiz.cursor));
    f.render_stateful_widget(list, rows[0], &mut state);

    let selected = app.selected_category().map(|c| c.id.as_str());
    let n = app.content.questions_in(selected).len();
    let estimate = QuizRun::new(app.content.questions_in(selected)).estimated_minutes();
    let info = Paragraph::new(Line::from(vec![
        Span::raw(format!("{n} questions · about {estimate} min · ")),
        Span::styled(
            format!("shuffle {}", if app.quiz.shuffle { "ON" } else { "OFF" }),
            bold(),
        ),
    ]))
    .block(Block::bordered());
    f.render_widget(info, rows[1]);
}

fn render_question(run: &QuizRun, f: &mut Frame, area: Rect) {
    let (Some(index), Some(question)) = (run.current_index(), run.current_question()) else {
        return;
    };
    let total = run.questions().len();

    let rows = Layout::vertical([
        Constraint::Length(3), // progress
        Constraint::Min(6),    // question
        Constraint::Length(2), // hint
    ])
    .split(area);

    let gauge = Gauge::default()
        .block(Block::bordered().title(format!(" Question {} of {} ", index + 1, total)))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio((run.progress_percent() / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}% complete", run.progress_percent()));
    f.render_widget(gauge, rows[0]);

    let chosen = run.current_answer();
    let mut lines = vec![
        Line::from(Span::styled(question.prompt.clone(), bold())),
        Line::from(Span::styled(
            format!("{} · {} · {} pts", question.category, question.difficulty, question.points),
            dim(),
        )),
        Line::from(""),
    ];
    for (i, option) in question.options.iter().enumerate() {
        let letter = OPTION_LETTERS.get(i).copied().unwrap_or('?');
        let style = if chosen == Some(i) {
            bold().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let marker = if chosen == Some(i) { "●" } else { "○" };
        lines.push(Line::from(Span::styled(
            format!("{marker} {letter}) {option}"),
            style,
        )));
    }

    f.render_widget(
        Paragraph::new(lines)
            .block(Block::bordered())
            .wrap(Wrap { trim: true }),
        rows[1],
    );

    let hint = if !run.is_current_open() {
        "Answer locked. Press enter to move forward."
    } else if chosen.is_none() {
        "Select an answer to continue."
    } else if run.is_last_question() {
        "Press enter to submit the quiz."
    } else {
        "Press enter for the next question."
    };
    f.render_widget(
        Paragraph::new(Span::styled(hint, dim().add_modifier(Modifier::ITALIC))),
        rows[2],
    );
}

fn render_results(run: &QuizRun, score: &QuizScore, offset: usize, f: &mut Frame, area: Rect) {
    let rows = Layout::vertical([Constraint::Length(5), Constraint::Min(3)]).split(area);

    let grade = score.grade();
    let colour = match grade {
        Grade::Excellence => Color::Green,
        Grade::WellDone => Color::Yellow,
        Grade::KeepLearning => Color::Red,
    };
    let header = Paragraph::new(vec![
        Line::from(Span::styled(grade.to_string(), bold().fg(colour))),
        Line::from(Span::styled(
            format!(
                "{:.0}%  ·  {} of {} correct  ·  {} points",
                score.percent, score.correct, score.total, score.points
            ),
            bold(),
        )),
        Line::from(Span::styled(grade.message(), dim())),
    ])
    .block(Block::bordered().title(" Quiz Results "));
    f.render_widget(header, rows[0]);

    let mut lines = Vec::new();
    for (i, item) in run.review().into_iter().enumerate() {
        let (mark, style) = if item.correct {
            ("✓", Style::default().fg(Color::Green))
        } else {
            ("✗", Style::default().fg(Color::Red))
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{mark} "), style),
            Span::styled(format!("{}. {}", i + 1, item.question.prompt), bold()),
        ]));
        lines.push(Line::from(format!(
            "   Your answer: {}   Correct: {}",
            item.chosen.unwrap_or("none"),
            item.question.correct_option()
        )));
        lines.push(Line::from(Span::styled(
            format!("   {}", item.question.explanation),
            dim(),
        )));
        lines.push(Line::from(""));
    }

    let review = Paragraph::new(lines)
        .block(Block::bordered().title(" Review "))
        .wrap(Wrap { trim: false })
        .scroll((offset.min(max_review_offset(run)) as u16, 0));
    f.render_widget(review, rows[1]);
}
