pub mod drill;
pub mod home;
pub mod learning;
pub mod profile;
pub mod quiz;
pub mod screen;
pub mod toast;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Tabs},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use suraksha::auth::AuthProvider;

use crate::{App, Route};

const HORIZONTAL_MARGIN: u16 = 2;

pub fn draw(app: &App, f: &mut Frame) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // tabs
        Constraint::Min(1),    // screen
        Constraint::Length(1), // legend
    ])
    .split(f.area());

    render_header(app, f, chunks[0]);

    let body = chunks[1].inner(Margin {
        horizontal: HORIZONTAL_MARGIN,
        vertical: 0,
    });
    screen::current_screen(&app.route).render(app, f, body);

    render_legend(app, f, chunks[2]);
    toast::render(&app.toasts, f, f.area());
}

fn render_header(app: &App, f: &mut Frame, area: Rect) {
    let titles: Vec<String> = Route::ALL
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{} {}", i + 1, r))
        .collect();

    let user = app
        .profile
        .current_user()
        .map_or_else(|| "not signed in".to_string(), |u| u.display_name.clone());

    let block = Block::bordered()
        .title(Span::styled(" Suraksha ", bold().fg(Color::Cyan)))
        .title(Line::from(format!(" {user} ")).alignment(Alignment::Right));

    let tabs = Tabs::new(titles)
        .block(block)
        .select(app.route.index())
        .highlight_style(bold().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED))
        .divider("|");

    f.render_widget(tabs, area);
}

fn render_legend(app: &App, f: &mut Frame, area: Rect) {
    let keys = match app.route {
        Route::Home => "",
        Route::Learning => "(f)ilter category / (↑↓) select",
        Route::Quiz => match app.quiz.run.as_ref().map(|r| r.phase()) {
            Some(suraksha::quiz::QuizPhase::InProgress { .. }) => {
                "(a-d) answer / (enter) next / (←) previous / (esc) abandon"
            }
            Some(suraksha::quiz::QuizPhase::Completed(_)) => {
                "(r)etake / (↑↓) scroll review / (esc) categories"
            }
            _ => "(↑↓) category / (s)huffle / (enter) start",
        },
        Route::Drills => match app.drills.session.as_ref().map(|s| s.run()) {
            Some(run) if run.is_completed() => "(r)estart / (esc) scenarios",
            Some(_) => "(a-d) choose / (space) confirm / (p)ause / (x) stop",
            None => "(↑↓) scenario / (enter) start",
        },
        Route::Profile if app.profile_input.is_some() => "(enter) sign in / (esc) cancel",
        Route::Profile => "(o) sign out / (enter) sign in / (c) clear history",
    };

    let legend = Paragraph::new(Span::styled(
        format!(" {keys}  (tab) switch / (q)uit"),
        Style::default().add_modifier(Modifier::ITALIC),
    ));
    f.render_widget(legend, area);
}

pub(crate) fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub(crate) fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

/// Cut `text` to at most `width` terminal columns, ending in an ellipsis when cut.
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// Ten-cell text progress bar.
pub(crate) fn bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 10.0).round()) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Earthquake Response Drill", 10), "Earthquak…");
        assert!(truncate("Earthquake Response Drill", 10).width() <= 10);
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(0.0), "░░░░░░░░░░");
        assert_eq!(bar(78.0), "████████░░");
        assert_eq!(bar(150.0), "██████████");
    }
}
