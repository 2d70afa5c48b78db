use ratatui::{layout::Rect, Frame};

use crate::{App, Route};

/// A UI Screen boundary: responsible for rendering one route
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect);
}

pub struct HomeScreen;

impl Screen for HomeScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        super::home::render(app, f, area);
    }
}

pub struct LearningScreen;

impl Screen for LearningScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        super::learning::render(app, f, area);
    }
}

pub struct QuizScreen;

impl Screen for QuizScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        super::quiz::render(app, f, area);
    }
}

pub struct DrillsScreen;

impl Screen for DrillsScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        super::drill::render(app, f, area);
    }
}

pub struct ProfileScreen;

impl Screen for ProfileScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        super::profile::render(app, f, area);
    }
}

/// Helper to construct the appropriate screen for the current route
pub fn current_screen(route: &Route) -> Box<dyn Screen> {
    match route {
        Route::Home => Box::new(HomeScreen),
        Route::Learning => Box::new(LearningScreen),
        Route::Quiz => Box::new(QuizScreen),
        Route::Drills => Box::new(DrillsScreen),
        Route::Profile => Box::new(ProfileScreen),
    }
}
