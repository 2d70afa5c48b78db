mod ui;

use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    cursor::Show,
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::seq::SliceRandom;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    io::{self, stdin},
    sync::mpsc::Sender,
    time::{Duration, Instant},
};
use tracing::{info, warn};

use suraksha::{
    app_dirs::AppDirs,
    auth::{AuthProvider, LocalProfile, User},
    config::{Config, ConfigStore, FileConfigStore},
    content::{ContentRegistry, DrillScenario, QuizCategory},
    drill::DrillEvent,
    error::Result,
    history::{HistoryDb, RunKind, RunRecord},
    logging,
    notify::{drill_notice, quiz_notice, Notice, Notifier, ToastQueue},
    progress,
    quiz::{Advance, QuizPhase, QuizRun},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::DrillSession,
};

const TICK_RATE_MS: u64 = 100;
const RECENT_ACTIVITY: usize = 5;

/// disaster-preparedness drills, quizzes and learning progress in your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Practise school emergency procedures from the terminal: timed virtual drills, category quizzes with review, and a learning-module progress dashboard."
)]
pub struct Cli {
    /// screen to open on
    #[clap(short = 'r', long, value_enum, default_value_t = Route::Home)]
    route: Route,

    /// quiz category to preselect (earthquake, fire, flood, general)
    #[clap(short = 'c', long)]
    category: Option<String>,

    /// drill scenario id to preselect
    #[clap(short = 's', long)]
    scenario: Option<u32>,

    /// shuffle question order for every quiz
    #[clap(long)]
    shuffle: bool,

    /// student name to sign in with
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// do not record completed quizzes and drills
    #[clap(long)]
    no_history: bool,

    /// log filter for the log file (SURAKSHA_LOG takes precedence)
    #[clap(long)]
    log_level: Option<String>,
}

impl Cli {
    /// The saved config with command line flags layered over it. `saved`
    /// itself is left alone so one-off flags are not written back on exit.
    fn layered(&self, saved: &Config) -> Config {
        let mut cfg = saved.clone();
        self.apply(&mut cfg);
        cfg
    }

    fn apply(&self, cfg: &mut Config) {
        if let Some(category) = &self.category {
            cfg.quiz_category = Some(category.clone());
        }
        if let Some(scenario) = self.scenario {
            cfg.drill_scenario = Some(scenario);
        }
        if self.shuffle {
            cfg.shuffle_questions = true;
        }
        if let Some(name) = &self.name {
            cfg.student_name = Some(name.clone());
        }
        if self.no_history {
            cfg.record_history = false;
        }
        if let Some(level) = &self.log_level {
            cfg.log_level = level.clone();
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum Route {
    Home,
    Learning,
    Quiz,
    Drills,
    Profile,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Home,
        Route::Learning,
        Route::Quiz,
        Route::Drills,
        Route::Profile,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|r| *r == self).unwrap_or(0)
    }

    pub fn next(self) -> Route {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Route {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Learning => "/learning",
            Route::Quiz => "/quiz",
            Route::Drills => "/drills",
            Route::Profile => "/auth",
        }
    }
}

#[derive(Debug, Default)]
pub struct QuizState {
    /// 0 selects every question; `n` selects the n-th category.
    pub cursor: usize,
    pub shuffle: bool,
    pub run: Option<QuizRun>,
    pub review_offset: usize,
}

#[derive(Default)]
pub struct DrillsState {
    pub cursor: usize,
    pub session: Option<DrillSession>,
}

#[derive(Debug, Default)]
pub struct LearningState {
    pub filter: Option<String>,
    pub cursor: usize,
}

pub struct App {
    pub content: ContentRegistry,
    pub route: Route,
    pub quiz: QuizState,
    pub drills: DrillsState,
    pub learning: LearningState,
    pub profile: LocalProfile,
    /// Name being typed on the profile screen, while signing in.
    pub profile_input: Option<String>,
    pub school: Option<String>,
    pub toasts: ToastQueue,
    pub history: Option<HistoryDb>,
    pub recent: Vec<RunRecord>,
    pub should_quit: bool,
    countdown_interval: Duration,
    events: Sender<AppEvent>,
}

impl App {
    pub fn new(
        content: ContentRegistry,
        cfg: &Config,
        route: Route,
        history: Option<HistoryDb>,
        events: Sender<AppEvent>,
    ) -> Self {
        let quiz_cursor = cfg
            .quiz_category
            .as_deref()
            .and_then(|id| content.categories.iter().position(|c| c.id == id))
            .map_or(0, |i| i + 1);
        let drill_cursor = cfg
            .drill_scenario
            .and_then(|id| content.scenarios.iter().position(|s| s.id == id))
            .unwrap_or(0);
        let user = cfg
            .student_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .map(|n| User::new(n, cfg.school.as_deref()));

        let mut app = Self {
            content,
            route,
            quiz: QuizState {
                cursor: quiz_cursor,
                shuffle: cfg.shuffle_questions,
                ..QuizState::default()
            },
            drills: DrillsState {
                cursor: drill_cursor,
                session: None,
            },
            learning: LearningState::default(),
            profile: LocalProfile::new(user),
            profile_input: None,
            school: cfg.school.clone(),
            toasts: ToastQueue::default(),
            history,
            recent: Vec::new(),
            should_quit: false,
            countdown_interval: cfg.countdown_interval(),
            events,
        };
        app.refresh_recent();
        app
    }

    pub fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Resize => {}
            AppEvent::Tick => self.toasts.expire(Instant::now()),
            AppEvent::Countdown(id) => {
                if let Some(session) = self.drills.session.as_mut() {
                    let events = session.on_countdown(id);
                    self.apply_drill_events(events);
                }
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.profile_input.is_some() {
            self.on_profile_input(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab => return self.set_route(self.route.next()),
            KeyCode::BackTab => return self.set_route(self.route.prev()),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                return self.set_route(Route::ALL[idx]);
            }
            _ => {}
        }

        match self.route {
            Route::Home => {}
            Route::Learning => self.on_learning_key(key),
            Route::Quiz => self.on_quiz_key(key),
            Route::Drills => self.on_drills_key(key),
            Route::Profile => self.on_profile_key(key),
        }
    }

    /// Switch screens. A drill left running is paused so its countdown stops.
    pub fn set_route(&mut self, route: Route) {
        if self.route == route {
            return;
        }
        if self.route == Route::Drills {
            if let Some(session) = self.drills.session.as_mut() {
                if session.run().is_running() {
                    let events = session.pause();
                    self.apply_drill_events(events);
                    self.toasts.notify(Notice::warning(
                        "Drill Paused",
                        "Return to Drills and press p to resume.",
                    ));
                }
            }
        }
        info!(route = route.path(), "navigate");
        self.route = route;
    }

    fn on_learning_key(&mut self, key: KeyEvent) {
        let visible =
            progress::filter_by_category(&self.content.modules, self.learning.filter.as_deref())
                .len();
        match key.code {
            KeyCode::Char('f') => {
                let categories = progress::categories(&self.content.modules);
                let next = match &self.learning.filter {
                    None => categories.first(),
                    Some(current) => categories
                        .iter()
                        .position(|c| c == current)
                        .and_then(|i| categories.get(i + 1)),
                };
                self.learning.filter = next.map(|c| c.to_string());
                self.learning.cursor = 0;
            }
            KeyCode::Up => self.learning.cursor = self.learning.cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.learning.cursor + 1 < visible {
                    self.learning.cursor += 1;
                }
            }
            _ => {}
        }
    }

    fn on_quiz_key(&mut self, key: KeyEvent) {
        let phase = self.quiz.run.as_ref().map(|r| r.phase().clone());
        match phase {
            None | Some(QuizPhase::NotStarted) => match key.code {
                KeyCode::Up => self.quiz.cursor = self.quiz.cursor.saturating_sub(1),
                KeyCode::Down => {
                    self.quiz.cursor = (self.quiz.cursor + 1).min(self.content.categories.len())
                }
                KeyCode::Char('s') => self.quiz.shuffle = !self.quiz.shuffle,
                KeyCode::Enter => self.start_quiz(),
                _ => {}
            },
            Some(QuizPhase::InProgress { .. }) => match key.code {
                KeyCode::Char(c @ 'a'..='d') => {
                    if let Some(run) = self.quiz.run.as_mut() {
                        run.select_answer(choice_index(c));
                    }
                }
                KeyCode::Enter | KeyCode::Right => self.advance_quiz(),
                KeyCode::Left => {
                    if let Some(run) = self.quiz.run.as_mut() {
                        run.previous();
                    }
                }
                KeyCode::Esc => self.reset_quiz(),
                _ => {}
            },
            Some(QuizPhase::Completed(_)) => match key.code {
                KeyCode::Char('r') => self.start_quiz(),
                KeyCode::Up => self.quiz.review_offset = self.quiz.review_offset.saturating_sub(1),
                KeyCode::Down => {
                    let max = self.quiz.run.as_ref().map_or(0, ui::quiz::max_review_offset);
                    self.quiz.review_offset = (self.quiz.review_offset + 1).min(max);
                }
                KeyCode::Esc | KeyCode::Enter => self.reset_quiz(),
                _ => {}
            },
        }
    }

    pub fn selected_category(&self) -> Option<&QuizCategory> {
        self.quiz
            .cursor
            .checked_sub(1)
            .and_then(|i| self.content.categories.get(i))
    }

    pub fn quiz_title(&self) -> String {
        self.selected_category()
            .map_or_else(|| "All Categories".to_string(), |c| c.name.clone())
    }

    fn start_quiz(&mut self) {
        let category = self.selected_category().map(|c| c.id.clone());
        let mut questions = self.content.questions_in(category.as_deref());
        if self.quiz.shuffle {
            questions.shuffle(&mut rand::thread_rng());
        }
        let mut run = QuizRun::new(questions);
        run.start();
        self.quiz.run = Some(run);
        self.quiz.review_offset = 0;
    }

    /// Back to the category list.
    fn reset_quiz(&mut self) {
        if let Some(run) = self.quiz.run.as_mut() {
            run.reset();
        }
        self.quiz.review_offset = 0;
    }

    fn advance_quiz(&mut self) {
        let Some(run) = self.quiz.run.as_mut() else {
            return;
        };
        match run.advance() {
            Advance::Next(_) => {}
            Advance::Blocked => self.toasts.notify(Notice::warning(
                "No Answer Selected",
                "Pick an option with a-d before moving on.",
            )),
            Advance::Finished(score) => {
                let max_score: u32 = run.questions().iter().map(|q| q.points).sum();
                self.toasts.notify(quiz_notice(&score));
                let record = RunRecord {
                    kind: RunKind::Quiz,
                    title: self.quiz_title(),
                    score: score.points,
                    max_score,
                    percent: score.percent,
                    completed_at: Local::now(),
                };
                self.record_run(record);
            }
        }
    }

    pub fn selected_scenario(&self) -> Option<&DrillScenario> {
        self.content.scenarios.get(self.drills.cursor)
    }

    fn on_drills_key(&mut self, key: KeyEvent) {
        let Some(session) = self.drills.session.as_mut() else {
            match key.code {
                KeyCode::Up => self.drills.cursor = self.drills.cursor.saturating_sub(1),
                KeyCode::Down => {
                    if self.drills.cursor + 1 < self.content.scenarios.len() {
                        self.drills.cursor += 1;
                    }
                }
                KeyCode::Enter => self.start_drill(),
                _ => {}
            }
            return;
        };

        if session.run().is_completed() {
            match key.code {
                KeyCode::Char('r') => {
                    let events = session.start();
                    self.apply_drill_events(events);
                }
                KeyCode::Esc | KeyCode::Char('x') | KeyCode::Enter => self.drills.session = None,
                _ => {}
            }
            return;
        }

        let events = match key.code {
            KeyCode::Char(c @ 'a'..='d') => session.submit_choice(choice_index(c)),
            KeyCode::Char(' ') | KeyCode::Enter => session.confirm_action(),
            KeyCode::Char('p') => session.toggle_pause(),
            KeyCode::Esc | KeyCode::Char('x') => {
                session.reset();
                self.drills.session = None;
                self.toasts
                    .notify(Notice::warning("Drill Stopped", "Progress was discarded."));
                return;
            }
            _ => return,
        };
        self.apply_drill_events(events);
    }

    fn start_drill(&mut self) {
        let Some(scenario) = self.selected_scenario().cloned() else {
            return;
        };
        if !scenario.status.is_startable() {
            self.toasts.notify(Notice::error(
                "Drill Unavailable",
                format!("{} is {}.", scenario.title, scenario.status),
            ));
            return;
        }
        let mut session = DrillSession::new(scenario, self.countdown_interval, self.events.clone());
        let events = session.start();
        self.drills.session = Some(session);
        self.apply_drill_events(events);
    }

    fn apply_drill_events(&mut self, events: Vec<DrillEvent>) {
        for event in events {
            if let Some(notice) = drill_notice(&event) {
                self.toasts.notify(notice);
            }
            if let DrillEvent::Completed(summary) = event {
                let title = self
                    .drills
                    .session
                    .as_ref()
                    .map(|s| s.run().scenario().title.clone())
                    .unwrap_or_default();
                self.record_run(RunRecord {
                    kind: RunKind::Drill,
                    title,
                    score: summary.score,
                    max_score: summary.max_score,
                    percent: summary.percent,
                    completed_at: Local::now(),
                });
            }
        }
    }

    fn on_profile_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('o') => {
                if self.profile.current_user().is_some() {
                    self.profile.sign_out();
                    self.toasts
                        .notify(Notice::success("Signed Out", "See you at the next drill."));
                }
            }
            KeyCode::Enter | KeyCode::Char('i') => {
                if self.profile.current_user().is_none() {
                    self.profile_input = Some(String::new());
                }
            }
            KeyCode::Char('c') => match self.clear_history() {
                Ok(()) => self
                    .toasts
                    .notify(Notice::success("History Cleared", "Recent activity was removed.")),
                Err(err) => self
                    .toasts
                    .notify(Notice::error("History Not Cleared", err.to_string())),
            },
            _ => {}
        }
    }

    fn on_profile_input(&mut self, key: KeyEvent) {
        let Some(input) = self.profile_input.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Esc => self.profile_input = None,
            KeyCode::Enter => {
                let name = input.clone();
                if self.profile.sign_in(&name, self.school.as_deref()) {
                    self.profile_input = None;
                    self.toasts
                        .notify(Notice::success("Welcome", format!("Signed in as {}.", name.trim())));
                } else {
                    self.toasts
                        .notify(Notice::error("Name Required", "Type your name, then Enter."));
                }
            }
            _ => {}
        }
    }

    fn record_run(&mut self, record: RunRecord) {
        match self.store_run(&record) {
            Ok(Some(previous)) if record.percent > previous => {
                self.toasts.notify(Notice::success(
                    "New Personal Best",
                    format!("{:.0}% beats your previous {:.0}%.", record.percent, previous),
                ));
            }
            Ok(_) => {}
            Err(err) => warn!(%err, "failed to record run"),
        }
        self.refresh_recent();
    }

    /// Save `record`, returning the best percent for the same quiz or drill
    /// before this run.
    fn store_run(&self, record: &RunRecord) -> Result<Option<f64>> {
        let Some(db) = &self.history else {
            return Ok(None);
        };
        let previous = db.best_percent(record.kind, &record.title)?;
        db.record(record)?;
        Ok(previous)
    }

    fn clear_history(&mut self) -> Result<()> {
        if let Some(db) = &self.history {
            db.clear_all()?;
        }
        self.recent.clear();
        Ok(())
    }

    fn refresh_recent(&mut self) {
        let Some(db) = &self.history else {
            return;
        };
        match db.recent(RECENT_ACTIVITY) {
            Ok(recent) => self.recent = recent,
            Err(err) => warn!(%err, "failed to read run history"),
        }
    }

    /// Config to persist on exit: `saved` (as read from disk, without command
    /// line flags) plus the choices made this session.
    pub fn to_config(&self, saved: &Config) -> Config {
        let user = self.profile.current_user();
        Config {
            student_name: user.map(|u| u.display_name.clone()),
            school: user
                .and_then(|u| u.school.clone())
                .or_else(|| self.school.clone()),
            quiz_category: self.selected_category().map(|c| c.id.clone()),
            drill_scenario: self.selected_scenario().map(|s| s.id),
            shuffle_questions: self.quiz.shuffle,
            ..saved.clone()
        }
    }
}

fn choice_index(c: char) -> usize {
    c as usize - 'a' as usize
}

fn open_history(cfg: &Config) -> Option<HistoryDb> {
    if !cfg.record_history {
        return None;
    }
    let path = AppDirs::db_path()?;
    match HistoryDb::open(&path) {
        Ok(db) => Some(db),
        Err(err) => {
            warn!(%err, path = %path.display(), "run history disabled");
            None
        }
    }
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        default_hook(info);
    }));
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let read = store.read();
    let saved = read.as_ref().cloned().unwrap_or_default();
    let cfg = cli.layered(&saved);

    if let Some(path) = AppDirs::log_path() {
        if let Err(err) = logging::init(&cfg.log_level, &path) {
            eprintln!("suraksha: {err}");
        }
    }
    info!(version = env!("CARGO_PKG_VERSION"), "starting");
    if let Err(err) = &read {
        warn!(path = %store.path().display(), %err, "unreadable config, using defaults");
    }

    let content = ContentRegistry::load()?;
    if let Some(category) = &cli.category {
        if content.category(category).is_none() {
            let mut cmd = Cli::command();
            cmd.error(
                ErrorKind::InvalidValue,
                format!("unknown quiz category '{category}'"),
            )
            .exit();
        }
    }
    if let Some(id) = cli.scenario {
        if content.scenario(id).is_none() {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, format!("unknown drill scenario {id}"))
                .exit();
        }
    }

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let history = open_history(&cfg);
    let mut app = App::new(content, &cfg, cli.route, history, runner.sender());

    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &runner);

    restore_terminal()?;
    terminal.show_cursor()?;

    if let Err(err) = store.save(&app.to_config(&saved)) {
        warn!(%err, "failed to save config");
    }
    info!("exiting");
    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<CrosstermEventSource, FixedTicker>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(app, f))?;
        app.on_event(runner.step());
        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use ratatui::backend::TestBackend;
    use suraksha::notify::NoticeKind;
    use suraksha::runtime::{AppEventSource, TestEventSource};

    fn test_app_with(cfg: Config) -> (App, TestEventSource) {
        let source = TestEventSource::new();
        let content = ContentRegistry::load().unwrap();
        let history = HistoryDb::open_in_memory().unwrap();
        let app = App::new(content, &cfg, Route::Home, Some(history), source.sender());
        (app, source)
    }

    fn test_app() -> (App, TestEventSource) {
        test_app_with(Config::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.on_event(AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn latest_kind(app: &App) -> Option<NoticeKind> {
        app.toasts.latest().map(|t| t.kind)
    }

    fn screen_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 34)).unwrap();
        terminal.draw(|f| ui::draw(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["suraksha"]);
        assert_eq!(cli.route, Route::Home);
        assert!(!cli.shuffle);
        assert!(!cli.no_history);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "suraksha",
            "--route",
            "drills",
            "--category",
            "fire",
            "--scenario",
            "3",
            "--shuffle",
            "--name",
            "Asha",
            "--no-history",
            "--log-level",
            "debug",
        ]);
        let mut cfg = Config::default();

        cli.apply(&mut cfg);

        assert_eq!(cli.route, Route::Drills);
        assert_eq!(cfg.quiz_category.as_deref(), Some("fire"));
        assert_eq!(cfg.drill_scenario, Some(3));
        assert!(cfg.shuffle_questions);
        assert_eq!(cfg.student_name.as_deref(), Some("Asha"));
        assert!(!cfg.record_history);
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn test_one_off_flags_are_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let saved = store.read().unwrap();
        let cli = Cli::parse_from([
            "suraksha",
            "--no-history",
            "--log-level",
            "trace",
            "--category",
            "flood",
        ]);
        let cfg = cli.layered(&saved);
        assert!(!cfg.record_history);
        let (app, _source) = test_app_with(cfg);

        store.save(&app.to_config(&saved)).unwrap();

        let next = Cli::parse_from(["suraksha"]).layered(&store.read().unwrap());
        assert!(next.record_history);
        assert_eq!(next.log_level, "info");
        assert_eq!(next.quiz_category.as_deref(), Some("flood"));
    }

    #[test]
    fn test_route_cycle() {
        assert_eq!(Route::Home.next(), Route::Learning);
        assert_eq!(Route::Profile.next(), Route::Home);
        assert_eq!(Route::Home.prev(), Route::Profile);
        assert_eq!(Route::Profile.path(), "/auth");
        assert_eq!(Route::Drills.to_string(), "Drills");
    }

    #[test]
    fn test_tab_and_number_keys_switch_routes() {
        let (mut app, _source) = test_app();

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.route, Route::Learning);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.route, Route::Home);
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.route, Route::Drills);
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _source) = test_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        let (mut app, _source) = test_app();
        app.on_event(AppEvent::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit);
    }

    #[test]
    fn test_config_preselects_category_and_scenario() {
        let cfg = Config {
            quiz_category: Some("flood".into()),
            drill_scenario: Some(4),
            student_name: Some("Ravi".into()),
            ..Config::default()
        };
        let (app, _source) = test_app_with(cfg);

        assert_eq!(app.selected_category().map(|c| c.id.as_str()), Some("flood"));
        assert_eq!(app.selected_scenario().map(|s| s.id), Some(4));
        assert_eq!(
            app.profile.current_user().map(|u| u.display_name.as_str()),
            Some("Ravi")
        );
    }

    #[test]
    fn test_quiz_perfect_run_is_recorded() {
        let (mut app, _source) = test_app_with(Config {
            quiz_category: Some("fire".into()),
            ..Config::default()
        });
        app.set_route(Route::Quiz);

        press(&mut app, KeyCode::Enter);
        while let Some(question) = app.quiz.run.as_ref().and_then(|r| r.current_question()) {
            let letter = (b'a' + question.correct_index as u8) as char;
            press(&mut app, KeyCode::Char(letter));
            press(&mut app, KeyCode::Enter);
        }

        let score = app.quiz.run.as_ref().and_then(|r| r.score()).unwrap();
        assert_eq!(score.percent, 100.0);
        assert_eq!(latest_kind(&app), Some(NoticeKind::Success));
        assert_eq!(app.recent.len(), 1);
        assert_eq!(app.recent[0].kind, RunKind::Quiz);
        assert_eq!(app.recent[0].title, "Fire Safety");
    }

    #[test]
    fn test_quiz_next_without_answer_warns() {
        let (mut app, _source) = test_app();
        app.set_route(Route::Quiz);
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Enter);

        assert_eq!(latest_kind(&app), Some(NoticeKind::Warning));
        assert_eq!(app.quiz.run.as_ref().and_then(|r| r.current_index()), Some(0));
    }

    #[test]
    fn test_quiz_all_categories_and_escape() {
        let (mut app, _source) = test_app();
        app.set_route(Route::Quiz);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.quiz.run.as_ref().map(|r| r.questions().len()), Some(10));
        press(&mut app, KeyCode::Esc);
        assert_matches!(
            app.quiz.run.as_ref().map(|r| r.phase()),
            Some(QuizPhase::NotStarted)
        );

        // back on the category list, Enter starts again
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.quiz.run.as_ref().and_then(|r| r.current_index()), Some(0));
    }

    fn finish_quiz(app: &mut App, pick_correct: bool) {
        press(app, KeyCode::Enter);
        while let Some(question) = app.quiz.run.as_ref().and_then(|r| r.current_question()) {
            let choice = if pick_correct {
                question.correct_index
            } else {
                (question.correct_index + 1) % 4
            };
            press(app, KeyCode::Char((b'a' + choice as u8) as char));
            press(app, KeyCode::Enter);
        }
    }

    #[test]
    fn test_review_scroll_is_clamped() {
        let (mut app, _source) = test_app_with(Config {
            quiz_category: Some("flood".into()),
            ..Config::default()
        });
        app.set_route(Route::Quiz);
        finish_quiz(&mut app, true);
        let max = ui::quiz::max_review_offset(app.quiz.run.as_ref().unwrap());

        for _ in 0..max + 20 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.quiz.review_offset, max);

        press(&mut app, KeyCode::Up);
        assert_eq!(app.quiz.review_offset, max - 1);
    }

    #[test]
    fn test_better_retake_is_a_personal_best() {
        let (mut app, _source) = test_app_with(Config {
            quiz_category: Some("fire".into()),
            ..Config::default()
        });
        app.set_route(Route::Quiz);
        finish_quiz(&mut app, false);
        assert!(app.toasts.iter().all(|t| t.title != "New Personal Best"));

        press(&mut app, KeyCode::Esc);
        finish_quiz(&mut app, true);

        assert_eq!(app.toasts.latest().map(|t| t.title.as_str()), Some("New Personal Best"));
        assert_eq!(app.recent.len(), 2);
    }

    #[test]
    fn test_profile_clears_history() {
        let (mut app, _source) = test_app_with(Config {
            quiz_category: Some("fire".into()),
            ..Config::default()
        });
        app.set_route(Route::Quiz);
        finish_quiz(&mut app, true);
        assert_eq!(app.recent.len(), 1);

        app.set_route(Route::Profile);
        press(&mut app, KeyCode::Char('c'));

        assert!(app.recent.is_empty());
        assert_eq!(latest_kind(&app), Some(NoticeKind::Success));
        let summary = app.history.as_ref().unwrap().summary(RunKind::Quiz).unwrap();
        assert_eq!(summary.runs, 0);
    }

    #[test]
    fn test_unstartable_drill_raises_error() {
        let (mut app, _source) = test_app_with(Config {
            drill_scenario: Some(2),
            ..Config::default()
        });
        app.set_route(Route::Drills);

        press(&mut app, KeyCode::Enter);

        assert!(app.drills.session.is_none());
        assert_eq!(latest_kind(&app), Some(NoticeKind::Error));
    }

    #[test]
    fn test_drill_keys_drive_session() {
        let (mut app, _source) = test_app();
        app.set_route(Route::Drills);
        press(&mut app, KeyCode::Enter);
        assert!(app.drills.session.as_ref().unwrap().run().is_running());

        // first earthquake step is a decision with option c correct
        press(&mut app, KeyCode::Char('c'));
        let run = app.drills.session.as_ref().unwrap().run();
        assert_eq!(run.score(), 20);
        assert_eq!(run.current_index(), Some(1));

        press(&mut app, KeyCode::Char('p'));
        assert!(app.drills.session.as_ref().unwrap().run().is_paused());
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.drills.session.as_ref().unwrap().run().score(), 30);

        press(&mut app, KeyCode::Char('x'));
        assert!(app.drills.session.is_none());
        assert_eq!(latest_kind(&app), Some(NoticeKind::Warning));
    }

    #[test]
    fn test_leaving_drills_pauses_run() {
        let (mut app, _source) = test_app();
        app.set_route(Route::Drills);
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Tab);

        let session = app.drills.session.as_ref().unwrap();
        assert!(session.run().is_paused());
        assert!(!session.has_active_timer());
    }

    #[test]
    fn test_countdown_events_reach_the_drill() {
        let (mut app, source) = test_app_with(Config {
            countdown_ms: 5,
            ..Config::default()
        });
        app.set_route(Route::Drills);
        press(&mut app, KeyCode::Enter);

        let event = loop {
            match source.recv_timeout(Duration::from_secs(2)) {
                Ok(ev @ AppEvent::Countdown(_)) => break ev,
                Ok(_) => continue,
                Err(_) => panic!("no countdown event"),
            }
        };
        app.on_event(event);

        assert_eq!(
            app.drills.session.as_ref().unwrap().run().remaining_secs(),
            Some(9)
        );
    }

    #[test]
    fn test_completed_drill_is_recorded() {
        let (mut app, _source) = test_app_with(Config {
            drill_scenario: Some(5),
            ..Config::default()
        });
        app.set_route(Route::Drills);
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Char(' '));

        let session = app.drills.session.as_ref().unwrap();
        let summary = session.run().summary().unwrap();
        assert_eq!(summary.score, 25);
        assert_eq!(summary.percent, 100.0);
        assert_matches!(app.recent.first(), Some(r) if r.kind == RunKind::Drill);

        press(&mut app, KeyCode::Esc);
        assert!(app.drills.session.is_none());
    }

    #[test]
    fn test_learning_filter_cycles() {
        let (mut app, _source) = test_app();
        app.set_route(Route::Learning);

        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.learning.filter.as_deref(), Some("Natural Disasters"));
        for _ in 0..6 {
            press(&mut app, KeyCode::Char('f'));
        }
        assert_eq!(app.learning.filter, None);
    }

    #[test]
    fn test_profile_sign_out_and_in() {
        let (mut app, _source) = test_app_with(Config {
            student_name: Some("Asha".into()),
            ..Config::default()
        });
        app.set_route(Route::Profile);

        press(&mut app, KeyCode::Char('o'));
        assert!(app.profile.current_user().is_none());

        press(&mut app, KeyCode::Enter);
        for c in "Meera".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        // digits are typed, not routed, while editing
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.route, Route::Profile);
        assert_eq!(
            app.profile.current_user().map(|u| u.display_name.as_str()),
            Some("Meera")
        );
        assert!(app.profile_input.is_none());
    }

    #[test]
    fn test_to_config_keeps_selection() {
        let (mut app, _source) = test_app();
        app.set_route(Route::Quiz);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('s'));

        let cfg = app.to_config(&Config::default());

        assert_eq!(cfg.quiz_category.as_deref(), Some("earthquake"));
        assert!(cfg.shuffle_questions);
        assert_eq!(cfg.drill_scenario, Some(1));
        assert_eq!(cfg.countdown_ms, Config::default().countdown_ms);
    }

    #[test]
    fn test_every_route_renders() {
        let (mut app, _source) = test_app();
        for route in Route::ALL {
            app.set_route(route);
            let text = screen_text(&mut app);
            assert!(text.contains("Suraksha"), "header missing on {route}");
        }
    }

    #[test]
    fn test_drill_screen_shows_countdown() {
        let (mut app, _source) = test_app();
        app.set_route(Route::Drills);
        press(&mut app, KeyCode::Enter);

        let text = screen_text(&mut app);

        assert!(text.contains("10s"));
        assert!(text.contains("Earthquake Response Drill"));
    }

    #[test]
    fn test_quiz_review_renders() {
        let (mut app, _source) = test_app_with(Config {
            quiz_category: Some("general".into()),
            ..Config::default()
        });
        app.set_route(Route::Quiz);
        press(&mut app, KeyCode::Enter);
        while app.quiz.run.as_ref().is_some_and(|r| r.score().is_none()) {
            press(&mut app, KeyCode::Char('a'));
            press(&mut app, KeyCode::Enter);
        }

        let text = screen_text(&mut app);

        assert!(text.contains("Keep Learning"));
    }
}
