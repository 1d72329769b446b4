use ratatui::Frame;

use crate::{
    ui::{render_search, render_start, render_study, render_summary},
    App, AppState,
};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Day range selection and session start
pub struct StartScreen;

impl Screen for StartScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_start(app, f);
    }
}

/// The flashcard itself
pub struct StudyScreen;

impl Screen for StudyScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_study(app, f);
    }
}

/// Results of the finished run
pub struct SummaryScreen;

impl Screen for SummaryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_summary(app, f);
    }
}

/// Word lookup over the whole list
pub struct SearchScreen;

impl Screen for SearchScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_search(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Start => Box::new(StartScreen),
        AppState::Study => Box::new(StudyScreen),
        AppState::Summary => Box::new(SummaryScreen),
        AppState::Search => Box::new(SearchScreen),
    }
}
