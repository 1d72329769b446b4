mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tango::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    day_grid::DayRangePicker,
    logging::init_logging,
    runtime::{
        CrosstermEventSource, FixedTicker, Runner, SystemClock, Ticker, TrainerEvent,
        TrainerEventSource,
    },
    session::{start_session, DayRange},
    speech::speaker_for,
    store::{clear_session, load_finished_session, load_session, save_session, MemoryStore},
    study::{Collaborators, RenderPayload, StudyMachine, Timing, Transition},
    summary::{summarize, SummaryReport},
    vocab::{self, VocabularySet},
    wake_lock::wake_lock_for,
    TrainerError,
};
use tracing::{info, warn};

const TICK_RATE_MS: u64 = 100;
const GRID_COLUMNS: u32 = 10;

/// vocabulary flashcards with timed auto-reveal and review rounds
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Step through a day-based vocabulary list: each word is shown, its meaning revealed, and you mark it known or leave it for review. Finished runs can be replayed with only the missed words."
)]
pub struct Cli {
    /// csv word list with day,idx,en,ko columns (defaults to the bundled list)
    #[clap(long)]
    vocab: Option<PathBuf>,

    /// first day of the range; skips the start screen
    #[clap(short = 's', long)]
    start_day: Option<u32>,

    /// last day of the range (defaults to the start day)
    #[clap(short = 'e', long, requires = "start_day")]
    end_day: Option<u32>,

    /// shuffle the words of the range
    #[clap(long)]
    shuffle: bool,

    /// speak every new word automatically
    #[clap(long)]
    auto_speak: bool,

    /// milliseconds before the meaning is revealed in auto mode
    #[clap(long)]
    reveal_ms: Option<u64>,

    /// milliseconds before the next word in auto mode
    #[clap(long)]
    advance_ms: Option<u64>,

    /// text-to-speech program and arguments, e.g. "espeak -v en-us"
    #[clap(long, value_delimiter = ' ', num_args = 1..)]
    speech_command: Option<Vec<String>>,

    /// program that keeps the screen awake while running, e.g. "caffeinate -d"
    #[clap(long, value_delimiter = ' ', num_args = 1..)]
    wake_lock_command: Option<Vec<String>>,
}

impl Cli {
    /// Day range asked for on the command line, taken as given.
    fn day_range(&self) -> Option<DayRange> {
        self.start_day
            .map(|start| DayRange::new(start, self.end_day.unwrap_or(start)))
    }

    /// Overlay explicitly given flags on the saved settings.
    fn apply_to(&self, cfg: &mut Config) {
        if let Some(ref path) = self.vocab {
            cfg.vocab_path = Some(path.clone());
        }
        if self.shuffle {
            cfg.shuffle = true;
        }
        if self.auto_speak {
            cfg.auto_speak = true;
        }
        if let Some(ms) = self.reveal_ms {
            cfg.reveal_delay_ms = ms;
        }
        if let Some(ms) = self.advance_ms {
            cfg.advance_delay_ms = ms;
        }
        if let Some(ref cmd) = self.speech_command {
            cfg.speech_command = Some(cmd.clone());
        }
        if let Some(ref cmd) = self.wake_lock_command {
            cfg.wake_lock_command = Some(cmd.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Start,
    Study,
    Summary,
    Search,
}

#[derive(Debug)]
pub struct StartState {
    pub picker: DayRangePicker,
    pub focus: u32,
    pub shuffle: bool,
}

pub struct App {
    pub config: Config,
    pub vocabulary: VocabularySet,
    pub state: AppState,
    pub start: StartState,
    pub study: Option<StudyMachine<SystemClock>>,
    pub card: Option<RenderPayload>,
    pub timer_text: String,
    pub summary: Option<SummaryReport>,
    pub review_shuffle: bool,
    pub query: String,
    pub notice: Option<String>,
    store: MemoryStore,
}

impl App {
    pub fn new(config: Config) -> Self {
        let (vocabulary, notice) = match vocab::load(config.vocab_path.as_deref()) {
            Ok(words) => (words, None),
            Err(e) => (VocabularySet::default(), Some(e.to_string())),
        };
        info!(words = vocabulary.len(), max_day = vocabulary.max_day(), "vocabulary loaded");
        let start = StartState {
            picker: DayRangePicker::new(vocabulary.max_day()),
            focus: 1,
            shuffle: config.shuffle,
        };
        Self {
            config,
            vocabulary,
            state: AppState::Start,
            start,
            study: None,
            card: None,
            timer_text: "00:00:00".to_string(),
            summary: None,
            review_shuffle: false,
            query: String::new(),
            notice,
            store: MemoryStore::new(),
        }
    }

    /// Start a run over the picked day range.
    pub fn begin_session(&mut self) {
        self.begin_session_with(self.start.picker.range());
    }

    /// Start a run over exactly `range`; an empty range stays on the start
    /// view with a notice.
    pub fn begin_session_with(&mut self, range: DayRange) {
        if let Err(e) = self.try_begin_session(range) {
            warn!("session not started: {e}");
            self.notice = Some(e.to_string());
        }
    }

    fn try_begin_session(&mut self, range: DayRange) -> Result<(), TrainerError> {
        if self.vocabulary.is_empty() {
            return Err(TrainerError::DataLoad {
                origin: self
                    .config
                    .vocab_path
                    .as_ref()
                    .map_or_else(|| "bundled list".to_string(), |p| p.display().to_string()),
                reason: "no words loaded".to_string(),
            });
        }
        let session = start_session(&self.vocabulary, range, self.start.shuffle, &SystemClock)?;
        save_session(&mut self.store, &session)?;
        self.notice = None;
        self.enter_study();
        Ok(())
    }

    /// Open the study view for whatever session the store holds.
    pub fn enter_study(&mut self) {
        let session = match load_session(&self.store) {
            Ok(session) => session,
            Err(e) => {
                warn!("cannot enter study view: {e}");
                self.state = AppState::Start;
                return;
            }
        };
        let collaborators = Collaborators {
            speaker: speaker_for(self.config.speech_command.as_deref()),
            wake_lock: wake_lock_for(self.config.wake_lock_command.as_deref()),
        };
        let mut machine = StudyMachine::new(
            session,
            Timing::from(&self.config),
            SystemClock,
            collaborators,
        )
        .with_auto_speak(self.config.auto_speak);
        self.timer_text = "00:00:00".to_string();
        self.card = None;
        self.state = AppState::Study;
        let first = machine.start();
        self.study = Some(machine);
        match first {
            Ok(t) => self.apply(t),
            Err(e) => warn!("{e}"),
        }
    }

    /// Open the summary view for the finished run in the store.
    pub fn enter_summary(&mut self) {
        match load_finished_session(&self.store) {
            Ok(session) => {
                self.summary = summarize(&session);
                self.review_shuffle = false;
                self.state = AppState::Summary;
            }
            Err(e) => {
                warn!("cannot enter summary view: {e}");
                self.state = AppState::Start;
            }
        }
    }

    /// Replay only the words missed in the finished run.
    pub fn start_review(&mut self) {
        let Some(report) = self.summary.as_ref() else {
            return;
        };
        match report.restart_with_missed(self.review_shuffle, &SystemClock) {
            Ok(session) => {
                if let Err(e) = save_session(&mut self.store, &session) {
                    warn!("{e}");
                    return;
                }
                self.summary = None;
                self.enter_study();
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    /// Drop the session and return to the start view.
    pub fn back_to_start(&mut self) {
        clear_session(&mut self.store);
        self.study = None;
        self.card = None;
        self.summary = None;
        self.state = AppState::Start;
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Render(payload) => {
                self.card = Some(payload);
                self.persist();
            }
            Transition::Finished(_) => {
                self.persist();
                self.study = None;
                self.card = None;
                self.enter_summary();
            }
            Transition::Unchanged => {}
        }
    }

    fn persist(&mut self) {
        if let Some(ref machine) = self.study {
            if let Err(e) = save_session(&mut self.store, machine.session()) {
                warn!("failed to store session: {e}");
            }
        }
    }

    fn with_machine(&mut self, f: impl FnOnce(&mut StudyMachine<SystemClock>) -> Transition) {
        if let Some(machine) = self.study.as_mut() {
            let t = f(machine);
            self.apply(t);
        }
    }

    pub fn on_tick(&mut self) {
        if self.state != AppState::Study {
            return;
        }
        self.with_machine(|m| m.on_tick());
        if let Some(label) = self.study.as_ref().and_then(|m| m.timer_label()) {
            self.timer_text = label;
        }
    }

    pub fn on_focus(&mut self, visible: bool) {
        if let Some(machine) = self.study.as_mut() {
            machine.set_visible(visible);
        }
    }

    /// Returns false when the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return false;
        }
        match self.state {
            AppState::Start => self.on_start_key(key),
            AppState::Study => self.on_study_key(key),
            AppState::Summary => self.on_summary_key(key),
            AppState::Search => self.on_search_key(key),
        }
    }

    fn on_start_key(&mut self, key: KeyEvent) -> bool {
        let max_day = self.start.picker.max_day().max(1);
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Left => self.start.focus = self.start.focus.saturating_sub(1).max(1),
            KeyCode::Right => self.start.focus = (self.start.focus + 1).min(max_day),
            KeyCode::Up => {
                if self.start.focus > GRID_COLUMNS {
                    self.start.focus -= GRID_COLUMNS;
                }
            }
            KeyCode::Down => {
                if self.start.focus + GRID_COLUMNS <= max_day {
                    self.start.focus += GRID_COLUMNS;
                }
            }
            KeyCode::Char(' ') => self.start.picker.click(self.start.focus),
            KeyCode::Char('s') => self.start.shuffle = !self.start.shuffle,
            KeyCode::Char('/') => {
                self.query.clear();
                self.state = AppState::Search;
            }
            KeyCode::Enter => self.begin_session(),
            _ => {}
        }
        true
    }

    fn on_study_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Right | KeyCode::Char(' ') | KeyCode::Char('k') => {
                self.with_machine(|m| m.pass())
            }
            KeyCode::Down | KeyCode::Enter | KeyCode::Char('n') => self.with_machine(|m| m.next()),
            KeyCode::Left | KeyCode::Char('b') => self.with_machine(|m| {
                // going back from the first words of a run is simply ignored
                m.previous().unwrap_or(Transition::Unchanged)
            }),
            KeyCode::Char('e') => self.with_machine(|m| m.end()),
            KeyCode::Char('p') => {
                if let Some(m) = self.study.as_mut() {
                    m.toggle_pause();
                }
            }
            KeyCode::Char('s') => {
                if let Some(m) = self.study.as_mut() {
                    m.speak_current();
                }
            }
            KeyCode::Char('a') => {
                if let Some(m) = self.study.as_mut() {
                    m.toggle_auto_speak();
                }
            }
            KeyCode::Char('t') => {
                if let Some(m) = self.study.as_mut() {
                    if m.toggle_timer() {
                        self.timer_text = tango::util::format_duration(m.elapsed_secs());
                    }
                }
            }
            _ => {}
        }
        true
    }

    fn on_summary_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('r') => self.start_review(),
            KeyCode::Char('s') => self.review_shuffle = !self.review_shuffle,
            KeyCode::Char('n') => self.back_to_start(),
            _ => {}
        }
        true
    }

    fn on_search_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => self.state = AppState::Start,
            KeyCode::Backspace => {
                self.query.pop();
            }
            KeyCode::Char(c) => self.query.push(c),
            _ => {}
        }
        true
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = AppDirs::log_dir().and_then(|dir| init_logging(&dir).ok());

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply_to(&mut config);
    if let Err(e) = config_store.save(&config) {
        warn!("failed to save config: {e}");
    }

    let mut app = App::new(config);
    if let Some(range) = cli.day_range() {
        app.begin_session_with(range);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let res = run_app(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend, E: TrainerEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match runner.step() {
            TrainerEvent::Tick => app.on_tick(),
            TrainerEvent::Resize => {}
            TrainerEvent::Focus(visible) => app.on_focus(visible),
            TrainerEvent::Key(key) => {
                if !app.on_key(key) {
                    break;
                }
            }
        }
    }
    Ok(())
}
