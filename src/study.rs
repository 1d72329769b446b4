//! Card-by-card study flow.
//!
//! A [`StudyMachine`] owns the [`Session`] of the current run and moves
//! through the [`Phase`]s below. Manual operations and timer callbacks
//! both go through the same transitions; every transition first cancels
//! the pending auto-advance and schedules a fresh one afterwards unless
//! the machine is paused.
//!
//! ```text
//! Init ──advance──▶ ShowingSource ──reveal──▶ ShowingTarget
//!                        ▲                          │
//!                        └──────────advance─────────┘
//!              (advance with the order exhausted) ──▶ Finished
//! ```

use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Result, TrainerError};
use crate::progress::progress_label;
use crate::runtime::Clock;
use crate::scheduler::{Scheduler, TimedAction};
use crate::session::{RevisitMarker, Session};
use crate::speech::{SilentSpeaker, Speaker};
use crate::summary::{end_run, SummaryReport};
use crate::util::format_duration;
use crate::wake_lock::{NoWakeLock, WakeLock};

pub const DEFAULT_REVEAL_DELAY_MS: u64 = 3000;
pub const DEFAULT_ADVANCE_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    #[strum(to_string = "waiting for the first word")]
    Init,
    #[strum(to_string = "showing the word")]
    ShowingSource,
    #[strum(to_string = "showing the meaning")]
    ShowingTarget,
    #[strum(to_string = "finished")]
    Finished,
}

/// Auto-advance delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub reveal_delay: Duration,
    pub advance_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            reveal_delay: Duration::from_millis(DEFAULT_REVEAL_DELAY_MS),
            advance_delay: Duration::from_millis(DEFAULT_ADVANCE_DELAY_MS),
        }
    }
}

/// Everything the renderer needs to draw the card on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPayload {
    pub phase: Phase,
    pub source_text: String,
    pub target_text: Option<String>,
    pub day_label: String,
    pub progress_label: String,
    pub revisit_marker: Option<RevisitMarker>,
    pub long_word: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Render(RenderPayload),
    Finished(SummaryReport),
    Unchanged,
}

/// Side-effecting helpers driven by the machine. Their failures are
/// logged and never change study state.
pub struct Collaborators {
    pub speaker: Box<dyn Speaker>,
    pub wake_lock: Box<dyn WakeLock>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            speaker: Box::new(SilentSpeaker),
            wake_lock: Box::new(NoWakeLock::default()),
        }
    }
}

pub struct StudyMachine<C: Clock> {
    session: Session,
    phase: Phase,
    current: Option<usize>,
    revisit: Option<RevisitMarker>,
    paused: bool,
    pause_started_at: f64,
    visible: bool,
    auto_speak: bool,
    timer_visible: bool,
    scheduler: Scheduler,
    timing: Timing,
    clock: C,
    collaborators: Collaborators,
    report: Option<SummaryReport>,
}

impl<C: Clock> StudyMachine<C> {
    /// Wraps `session` in the `Init` phase. Runs start paused, i.e. in
    /// manual mode, until [`resume`](Self::resume) is called.
    pub fn new(session: Session, timing: Timing, clock: C, collaborators: Collaborators) -> Self {
        let pause_started_at = clock.now();
        Self {
            session,
            phase: Phase::Init,
            current: None,
            revisit: None,
            paused: true,
            pause_started_at,
            visible: true,
            auto_speak: false,
            timer_visible: true,
            scheduler: Scheduler::new(),
            timing,
            clock,
            collaborators,
            report: None,
        }
    }

    pub fn with_auto_speak(mut self, on: bool) -> Self {
        self.auto_speak = on;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn auto_speak(&self) -> bool {
        self.auto_speak
    }

    pub fn timer_visible(&self) -> bool {
        self.timer_visible
    }

    pub fn report(&self) -> Option<&SummaryReport> {
        self.report.as_ref()
    }

    pub fn pending_action(&self) -> Option<TimedAction> {
        self.scheduler.pending_action()
    }

    /// Show the first (or resumed) word. Only valid once, from `Init`.
    pub fn start(&mut self) -> Result<Transition> {
        if self.phase != Phase::Init {
            return Err(self.illegal("start"));
        }
        Ok(self.advance_to_next_word())
    }

    /// Show the word at the cursor, or finish when the order is used up.
    pub fn advance_to_next_word(&mut self) -> Transition {
        self.transition(Self::show_next)
    }

    /// Reveal the meaning of the word on screen.
    pub fn reveal(&mut self) -> Result<Transition> {
        if self.phase != Phase::ShowingSource {
            return Err(self.illegal("reveal"));
        }
        Ok(self.transition(Self::show_target))
    }

    /// Contextual advance: reveal when the word is showing, otherwise move
    /// on to the next word.
    pub fn step(&mut self) -> Transition {
        self.transition(Self::contextual)
    }

    /// "Know": mark the word on screen as known, then step.
    pub fn pass(&mut self) -> Transition {
        if self.phase == Phase::Finished {
            return Transition::Unchanged;
        }
        self.mark_known();
        self.step()
    }

    /// "Don't know": clear any earlier known mark for the word on screen,
    /// then step.
    pub fn next(&mut self) -> Transition {
        if self.phase == Phase::Finished {
            return Transition::Unchanged;
        }
        if self.session.state.unmark_known() {
            debug!(index = ?self.session.state.last_actual_index, "unmarked known word");
        }
        self.step()
    }

    /// Record the word on screen as known without moving.
    pub fn mark_known(&mut self) -> bool {
        let added = self.session.state.mark_known();
        if added {
            debug!(index = ?self.session.state.last_actual_index, "marked word known");
        }
        added
    }

    /// Go back to the word before the one on screen. Switches to manual
    /// mode. Fails without side effects when fewer than two words of this
    /// run have been shown.
    pub fn previous(&mut self) -> Result<Transition> {
        if matches!(self.phase, Phase::Init | Phase::Finished) {
            return Err(self.illegal("previous"));
        }
        self.session.state.rewind()?;
        self.pause();
        Ok(self.transition(Self::show_next))
    }

    /// End the run now.
    pub fn end(&mut self) -> Transition {
        if self.phase == Phase::Finished {
            return Transition::Unchanged;
        }
        self.scheduler.cancel();
        self.finish()
    }

    /// Fire the auto-advance action if it is due.
    pub fn on_tick(&mut self) -> Transition {
        let now = self.clock.now();
        match self.scheduler.poll(now) {
            Some(action) => {
                debug!(?action, "auto-advance fired");
                self.transition(|m| match action {
                    TimedAction::Reveal if m.phase == Phase::ShowingSource => m.show_target(),
                    TimedAction::Reveal => Transition::Unchanged,
                    TimedAction::Advance => m.show_next(),
                })
            }
            None => Transition::Unchanged,
        }
    }

    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.scheduler.cancel();
        self.pause_started_at = self.clock.now();
        if let Err(e) = self.collaborators.wake_lock.release() {
            warn!("wake lock release failed: {e}");
        }
        debug!("paused");
    }

    pub fn resume(&mut self) {
        if !self.paused || self.phase == Phase::Finished {
            return;
        }
        self.paused = false;
        self.session.state.paused_accumulated += self.clock.now() - self.pause_started_at;
        self.reschedule();
        if self.visible {
            self.acquire_wake_lock();
        }
        debug!(paused_total = self.session.state.paused_accumulated, "resumed");
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// The view was hidden or shown again.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            if let Err(e) = self.collaborators.wake_lock.release() {
                warn!("wake lock release failed: {e}");
            }
        } else if !self.paused {
            self.acquire_wake_lock();
        }
    }

    pub fn toggle_auto_speak(&mut self) -> bool {
        self.auto_speak = !self.auto_speak;
        self.auto_speak
    }

    pub fn toggle_timer(&mut self) -> bool {
        self.timer_visible = !self.timer_visible;
        self.timer_visible
    }

    /// Speak the source text of the word on screen.
    pub fn speak_current(&mut self) {
        let Some(text) = self.current_word().map(|w| w.en.clone()) else {
            return;
        };
        if let Err(e) = self.collaborators.speaker.speak(&text) {
            warn!("speech failed: {e}");
        }
    }

    /// Net study seconds so far, not counting completed pauses.
    pub fn elapsed_secs(&self) -> f64 {
        let state = &self.session.state;
        self.clock.now() - state.start_time_epoch - state.paused_accumulated
    }

    /// Timer text for the periodic display refresh; `None` while paused or
    /// hidden, which leaves the last shown value in place.
    pub fn timer_label(&self) -> Option<String> {
        if self.paused || !self.timer_visible {
            return None;
        }
        Some(format_duration(self.elapsed_secs()))
    }

    /// Payload for the card currently on screen.
    pub fn payload(&self) -> Option<RenderPayload> {
        let word = self.current_word()?;
        let target_text = match self.phase {
            Phase::ShowingTarget => Some(word.ko.clone()),
            _ => None,
        };
        Some(RenderPayload {
            phase: self.phase,
            source_text: word.en.clone(),
            target_text,
            day_label: format!("Day {}", word.day),
            progress_label: progress_label(&self.session.state),
            revisit_marker: self.revisit,
            long_word: word.has_long_word(),
        })
    }

    fn current_word(&self) -> Option<&crate::vocab::WordRecord> {
        if self.phase == Phase::Finished {
            return None;
        }
        self.current.and_then(|i| self.session.word_at(i))
    }

    fn transition(&mut self, f: impl FnOnce(&mut Self) -> Transition) -> Transition {
        self.scheduler.cancel();
        let outcome = f(self);
        self.reschedule();
        outcome
    }

    fn contextual(&mut self) -> Transition {
        match self.phase {
            Phase::ShowingSource => self.show_target(),
            Phase::Init | Phase::ShowingTarget => self.show_next(),
            Phase::Finished => Transition::Unchanged,
        }
    }

    fn show_next(&mut self) -> Transition {
        if self.phase == Phase::Finished {
            return Transition::Unchanged;
        }
        let position = self.session.state.cursor;
        let Some(index) = self.session.state.take_next() else {
            return self.finish();
        };
        self.current = Some(index);
        self.revisit = self.session.state.revisit_status(position);
        self.phase = Phase::ShowingSource;
        debug!(position, index, revisit = ?self.revisit, "showing word");
        if self.auto_speak {
            self.speak_current();
        }
        self.render()
    }

    fn show_target(&mut self) -> Transition {
        self.phase = Phase::ShowingTarget;
        debug!(index = ?self.current, "revealed meaning");
        self.render()
    }

    fn finish(&mut self) -> Transition {
        self.phase = Phase::Finished;
        self.current = None;
        self.revisit = None;
        if let Err(e) = self.collaborators.wake_lock.release() {
            warn!("wake lock release failed: {e}");
        }
        let report = end_run(&mut self.session, &self.clock);
        self.report = Some(report.clone());
        Transition::Finished(report)
    }

    fn render(&self) -> Transition {
        match self.payload() {
            Some(payload) => Transition::Render(payload),
            None => Transition::Unchanged,
        }
    }

    fn reschedule(&mut self) {
        self.scheduler.cancel();
        if self.paused {
            return;
        }
        let (action, delay) = match self.phase {
            Phase::ShowingSource => (TimedAction::Reveal, self.timing.reveal_delay),
            Phase::ShowingTarget => (TimedAction::Advance, self.timing.advance_delay),
            Phase::Init | Phase::Finished => return,
        };
        self.scheduler.schedule(action, delay, self.clock.now());
    }

    fn acquire_wake_lock(&mut self) {
        if let Err(e) = self.collaborators.wake_lock.acquire() {
            warn!("wake lock request failed: {e}");
        }
    }

    fn illegal(&self, action: &'static str) -> TrainerError {
        TrainerError::IllegalTransition {
            action,
            phase: self.phase,
        }
    }
}
