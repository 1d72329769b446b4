use rand::Rng;
use tracing::info;

use crate::error::{Result, TrainerError};
use crate::runtime::Clock;
use crate::session::{self, DayRange, Session};
use crate::util::format_duration;
use crate::vocab::{VocabularySet, WordRecord};

/// Results of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub total_elapsed: f64,
    pub paused: f64,
    pub known_count: usize,
    pub studied_count: usize,
    /// Shown words not marked known, in traversal order.
    pub missed: Vec<WordRecord>,
    pub day_range: Option<DayRange>,
}

impl SummaryReport {
    /// Elapsed time minus time spent paused.
    pub fn net_study_secs(&self) -> f64 {
        self.total_elapsed - self.paused
    }

    pub fn study_time(&self) -> String {
        format_duration(self.net_study_secs())
    }

    pub fn pause_time(&self) -> String {
        format_duration(self.paused)
    }

    pub fn has_missed(&self) -> bool {
        !self.missed.is_empty()
    }

    /// Start a review round over the missed words only.
    pub fn restart_with_missed<C: Clock>(&self, shuffle: bool, clock: &C) -> Result<Session> {
        self.restart_with_missed_rng(shuffle, clock, &mut rand::thread_rng())
    }

    pub fn restart_with_missed_rng<C: Clock, R: Rng + ?Sized>(
        &self,
        shuffle: bool,
        clock: &C,
        rng: &mut R,
    ) -> Result<Session> {
        if self.missed.is_empty() {
            let range = self.day_range.unwrap_or(DayRange::new(0, 0));
            return Err(TrainerError::EmptyRange {
                start: range.start,
                end: range.end,
            });
        }
        info!(words = self.missed.len(), shuffle, "starting review round");
        let words: VocabularySet = self.missed.iter().cloned().collect();
        Ok(session::seed(words, self.day_range, shuffle, clock, rng))
    }
}

/// Freeze the elapsed time of `session` and build its report.
pub fn end_run<C: Clock>(session: &mut Session, clock: &C) -> SummaryReport {
    let state = &mut session.state;
    let total_elapsed = clock.now() - state.start_time_epoch;
    state.total_elapsed = Some(total_elapsed);
    info!(
        studied = state.studied(),
        known = state.known_count(),
        total_elapsed,
        "run ended"
    );
    report(session, total_elapsed)
}

/// Report for a session whose run already ended, `None` otherwise.
pub fn summarize(session: &Session) -> Option<SummaryReport> {
    let total_elapsed = session.state.total_elapsed?;
    Some(report(session, total_elapsed))
}

fn report(session: &Session, total_elapsed: f64) -> SummaryReport {
    let state = &session.state;
    let missed = state
        .missed_indices()
        .into_iter()
        .filter_map(|i| session.word_at(i).cloned())
        .collect();
    SummaryReport {
        total_elapsed,
        paused: state.paused_accumulated,
        known_count: state.known_count(),
        studied_count: state.studied(),
        missed,
        day_range: state.day_range,
    }
}
