use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

use crate::error::{Result, TrainerError};
use crate::runtime::Clock;
use crate::vocab::{VocabularySet, WordRecord};

/// Inclusive range of study days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub start: u32,
    pub end: u32,
}

impl DayRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, day: u32) -> bool {
        day >= self.start && day <= self.end
    }
}

impl fmt::Display for DayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.start, self.end)
    }
}

/// Whether a previously visited word was marked known or left for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum RevisitMarker {
    Known,
    Review,
}

/// Traversal bookkeeping for one study run.
///
/// `order` holds indices into the session's working vocabulary. `cursor`
/// points at the next entry of `order` to show, so `cursor == order.len()`
/// means every word has been shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub order: Vec<usize>,
    pub cursor: usize,
    pub start_cursor: usize,
    pub max_cursor_reached: usize,
    /// Vocabulary index of the word on screen, `None` before the first one.
    pub last_actual_index: Option<usize>,
    pub known_set: BTreeSet<usize>,
    pub start_time_epoch: f64,
    pub paused_accumulated: f64,
    /// Wall-clock seconds since start, frozen when the run ends.
    pub total_elapsed: Option<f64>,
    pub day_range: Option<DayRange>,
}

impl SessionState {
    pub fn new(order: Vec<usize>, started_at: f64, day_range: Option<DayRange>) -> Self {
        Self {
            order,
            cursor: 0,
            start_cursor: 0,
            max_cursor_reached: 0,
            last_actual_index: None,
            known_set: BTreeSet::new(),
            start_time_epoch: started_at,
            paused_accumulated: 0.0,
            total_elapsed: None,
            day_range,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.order.len()
    }

    pub fn studied(&self) -> usize {
        self.cursor.saturating_sub(self.start_cursor)
    }

    pub fn known_count(&self) -> usize {
        self.known_set.len()
    }

    /// Take the word at the cursor and move past it.
    ///
    /// Raises the high-water mark first, so it records the furthest
    /// position shown rather than the cursor after the increment.
    pub fn take_next(&mut self) -> Option<usize> {
        self.max_cursor_reached = self.max_cursor_reached.max(self.cursor);
        let index = *self.order.get(self.cursor)?;
        self.last_actual_index = Some(index);
        self.cursor += 1;
        Some(index)
    }

    /// Step back so that the next `take_next` yields the word before the
    /// one currently shown.
    pub fn rewind(&mut self) -> Result<()> {
        if self.cursor <= self.start_cursor + 1 {
            return Err(TrainerError::InvalidRewind {
                cursor: self.cursor,
                start_cursor: self.start_cursor,
            });
        }
        self.cursor -= 2;
        Ok(())
    }

    /// Record the word on screen as known. No-op before the first word.
    pub fn mark_known(&mut self) -> bool {
        match self.last_actual_index {
            Some(index) => self.known_set.insert(index),
            None => false,
        }
    }

    /// Drop the word on screen from the known set.
    pub fn unmark_known(&mut self) -> bool {
        match self.last_actual_index {
            Some(index) => self.known_set.remove(&index),
            None => false,
        }
    }

    pub fn is_known(&self, index: usize) -> bool {
        self.known_set.contains(&index)
    }

    /// Status of the word at `position` if that position was already passed
    /// once, `None` for first visits.
    pub fn revisit_status(&self, position: usize) -> Option<RevisitMarker> {
        if position >= self.max_cursor_reached {
            return None;
        }
        let index = *self.order.get(position)?;
        Some(if self.is_known(index) {
            RevisitMarker::Known
        } else {
            RevisitMarker::Review
        })
    }

    /// Vocabulary indices shown this run and not marked known, in order.
    pub fn missed_indices(&self) -> Vec<usize> {
        let end = self.cursor.min(self.order.len());
        self.order
            .get(self.start_cursor..end)
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|i| !self.is_known(*i))
            .collect()
    }
}

/// The working word list of a run together with its traversal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub words: VocabularySet,
    pub state: SessionState,
}

impl Session {
    pub fn word_at(&self, index: usize) -> Option<&WordRecord> {
        self.words.get(index)
    }
}

/// Begin a run over the words of `range`, optionally shuffled.
pub fn start_session<C: Clock>(
    vocabulary: &VocabularySet,
    range: DayRange,
    shuffle: bool,
    clock: &C,
) -> Result<Session> {
    start_session_with_rng(vocabulary, range, shuffle, clock, &mut rand::thread_rng())
}

pub fn start_session_with_rng<C: Clock, R: Rng + ?Sized>(
    vocabulary: &VocabularySet,
    range: DayRange,
    shuffle: bool,
    clock: &C,
    rng: &mut R,
) -> Result<Session> {
    let words = vocabulary.filter_days(range.start, range.end);
    if words.is_empty() {
        return Err(TrainerError::EmptyRange {
            start: range.start,
            end: range.end,
        });
    }
    info!(%range, words = words.len(), shuffle, "starting session");
    Ok(seed(words, Some(range), shuffle, clock, rng))
}

/// Fresh state over every word of `words`.
pub(crate) fn seed<C: Clock, R: Rng + ?Sized>(
    words: VocabularySet,
    day_range: Option<DayRange>,
    shuffle: bool,
    clock: &C,
    rng: &mut R,
) -> Session {
    let mut order: Vec<usize> = (0..words.len()).collect();
    if shuffle {
        order.shuffle(rng);
    }
    debug!(?order, "seeded traversal order");
    Session {
        words,
        state: SessionState::new(order, clock.now(), day_range),
    }
}
