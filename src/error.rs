use crate::study::Phase;

/// Errors raised while loading vocabulary or driving a study session.
///
/// Only `DataLoad` and `EmptyRange` are meant to reach the user. The
/// session-level variants are handled by the caller: `MissingSession`
/// sends the app back to the start screen and `InvalidRewind` is dropped.
#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    #[error("failed to load vocabulary from {origin}: {reason}")]
    DataLoad { origin: String, reason: String },

    #[error("no words in days {start} ~ {end}")]
    EmptyRange { start: u32, end: u32 },

    #[error("no active study session")]
    MissingSession,

    #[error("cannot go back from position {cursor} (session started at {start_cursor})")]
    InvalidRewind { cursor: usize, start_cursor: usize },

    #[error("{action} is not allowed while {phase}")]
    IllegalTransition { action: &'static str, phase: Phase },

    #[error("session storage error: {0}")]
    Storage(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
