use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{Result, TrainerError};
use crate::session::{Session, SessionState};
use crate::vocab::VocabularySet;

pub const WORDS_KEY: &str = "word_data";
pub const STATE_KEY: &str = "session_state";

/// String-keyed store scoped to one running app.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
    fn clear(&mut self);
}

/// In-memory store that lives as long as the app does.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Write the working word list and traversal state, replacing any
/// previous session.
pub fn save_session<S: SessionStore + ?Sized>(store: &mut S, session: &Session) -> Result<()> {
    store.set(WORDS_KEY, serde_json::to_string(&session.words)?);
    store.set(STATE_KEY, serde_json::to_string(&session.state)?);
    debug!(cursor = session.state.cursor, "saved session");
    Ok(())
}

/// Read the current session back. A missing or unreadable entry means
/// there is no session.
pub fn load_session<S: SessionStore + ?Sized>(store: &S) -> Result<Session> {
    let words = store.get(WORDS_KEY).ok_or(TrainerError::MissingSession)?;
    let state = store.get(STATE_KEY).ok_or(TrainerError::MissingSession)?;
    let words: VocabularySet = serde_json::from_str(&words).map_err(missing)?;
    let state: SessionState = serde_json::from_str(&state).map_err(missing)?;
    if state.order.iter().any(|i| *i >= words.len()) || state.cursor > state.order.len() {
        warn!("stored session does not match its word list");
        return Err(TrainerError::MissingSession);
    }
    Ok(Session { words, state })
}

/// Session whose run has ended, as needed by the summary screen.
pub fn load_finished_session<S: SessionStore + ?Sized>(store: &S) -> Result<Session> {
    let session = load_session(store)?;
    if session.state.total_elapsed.is_none() {
        return Err(TrainerError::MissingSession);
    }
    Ok(session)
}

pub fn clear_session<S: SessionStore + ?Sized>(store: &mut S) {
    store.remove(WORDS_KEY);
    store.remove(STATE_KEY);
}

fn missing(e: serde_json::Error) -> TrainerError {
    warn!("discarding unreadable session: {e}");
    TrainerError::MissingSession
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ManualClock;
    use crate::session::{start_session, DayRange};
    use assert_matches::assert_matches;

    fn session() -> Session {
        let vocab = crate::vocab::parse("1,1,a,가\n1,2,b,나\n2,3,c,다\n");
        start_session(&vocab, DayRange::new(1, 2), false, &ManualClock::starting_at(3.0)).unwrap()
    }

    #[test]
    fn save_then_load_restores_position() {
        let mut store = MemoryStore::new();
        let mut s = session();
        s.state.take_next();
        s.state.mark_known();
        s.state.take_next();
        save_session(&mut store, &s).unwrap();

        let loaded = load_session(&store).unwrap();
        assert_eq!(loaded, s);
        assert_eq!(loaded.state.cursor, 2);
    }

    #[test]
    fn empty_store_has_no_session() {
        let store = MemoryStore::new();
        assert_matches!(load_session(&store), Err(TrainerError::MissingSession));
    }

    #[test]
    fn corrupt_entry_counts_as_missing() {
        let mut store = MemoryStore::new();
        save_session(&mut store, &session()).unwrap();
        store.set(STATE_KEY, "{not json".to_string());
        assert_matches!(load_session(&store), Err(TrainerError::MissingSession));
    }

    #[test]
    fn out_of_range_order_counts_as_missing() {
        let mut store = MemoryStore::new();
        let mut s = session();
        s.state.order.push(99);
        save_session(&mut store, &s).unwrap();
        assert_matches!(load_session(&store), Err(TrainerError::MissingSession));
    }

    #[test]
    fn summary_needs_an_ended_run() {
        let mut store = MemoryStore::new();
        let mut s = session();
        save_session(&mut store, &s).unwrap();
        assert_matches!(load_finished_session(&store), Err(TrainerError::MissingSession));

        s.state.total_elapsed = Some(12.0);
        save_session(&mut store, &s).unwrap();
        assert!(load_finished_session(&store).is_ok());
    }

    #[test]
    fn clear_removes_session_keys_only() {
        let mut store = MemoryStore::new();
        store.set("other", "kept".to_string());
        save_session(&mut store, &session()).unwrap();
        clear_session(&mut store);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("other").as_deref(), Some("kept"));
        store.clear();
        assert!(store.is_empty());
    }
}
