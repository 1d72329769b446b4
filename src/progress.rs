use crate::session::SessionState;

/// `"<studied> (<not known>)"` for the words advanced past so far.
pub fn progress_label(state: &SessionState) -> String {
    format_progress(state.studied(), state.known_count())
}

/// Progress while the word at `display_cursor` is on screen, counting it.
pub fn display_progress(state: &SessionState, display_cursor: usize) -> String {
    let studied = (display_cursor + 1).saturating_sub(state.start_cursor);
    format_progress(studied, state.known_count())
}

/// The unknown count is `studied - known` and goes negative when a rewind
/// leaves more known words than positions passed.
pub fn format_progress(studied: usize, known: usize) -> String {
    let unknown = studied as i64 - known as i64;
    format!("{studied} ({unknown})")
}
