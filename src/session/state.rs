//! The single source of truth for which evaluation line is active.

/// Tracks the active session/line across polled notifications, plus the
/// notification high-water mark.
///
/// Invariant: `line_active == true` implies both `active_session` and
/// `active_line` are `Some`. Written only by the interpreter (state
/// transitions) and the poll loop (high-water mark); plain console lines
/// never mutate it.
#[derive(Debug, Default)]
pub struct ExecutionState {
    /// Session the current/most recent evaluation belongs to.
    pub active_session: Option<String>,
    /// Line identifier of the current/most recent evaluation.
    pub active_line: Option<String>,
    /// Whether that line is still executing. Cleared by `docStatus`, but
    /// the identifiers are kept so late output stays attributable.
    pub line_active: bool,
    /// Highest notification sequence identifier processed so far.
    last_seq: u64,
}

impl ExecutionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an `evalStart`: a new line is executing in `session`.
    pub fn begin_line(&mut self, session: String, line_id: String) {
        self.active_session = Some(session);
        self.active_line = Some(line_id);
        self.line_active = true;
    }

    /// Record a `docStatus`: the active line stopped executing. The
    /// identifiers survive for late-arriving plot/output attribution.
    pub fn finish_line(&mut self) {
        self.line_active = false;
    }

    /// Sequence identifier after which the next poll should resume.
    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    /// Advance the high-water mark. Never regresses, so a replayed batch
    /// cannot rewind the poll cursor.
    pub fn advance_seq(&mut self, seq: u64) {
        self.last_seq = self.last_seq.max(seq);
    }
}
