//! Classification of decoded payloads and the state transitions they drive.

use serde_json::Value;

use super::message::{NormalizedEvent, SessionMessage};
use super::state::ExecutionState;

/// What interpreting one embedded payload produced.
///
/// The continue request is a side effect the poll loop performs through
/// the transport; the interpreter itself only records that it is owed.
#[derive(Debug, Default, PartialEq)]
pub struct Interpretation {
    pub event: Option<NormalizedEvent>,
    /// Session for which evaluation must be continued (more queued lines).
    pub continue_session: Option<String>,
}

impl Interpretation {
    fn none() -> Self {
        Self::default()
    }

    fn event(event: NormalizedEvent) -> Self {
        Self {
            event: Some(event),
            continue_session: None,
        }
    }
}

/// Classify a decoded payload, apply its state transition, and return the
/// normalized event (if any).
///
/// Every failure path is swallowed here: a malformed or unknown payload is
/// logged and produces no event, it never reaches the poll loop as an
/// error.
pub fn interpret(payload: &Value, state: &mut ExecutionState) -> Interpretation {
    let kind = match payload.get("type").and_then(Value::as_str) {
        Some(kind) => kind,
        None => {
            tracing::warn!("Embedded payload has no type field: {payload}");
            return Interpretation::none();
        }
    };

    if !matches!(kind, "evalStart" | "docStatus") {
        tracing::debug!("Ignoring embedded message of unknown kind {kind:?}: {payload}");
        return Interpretation::none();
    }

    let message: SessionMessage = match serde_json::from_value(payload.clone()) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Malformed {kind} payload ({e}): {payload}");
            return Interpretation::none();
        }
    };

    match message {
        SessionMessage::EvalStart { session, data } => {
            state.begin_line(session.clone(), data.clone());
            Interpretation::event(NormalizedEvent::EvalStart {
                session,
                line_id: data,
            })
        }
        SessionMessage::DocStatus { session, data } => {
            // The identifiers are deliberately left in place so output and
            // plots arriving after the finish stay attributable.
            let line_completed = if state.active_session.as_deref() == Some(session.as_str()) {
                state.active_line.clone()
            } else {
                tracing::warn!(
                    "docStatus for session {session:?} but active session is {:?}; \
                     cannot attribute the completed line",
                    state.active_session
                );
                None
            };
            state.finish_line();

            let continue_session = (!data.eval_complete).then(|| session.clone());
            Interpretation {
                event: Some(NormalizedEvent::EvalFinish {
                    session,
                    line_completed,
                    next_index: data.next_index,
                }),
                continue_session,
            }
        }
    }
}
