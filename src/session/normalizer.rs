//! Construction of outward events from tracker state and raw output.

use super::message::{NormalizedEvent, OutputStream};
use super::state::ExecutionState;

/// Build a console event for a plain output line.
///
/// Output is attributed to the active line only while one is actually
/// executing; trailing text that arrives after `docStatus` cleared the
/// flag gets a null line id. `force` overrides that for out-of-band error
/// reporting, which always attributes to the last active line.
pub fn console_event(
    state: &ExecutionState,
    stream: OutputStream,
    text: impl Into<String>,
    force: bool,
) -> NormalizedEvent {
    let line_id = if state.line_active || force {
        state.active_line.clone()
    } else {
        None
    };
    NormalizedEvent::Console {
        session: state.active_session.clone(),
        line_id,
        stream,
        text: text.into(),
    }
}

/// Build a plot event from fetched image bytes. Attribution comes from a
/// snapshot of the tracker taken when the plot notification was
/// dispatched, not from live state.
pub fn plot_event(
    session: Option<String>,
    line_id: Option<String>,
    image_data: Vec<u8>,
) -> NormalizedEvent {
    NormalizedEvent::Plot {
        session,
        line_id,
        image_data,
    }
}

/// Build the forced stderr event reporting a failed plot fetch.
pub fn plot_failure_event(
    session: Option<String>,
    line_id: Option<String>,
    filename: &str,
    error: &str,
) -> NormalizedEvent {
    NormalizedEvent::Console {
        session,
        line_id,
        stream: OutputStream::Stderr,
        text: format!("Failed to fetch plot {filename}: {error}"),
    }
}
