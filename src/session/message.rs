use serde::{Deserialize, Serialize};

/// One asynchronous event retrieved from the remote session via polling.
///
/// Notifications carry a monotonically increasing sequence identifier; the
/// poll loop records the highest one processed so the next retrieval only
/// asks for newer entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNotification {
    pub seq: u64,
    #[serde(flatten)]
    pub kind: NotificationKind,
}

/// Notification payloads as delivered by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NotificationKind {
    /// Remote session finished initializing; bootstrap may run.
    InitComplete,

    /// A plot file became available on the remote side.
    PlotStateChanged { filename: String },

    /// Raw stdout text, newline-delimited, possibly carrying embedded
    /// protocol messages.
    ConsoleOutput { text: String },

    /// Raw stderr text. Always plain, always force-attributed.
    ConsoleError { text: String },
}

/// Decoded payload of an embedded message.
///
/// Wire shape is `{"type": ..., "session": ..., "data": ...}` where the
/// shape of `data` depends on `type`. Kinds we do not understand are kept
/// around for logging but never touch state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionMessage {
    /// A line of code started executing; `data` is the line identifier.
    #[serde(rename = "evalStart")]
    EvalStart { session: String, data: String },

    /// Document/evaluation status for the active line.
    #[serde(rename = "docStatus")]
    DocStatus { session: String, data: DocStatusData },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocStatusData {
    pub eval_complete: bool,
    #[serde(default)]
    pub next_index: Option<u32>,
}

/// Which output stream a console event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// The outward event vocabulary. These are the only artifacts subscribers
/// ever see; ownership transfers to the emitter on dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NormalizedEvent {
    /// A line of console output, attributed to the active line only while
    /// one is actually executing (or when force-attributed).
    #[serde(rename_all = "camelCase")]
    Console {
        session: Option<String>,
        line_id: Option<String>,
        stream: OutputStream,
        text: String,
    },

    /// A line of code began executing in a session.
    #[serde(rename_all = "camelCase")]
    EvalStart { session: String, line_id: String },

    /// Evaluation of the active line finished (or was reported finished).
    #[serde(rename_all = "camelCase")]
    EvalFinish {
        session: String,
        line_completed: Option<String>,
        next_index: Option<u32>,
    },

    /// A plot rendered by the session, with its fetched image bytes.
    #[serde(rename_all = "camelCase")]
    Plot {
        session: Option<String>,
        line_id: Option<String>,
        image_data: Vec<u8>,
    },
}
