pub mod framer;
pub mod interpreter;
pub mod message;
pub mod normalizer;
pub mod state;

pub use framer::{frame_line, FramedLine, Framing};
pub use interpreter::{interpret, Interpretation};
pub use message::{
    DocStatusData, NormalizedEvent, NotificationKind, OutputStream, RawNotification,
    SessionMessage,
};
pub use state::ExecutionState;
