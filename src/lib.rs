//! Bridge to an interactive R session.
//!
//! Polls the remote session for notifications, extracts the protocol
//! messages it embeds in its console stream, tracks which evaluation line
//! is active, and republishes a normalized event vocabulary to
//! subscribers. The RPC transport and any user interface live behind the
//! [`bridge::SessionTransport`] and [`bridge::EventEmitter`] seams.

pub mod bridge;
pub mod error;
pub mod session;
pub mod settings;

pub use bridge::{BridgeConfig, BridgeEvent, ChannelEmitter, EventEmitter, SessionBridge, SessionTransport};
pub use error::{BridgeError, Result};
pub use session::{NormalizedEvent, NotificationKind, OutputStream, RawNotification};
pub use settings::{BridgeSettings, SettingsManager};

/// Initialize logging for embedding applications and tools.
///
/// `filter` overrides the environment filter, e.g. `"rbridge=trace"`;
/// without it the crate logs at debug unless `RUST_LOG` says otherwise.
pub fn init_logging(filter: Option<&str>) {
    let env_filter = match filter {
        Some(directives) => tracing_subscriber::EnvFilter::new(directives),
        None => tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("rbridge=debug".parse().expect("static directive parses")),
    };
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
