use async_trait::async_trait;

use crate::error::Result;
use crate::session::RawNotification;

/// RPC seam to the remote session.
///
/// The bridge never talks to the wire itself; request/response plumbing,
/// retries and command-string construction all live behind this trait.
///
/// # Object Safety
/// Object-safe and intended to be used as `Arc<dyn SessionTransport>`.
#[async_trait]
pub trait SessionTransport: Send + Sync + 'static {
    /// Retrieve all notifications with a sequence identifier greater than
    /// `after_seq`, in non-decreasing sequence order.
    async fn poll_notifications(&self, after_seq: u64) -> Result<Vec<RawNotification>>;

    /// Send an opaque command string to the remote session.
    async fn execute(&self, command: &str) -> Result<()>;

    /// Ask the session to continue evaluating its queued lines.
    async fn request_evaluation_continue(&self, session: &str) -> Result<()>;

    /// Fetch the binary contents of a rendered plot file.
    async fn read_plot(&self, filename: &str) -> Result<Vec<u8>>;
}
