//! The poll/dispatch loop tying the decoder chain together.
//!
//! One `SessionBridge` owns one remote session connection. A single poll
//! task retrieves notification batches in order, runs every notification
//! through the framer/interpreter/normalizer chain, and republishes the
//! normalized events through the emitter seam. Exactly one poll cycle is
//! outstanding at a time; the only work allowed to escape the cycle is
//! the detached plot fetch, whose attribution is snapshotted at spawn.

mod emitter;
mod transport;

pub use emitter::{BridgeEvent, ChannelEmitter, EventEmitter};
pub use transport::SessionTransport;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{BridgeError, Result};
use crate::session::{
    frame_line, interpret, normalizer, ExecutionState, FramedLine, NotificationKind, OutputStream,
    RawNotification,
};
use crate::settings::BridgeSettings;

/// Runtime knobs for the poll loop.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Delay between poll cycles (also the retry delay base case).
    pub poll_interval: Duration,
    /// Delay before the next cycle after a failed one. Fixed, no backoff.
    pub retry_delay: Duration,
    /// Commands sent once, in order, when the session reports init-complete.
    pub bootstrap_commands: Vec<String>,
    /// Whether plot-state-changed notifications trigger a binary fetch.
    pub fetch_plots: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(300),
            retry_delay: Duration::from_millis(1000),
            bootstrap_commands: Vec::new(),
            fetch_plots: true,
        }
    }
}

impl BridgeConfig {
    pub fn from_settings(settings: &BridgeSettings) -> Self {
        Self {
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
            bootstrap_commands: settings.bootstrap_commands.clone(),
            fetch_plots: settings.fetch_plots,
        }
    }
}

/// Bridge to one interactive remote session.
///
/// Constructed at connection start, torn down by the stop signal. Owns
/// the subscriber seam and the execution state; the state itself lives
/// inside the poll task and is never shared across tasks.
pub struct SessionBridge {
    transport: Arc<dyn SessionTransport>,
    emitter: Arc<dyn EventEmitter>,
    config: BridgeConfig,
    /// Set once the init-complete bootstrap has run. Guards `execute`.
    bootstrapped: RwLock<bool>,
}

impl SessionBridge {
    pub fn new(
        transport: Arc<dyn SessionTransport>,
        emitter: Arc<dyn EventEmitter>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            transport,
            emitter,
            config,
            bootstrapped: RwLock::new(false),
        }
    }

    pub fn is_bootstrapped(&self) -> bool {
        *self.bootstrapped.read()
    }

    /// Send a command to the remote session.
    ///
    /// Fails fast before bootstrap: sending into a half-initialized
    /// session would silently produce malformed remote state.
    pub async fn execute(&self, command: &str) -> Result<()> {
        if !self.is_bootstrapped() {
            return Err(BridgeError::NotBootstrapped(command.to_string()));
        }
        self.transport.execute(command).await
    }

    /// Run the poll loop until the stop signal flips to `true` (or its
    /// sender is dropped). Cycle failures are logged and retried after
    /// the fixed delay; they never terminate the loop.
    pub async fn run(&self, mut stop_rx: watch::Receiver<bool>) {
        let mut state = ExecutionState::new();
        loop {
            let delay = match self.poll_cycle(&mut state).await {
                Ok(()) => self.config.poll_interval,
                Err(e) => {
                    tracing::warn!("Poll cycle failed, retrying: {e}");
                    self.config.retry_delay
                }
            };

            tokio::select! {
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        tracing::debug!("Stop signal received, ending poll loop");
                        break;
                    }
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Spawn the poll loop as a background task. Returns the stop handle
    /// and the task handle; send `true` to stop.
    pub fn spawn(self: Arc<Self>) -> (watch::Sender<bool>, JoinHandle<()>) {
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move { self.run(stop_rx).await });
        (stop_tx, handle)
    }

    /// One poll cycle: fetch everything after the high-water mark and
    /// dispatch each notification, in order, to completion.
    async fn poll_cycle(&self, state: &mut ExecutionState) -> Result<()> {
        let batch = self.transport.poll_notifications(state.last_seq()).await?;
        for notification in batch {
            self.dispatch(notification, state).await;
        }
        Ok(())
    }

    async fn dispatch(&self, notification: RawNotification, state: &mut ExecutionState) {
        // A replayed or stale notification must not replay its state
        // transitions; the high-water mark is authoritative.
        if notification.seq <= state.last_seq() && state.last_seq() > 0 {
            tracing::debug!(
                "Skipping stale notification {} (high-water mark {})",
                notification.seq,
                state.last_seq()
            );
            return;
        }
        state.advance_seq(notification.seq);

        match notification.kind {
            NotificationKind::InitComplete => self.handle_init_complete().await,
            NotificationKind::ConsoleOutput { text } => {
                self.handle_console_output(&text, state).await;
            }
            NotificationKind::ConsoleError { text } => {
                let events = text
                    .lines()
                    .map(|line| normalizer::console_event(state, OutputStream::Stderr, line, true))
                    .collect::<Vec<_>>();
                if !events.is_empty() {
                    self.emitter.emit_events(events);
                }
            }
            NotificationKind::PlotStateChanged { filename } => {
                self.handle_plot_changed(filename, state);
            }
        }
    }

    /// Run the one-time bootstrap and publish the init signal.
    async fn handle_init_complete(&self) {
        if self.is_bootstrapped() {
            tracing::debug!("Ignoring repeated init-complete notification");
            return;
        }
        for command in &self.config.bootstrap_commands {
            if let Err(e) = self.transport.execute(command).await {
                tracing::warn!("Bootstrap command failed ({e}): {command}");
            }
        }
        *self.bootstrapped.write() = true;
        self.emitter.emit_init_complete();
    }

    /// Split a console notification into lines, decode embedded messages,
    /// and emit one batch for the whole notification.
    async fn handle_console_output(&self, text: &str, state: &mut ExecutionState) {
        let mut events = Vec::new();
        for line in text.lines() {
            match frame_line(line) {
                FramedLine::Embedded(payload) => {
                    let outcome = interpret(&payload, state);
                    if let Some(event) = outcome.event {
                        events.push(event);
                    }
                    if let Some(session) = outcome.continue_session {
                        if let Err(e) = self.transport.request_evaluation_continue(&session).await {
                            tracing::warn!("Continue request for session {session} failed: {e}");
                        }
                    }
                }
                FramedLine::Plain => {
                    events.push(normalizer::console_event(
                        state,
                        OutputStream::Stdout,
                        line,
                        false,
                    ));
                }
            }
        }
        if !events.is_empty() {
            self.emitter.emit_events(events);
        }
    }

    /// Fetch the plot binary off the poll loop. Attribution is captured
    /// by value here so a later state change cannot corrupt an in-flight
    /// fetch.
    fn handle_plot_changed(&self, filename: String, state: &ExecutionState) {
        if !self.config.fetch_plots {
            tracing::debug!("Plot fetch disabled, ignoring {filename}");
            return;
        }
        let session = state.active_session.clone();
        let line_id = state.active_line.clone();
        let transport = Arc::clone(&self.transport);
        let emitter = Arc::clone(&self.emitter);
        tokio::spawn(async move {
            let event = match transport.read_plot(&filename).await {
                Ok(image_data) => normalizer::plot_event(session, line_id, image_data),
                Err(e) => {
                    tracing::warn!("Plot fetch for {filename} failed: {e}");
                    normalizer::plot_failure_event(session, line_id, &filename, &e.to_string())
                }
            };
            emitter.emit_events(vec![event]);
        });
    }
}
