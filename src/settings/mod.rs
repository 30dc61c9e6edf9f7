//! TOML-based settings for the bridge.
//!
//! Settings are loaded from `~/.rbridge/settings.toml` with environment
//! variable interpolation support.

pub mod loader;
pub mod schema;

pub use loader::{settings_path, SettingsManager};
pub use schema::BridgeSettings;
