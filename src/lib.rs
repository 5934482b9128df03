//! sendspin-mpris - MPRIS integration for Sendspin clients.
//!
//! Exposes a Sendspin client's playback on the D-Bus session bus as an MPRIS
//! player, so media keys, notification widgets and lock-screen controls can
//! follow and drive playback.
//!
//! - Mirrors metadata, playback state, volume and capabilities from client
//!   events into shared player state
//! - Runs the MPRIS server on a dedicated thread
//! - Forwards desktop commands back to the client
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sendspin_mpris::{client::ReplayClient, config::Config, services::MprisController};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let client = Arc::new(ReplayClient::new());
//!
//! let mut mpris = MprisController::new(client, config.mpris);
//! mpris.start()?;
//! # Ok(())
//! # }
//! ```

/// Sendspin client seam and event models.
pub mod client;

/// Configuration schema definitions and loading.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Bridge services.
pub mod services;

/// Logging setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{BridgeError, Result};
