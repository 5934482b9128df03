use std::sync::Arc;

use super::{MprisError, PlayerAdapter};

/// A protocol server exporting one player.
///
/// `serve` runs on the controller's dedicated thread and blocks until `quit`
/// is called from elsewhere.
pub trait MprisServer: Send + Sync {
    /// Run the blocking service loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot claim its bus or its loop fails.
    fn serve(&self) -> Result<(), MprisError>;

    /// Ask a running (or not yet started) `serve` to return.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown request could not be delivered.
    fn quit(&self) -> Result<(), MprisError>;
}

/// Signals observers that a group of player properties changed.
pub trait EventNotifier: Send + Sync {
    /// Track metadata changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the change signal could not be emitted.
    fn on_title(&self) -> Result<(), MprisError>;

    /// Playback status changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the change signal could not be emitted.
    fn on_playpause(&self) -> Result<(), MprisError>;

    /// Volume changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the change signal could not be emitted.
    fn on_volume(&self) -> Result<(), MprisError>;

    /// Player capabilities changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the change signal could not be emitted.
    fn on_options(&self) -> Result<(), MprisError>;
}

/// A server and the notifier bound to it
pub struct ServerParts {
    /// The service loop owner
    pub server: Arc<dyn MprisServer>,
    /// Property change signalling for that server
    pub notifier: Arc<dyn EventNotifier>,
}

/// Capability to build MPRIS servers in the current environment.
pub trait MprisBackend: Send + Sync {
    /// Whether the protocol is usable here at all.
    fn is_available(&self) -> bool;

    /// Build a server named `name` that serves `adapter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be constructed.
    fn create_server(
        &self,
        name: &str,
        adapter: Arc<PlayerAdapter>,
    ) -> Result<ServerParts, MprisError>;
}

/// Backend for environments without MPRIS.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBackend;

impl MprisBackend for NoopBackend {
    fn is_available(&self) -> bool {
        false
    }

    fn create_server(
        &self,
        _name: &str,
        _adapter: Arc<PlayerAdapter>,
    ) -> Result<ServerParts, MprisError> {
        Err(MprisError::InitializationFailed(
            "MPRIS is not available in this environment".to_string(),
        ))
    }
}
