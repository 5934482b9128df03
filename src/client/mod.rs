//! Sendspin client seam.
//!
//! The bridge does not talk to a Sendspin server itself. It consumes a client
//! through [`SendspinClient`]: listeners are registered for the three event
//! shapes it cares about, and commands flow back through
//! [`SendspinClient::send_group_command`].

mod field;
mod models;
/// In-process client fed from recorded JSON events
pub mod replay;

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

pub use field::FieldUpdate;
pub use models::{
    ClientEvent, ControllerState, GroupCommand, GroupUpdatePayload, MediaCommand, PlaybackState,
    RepeatMode, ServerStatePayload, SessionMetadata, TrackProgress,
};
pub use replay::ReplayClient;

/// Errors reported by a Sendspin client
#[derive(Error, Debug)]
pub enum ClientError {
    /// The client has no live connection to a server
    #[error("client is not connected")]
    NotConnected,

    /// The listener was already removed or never registered
    #[error("listener {0} is not registered")]
    ListenerNotFound(u64),

    /// The server refused the command
    #[error("command rejected: {0}")]
    CommandRejected(String),

    /// Transport level failure
    #[error("transport error: {0}")]
    Transport(String),
}

/// Callback for session metadata updates
pub type MetadataListener = Arc<dyn Fn(&ServerStatePayload) + Send + Sync>;

/// Callback for group updates
pub type GroupUpdateListener = Arc<dyn Fn(&GroupUpdatePayload) + Send + Sync>;

/// Callback for controller state updates
pub type ControllerStateListener = Arc<dyn Fn(&ServerStatePayload) + Send + Sync>;

/// Deregisters a previously registered listener when invoked.
pub struct ListenerRemover(Box<dyn FnOnce() -> Result<(), ClientError> + Send>);

impl ListenerRemover {
    /// Wrap a removal callback.
    pub fn new<F>(remove: F) -> Self
    where
        F: FnOnce() -> Result<(), ClientError> + Send + 'static,
    {
        Self(Box::new(remove))
    }

    /// Remove the listener.
    ///
    /// # Errors
    ///
    /// Returns whatever the client reports for the removal.
    pub fn remove(self) -> Result<(), ClientError> {
        (self.0)()
    }
}

impl fmt::Debug for ListenerRemover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRemover").finish_non_exhaustive()
    }
}

/// The parts of a Sendspin client the bridge depends on.
///
/// Listeners are invoked on the client's own runtime.
#[async_trait]
pub trait SendspinClient: Send + Sync {
    /// Register for session metadata updates.
    fn add_metadata_listener(&self, listener: MetadataListener) -> ListenerRemover;

    /// Register for group updates (playback state).
    fn add_group_update_listener(&self, listener: GroupUpdateListener) -> ListenerRemover;

    /// Register for controller state updates (capabilities, volume).
    fn add_controller_state_listener(&self, listener: ControllerStateListener)
    -> ListenerRemover;

    /// Send a command to the group this client controls.
    ///
    /// # Errors
    ///
    /// Returns an error if the command could not be delivered.
    async fn send_group_command(&self, command: GroupCommand) -> Result<(), ClientError>;
}
