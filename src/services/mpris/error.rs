use thiserror::Error;

/// Errors raised by the MPRIS bridge and its server backends
#[derive(Error, Debug)]
pub enum MprisError {
    /// `start` was called without a tokio runtime to bind to
    #[error("MPRIS must be started from within a running tokio runtime")]
    NoRuntime,

    /// The dedicated server thread could not be spawned
    #[error("failed to spawn MPRIS server thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    /// The server has not (yet) claimed its bus connection
    #[error("MPRIS server is not connected to the session bus")]
    NotConnected,

    /// D-Bus communication error
    #[error("D-Bus operation failed: {0}")]
    DbusError(#[from] zbus::Error),

    /// The server backend could not be constructed
    #[error("Failed to initialize MPRIS server: {0}")]
    InitializationFailed(String),

    /// The server loop cannot run
    #[error("MPRIS server loop failed: {0}")]
    ServerLoop(String),
}
