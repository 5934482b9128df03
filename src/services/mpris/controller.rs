use std::{
    collections::HashSet,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc, Weak,
        mpsc::{self, Receiver, RecvTimeoutError},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use tokio::runtime::Handle;
use tracing::{debug, error, info, instrument, warn};

use super::{
    MprisBackend, MprisError, MprisServer, MprisState, PlayerAdapter, ServerParts, ZbusBackend,
    bridge::Bridge,
};
use crate::{
    client::{
        GroupUpdatePayload, ListenerRemover, MediaCommand, PlaybackState, SendspinClient,
        ServerStatePayload,
    },
    config::MprisConfig,
};

const SERVER_THREAD_NAME: &str = "mpris-server";

/// The dedicated thread running a server's blocking loop.
struct ServerThread {
    handle: JoinHandle<()>,
    exited: Receiver<()>,
}

impl ServerThread {
    fn spawn(server: Arc<dyn MprisServer>) -> Result<Self, MprisError> {
        let (exited_tx, exited) = mpsc::channel();

        let handle = thread::Builder::new()
            .name(SERVER_THREAD_NAME.to_string())
            .spawn(move || {
                match panic::catch_unwind(AssertUnwindSafe(|| server.serve())) {
                    Ok(Ok(())) => debug!("MPRIS server loop exited"),
                    Ok(Err(e)) => error!(error = %e, "MPRIS server loop error"),
                    Err(_) => error!("MPRIS server loop panicked"),
                }
                let _ = exited_tx.send(());
            })
            .map_err(MprisError::ThreadSpawn)?;

        Ok(Self { handle, exited })
    }

    /// Wait up to `timeout` for the loop to return, then detach.
    fn join(self, timeout: Duration) {
        debug!(?timeout, "Waiting for MPRIS server thread to exit");

        match self.exited.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if self.handle.join().is_err() {
                    debug!("MPRIS server thread panicked while exiting");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                debug!("MPRIS server thread still running after timeout, detaching");
            }
        }
    }
}

/// Exposes a Sendspin client as an MPRIS player.
///
/// Once started, the controller mirrors metadata, playback state, volume and
/// capabilities from the client into [`MprisState`] and signals changes to
/// desktop observers. The MPRIS server itself runs on a dedicated thread.
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use sendspin_mpris::{client::ReplayClient, config::MprisConfig, services::mpris::MprisController};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Arc::new(ReplayClient::new());
/// let mut mpris = MprisController::new(client, MprisConfig::default());
/// mpris.start()?;
///
/// // Later
/// mpris.stop();
/// # Ok(())
/// # }
/// ```
pub struct MprisController {
    client: Arc<dyn SendspinClient>,
    backend: Arc<dyn MprisBackend>,
    config: MprisConfig,
    bridge: Arc<Bridge>,
    server: Option<Arc<dyn MprisServer>>,
    thread: Option<ServerThread>,
    listener_removers: Vec<ListenerRemover>,
}

impl MprisController {
    /// Create a controller that serves MPRIS over the session bus.
    pub fn new(client: Arc<dyn SendspinClient>, config: MprisConfig) -> Self {
        Self::with_backend(client, config, Arc::new(ZbusBackend))
    }

    /// Create a controller with an explicit server backend.
    pub fn with_backend(
        client: Arc<dyn SendspinClient>,
        config: MprisConfig,
        backend: Arc<dyn MprisBackend>,
    ) -> Self {
        Self {
            client,
            backend,
            config,
            bridge: Arc::new(Bridge::new()),
            server: None,
            thread: None,
            listener_removers: Vec::new(),
        }
    }

    /// Start the MPRIS server and attach listeners to the client.
    ///
    /// Does nothing if MPRIS is unavailable, disabled, or already running.
    /// Failing to construct the server is logged and leaves the controller
    /// stopped.
    ///
    /// # Errors
    ///
    /// Returns `MprisError::NoRuntime` when called outside a tokio runtime,
    /// and `MprisError::ThreadSpawn` if the server thread cannot be spawned.
    #[instrument(skip(self), fields(name = %self.config.name))]
    pub fn start(&mut self) -> Result<(), MprisError> {
        if !self.config.enabled {
            debug!("MPRIS disabled by configuration");
            return Ok(());
        }

        if !self.backend.is_available() {
            debug!("MPRIS not available: no session bus or unsupported platform");
            return Ok(());
        }

        if self.is_running() {
            debug!("MPRIS interface already running");
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| MprisError::NoRuntime)?;

        let adapter = Arc::new(PlayerAdapter::new(
            Arc::clone(&self.client),
            runtime,
            self.bridge.state().clone(),
            self.config.name.clone(),
            self.config.desktop_entry.clone(),
        ));

        let ServerParts { server, notifier } =
            match self.backend.create_server(&self.config.name, adapter) {
                Ok(parts) => parts,
                Err(e) => {
                    warn!(error = %e, "Failed to create MPRIS server");
                    return Ok(());
                }
            };

        self.thread = Some(ServerThread::spawn(Arc::clone(&server))?);
        self.server = Some(server);
        self.bridge.attach_notifier(notifier);
        self.bridge.set_running(true);

        self.attach_client_listeners();

        info!("MPRIS interface started");
        Ok(())
    }

    /// Stop the MPRIS server and remove client listeners.
    ///
    /// Removal and shutdown failures are logged and do not interrupt
    /// teardown. The server thread is given the configured shutdown timeout
    /// to exit and is detached afterwards.
    #[instrument(skip(self), fields(name = %self.config.name))]
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }

        self.bridge.set_running(false);
        self.bridge.detach_notifier();

        for remover in self.listener_removers.drain(..) {
            if let Err(e) = remover.remove() {
                debug!(error = %e, "Error removing listener");
            }
        }

        if let Some(server) = self.server.take() {
            if let Err(e) = server.quit() {
                debug!(error = %e, "Error stopping MPRIS server");
            }
        }

        if let Some(thread) = self.thread.take() {
            thread.join(self.config.shutdown_timeout());
        }

        info!("MPRIS interface stopped");
    }

    /// Whether the server is running and listeners are attached.
    pub fn is_running(&self) -> bool {
        self.bridge.is_running()
    }

    /// Number of client listeners currently registered by this controller.
    pub fn listener_count(&self) -> usize {
        self.listener_removers.len()
    }

    /// Snapshot of the mirrored player state.
    pub fn state(&self) -> MprisState {
        self.bridge.state().snapshot()
    }

    /// Update track metadata and signal the change.
    pub fn set_metadata(
        &self,
        title: Option<String>,
        artist: Option<String>,
        album: Option<String>,
        duration_ms: Option<u64>,
    ) {
        self.bridge.set_metadata(title, artist, album, duration_ms);
    }

    /// Update the playback position. Position is polled, so no change is signalled.
    pub fn set_progress(&self, progress_ms: Option<u64>) {
        self.bridge.set_progress(progress_ms);
    }

    /// Update the playback state and signal the change.
    pub fn set_playback_state(&self, state: PlaybackState) {
        self.bridge.set_playback_state(state);
    }

    /// Update group volume (0-100) and mute state and signal the change.
    pub fn set_volume(&self, volume: u8, muted: bool) {
        self.bridge.set_volume(volume, muted);
    }

    /// Replace the supported commands, which drive the `Can*` properties.
    pub fn set_supported_commands(&self, commands: HashSet<MediaCommand>) {
        self.bridge.set_supported_commands(commands);
    }

    fn attach_client_listeners(&mut self) {
        let bridge = Arc::downgrade(&self.bridge);
        self.listener_removers
            .push(self.client.add_metadata_listener(Arc::new(
                move |payload: &ServerStatePayload| {
                    with_bridge(&bridge, |b| b.on_metadata_update(payload));
                },
            )));

        let bridge = Arc::downgrade(&self.bridge);
        self.listener_removers
            .push(self.client.add_group_update_listener(Arc::new(
                move |payload: &GroupUpdatePayload| {
                    with_bridge(&bridge, |b| b.on_group_update(payload));
                },
            )));

        let bridge = Arc::downgrade(&self.bridge);
        self.listener_removers
            .push(self.client.add_controller_state_listener(Arc::new(
                move |payload: &ServerStatePayload| {
                    with_bridge(&bridge, |b| b.on_controller_state(payload));
                },
            )));

        debug!("Attached MPRIS listeners to Sendspin client");
    }
}

fn with_bridge(bridge: &Weak<Bridge>, handle: impl FnOnce(&Bridge)) {
    if let Some(bridge) = bridge.upgrade() {
        handle(&bridge);
    }
}

impl Drop for MprisController {
    fn drop(&mut self) {
        self.stop();
    }
}
