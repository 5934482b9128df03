use std::{
    env,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, RwLock,
        mpsc::{self, Receiver, Sender, TryRecvError},
    },
};

use tracing::{debug, info, instrument};
use zbus::blocking::{Connection, connection::Builder};

use super::{
    EventNotifier, MprisBackend, MprisError, MprisServer, PlayerAdapter, PlayerInterface,
    RootInterface, ServerParts,
};

/// Object path every MPRIS player is served at
pub const MPRIS_OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";

const BUS_NAME_PREFIX: &str = "org.mpris.MediaPlayer2";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Well-known bus name for a player called `name`.
///
/// Characters not allowed in a bus name element become `_`, and a leading
/// digit is prefixed with `_`.
pub fn bus_name(name: &str) -> String {
    let mut element: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if element.is_empty() {
        element.push_str("sendspin");
    } else if element.starts_with(|c: char| c.is_ascii_digit()) {
        element.insert(0, '_');
    }

    format!("{BUS_NAME_PREFIX}.{element}")
}

/// MPRIS over the D-Bus session bus, backed by zbus.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZbusBackend;

impl MprisBackend for ZbusBackend {
    fn is_available(&self) -> bool {
        cfg!(target_os = "linux") && env::var_os("DBUS_SESSION_BUS_ADDRESS").is_some()
    }

    fn create_server(
        &self,
        name: &str,
        adapter: Arc<PlayerAdapter>,
    ) -> Result<ServerParts, MprisError> {
        let connection = Arc::new(RwLock::new(None));
        let (shutdown_tx, shutdown_rx) = mpsc::channel();

        let server = ZbusServer {
            bus_name: bus_name(name),
            adapter,
            connection: Arc::clone(&connection),
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            shutdown_rx: Mutex::new(Some(shutdown_rx)),
        };

        Ok(ServerParts {
            server: Arc::new(server),
            notifier: Arc::new(ZbusNotifier { connection }),
        })
    }
}

type ConnectionSlot = Arc<RwLock<Option<Connection>>>;

/// Owns the bus connection while `serve` runs.
struct ZbusServer {
    bus_name: String,
    adapter: Arc<PlayerAdapter>,
    connection: ConnectionSlot,
    shutdown_tx: Mutex<Option<Sender<()>>>,
    shutdown_rx: Mutex<Option<Receiver<()>>>,
}

impl MprisServer for ZbusServer {
    #[instrument(skip(self), fields(bus_name = %self.bus_name))]
    fn serve(&self) -> Result<(), MprisError> {
        let shutdown = lock(&self.shutdown_rx)
            .take()
            .ok_or_else(|| MprisError::ServerLoop("server loop already ran".to_string()))?;

        if matches!(shutdown.try_recv(), Err(TryRecvError::Disconnected)) {
            debug!("Quit requested before the server loop started");
            return Ok(());
        }

        let connection = Builder::session()?
            .name(self.bus_name.as_str())?
            .serve_at(MPRIS_OBJECT_PATH, RootInterface::new(Arc::clone(&self.adapter)))?
            .serve_at(MPRIS_OBJECT_PATH, PlayerInterface::new(Arc::clone(&self.adapter)))?
            .build()?;

        *self
            .connection
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(connection);
        info!("MPRIS server registered on the session bus");

        // zbus dispatches on its own executor; block here until quit drops the sender.
        let _ = shutdown.recv();

        self.connection
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        info!("MPRIS server released the session bus");

        Ok(())
    }

    fn quit(&self) -> Result<(), MprisError> {
        if lock(&self.shutdown_tx).take().is_none() {
            debug!("MPRIS server quit already requested");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum ChangedProperty {
    Metadata,
    PlaybackStatus,
    Volume,
    Capabilities,
}

/// Emits `PropertiesChanged` through the server's connection.
struct ZbusNotifier {
    connection: ConnectionSlot,
}

impl ZbusNotifier {
    fn emit(&self, property: ChangedProperty) -> Result<(), MprisError> {
        let connection = self
            .connection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(MprisError::NotConnected)?;

        futures::executor::block_on(async move {
            let iface = connection
                .inner()
                .object_server()
                .interface::<_, PlayerInterface>(MPRIS_OBJECT_PATH)
                .await?;
            let emitter = iface.signal_emitter();
            let player = iface.get().await;

            match property {
                ChangedProperty::Metadata => player.metadata_changed(emitter).await?,
                ChangedProperty::PlaybackStatus => {
                    player.playback_status_changed(emitter).await?;
                }
                ChangedProperty::Volume => player.volume_changed(emitter).await?,
                ChangedProperty::Capabilities => {
                    player.can_play_changed(emitter).await?;
                    player.can_pause_changed(emitter).await?;
                    player.can_go_next_changed(emitter).await?;
                    player.can_go_previous_changed(emitter).await?;
                }
            }

            Ok::<(), zbus::Error>(())
        })?;

        Ok(())
    }
}

impl EventNotifier for ZbusNotifier {
    fn on_title(&self) -> Result<(), MprisError> {
        self.emit(ChangedProperty::Metadata)
    }

    fn on_playpause(&self) -> Result<(), MprisError> {
        self.emit(ChangedProperty::PlaybackStatus)
    }

    fn on_volume(&self) -> Result<(), MprisError> {
        self.emit(ChangedProperty::Volume)
    }

    fn on_options(&self) -> Result<(), MprisError> {
        self.emit(ChangedProperty::Capabilities)
    }
}
