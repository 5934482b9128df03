//! Test doubles for exercising the controller without a session bus.

#![allow(dead_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::sync::{
    Arc, Condvar, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use sendspin_mpris::{
    client::{
        ClientError, ControllerStateListener, GroupCommand, GroupUpdateListener, ListenerRemover,
        MetadataListener, ReplayClient, SendspinClient,
    },
    config::MprisConfig,
    services::mpris::{
        EventNotifier, MprisBackend, MprisError, MprisServer, PlayerAdapter, ServerParts,
    },
};

/// Server whose loop blocks until `quit`, unless told to ignore it.
#[derive(Default)]
pub struct FakeServer {
    quit: Mutex<bool>,
    wake: Condvar,
    ignore_quit: bool,
    pub serve_calls: AtomicUsize,
    pub quit_calls: AtomicUsize,
}

impl FakeServer {
    pub fn ignoring_quit() -> Self {
        Self {
            ignore_quit: true,
            ..Self::default()
        }
    }
}

impl MprisServer for FakeServer {
    fn serve(&self) -> Result<(), MprisError> {
        self.serve_calls.fetch_add(1, Ordering::SeqCst);
        let mut quit = self.quit.lock().unwrap();
        while !*quit {
            quit = self.wake.wait(quit).unwrap();
        }
        Ok(())
    }

    fn quit(&self) -> Result<(), MprisError> {
        self.quit_calls.fetch_add(1, Ordering::SeqCst);
        if !self.ignore_quit {
            *self.quit.lock().unwrap() = true;
            self.wake.notify_all();
        }
        Ok(())
    }
}

/// Notifier that counts each kind of change.
#[derive(Default)]
pub struct CountingNotifier {
    pub title: AtomicUsize,
    pub playpause: AtomicUsize,
    pub volume: AtomicUsize,
    pub options: AtomicUsize,
}

impl CountingNotifier {
    pub fn counts(&self) -> [usize; 4] {
        [
            self.title.load(Ordering::SeqCst),
            self.playpause.load(Ordering::SeqCst),
            self.volume.load(Ordering::SeqCst),
            self.options.load(Ordering::SeqCst),
        ]
    }
}

impl EventNotifier for CountingNotifier {
    fn on_title(&self) -> Result<(), MprisError> {
        self.title.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_playpause(&self) -> Result<(), MprisError> {
        self.playpause.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_volume(&self) -> Result<(), MprisError> {
        self.volume.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_options(&self) -> Result<(), MprisError> {
        self.options.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Backend handing out one shared fake server and notifier.
pub struct FakeBackend {
    pub available: bool,
    pub fail_create: bool,
    pub server: Arc<FakeServer>,
    pub notifier: Arc<CountingNotifier>,
    pub created: AtomicUsize,
    adapter: Mutex<Option<Arc<PlayerAdapter>>>,
}

impl FakeBackend {
    pub fn available() -> Self {
        Self::with_server(FakeServer::default())
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::available()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::available()
        }
    }

    pub fn with_server(server: FakeServer) -> Self {
        Self {
            available: true,
            fail_create: false,
            server: Arc::new(server),
            notifier: Arc::new(CountingNotifier::default()),
            created: AtomicUsize::new(0),
            adapter: Mutex::new(None),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// The adapter passed to the most recent `create_server`.
    pub fn adapter(&self) -> Option<Arc<PlayerAdapter>> {
        self.adapter.lock().unwrap().clone()
    }
}

impl MprisBackend for FakeBackend {
    fn is_available(&self) -> bool {
        self.available
    }

    fn create_server(
        &self,
        _name: &str,
        adapter: Arc<PlayerAdapter>,
    ) -> Result<ServerParts, MprisError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        if self.fail_create {
            return Err(MprisError::InitializationFailed("bus refused".to_string()));
        }

        *self.adapter.lock().unwrap() = Some(adapter);
        Ok(ServerParts {
            server: Arc::clone(&self.server) as Arc<dyn MprisServer>,
            notifier: Arc::clone(&self.notifier) as Arc<dyn EventNotifier>,
        })
    }
}

/// Client whose removers deregister and then report a failure.
#[derive(Default)]
pub struct FailingRemoverClient {
    pub inner: ReplayClient,
}

fn failing(remover: ListenerRemover) -> ListenerRemover {
    ListenerRemover::new(move || {
        remover.remove()?;
        Err(ClientError::Transport("connection reset".to_string()))
    })
}

#[async_trait]
impl SendspinClient for FailingRemoverClient {
    fn add_metadata_listener(&self, listener: MetadataListener) -> ListenerRemover {
        failing(self.inner.add_metadata_listener(listener))
    }

    fn add_group_update_listener(&self, listener: GroupUpdateListener) -> ListenerRemover {
        failing(self.inner.add_group_update_listener(listener))
    }

    fn add_controller_state_listener(
        &self,
        listener: ControllerStateListener,
    ) -> ListenerRemover {
        failing(self.inner.add_controller_state_listener(listener))
    }

    async fn send_group_command(&self, command: GroupCommand) -> Result<(), ClientError> {
        self.inner.send_group_command(command).await
    }
}

pub fn fast_shutdown() -> MprisConfig {
    MprisConfig {
        shutdown_timeout_ms: 50,
        ..MprisConfig::default()
    }
}
