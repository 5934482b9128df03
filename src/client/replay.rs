use std::{
    io,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use super::{
    ClientError, ClientEvent, ControllerStateListener, GroupCommand, GroupUpdateListener,
    ListenerRemover, MetadataListener, SendspinClient,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct ListenerRegistry<L> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, L)>>,
}

impl<L: Clone + Send + 'static> ListenerRegistry<L> {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
        })
    }

    fn add(self: &Arc<Self>, listener: L) -> ListenerRemover {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.listeners).push((id, listener));

        let registry: Weak<Self> = Arc::downgrade(self);
        ListenerRemover::new(move || match registry.upgrade() {
            Some(registry) => registry.remove(id),
            None => Err(ClientError::NotConnected),
        })
    }

    fn remove(&self, id: u64) -> Result<(), ClientError> {
        let mut listeners = lock(&self.listeners);
        let position = listeners
            .iter()
            .position(|(listener_id, _)| *listener_id == id)
            .ok_or(ClientError::ListenerNotFound(id))?;
        listeners.remove(position);
        Ok(())
    }

    // Listeners run outside the lock so they may register or remove others.
    fn snapshot(&self) -> Vec<L> {
        lock(&self.listeners)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    fn len(&self) -> usize {
        lock(&self.listeners).len()
    }
}

/// Outcome of replaying an event stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Events decoded and dispatched to listeners
    pub dispatched: usize,
    /// Lines that could not be decoded
    pub skipped: usize,
}

/// A Sendspin client driven by recorded events instead of a live server.
///
/// Events are newline-delimited JSON [`ClientEvent`]s. Commands sent back
/// to the "server" are logged and kept for inspection.
pub struct ReplayClient {
    metadata: Arc<ListenerRegistry<MetadataListener>>,
    group: Arc<ListenerRegistry<GroupUpdateListener>>,
    controller: Arc<ListenerRegistry<ControllerStateListener>>,
    sent: Mutex<Vec<GroupCommand>>,
}

impl ReplayClient {
    /// Create a client with no listeners.
    pub fn new() -> Self {
        Self {
            metadata: ListenerRegistry::new(),
            group: ListenerRegistry::new(),
            controller: ListenerRegistry::new(),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Deliver one event to the matching listeners.
    ///
    /// A `server/state` event reaches metadata listeners when it carries
    /// metadata and controller listeners when it carries controller state.
    pub fn dispatch(&self, event: &ClientEvent) {
        match event {
            ClientEvent::ServerState(payload) => {
                if payload.metadata.is_some() {
                    for listener in self.metadata.snapshot() {
                        listener(payload);
                    }
                }
                if payload.controller.is_some() {
                    for listener in self.controller.snapshot() {
                        listener(payload);
                    }
                }
            }
            ClientEvent::GroupUpdate(payload) => {
                for listener in self.group.snapshot() {
                    listener(payload);
                }
            }
        }
    }

    /// Decode events line by line from `reader` and dispatch them.
    ///
    /// Blank lines are ignored; malformed lines are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from `reader` fails.
    pub async fn replay<R>(&self, reader: R) -> io::Result<ReplayStats>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut stats = ReplayStats::default();
        let mut lines = reader.lines();
        let mut line_number = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<ClientEvent>(line) {
                Ok(event) => {
                    debug!(line = line_number, ?event, "Replaying client event");
                    self.dispatch(&event);
                    stats.dispatched += 1;
                }
                Err(error) => {
                    warn!(line = line_number, %error, "Skipping malformed client event");
                    stats.skipped += 1;
                }
            }
        }

        Ok(stats)
    }

    /// Number of currently registered listeners across all event kinds.
    pub fn listener_count(&self) -> usize {
        self.metadata.len() + self.group.len() + self.controller.len()
    }

    /// Commands sent so far, oldest first.
    pub fn sent_commands(&self) -> Vec<GroupCommand> {
        lock(&self.sent).clone()
    }
}

impl Default for ReplayClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SendspinClient for ReplayClient {
    fn add_metadata_listener(&self, listener: MetadataListener) -> ListenerRemover {
        self.metadata.add(listener)
    }

    fn add_group_update_listener(&self, listener: GroupUpdateListener) -> ListenerRemover {
        self.group.add(listener)
    }

    fn add_controller_state_listener(
        &self,
        listener: ControllerStateListener,
    ) -> ListenerRemover {
        self.controller.add(listener)
    }

    async fn send_group_command(&self, command: GroupCommand) -> Result<(), ClientError> {
        info!(?command, "Group command");
        lock(&self.sent).push(command);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::client::{
        GroupUpdatePayload, MediaCommand, PlaybackState, ServerStatePayload, SessionMetadata,
    };

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        (count, move || {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn removers_deregister_listeners() {
        let client = ReplayClient::new();
        let (count, bump) = counter();
        let remover = client.add_group_update_listener(Arc::new(move |_: &GroupUpdatePayload| bump()));

        assert_eq!(client.listener_count(), 1);
        client.dispatch(&ClientEvent::GroupUpdate(GroupUpdatePayload::default()));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        remover.remove().unwrap();
        assert_eq!(client.listener_count(), 0);
        client.dispatch(&ClientEvent::GroupUpdate(GroupUpdatePayload::default()));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn remover_fails_once_client_is_gone() {
        let client = ReplayClient::new();
        let remover = client.add_metadata_listener(Arc::new(|_: &ServerStatePayload| {}));
        drop(client);

        assert!(matches!(remover.remove(), Err(ClientError::NotConnected)));
    }

    #[test]
    fn server_state_routes_by_content() {
        let client = ReplayClient::new();
        let (metadata_count, bump_metadata) = counter();
        let (controller_count, bump_controller) = counter();
        let _m = client.add_metadata_listener(Arc::new(move |_: &ServerStatePayload| bump_metadata()));
        let _c = client
            .add_controller_state_listener(Arc::new(move |_: &ServerStatePayload| bump_controller()));

        client.dispatch(&ClientEvent::ServerState(ServerStatePayload {
            metadata: Some(SessionMetadata::default()),
            controller: None,
        }));

        assert_eq!(metadata_count.load(Ordering::SeqCst), 1);
        assert_eq!(controller_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn replay_skips_malformed_lines() {
        let client = ReplayClient::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _r = client.add_group_update_listener(Arc::new(move |payload: &GroupUpdatePayload| {
            lock(&sink).push(payload.playback_state);
        }));

        let input = concat!(
            r#"{"type": "group/update", "payload": {"playback_state": "playing"}}"#,
            "\n\nnot json\n",
            r#"{"type": "group/update", "payload": {"playback_state": "paused"}}"#,
            "\n",
        );

        let stats = client.replay(input.as_bytes()).await.unwrap();

        assert_eq!(stats, ReplayStats { dispatched: 2, skipped: 1 });
        assert_eq!(
            *lock(&seen),
            vec![Some(PlaybackState::Playing), Some(PlaybackState::Paused)]
        );
    }

    #[tokio::test]
    async fn records_sent_commands() {
        let client = ReplayClient::new();

        client
            .send_group_command(GroupCommand::new(MediaCommand::Next))
            .await
            .unwrap();
        client.send_group_command(GroupCommand::volume(30)).await.unwrap();

        assert_eq!(
            client.sent_commands(),
            vec![GroupCommand::new(MediaCommand::Next), GroupCommand::volume(30)]
        );
    }
}
