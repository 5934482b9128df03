use std::{sync::Arc, time::Duration};

use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, warn};

use super::{SharedState, utils};
use crate::client::{GroupCommand, MediaCommand, PlaybackState, SendspinClient};

/// MPRIS `PlaybackStatus` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// "Playing"
    Playing,
    /// "Paused"
    Paused,
    /// "Stopped"
    Stopped,
}

impl PlaybackStatus {
    /// The D-Bus string for this status
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
        }
    }
}

impl From<Option<PlaybackState>> for PlaybackStatus {
    fn from(state: Option<PlaybackState>) -> Self {
        match state {
            Some(PlaybackState::Playing) => Self::Playing,
            Some(PlaybackState::Paused) => Self::Paused,
            Some(PlaybackState::Stopped) | None => Self::Stopped,
        }
    }
}

/// Track information as exposed through the `Metadata` property
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackInfo {
    /// Track title
    pub title: Option<String>,
    /// Track artist
    pub artist: Option<String>,
    /// Album name
    pub album: Option<String>,
    /// Track length
    pub length: Option<Duration>,
}

impl TrackInfo {
    /// Whether any descriptive field is known.
    pub fn has_track(&self) -> bool {
        self.title.is_some() || self.artist.is_some() || self.album.is_some()
    }
}

/// Read side of the bridge, plus the command path back to the client.
///
/// Built by the controller on `start` and handed to the server backend. All
/// getters read the shared state; command methods spawn the client call on
/// the runtime captured at `start` and hand back the task handle.
pub struct PlayerAdapter {
    client: Arc<dyn SendspinClient>,
    runtime: Handle,
    state: SharedState,
    identity: String,
    desktop_entry: Option<String>,
}

impl PlayerAdapter {
    /// Create an adapter over `state` that sends commands through `client`.
    pub fn new(
        client: Arc<dyn SendspinClient>,
        runtime: Handle,
        state: SharedState,
        identity: impl Into<String>,
        desktop_entry: Option<String>,
    ) -> Self {
        Self {
            client,
            runtime,
            state,
            identity: identity.into(),
            desktop_entry,
        }
    }

    /// Human readable player name.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Desktop entry name, without the `.desktop` extension.
    pub fn desktop_entry(&self) -> Option<&str> {
        self.desktop_entry.as_deref()
    }

    /// Current playback status.
    pub fn playback_status(&self) -> PlaybackStatus {
        self.state.read(|s| PlaybackStatus::from(s.playback_state))
    }

    /// Current track information.
    pub fn track(&self) -> TrackInfo {
        self.state.read(|s| TrackInfo {
            title: s.title.clone(),
            artist: s.artist.clone(),
            album: s.album.clone(),
            length: s.duration_ms.map(Duration::from_millis),
        })
    }

    /// Playback position in microseconds.
    pub fn position_micros(&self) -> i64 {
        self.state
            .read(|s| s.progress_ms)
            .map_or(0, utils::to_mpris_micros)
    }

    /// Volume in the MPRIS 0.0-1.0 range.
    pub fn volume(&self) -> f64 {
        self.state
            .read(|s| utils::to_mpris_volume(s.volume, s.muted))
    }

    /// Whether `Play` is accepted.
    pub fn can_play(&self) -> bool {
        self.supports(MediaCommand::Play)
    }

    /// Whether `Pause` is accepted.
    pub fn can_pause(&self) -> bool {
        self.supports(MediaCommand::Pause)
    }

    /// Whether `Next` is accepted.
    pub fn can_go_next(&self) -> bool {
        self.supports(MediaCommand::Next)
    }

    /// Whether `Previous` is accepted.
    pub fn can_go_previous(&self) -> bool {
        self.supports(MediaCommand::Previous)
    }

    /// Whether volume writes are accepted.
    pub fn can_set_volume(&self) -> bool {
        self.supports(MediaCommand::Volume)
    }

    fn supports(&self, command: MediaCommand) -> bool {
        self.state.read(|s| s.supports(command))
    }

    /// Start playback.
    pub fn play(&self) -> Option<JoinHandle<()>> {
        self.dispatch(GroupCommand::new(MediaCommand::Play))
    }

    /// Pause playback.
    pub fn pause(&self) -> Option<JoinHandle<()>> {
        self.dispatch(GroupCommand::new(MediaCommand::Pause))
    }

    /// Pause while playing, play otherwise.
    pub fn play_pause(&self) -> Option<JoinHandle<()>> {
        match self.playback_status() {
            PlaybackStatus::Playing => self.pause(),
            PlaybackStatus::Paused | PlaybackStatus::Stopped => self.play(),
        }
    }

    /// Stop playback.
    pub fn stop(&self) -> Option<JoinHandle<()>> {
        self.dispatch(GroupCommand::new(MediaCommand::Stop))
    }

    /// Skip to the next track.
    pub fn next(&self) -> Option<JoinHandle<()>> {
        self.dispatch(GroupCommand::new(MediaCommand::Next))
    }

    /// Go back to the previous track.
    pub fn previous(&self) -> Option<JoinHandle<()>> {
        self.dispatch(GroupCommand::new(MediaCommand::Previous))
    }

    /// Set the group volume from an MPRIS 0.0-1.0 value.
    pub fn set_volume(&self, volume: f64) -> Option<JoinHandle<()>> {
        self.dispatch(GroupCommand::volume(utils::from_mpris_volume(volume)))
    }

    /// Spawn `command` on the client runtime if the server accepts it.
    ///
    /// Returns `None` when the command is unsupported and was dropped.
    fn dispatch(&self, command: GroupCommand) -> Option<JoinHandle<()>> {
        if !self.supports(command.command) {
            debug!(?command, "Ignoring unsupported MPRIS command");
            return None;
        }

        let client = Arc::clone(&self.client);
        Some(self.runtime.spawn(async move {
            if let Err(error) = client.send_group_command(command).await {
                warn!(?command, %error, "Failed to send group command");
            }
        }))
    }
}

impl std::fmt::Debug for PlayerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerAdapter")
            .field("identity", &self.identity)
            .field("desktop_entry", &self.desktop_entry)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::client::ReplayClient;

    fn adapter_with(client: Arc<ReplayClient>, state: SharedState) -> PlayerAdapter {
        PlayerAdapter::new(client, Handle::current(), state, "Sendspin", None)
    }

    #[test]
    fn status_follows_playback_state() {
        assert_eq!(PlaybackStatus::from(None), PlaybackStatus::Stopped);
        assert_eq!(
            PlaybackStatus::from(Some(PlaybackState::Paused)).as_str(),
            "Paused"
        );
        assert_eq!(
            PlaybackStatus::from(Some(PlaybackState::Playing)).as_str(),
            "Playing"
        );
    }

    #[tokio::test]
    async fn exposes_state_in_mpris_units() {
        let state = SharedState::new();
        state.update(|s| {
            s.title = Some("Sinnerman".to_string());
            s.duration_ms = Some(620_000);
            s.progress_ms = Some(1_500);
            s.volume = 40;
            s.supported_commands.extend([MediaCommand::Play, MediaCommand::Next]);
        });
        let adapter = adapter_with(Arc::new(ReplayClient::new()), state);

        let track = adapter.track();
        assert!(track.has_track());
        assert_eq!(track.title.as_deref(), Some("Sinnerman"));
        assert_eq!(track.length, Some(Duration::from_secs(620)));
        assert_eq!(adapter.position_micros(), 1_500_000);
        assert_eq!(adapter.volume(), 0.4);
        assert!(adapter.can_play());
        assert!(adapter.can_go_next());
        assert!(!adapter.can_pause());
        assert!(!adapter.can_set_volume());
    }

    #[tokio::test]
    async fn unsupported_commands_are_dropped() {
        let client = Arc::new(ReplayClient::new());
        let adapter = adapter_with(Arc::clone(&client), SharedState::new());

        assert!(adapter.play().is_none());
        assert!(adapter.set_volume(0.5).is_none());
        assert!(client.sent_commands().is_empty());
    }

    #[tokio::test]
    async fn play_pause_toggles_on_status() {
        let client = Arc::new(ReplayClient::new());
        let state = SharedState::new();
        state.update(|s| {
            s.playback_state = Some(PlaybackState::Playing);
            s.supported_commands.extend([MediaCommand::Play, MediaCommand::Pause]);
        });
        let adapter = adapter_with(Arc::clone(&client), state.clone());

        adapter.play_pause().unwrap().await.unwrap();
        state.update(|s| s.playback_state = Some(PlaybackState::Paused));
        adapter.play_pause().unwrap().await.unwrap();

        assert_eq!(
            client.sent_commands(),
            vec![
                GroupCommand::new(MediaCommand::Pause),
                GroupCommand::new(MediaCommand::Play),
            ]
        );
    }

    #[tokio::test]
    async fn volume_writes_are_converted() {
        let client = Arc::new(ReplayClient::new());
        let state = SharedState::new();
        state.update(|s| {
            s.supported_commands.insert(MediaCommand::Volume);
        });
        let adapter = adapter_with(Arc::clone(&client), state);

        adapter.set_volume(0.26).unwrap().await.unwrap();

        assert_eq!(client.sent_commands(), vec![GroupCommand::volume(26)]);
    }
}
