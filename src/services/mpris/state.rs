use std::{
    collections::HashSet,
    sync::{Arc, PoisonError, RwLock},
};

use crate::client::{MediaCommand, PlaybackState};

/// Last known player state mirrored from the Sendspin client.
///
/// Every field holds the most recent value written through the controller's
/// setters; the server thread only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MprisState {
    /// Track title
    pub title: Option<String>,
    /// Track artist
    pub artist: Option<String>,
    /// Album name
    pub album: Option<String>,
    /// Track length in milliseconds
    pub duration_ms: Option<u64>,
    /// Playback position in milliseconds
    pub progress_ms: Option<u64>,
    /// Group playback state
    pub playback_state: Option<PlaybackState>,
    /// Group volume (0-100)
    pub volume: u8,
    /// Group mute state
    pub muted: bool,
    /// Commands the server currently accepts
    pub supported_commands: HashSet<MediaCommand>,
}

impl MprisState {
    /// Whether the server currently accepts `command`.
    pub fn supports(&self, command: MediaCommand) -> bool {
        self.supported_commands.contains(&command)
    }
}

impl Default for MprisState {
    fn default() -> Self {
        Self {
            title: None,
            artist: None,
            album: None,
            duration_ms: None,
            progress_ms: None,
            playback_state: None,
            volume: 100,
            muted: false,
            supported_commands: HashSet::new(),
        }
    }
}

/// [`MprisState`] shared between the client runtime and the server thread.
///
/// Writers hold the lock only for their own field assignments, so readers
/// may observe a mix of consecutive updates. A poisoned lock is recovered.
#[derive(Debug, Clone, Default)]
pub struct SharedState(Arc<RwLock<MprisState>>);

impl SharedState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `read` against the current state.
    pub fn read<R>(&self, read: impl FnOnce(&MprisState) -> R) -> R {
        let guard = self.0.read().unwrap_or_else(PoisonError::into_inner);
        read(&guard)
    }

    /// Apply `update` to the state.
    pub fn update(&self, update: impl FnOnce(&mut MprisState)) {
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut guard);
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> MprisState {
        self.read(MprisState::clone)
    }
}
