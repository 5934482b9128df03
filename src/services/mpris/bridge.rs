use std::{
    collections::HashSet,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicBool, Ordering},
    },
};

use tracing::{debug, trace, warn};

use super::{EventNotifier, MprisError, SharedState};
use crate::client::{
    FieldUpdate, GroupUpdatePayload, MediaCommand, PlaybackState, ServerStatePayload,
};

/// State, notifier and running flag shared with the client listeners.
pub(crate) struct Bridge {
    state: SharedState,
    notifier: RwLock<Option<Arc<dyn EventNotifier>>>,
    running: AtomicBool,
}

impl Bridge {
    pub(crate) fn new() -> Self {
        Self {
            state: SharedState::new(),
            notifier: RwLock::new(None),
            running: AtomicBool::new(false),
        }
    }

    pub(crate) fn state(&self) -> &SharedState {
        &self.state
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub(crate) fn attach_notifier(&self, notifier: Arc<dyn EventNotifier>) {
        *self.notifier.write().unwrap_or_else(PoisonError::into_inner) = Some(notifier);
    }

    pub(crate) fn detach_notifier(&self) {
        self.notifier
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn notifier(&self) -> Option<Arc<dyn EventNotifier>> {
        self.notifier
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make one best-effort change notification.
    fn notify<F>(&self, change: &'static str, emit: F)
    where
        F: FnOnce(&dyn EventNotifier) -> Result<(), MprisError>,
    {
        let Some(notifier) = self.notifier() else {
            warn!(change, "MPRIS event notifier not initialized; cannot emit change");
            return;
        };

        if let Err(error) = emit(notifier.as_ref()) {
            debug!(change, %error, "Failed to emit MPRIS change");
        }
    }

    pub(crate) fn set_metadata(
        &self,
        title: Option<String>,
        artist: Option<String>,
        album: Option<String>,
        duration_ms: Option<u64>,
    ) {
        trace!(?title, ?artist, ?album, ?duration_ms, "Updating metadata");
        self.state.update(|s| {
            s.title = title;
            s.artist = artist;
            s.album = album;
            s.duration_ms = duration_ms;
        });

        self.notify("metadata", |n| n.on_title());
    }

    pub(crate) fn set_progress(&self, progress_ms: Option<u64>) {
        self.state.update(|s| s.progress_ms = progress_ms);
    }

    pub(crate) fn set_playback_state(&self, playback_state: PlaybackState) {
        trace!(?playback_state, "Updating playback state");
        self.state
            .update(|s| s.playback_state = Some(playback_state));

        self.notify("playback state", |n| n.on_playpause());
    }

    pub(crate) fn set_volume(&self, volume: u8, muted: bool) {
        trace!(volume, muted, "Updating volume");
        self.state.update(|s| {
            s.volume = volume.min(100);
            s.muted = muted;
        });

        self.notify("volume", |n| n.on_volume());
    }

    pub(crate) fn set_supported_commands(&self, commands: HashSet<MediaCommand>) {
        trace!(?commands, "Updating supported commands");
        self.state.update(|s| s.supported_commands = commands);

        self.notify("options", |n| n.on_options());
    }

    pub(crate) fn on_metadata_update(&self, payload: &ServerStatePayload) {
        let Some(metadata) = &payload.metadata else {
            return;
        };

        let previous = self.state.snapshot();

        let title = metadata.title.clone().resolve(previous.title);
        let artist = metadata.artist.clone().resolve(previous.artist);
        let album = metadata.album.clone().resolve(previous.album);

        let (duration_ms, progress_ms) = match &metadata.progress {
            FieldUpdate::Value(progress) => {
                (Some(progress.track_duration), Some(progress.track_progress))
            }
            FieldUpdate::Undefined | FieldUpdate::Null => {
                (previous.duration_ms, previous.progress_ms)
            }
        };

        self.set_metadata(title, artist, album, duration_ms);

        if progress_ms.is_some() {
            self.set_progress(progress_ms);
        }
    }

    pub(crate) fn on_group_update(&self, payload: &GroupUpdatePayload) {
        if let Some(playback_state) = payload.playback_state {
            self.set_playback_state(playback_state);
        }
    }

    pub(crate) fn on_controller_state(&self, payload: &ServerStatePayload) {
        let Some(controller) = &payload.controller else {
            return;
        };

        self.set_supported_commands(controller.supported_commands.iter().copied().collect());
        self.set_volume(controller.volume, controller.muted);
    }
}
