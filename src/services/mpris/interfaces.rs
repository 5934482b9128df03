use std::{collections::HashMap, sync::Arc};

use tracing::debug;
use zbus::{
    interface,
    zvariant::{ObjectPath, OwnedValue, Value},
};

use super::{PlayerAdapter, TrackInfo, utils};

const CURRENT_TRACK_ID: &str = "/org/sendspin/track/current";
const NO_TRACK_ID: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";

/// `org.mpris.MediaPlayer2` served for the bridge
pub struct RootInterface {
    adapter: Arc<PlayerAdapter>,
}

impl RootInterface {
    /// Serve the root interface from `adapter`.
    pub fn new(adapter: Arc<PlayerAdapter>) -> Self {
        Self { adapter }
    }
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootInterface {
    fn raise(&self) {
        debug!("Ignoring MPRIS Raise");
    }

    fn quit(&self) {
        debug!("Ignoring MPRIS Quit");
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> String {
        self.adapter.identity().to_string()
    }

    #[zbus(property)]
    fn desktop_entry(&self) -> String {
        self.adapter.desktop_entry().unwrap_or_default().to_string()
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        Vec::new()
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        Vec::new()
    }
}

/// `org.mpris.MediaPlayer2.Player` served for the bridge
pub struct PlayerInterface {
    adapter: Arc<PlayerAdapter>,
}

impl PlayerInterface {
    /// Serve the player interface from `adapter`.
    pub fn new(adapter: Arc<PlayerAdapter>) -> Self {
        Self { adapter }
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerInterface {
    fn play(&self) {
        self.adapter.play();
    }

    fn pause(&self) {
        self.adapter.pause();
    }

    fn play_pause(&self) {
        self.adapter.play_pause();
    }

    fn stop(&self) {
        self.adapter.stop();
    }

    fn next(&self) {
        self.adapter.next();
    }

    fn previous(&self) {
        self.adapter.previous();
    }

    fn seek(&self, offset: i64) {
        debug!(offset, "Ignoring MPRIS Seek, seeking is not supported");
    }

    fn set_position(&self, track_id: ObjectPath<'_>, position: i64) {
        debug!(%track_id, position, "Ignoring MPRIS SetPosition, seeking is not supported");
    }

    fn open_uri(&self, uri: String) {
        debug!(%uri, "Ignoring MPRIS OpenUri");
    }

    #[zbus(property)]
    fn playback_status(&self) -> String {
        self.adapter.playback_status().as_str().to_string()
    }

    #[zbus(property)]
    fn loop_status(&self) -> String {
        "None".to_string()
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn minimum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn maximum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn shuffle(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        metadata_map(&self.adapter.track())
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.adapter.volume()
    }

    #[zbus(property)]
    fn set_volume(&mut self, volume: f64) {
        self.adapter.set_volume(volume);
    }

    // Position is polled by clients and never signalled.
    #[zbus(property(emits_changed_signal = "false"))]
    fn position(&self) -> i64 {
        self.adapter.position_micros()
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        self.adapter.can_go_next()
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        self.adapter.can_go_previous()
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        self.adapter.can_play()
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        self.adapter.can_pause()
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }
}

/// Build the MPRIS `Metadata` dictionary for `track`
pub fn metadata_map(track: &TrackInfo) -> HashMap<String, OwnedValue> {
    let mut metadata = HashMap::new();

    let track_id = if track.has_track() { CURRENT_TRACK_ID } else { NO_TRACK_ID };
    if let Ok(path) = ObjectPath::try_from(track_id) {
        insert(&mut metadata, "mpris:trackid", Value::from(path));
    }

    if let Some(title) = &track.title {
        insert(&mut metadata, "xesam:title", Value::from(title.as_str()));
    }
    if let Some(artist) = &track.artist {
        insert(&mut metadata, "xesam:artist", Value::from(vec![artist.as_str()]));
    }
    if let Some(album) = &track.album {
        insert(&mut metadata, "xesam:album", Value::from(album.as_str()));
    }
    if let Some(length) = track.length {
        let micros = utils::to_mpris_micros(u64::try_from(length.as_millis()).unwrap_or(u64::MAX));
        insert(&mut metadata, "mpris:length", Value::from(micros));
    }

    metadata
}

fn insert(metadata: &mut HashMap<String, OwnedValue>, key: &str, value: Value<'_>) {
    match OwnedValue::try_from(value) {
        Ok(value) => {
            metadata.insert(key.to_string(), value);
        }
        Err(error) => debug!(key, %error, "Skipping metadata entry"),
    }
}
