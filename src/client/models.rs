use serde::{Deserialize, Deserializer, Serialize};

use super::FieldUpdate;

/// Playback state of a Sendspin group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Group is playing
    Playing,

    /// Group is paused
    Paused,

    /// Group is stopped
    Stopped,
}

/// Commands a controller can send to its group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCommand {
    /// Start playback
    Play,
    /// Pause playback
    Pause,
    /// Stop playback
    Stop,
    /// Skip to next track
    Next,
    /// Go to previous track
    Previous,
    /// Set group volume
    Volume,
    /// Set group mute
    Mute,
    /// Disable repeat
    RepeatOff,
    /// Repeat current track
    RepeatOne,
    /// Repeat whole queue
    RepeatAll,
    /// Enable shuffle
    Shuffle,
    /// Disable shuffle
    Unshuffle,
    /// Switch to another group
    Switch,
}

/// Repeat mode reported in session metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    /// No repeat
    Off,
    /// Repeat current track
    One,
    /// Repeat queue
    All,
}

/// Playback position of the current track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackProgress {
    /// Position in milliseconds
    pub track_progress: u64,

    /// Track length in milliseconds
    pub track_duration: u64,

    /// Playback speed multiplied by 1000
    #[serde(default = "default_playback_speed")]
    pub playback_speed: u32,
}

fn default_playback_speed() -> u32 {
    1000
}

/// Sparse session metadata update
///
/// Every field may be omitted (unchanged) or `null` (cleared).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Server timestamp of the update, in microseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    /// Track title
    #[serde(default, skip_serializing_if = "FieldUpdate::is_undefined")]
    pub title: FieldUpdate<String>,

    /// Track artist
    #[serde(default, skip_serializing_if = "FieldUpdate::is_undefined")]
    pub artist: FieldUpdate<String>,

    /// Album artist
    #[serde(default, skip_serializing_if = "FieldUpdate::is_undefined")]
    pub album_artist: FieldUpdate<String>,

    /// Album name
    #[serde(default, skip_serializing_if = "FieldUpdate::is_undefined")]
    pub album: FieldUpdate<String>,

    /// Artwork URL
    #[serde(default, skip_serializing_if = "FieldUpdate::is_undefined")]
    pub artwork_url: FieldUpdate<String>,

    /// Release year
    #[serde(default, skip_serializing_if = "FieldUpdate::is_undefined")]
    pub year: FieldUpdate<u32>,

    /// Track number
    #[serde(default, skip_serializing_if = "FieldUpdate::is_undefined")]
    pub track: FieldUpdate<u32>,

    /// Playback position and length
    #[serde(default, skip_serializing_if = "FieldUpdate::is_undefined")]
    pub progress: FieldUpdate<TrackProgress>,

    /// Repeat mode
    #[serde(default, skip_serializing_if = "FieldUpdate::is_undefined")]
    pub repeat: FieldUpdate<RepeatMode>,

    /// Shuffle flag
    #[serde(default, skip_serializing_if = "FieldUpdate::is_undefined")]
    pub shuffle: FieldUpdate<bool>,
}

/// Controller capabilities and group volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    /// Commands the server currently accepts
    #[serde(default)]
    pub supported_commands: Vec<MediaCommand>,

    /// Group volume (0-100); out-of-range values are clamped
    #[serde(deserialize_with = "clamped_volume")]
    pub volume: u8,

    /// Group mute state
    #[serde(default)]
    pub muted: bool,
}

fn clamped_volume<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let volume = i64::deserialize(deserializer)?;
    Ok(u8::try_from(volume.clamp(0, 100)).unwrap_or(100))
}

/// `server/state` message payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerStatePayload {
    /// Session metadata update, if this message carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SessionMetadata>,

    /// Controller state, if this message carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<ControllerState>,
}

/// `group/update` message payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupUpdatePayload {
    /// New playback state, if it changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_state: Option<PlaybackState>,

    /// Group identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    /// Human readable group name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

/// Command sent from a controller to its group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCommand {
    /// The command to run
    pub command: MediaCommand,

    /// Target volume, only for [`MediaCommand::Volume`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u8>,

    /// Target mute state, only for [`MediaCommand::Mute`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,
}

impl GroupCommand {
    /// A command without arguments.
    pub fn new(command: MediaCommand) -> Self {
        Self {
            command,
            volume: None,
            mute: None,
        }
    }

    /// Set the group volume, clamped to 0-100.
    pub fn volume(volume: u8) -> Self {
        Self {
            volume: Some(volume.min(100)),
            ..Self::new(MediaCommand::Volume)
        }
    }
}

/// A client event as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientEvent {
    /// Metadata and/or controller state
    #[serde(rename = "server/state")]
    ServerState(ServerStatePayload),

    /// Group playback state
    #[serde(rename = "group/update")]
    GroupUpdate(GroupUpdatePayload),
}
