/// Read side of the bridge and inbound command dispatch
pub mod adapter;
/// Server backend capability traits
pub mod backend;
mod bridge;
/// Controller lifecycle and public setters
pub mod controller;
/// MPRIS bridge error types
pub mod error;
/// zbus interface implementations
pub mod interfaces;
/// zbus session bus backend
pub mod server;
/// Shared player state
pub mod state;
/// MPRIS unit conversions
pub mod utils;

pub use adapter::{PlaybackStatus, PlayerAdapter, TrackInfo};
pub use backend::{EventNotifier, MprisBackend, MprisServer, NoopBackend, ServerParts};
pub use controller::MprisController;
pub use error::MprisError;
pub use interfaces::{PlayerInterface, RootInterface};
pub use server::{MPRIS_OBJECT_PATH, ZbusBackend, bus_name};
pub use state::{MprisState, SharedState};
