/// MPRIS bridge for Sendspin clients
pub mod mpris;

pub use mpris::{MprisController, MprisError};
