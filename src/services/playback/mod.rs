/// Media backend and audio output capabilities
pub mod backend;
/// Playback state coordination
pub mod coordinator;
/// Playback error types
pub mod error;
/// Observer traits and registries
pub mod observers;
/// Actor hosting the coordinator
pub mod service;
/// Session and audio route signals
pub mod signals;
/// In-process simulated backend
pub mod simulated;
/// Playback state types
pub mod state;
mod transport;


pub use backend::*;
pub use coordinator::*;
pub use error::*;
pub use observers::{PeriodicTimeObserver, PlaybackObserver};
pub use service::*;
pub use signals::*;
pub use simulated::*;
pub use state::*;
