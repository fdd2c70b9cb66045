//! airwave - live radio playback core.
//!
//! airwave drives a single live stream at a time and keeps everyone who
//! cares about it informed:
//!
//! - A playback coordinator that owns the current media session and reduces
//!   its asynchronous signals to one canonical [`PlaybackState`]
//! - An actor service giving that coordinator a single serialized context
//! - Non-owning observer registries for state changes and time ticks
//! - TOML configuration with a configurable station list
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use airwave::{
//!     config::Config,
//!     services::playback::{PlaybackService, SimulatedBackend, SimulatedOutput},
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let station = config.station("r1")?;
//!
//! let playback = PlaybackService::start(
//!     SimulatedBackend::default(),
//!     SimulatedOutput::new(),
//!     &config.playback,
//! );
//! playback.play_url(station.url.clone()).await?;
//! println!("{}", playback.playback_state());
//! # Ok(())
//! # }
//! ```
//!
//! [`PlaybackState`]: services::PlaybackState

/// Configuration schema definitions and loading.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Playback services.
pub mod services;

/// Logging setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{AirwaveError, Result};
