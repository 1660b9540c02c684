//! Trajectory playback engine for vehicle movement tracking
//!
//! Owns route data, the current playback position, timing, and heading
//! computation, independent of any map or widget library. A
//! [`PlaybackDriver`] schedules ticks and broadcasts read-only
//! [`Snapshot`]s; renderers implement [`adapter::PresentationAdapter`] and
//! send user intents (play, pause, restart, scrub, speed) back through the
//! driver.

pub mod adapter;
pub mod core;
pub mod error;
pub mod playback;
pub mod source;

pub use crate::core::{bearing, Route, Waypoint};
pub use crate::error::PlaybackError;
pub use crate::playback::{
    PlaybackConfig, PlaybackDriver, PlaybackEngine, PlaybackState, Snapshot,
};
pub use crate::source::{RouteSource, TimeFrame};
