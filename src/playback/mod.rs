pub mod driver;
pub mod engine;

pub use driver::PlaybackDriver;
pub use engine::PlaybackEngine;

use crate::core::Waypoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No route loaded
    Idle,
    /// Route loaded, marker at rest
    Ready,
    /// Tick loop active
    Playing,
    /// Tick loop suspended, index retained
    Paused,
    /// Destination reached, index stays at the end
    Finished,
}

/// Playback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Milliseconds between ticks at 1x speed
    pub base_tick_ms: u64,

    /// Speed multiplier, 1.0 = real-time, 10.0 = fastest
    pub speed: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            base_tick_ms: 1000,
            speed: 1.0,
        }
    }
}

impl PlaybackConfig {
    /// Interval between ticks at the current speed
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(self.base_tick_ms as f64 / 1000.0 / self.speed)
    }
}

/// Read-only view of the playback state, published to renderers on every
/// state change
///
/// Renderers position the marker at `position`, rotate it to `bearing_deg`,
/// and drive a progress slider from `progress_pct`. All writes go back
/// through the driver's operation API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Marker position
    pub position: Waypoint,

    /// Heading of the segment being traversed, degrees in [0, 360)
    pub bearing_deg: f64,

    /// Progress along the route, 0 to 100
    pub progress_pct: f64,

    /// Whether the tick loop is running
    pub is_playing: bool,

    /// Current speed multiplier
    pub speed: f64,

    /// Playback state the snapshot was taken in
    pub state: PlaybackState,

    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,
}
