use thiserror::Error;

/// Failures reported by the playback engine and its helpers
///
/// All of these are local, synchronous conditions surfaced to the control
/// surface; none are retryable.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PlaybackError {
    /// Route has no waypoints
    #[error("route contains no waypoints")]
    EmptyRoute,

    /// A playback operation was attempted before any route was loaded
    #[error("no route loaded")]
    NoRouteLoaded,

    /// Speed multiplier was non-finite or not positive
    #[error("invalid speed multiplier: {0}")]
    InvalidSpeed(f64),

    /// A coordinate or percentage was not a finite number
    #[error("non-finite numeric input")]
    InvalidInput,
}
