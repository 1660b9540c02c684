use crate::core::Waypoint;
use crate::error::PlaybackError;

/// Heading of travel from one waypoint to another, in degrees [0, 360)
///
/// Uses the planar angle of the coordinate delta rather than a great-circle
/// bearing; displayed routes span a few kilometers, where the two agree to
/// well under a degree.
pub fn bearing(from: Waypoint, to: Waypoint) -> Result<f64, PlaybackError> {
    if !from.is_finite() || !to.is_finite() {
        return Err(PlaybackError::InvalidInput);
    }

    let dlng = to.lng - from.lng;
    let dlat = to.lat - from.lat;

    Ok(dlat.atan2(dlng).to_degrees().rem_euclid(360.0))
}
