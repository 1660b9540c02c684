pub mod csv;

pub use csv::load_waypoints;

use crate::core::{Route, Waypoint};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Base route used when no custom waypoint file is supplied, a short run
/// through San Francisco
const BASE_ROUTE: [[f64; 2]; 10] = [
    [37.7749, -122.4194],
    [37.7757, -122.4218],
    [37.7768, -122.4239],
    [37.778, -122.4263],
    [37.7792, -122.4287],
    [37.7804, -122.431],
    [37.7816, -122.4334],
    [37.7828, -122.4358],
    [37.784, -122.4382],
    [37.7852, -122.4406],
];

/// Time frame selectable from the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFrame {
    Today,
    LastWeek,
    LastMonth,
    NextWeek,
}

impl TimeFrame {
    /// Parse a control-surface token; unrecognized tokens fall back to
    /// the base time frame
    pub fn parse(token: &str) -> Self {
        match token {
            "lastWeek" => TimeFrame::LastWeek,
            "lastMonth" => TimeFrame::LastMonth,
            "nextWeek" => TimeFrame::NextWeek,
            _ => TimeFrame::Today,
        }
    }

    /// The control-surface token for this time frame
    pub fn token(self) -> &'static str {
        match self {
            TimeFrame::Today => "today",
            TimeFrame::LastWeek => "lastWeek",
            TimeFrame::LastMonth => "lastMonth",
            TimeFrame::NextWeek => "nextWeek",
        }
    }

    /// Coordinate shift applied to every waypoint of the base route,
    /// degrees (lat, lng)
    pub fn offset(self) -> (f64, f64) {
        match self {
            TimeFrame::Today => (0.0, 0.0),
            TimeFrame::LastWeek => (-0.01, -0.01),
            TimeFrame::LastMonth => (-0.02, -0.02),
            TimeFrame::NextWeek => (0.01, 0.01),
        }
    }
}

/// Route generator keyed by time-frame token
///
/// Holds one base route and derives each time frame's route by shifting
/// every coordinate by that frame's fixed delta.
pub struct RouteSource {
    base: Vec<Waypoint>,
}

impl Default for RouteSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteSource {
    /// Source over the built-in base route
    pub fn new() -> Self {
        Self {
            base: BASE_ROUTE
                .iter()
                .map(|[lat, lng]| Waypoint::new(*lat, *lng))
                .collect(),
        }
    }

    /// Source over a custom base route
    pub fn with_base(base: Vec<Waypoint>) -> Self {
        Self { base }
    }

    /// Source over a base route loaded from a waypoint CSV file
    pub fn from_csv(path: &str) -> Result<Self> {
        Ok(Self::with_base(load_waypoints(path)?))
    }

    /// Generate the route for a time-frame token
    pub fn generate(&self, token: &str) -> Route {
        let frame = TimeFrame::parse(token);
        let (dlat, dlng) = frame.offset();
        Route::new(
            frame.token(),
            self.base.iter().map(|w| w.offset(dlat, dlng)).collect(),
        )
    }
}
