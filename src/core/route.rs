use crate::core::Waypoint;
use serde::{Deserialize, Serialize};

/// An ordered start-to-destination waypoint path
///
/// Index 0 is the start and the last index is the destination. The engine
/// rejects empty routes at load time; as a plain value a route may hold any
/// number of waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Label of the time frame that produced this route
    pub label: String,

    /// Ordered waypoints
    pub waypoints: Vec<Waypoint>,
}

impl Route {
    /// Create a new route
    pub fn new(label: impl Into<String>, waypoints: Vec<Waypoint>) -> Self {
        Self {
            label: label.into(),
            waypoints,
        }
    }

    /// Number of waypoints
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Check whether the route has no waypoints
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Index of the destination waypoint (0 for empty or single-point routes)
    pub fn last_index(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    /// Get the waypoint at an index
    pub fn get(&self, index: usize) -> Option<Waypoint> {
        self.waypoints.get(index).copied()
    }

    /// The start waypoint
    pub fn start(&self) -> Option<Waypoint> {
        self.waypoints.first().copied()
    }

    /// The destination waypoint
    pub fn destination(&self) -> Option<Waypoint> {
        self.waypoints.last().copied()
    }
}
