use crate::core::{bearing, Route, Waypoint};
use crate::error::PlaybackError;
use crate::playback::{PlaybackConfig, PlaybackState, Snapshot};
use chrono::Utc;
use std::time::Duration;

/// Lower bound for the speed multiplier
pub const MIN_SPEED: f64 = 1.0;

/// Upper bound for the speed multiplier
pub const MAX_SPEED: f64 = 10.0;

/// Playback engine for a waypoint route
///
/// Synchronous state machine over `Idle → Ready → Playing → Paused →
/// Finished`. The engine owns the current index, progress, bearing, and
/// speed; an external scheduler calls `tick()` once per interval while
/// playing. Every operation completes within the call, and a tick updates
/// index, position, bearing, and progress as a single transition.
///
/// `play()` at `Finished` is a no-op once the destination is reached;
/// `restart()` is the way to run the route again. Scrubbing back from the
/// end re-arms `play()`.
pub struct PlaybackEngine {
    route: Option<Route>,
    config: PlaybackConfig,
    state: PlaybackState,
    current_index: usize,
    progress_pct: f64,
    bearing_deg: f64,
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackEngine {
    pub fn new() -> Self {
        Self::with_config(PlaybackConfig::default())
    }

    pub fn with_config(config: PlaybackConfig) -> Self {
        Self {
            route: None,
            config,
            state: PlaybackState::Idle,
            current_index: 0,
            progress_pct: 0.0,
            bearing_deg: 0.0,
        }
    }

    /// Get the current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Check if the tick loop should be running
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Get the current waypoint index
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Get the marker position, if a route is loaded
    pub fn current_position(&self) -> Option<Waypoint> {
        self.route.as_ref().and_then(|r| r.get(self.current_index))
    }

    /// Get the progress percentage, 0 to 100
    pub fn progress_pct(&self) -> f64 {
        self.progress_pct
    }

    /// Get the heading of the segment being traversed, degrees in [0, 360)
    pub fn bearing_deg(&self) -> f64 {
        self.bearing_deg
    }

    /// Get the current speed multiplier
    pub fn speed(&self) -> f64 {
        self.config.speed
    }

    /// Get the loaded route
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Interval until the next tick at the current speed
    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval()
    }

    /// Replace the active route and reset playback to its start
    ///
    /// Fails with `EmptyRoute` for a route with no waypoints and with
    /// `InvalidInput` if any coordinate is non-finite; either way the
    /// engine keeps its prior state.
    pub fn load_route(&mut self, route: Route) -> Result<(), PlaybackError> {
        if route.is_empty() {
            return Err(PlaybackError::EmptyRoute);
        }
        if route.waypoints.iter().any(|w| !w.is_finite()) {
            return Err(PlaybackError::InvalidInput);
        }

        self.bearing_deg = segment_bearing(&route, 0).unwrap_or(0.0);
        self.route = Some(route);
        self.current_index = 0;
        self.progress_pct = 0.0;
        self.state = PlaybackState::Ready;
        Ok(())
    }

    /// Start or resume playback from the current index
    ///
    /// No-op while already playing or once the destination is reached.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        let route = self.route.as_ref().ok_or(PlaybackError::NoRouteLoaded)?;

        if self.state == PlaybackState::Playing {
            return Ok(());
        }
        if self.current_index == route.last_index() {
            // Destination already reached; restart() runs the route again
            self.state = PlaybackState::Finished;
            return Ok(());
        }

        self.state = PlaybackState::Playing;
        Ok(())
    }

    /// Suspend the tick loop, retaining the current index
    ///
    /// No-op unless playing.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Reset to the start of the route and begin playing
    pub fn restart(&mut self) -> Result<(), PlaybackError> {
        let route = self.route.as_ref().ok_or(PlaybackError::NoRouteLoaded)?;

        self.current_index = 0;
        self.progress_pct = 0.0;
        self.bearing_deg = segment_bearing(route, 0).unwrap_or(0.0);
        self.state = if route.last_index() == 0 {
            // A single waypoint has no segment to traverse
            PlaybackState::Finished
        } else {
            PlaybackState::Playing
        };
        Ok(())
    }

    /// Set the speed multiplier, clamped into [1, 10]
    ///
    /// Fails with `InvalidSpeed` for non-finite or non-positive values.
    /// Never changes the current index or position; takes effect on the
    /// next scheduled tick.
    pub fn set_speed(&mut self, multiplier: f64) -> Result<(), PlaybackError> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(PlaybackError::InvalidSpeed(multiplier));
        }
        self.config.speed = multiplier.clamp(MIN_SPEED, MAX_SPEED);
        Ok(())
    }

    /// Seek to a progress percentage along the route
    ///
    /// Out-of-range percentages are clamped into [0, 100]; non-finite ones
    /// fail with `InvalidInput`. Does not start or stop the tick loop:
    /// scrubbing while playing continues from the new index on the next
    /// tick.
    pub fn scrub_to(&mut self, percent: f64) -> Result<(), PlaybackError> {
        let route = self.route.as_ref().ok_or(PlaybackError::NoRouteLoaded)?;
        if !percent.is_finite() {
            return Err(PlaybackError::InvalidInput);
        }

        let pct = percent.clamp(0.0, 100.0);
        let last = route.last_index();
        let new_index = ((last as f64 * pct / 100.0).floor() as usize).min(last);

        if let Some(deg) = segment_bearing(route, new_index) {
            self.bearing_deg = deg;
        }
        self.current_index = new_index;
        self.progress_pct = pct;

        if self.state != PlaybackState::Playing {
            if last > 0 && new_index == last {
                self.state = PlaybackState::Finished;
            } else if self.state == PlaybackState::Finished {
                self.state = PlaybackState::Paused;
            }
        }
        Ok(())
    }

    /// Advance one waypoint; called once per interval while playing
    ///
    /// Index, position, bearing, and progress all change together in one
    /// transition. Reaching the destination clears the playing flag.
    pub fn tick(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(route) = self.route.as_ref() else {
            return;
        };

        let last = route.last_index();
        if self.current_index < last {
            let next = self.current_index + 1;
            if let Ok(deg) = bearing(route.waypoints[next - 1], route.waypoints[next]) {
                self.bearing_deg = deg;
            }
            self.current_index = next;
            self.progress_pct = next as f64 / last as f64 * 100.0;
            if next == last {
                self.state = PlaybackState::Finished;
            }
        } else {
            self.state = PlaybackState::Finished;
        }
    }

    /// Take a read-only snapshot, or `None` before any route is loaded
    pub fn snapshot(&self) -> Option<Snapshot> {
        Some(Snapshot {
            position: self.current_position()?,
            bearing_deg: self.bearing_deg,
            progress_pct: self.progress_pct,
            is_playing: self.is_playing(),
            speed: self.config.speed,
            state: self.state,
            timestamp: Utc::now(),
        })
    }
}

/// Heading for the segment that arrives at `index`; the first segment for
/// index 0. `None` when the route has no segments.
fn segment_bearing(route: &Route, index: usize) -> Option<f64> {
    if route.len() < 2 {
        return None;
    }
    let (from, to) = if index == 0 { (0, 1) } else { (index - 1, index) };
    bearing(route.waypoints[from], route.waypoints[to]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_route(n: usize) -> Route {
        Route::new(
            "today",
            (0..n).map(|i| Waypoint::new(0.0, i as f64)).collect(),
        )
    }

    fn loaded_engine(n: usize) -> PlaybackEngine {
        let mut engine = PlaybackEngine::new();
        engine.load_route(straight_route(n)).unwrap();
        engine
    }

    #[test]
    fn test_load_route_resets_state() {
        let mut engine = loaded_engine(5);
        engine.play().unwrap();
        engine.tick();
        assert_eq!(engine.current_index(), 1);

        engine.load_route(straight_route(3)).unwrap();
        assert_eq!(engine.state(), PlaybackState::Ready);
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.progress_pct(), 0.0);
        assert_eq!(engine.current_position(), Some(Waypoint::new(0.0, 0.0)));
        assert!(!engine.is_playing());
    }

    #[test]
    fn test_load_empty_route_fails_and_keeps_state() {
        let mut engine = loaded_engine(5);
        engine.play().unwrap();
        engine.tick();

        let result = engine.load_route(Route::new("today", vec![]));
        assert_eq!(result, Err(PlaybackError::EmptyRoute));
        assert_eq!(engine.current_index(), 1);
        assert_eq!(engine.state(), PlaybackState::Playing);
        assert_eq!(engine.route().unwrap().len(), 5);
    }

    #[test]
    fn test_load_non_finite_route_fails() {
        let mut engine = PlaybackEngine::new();
        let route = Route::new(
            "today",
            vec![Waypoint::new(0.0, 0.0), Waypoint::new(f64::NAN, 1.0)],
        );
        assert_eq!(engine.load_route(route), Err(PlaybackError::InvalidInput));
        assert_eq!(engine.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_play_requires_route() {
        let mut engine = PlaybackEngine::new();
        assert_eq!(engine.play(), Err(PlaybackError::NoRouteLoaded));
        assert_eq!(engine.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_ticking_to_destination() {
        // N-1 ticks from index 0 reach the last index, progress 100, stopped
        let n = 6;
        let mut engine = loaded_engine(n);
        engine.play().unwrap();

        for _ in 0..n - 1 {
            engine.tick();
        }
        assert_eq!(engine.current_index(), n - 1);
        assert_eq!(engine.progress_pct(), 100.0);
        assert!(!engine.is_playing());
        assert_eq!(engine.state(), PlaybackState::Finished);
    }

    #[test]
    fn test_three_waypoint_scenario() {
        // route = [(0,0),(0,1),(0,2)]; play; two ticks reach the end
        let mut engine = loaded_engine(3);
        engine.play().unwrap();

        engine.tick();
        assert_eq!(engine.current_index(), 1);
        assert_eq!(engine.progress_pct(), 50.0);
        assert!(engine.is_playing());

        engine.tick();
        assert_eq!(engine.current_index(), 2);
        assert_eq!(engine.progress_pct(), 100.0);
        assert!(!engine.is_playing());
    }

    #[test]
    fn test_tick_updates_bearing_for_segment() {
        let mut engine = PlaybackEngine::new();
        engine
            .load_route(Route::new(
                "today",
                vec![
                    Waypoint::new(0.0, 0.0),
                    Waypoint::new(0.0, 1.0),
                    Waypoint::new(1.0, 1.0),
                ],
            ))
            .unwrap();
        // Initial bearing is the first segment, due east
        assert!((engine.bearing_deg() - 0.0).abs() < 1e-9);

        engine.play().unwrap();
        engine.tick();
        assert!((engine.bearing_deg() - 0.0).abs() < 1e-9);
        engine.tick();
        // Second segment heads due north
        assert!((engine.bearing_deg() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_pause_only_from_playing() {
        let mut engine = PlaybackEngine::new();
        engine.pause();
        assert_eq!(engine.state(), PlaybackState::Idle);

        engine.load_route(straight_route(3)).unwrap();
        engine.pause();
        assert_eq!(engine.state(), PlaybackState::Ready);

        engine.play().unwrap();
        engine.tick();
        engine.pause();
        assert_eq!(engine.state(), PlaybackState::Paused);
        assert_eq!(engine.current_index(), 1);

        // Resume from the retained index
        engine.play().unwrap();
        engine.tick();
        assert_eq!(engine.current_index(), 2);
    }

    #[test]
    fn test_play_at_finished_is_a_no_op() {
        let mut engine = loaded_engine(3);
        engine.play().unwrap();
        engine.tick();
        engine.tick();
        assert_eq!(engine.state(), PlaybackState::Finished);

        engine.play().unwrap();
        assert_eq!(engine.state(), PlaybackState::Finished);
        assert!(!engine.is_playing());
        assert_eq!(engine.current_index(), 2);
    }

    #[test]
    fn test_restart_from_finished() {
        let mut engine = loaded_engine(3);
        engine.play().unwrap();
        engine.tick();
        engine.tick();

        engine.restart().unwrap();
        assert_eq!(engine.state(), PlaybackState::Playing);
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.progress_pct(), 0.0);
        assert_eq!(engine.current_position(), Some(Waypoint::new(0.0, 0.0)));
    }

    #[test]
    fn test_restart_requires_route() {
        let mut engine = PlaybackEngine::new();
        assert_eq!(engine.restart(), Err(PlaybackError::NoRouteLoaded));
    }

    #[test]
    fn test_set_speed_clamps() {
        let mut engine = PlaybackEngine::new();
        engine.set_speed(15.0).unwrap();
        assert_eq!(engine.speed(), 10.0);

        engine.set_speed(0.5).unwrap();
        assert_eq!(engine.speed(), 1.0);

        engine.set_speed(4.0).unwrap();
        assert_eq!(engine.speed(), 4.0);
    }

    #[test]
    fn test_set_speed_rejects_non_finite() {
        let mut engine = PlaybackEngine::new();
        assert!(matches!(
            engine.set_speed(f64::NAN),
            Err(PlaybackError::InvalidSpeed(_))
        ));
        assert_eq!(
            engine.set_speed(0.0),
            Err(PlaybackError::InvalidSpeed(0.0))
        );
        assert_eq!(
            engine.set_speed(-3.0),
            Err(PlaybackError::InvalidSpeed(-3.0))
        );
    }

    #[test]
    fn test_speed_change_never_moves_the_marker() {
        let mut engine = loaded_engine(5);
        engine.play().unwrap();
        engine.tick();
        let index = engine.current_index();
        let position = engine.current_position();

        engine.set_speed(9.0).unwrap();
        assert_eq!(engine.current_index(), index);
        assert_eq!(engine.current_position(), position);
        assert!(engine.is_playing());
    }

    #[test]
    fn test_scrub_is_idempotent() {
        let mut engine = loaded_engine(10);
        engine.scrub_to(37.0).unwrap();
        let index = engine.current_index();
        let progress = engine.progress_pct();
        let bearing_deg = engine.bearing_deg();

        engine.scrub_to(37.0).unwrap();
        assert_eq!(engine.current_index(), index);
        assert_eq!(engine.progress_pct(), progress);
        assert_eq!(engine.bearing_deg(), bearing_deg);
    }

    #[test]
    fn test_scrub_round_trip_returns_to_start() {
        let mut engine = loaded_engine(10);
        let start = engine.current_position();

        engine.scrub_to(0.0).unwrap();
        engine.scrub_to(100.0).unwrap();
        assert_eq!(engine.current_index(), 9);
        engine.scrub_to(0.0).unwrap();
        assert_eq!(engine.current_position(), start);
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.progress_pct(), 0.0);
    }

    #[test]
    fn test_scrub_clamps_out_of_range() {
        let mut engine = loaded_engine(5);
        engine.scrub_to(250.0).unwrap();
        assert_eq!(engine.current_index(), 4);
        assert_eq!(engine.progress_pct(), 100.0);

        engine.scrub_to(-40.0).unwrap();
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.progress_pct(), 0.0);
    }

    #[test]
    fn test_scrub_rejects_non_finite() {
        let mut engine = loaded_engine(5);
        assert_eq!(engine.scrub_to(f64::NAN), Err(PlaybackError::InvalidInput));
        assert_eq!(
            engine.scrub_to(f64::INFINITY),
            Err(PlaybackError::InvalidInput)
        );
    }

    #[test]
    fn test_scrub_requires_route() {
        let mut engine = PlaybackEngine::new();
        assert_eq!(engine.scrub_to(50.0), Err(PlaybackError::NoRouteLoaded));
    }

    #[test]
    fn test_scrub_while_playing_keeps_playing() {
        let mut engine = loaded_engine(10);
        engine.play().unwrap();
        engine.tick();

        engine.scrub_to(50.0).unwrap();
        assert!(engine.is_playing());
        assert_eq!(engine.current_index(), 4);

        engine.tick();
        assert_eq!(engine.current_index(), 5);
    }

    #[test]
    fn test_scrub_back_from_finished_rearms_play() {
        let mut engine = loaded_engine(3);
        engine.play().unwrap();
        engine.tick();
        engine.tick();
        assert_eq!(engine.state(), PlaybackState::Finished);

        engine.scrub_to(0.0).unwrap();
        assert_eq!(engine.state(), PlaybackState::Paused);

        engine.play().unwrap();
        assert!(engine.is_playing());
        engine.tick();
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn test_scrub_to_end_while_stopped_finishes() {
        let mut engine = loaded_engine(4);
        engine.scrub_to(100.0).unwrap();
        assert_eq!(engine.state(), PlaybackState::Finished);
        assert!(!engine.is_playing());
    }

    #[test]
    fn test_single_waypoint_route_cannot_move() {
        let mut engine = loaded_engine(1);
        assert_eq!(engine.state(), PlaybackState::Ready);

        engine.play().unwrap();
        assert_eq!(engine.state(), PlaybackState::Finished);
        assert!(!engine.is_playing());
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut engine = PlaybackEngine::new();
        assert!(engine.snapshot().is_none());

        engine.load_route(straight_route(3)).unwrap();
        engine.play().unwrap();
        engine.tick();

        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.position, Waypoint::new(0.0, 1.0));
        assert_eq!(snapshot.progress_pct, 50.0);
        assert!(snapshot.is_playing);
        assert_eq!(snapshot.state, PlaybackState::Playing);
        assert_eq!(snapshot.speed, 1.0);
    }

    #[test]
    fn test_progress_tracks_index_stepping() {
        let n = 5;
        let mut engine = loaded_engine(n);
        engine.play().unwrap();
        for i in 1..n {
            engine.tick();
            let expected = i as f64 / (n - 1) as f64 * 100.0;
            assert_eq!(engine.progress_pct(), expected);
            assert_eq!(
                engine.current_position(),
                Some(Waypoint::new(0.0, i as f64))
            );
        }
    }
}
