use crate::core::Route;
use crate::error::PlaybackError;
use crate::playback::{PlaybackConfig, PlaybackEngine, Snapshot};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Buffered snapshots per subscriber before broadcast applies backpressure
const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

type SubscriberList = Arc<Mutex<Vec<mpsc::Sender<Snapshot>>>>;

/// Tick scheduler and snapshot broadcaster around one playback engine
///
/// The driver is the sole writer of playback state: every user intent goes
/// through its operation API, and renderers only read the snapshots it
/// broadcasts. At most one ticker task exists at a time; the previous task
/// is aborted before a new one is spawned, and on every path that leaves
/// the playing state (pause, route reload, speed change, finish, drop), so
/// a stale timer can never keep advancing the marker.
pub struct PlaybackDriver {
    engine: Arc<Mutex<PlaybackEngine>>,
    subscribers: SubscriberList,
    ticker: Option<JoinHandle<()>>,
}

impl Default for PlaybackDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackDriver {
    pub fn new() -> Self {
        Self::with_config(PlaybackConfig::default())
    }

    pub fn with_config(config: PlaybackConfig) -> Self {
        Self {
            engine: Arc::new(Mutex::new(PlaybackEngine::with_config(config))),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            ticker: None,
        }
    }

    /// Subscribe to state-change snapshots
    ///
    /// The receiver gets one snapshot per state change, starting with the
    /// next change after subscription. Dropped receivers are pruned on the
    /// following broadcast.
    pub async fn subscribe(&self) -> mpsc::Receiver<Snapshot> {
        let (tx, rx) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);
        self.subscribers.lock().await.push(tx);
        rx
    }

    /// Take a snapshot of the current state, if a route is loaded
    pub async fn snapshot(&self) -> Option<Snapshot> {
        self.engine.lock().await.snapshot()
    }

    /// Replace the active route; playback stops and resets to its start
    ///
    /// On a load failure the engine keeps its prior state and any running
    /// tick loop is left untouched.
    pub async fn load_route(&mut self, route: Route) -> Result<(), PlaybackError> {
        let snapshot = {
            let mut engine = self.engine.lock().await;
            engine.load_route(route)?;
            // The lock is held, so the old ticker cannot observe the new
            // route before it is aborted here
            if let Some(handle) = self.ticker.take() {
                handle.abort();
            }
            info!(
                "Loaded route '{}' with {} waypoints",
                engine.route().map(|r| r.label.as_str()).unwrap_or(""),
                engine.route().map(|r| r.len()).unwrap_or(0)
            );
            engine.snapshot()
        };
        Self::broadcast(&self.subscribers, snapshot).await;
        Ok(())
    }

    /// Start or resume playback from the current index
    pub async fn play(&mut self) -> Result<(), PlaybackError> {
        let snapshot = {
            let mut engine = self.engine.lock().await;
            engine.play()?;
            engine.snapshot()
        };
        Self::broadcast(&self.subscribers, snapshot).await;
        self.respawn_ticker().await;
        Ok(())
    }

    /// Suspend playback, retaining the current index
    pub async fn pause(&mut self) {
        self.abort_ticker();
        let snapshot = {
            let mut engine = self.engine.lock().await;
            engine.pause();
            engine.snapshot()
        };
        debug!("Playback paused");
        Self::broadcast(&self.subscribers, snapshot).await;
    }

    /// Reset to the start of the route and begin playing
    pub async fn restart(&mut self) -> Result<(), PlaybackError> {
        let snapshot = {
            let mut engine = self.engine.lock().await;
            engine.restart()?;
            engine.snapshot()
        };
        info!("Playback restarted");
        Self::broadcast(&self.subscribers, snapshot).await;
        self.respawn_ticker().await;
        Ok(())
    }

    /// Change the speed multiplier, clamped into [1, 10]
    ///
    /// While playing, the pending tick at the old cadence is cancelled and
    /// rescheduled so the new interval applies from now on.
    pub async fn set_speed(&mut self, multiplier: f64) -> Result<(), PlaybackError> {
        let (snapshot, playing) = {
            let mut engine = self.engine.lock().await;
            engine.set_speed(multiplier)?;
            debug!("Speed set to {:.1}x", engine.speed());
            (engine.snapshot(), engine.is_playing())
        };
        Self::broadcast(&self.subscribers, snapshot).await;
        if playing {
            self.respawn_ticker().await;
        }
        Ok(())
    }

    /// Seek to a progress percentage; playback continues if it was running
    pub async fn scrub_to(&mut self, percent: f64) -> Result<(), PlaybackError> {
        let snapshot = {
            let mut engine = self.engine.lock().await;
            engine.scrub_to(percent)?;
            engine.snapshot()
        };
        Self::broadcast(&self.subscribers, snapshot).await;
        Ok(())
    }

    /// Cancel any scheduled tick, then schedule ticks at the current
    /// cadence while the engine is playing
    async fn respawn_ticker(&mut self) {
        self.abort_ticker();
        if !self.engine.lock().await.is_playing() {
            return;
        }

        let engine = self.engine.clone();
        let subscribers = self.subscribers.clone();
        self.ticker = Some(tokio::spawn(async move {
            loop {
                let interval = engine.lock().await.tick_interval();
                tokio::time::sleep(interval).await;

                let (snapshot, still_playing) = {
                    let mut engine = engine.lock().await;
                    if !engine.is_playing() {
                        break;
                    }
                    engine.tick();
                    (engine.snapshot(), engine.is_playing())
                };
                Self::broadcast(&subscribers, snapshot).await;

                if !still_playing {
                    debug!("Destination reached");
                    break;
                }
            }
        }));
    }

    fn abort_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    async fn broadcast(subscribers: &SubscriberList, snapshot: Option<Snapshot>) {
        let Some(snapshot) = snapshot else {
            return;
        };
        let mut subs = subscribers.lock().await;
        let mut closed = Vec::new();
        for (i, tx) in subs.iter().enumerate() {
            if tx.send(snapshot.clone()).await.is_err() {
                closed.push(i);
            }
        }
        for i in closed.into_iter().rev() {
            subs.remove(i);
        }
    }
}

impl Drop for PlaybackDriver {
    fn drop(&mut self) {
        self.abort_ticker();
    }
}
