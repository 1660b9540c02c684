use crate::adapter::PresentationAdapter;
use crate::playback::Snapshot;
use async_trait::async_trait;
use tracing::info;

/// Console renderer that reports marker updates as log lines
///
/// Useful for headless runs and as a template for real map surfaces.
pub struct ConsoleAdapter {
    name: String,
    every: usize,
    seen: usize,
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self::with_throttle(1)
    }

    /// Log only every `every`-th snapshot while the marker is moving;
    /// state changes at rest are always logged
    pub fn with_throttle(every: usize) -> Self {
        Self {
            name: "console".to_string(),
            every: every.max(1),
            seen: 0,
        }
    }
}

#[async_trait]
impl PresentationAdapter for ConsoleAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.seen += 1;
        if snapshot.is_playing && self.seen % self.every != 0 {
            return;
        }

        info!(
            "Marker at {} heading {:.1}° progress {:.0}% speed {:.1}x [{:?}]",
            snapshot.position,
            snapshot.bearing_deg,
            snapshot.progress_pct,
            snapshot.speed,
            snapshot.state
        );
    }
}
