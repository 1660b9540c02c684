pub mod console;

pub use console::ConsoleAdapter;

use crate::playback::Snapshot;
use async_trait::async_trait;

/// Trait for presentation surfaces that render playback snapshots
///
/// Implementations subscribe to a driver's snapshot stream and draw the
/// marker position, heading, and progress however they like. They never
/// mutate playback state directly; user intents go back through the
/// driver's operation API.
#[async_trait]
pub trait PresentationAdapter: Send {
    /// Name of this surface
    fn name(&self) -> &str;

    /// Render one state-change snapshot
    async fn on_snapshot(&mut self, snapshot: &Snapshot);
}
