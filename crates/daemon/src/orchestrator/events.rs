use engine::ControlSnapshot;
use tokio::sync::watch;
use tracing::debug;

/// Fans read-only snapshots out to every panel connection.
///
/// A watch channel keeps only the latest snapshot, so a slow subscriber skips
/// intermediate progress messages instead of lagging behind.
pub struct SnapshotFeed {
    tx: watch::Sender<ControlSnapshot>,
}

impl SnapshotFeed {
    pub fn new(initial: ControlSnapshot) -> Self {
        let (tx, _rx) = watch::channel(initial);
        SnapshotFeed { tx }
    }

    pub fn publish(&self, snapshot: ControlSnapshot) {
        debug!(
            "[Events] {:?}: {} ({} subscribers)",
            snapshot.status.phase,
            snapshot.status.message,
            self.tx.receiver_count()
        );
        // send_replace stores the value even with no subscribers
        self.tx.send_replace(snapshot);
    }

    pub fn subscribe(&self) -> watch::Receiver<ControlSnapshot> {
        self.tx.subscribe()
    }
}
