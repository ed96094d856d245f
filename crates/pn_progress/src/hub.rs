use futures::stream::{self, Stream};
use pn_core::ScrapeProgress;
use tokio::sync::{broadcast, watch};
use tracing::warn;

const DEFAULT_CAPACITY: usize = 64;

/// Latest-value cell plus an ordered fan-out of every published snapshot.
#[derive(Debug)]
pub struct ProgressHub {
    latest: watch::Sender<ScrapeProgress>,
    events: broadcast::Sender<ScrapeProgress>,
}

impl Default for ProgressHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (latest, _) = watch::channel(ScrapeProgress::default());
        let (events, _) = broadcast::channel(capacity.max(1));
        Self { latest, events }
    }

    pub fn publish(&self, snapshot: ScrapeProgress) {
        self.latest.send_replace(snapshot.clone());
        // no subscribers is fine
        let _ = self.events.send(snapshot);
    }

    pub fn latest(&self) -> ScrapeProgress {
        self.latest.borrow().clone()
    }

    /// Snapshots published from now on, in order.
    pub fn subscribe(&self) -> ProgressStream {
        ProgressStream {
            rx: self.events.subscribe(),
        }
    }

    pub fn watch(&self) -> watch::Receiver<ScrapeProgress> {
        self.latest.subscribe()
    }
}

pub struct ProgressStream {
    rx: broadcast::Receiver<ScrapeProgress>,
}

impl ProgressStream {
    /// Next snapshot, or `None` once the hub is gone. Lagging receivers skip ahead.
    pub async fn next(&mut self) -> Option<ScrapeProgress> {
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Progress subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = ScrapeProgress> {
        stream::unfold(self, |mut s| async move { s.next().await.map(|p| (p, s)) })
    }
}
