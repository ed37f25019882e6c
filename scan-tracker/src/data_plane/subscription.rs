//! Consumer-side handle to the snapshot fan-out.

use crate::data_plane::bridge::SchedulerBridge;
use crate::data_plane::registry::SubscriberId;
use crate::state::LatestScan;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

/// Stream of [`LatestScan`] snapshots broadcast after this subscription was
/// opened.
///
/// There is no replay: a subscriber that wants the current value should call
/// [`crate::ScanTracker::get_latest`] as well. Dropping the subscription
/// detaches it; other subscribers are unaffected.
pub struct ScanSubscription {
    id: SubscriberId,
    receiver: UnboundedReceiver<LatestScan>,
    bridge: SchedulerBridge,
}

impl ScanSubscription {
    pub(crate) fn open(bridge: &SchedulerBridge) -> Self {
        let (channel, receiver) = unbounded_channel();
        let id = SubscriberId::new();
        bridge.attach(id, channel);
        Self {
            id,
            receiver,
            bridge: bridge.clone(),
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Waits for the next snapshot. Returns `None` once the fan-out has shut
    /// down.
    pub async fn recv(&mut self) -> Option<LatestScan> {
        self.receiver.recv().await
    }
}

impl Stream for ScanSubscription {
    type Item = LatestScan;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for ScanSubscription {
    fn drop(&mut self) {
        self.bridge.detach(self.id);
    }
}

impl std::fmt::Debug for ScanSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSubscription")
            .field("id", &self.id)
            .finish()
    }
}
