//! Subscriber registry owned by the broadcast dispatcher.

use crate::observability::events;
use crate::state::LatestScan;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};
use uuid::Uuid;

const COMPONENT: &str = "subscriber_registry";

/// Identity of one attached subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for SubscriberId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Per-subscriber delivery channels.
///
/// Only ever touched from the dispatcher task, so it carries no lock.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    channels: HashMap<SubscriberId, UnboundedSender<LatestScan>>,
}

impl SubscriberRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn attach(&mut self, id: SubscriberId, channel: UnboundedSender<LatestScan>) {
        if self.channels.insert(id, channel).is_some() {
            warn!(
                component = COMPONENT,
                subscriber = %id,
                "replaced channel of an already attached subscriber"
            );
        }
        debug!(
            event = events::SUBSCRIBER_ATTACH,
            component = COMPONENT,
            subscriber = %id,
            subscribers = self.channels.len(),
            "subscriber attached"
        );
    }

    /// Removes `id`. Detaching an unknown subscriber is a no-op.
    pub(crate) fn detach(&mut self, id: &SubscriberId) -> bool {
        let removed = self.channels.remove(id).is_some();
        if removed {
            debug!(
                event = events::SUBSCRIBER_DETACH,
                component = COMPONENT,
                subscriber = %id,
                subscribers = self.channels.len(),
                "subscriber detached"
            );
        }
        removed
    }

    /// Pushes a copy of `snapshot` to every attached subscriber and returns
    /// how many received it.
    ///
    /// A failed push is logged and the subscriber dropped; delivery to the
    /// others continues.
    pub(crate) fn broadcast(&mut self, snapshot: &LatestScan) -> usize {
        if self.channels.is_empty() {
            return 0;
        }

        let mut closed = Vec::new();
        for (id, channel) in &self.channels {
            if channel.send(snapshot.clone()).is_err() {
                warn!(
                    event = events::BROADCAST_DELIVER_FAILED,
                    component = COMPONENT,
                    subscriber = %id,
                    "subscriber channel closed, dropping subscriber"
                );
                closed.push(*id);
            }
        }
        for id in &closed {
            self.channels.remove(id);
        }

        let delivered = self.channels.len();
        debug!(
            event = events::BROADCAST_DONE,
            component = COMPONENT,
            delivered,
            dropped = closed.len(),
            status = %snapshot.status,
            "broadcast complete"
        );
        delivered
    }

    pub(crate) fn len(&self) -> usize {
        self.channels.len()
    }
}
