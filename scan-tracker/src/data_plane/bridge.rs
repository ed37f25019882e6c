//! Handoff from foreign threads to the dispatcher task.

use crate::data_plane::dispatcher::DispatchCommand;
use crate::data_plane::registry::SubscriberId;
use crate::observability::events;
use crate::state::LatestScan;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

const COMPONENT: &str = "scheduler_bridge";

/// Queues work onto the dispatcher from any thread without blocking.
///
/// Every method is fire-and-forget. If the dispatcher's runtime is gone the
/// request is logged and dropped; nothing is raised to the caller.
#[derive(Clone)]
pub(crate) struct SchedulerBridge {
    commands: UnboundedSender<DispatchCommand>,
}

impl SchedulerBridge {
    pub(crate) fn new(commands: UnboundedSender<DispatchCommand>) -> Self {
        Self { commands }
    }

    /// Schedules a broadcast of `snapshot` to every attached subscriber.
    pub(crate) fn schedule(&self, snapshot: LatestScan) {
        self.submit(DispatchCommand::Broadcast(snapshot), "broadcast");
    }

    pub(crate) fn attach(&self, id: SubscriberId, channel: UnboundedSender<LatestScan>) {
        self.submit(DispatchCommand::Attach { id, channel }, "attach");
    }

    pub(crate) fn detach(&self, id: SubscriberId) {
        self.submit(DispatchCommand::Detach(id), "detach");
    }

    fn submit(&self, command: DispatchCommand, kind: &'static str) {
        if self.commands.send(command).is_err() {
            warn!(
                event = events::BRIDGE_SCHEDULE_FAILED,
                component = COMPONENT,
                kind,
                "dispatcher is not running, dropping request"
            );
        }
    }
}
