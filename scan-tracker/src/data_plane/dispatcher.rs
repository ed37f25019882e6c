//! Broadcast dispatcher task.
//!
//! The dispatcher is the single owner of the [`SubscriberRegistry`]. Attach,
//! detach and broadcast requests arrive on one FIFO queue, which gives every
//! subscriber the same order of snapshots and makes an attach that was
//! requested before a broadcast see that broadcast.

use crate::data_plane::bridge::SchedulerBridge;
use crate::data_plane::registry::{SubscriberId, SubscriberRegistry};
use crate::observability::events;
use crate::state::LatestScan;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::info;

const COMPONENT: &str = "broadcast_dispatcher";

pub(crate) enum DispatchCommand {
    Attach {
        id: SubscriberId,
        channel: UnboundedSender<LatestScan>,
    },
    Detach(SubscriberId),
    Broadcast(LatestScan),
}

pub(crate) struct BroadcastDispatcher {
    registry: SubscriberRegistry,
}

impl BroadcastDispatcher {
    /// Spawns the dispatcher on `runtime` and returns the bridge feeding it.
    ///
    /// The task ends once every bridge clone has been dropped.
    pub(crate) fn spawn(runtime: &Handle) -> SchedulerBridge {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            registry: SubscriberRegistry::new(),
        };
        runtime.spawn(dispatcher.run(commands_rx));
        SchedulerBridge::new(commands_tx)
    }

    async fn run(mut self, mut commands: UnboundedReceiver<DispatchCommand>) {
        while let Some(command) = commands.recv().await {
            self.handle(command);
        }
        info!(
            event = events::DISPATCHER_STOPPED,
            component = COMPONENT,
            subscribers = self.registry.len(),
            "all bridges dropped, dispatcher stopping"
        );
    }

    fn handle(&mut self, command: DispatchCommand) {
        match command {
            DispatchCommand::Attach { id, channel } => self.registry.attach(id, channel),
            DispatchCommand::Detach(id) => {
                self.registry.detach(&id);
            }
            DispatchCommand::Broadcast(snapshot) => {
                self.registry.broadcast(&snapshot);
            }
        }
    }
}
