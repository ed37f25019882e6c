//! Broker listener that folds scan documents into the store and feeds fan-out.

use crate::broker::FrameListener;
use crate::data_plane::bridge::SchedulerBridge;
use crate::observability::events;
use crate::state::{HoldReason, ScanEvent, ScanStateStore, Transition};
use std::sync::Arc;
use tracing::{debug, info, warn};

const COMPONENT: &str = "ingress_listener";

pub(crate) struct ScanIngressListener {
    store: Arc<ScanStateStore>,
    bridge: SchedulerBridge,
}

impl ScanIngressListener {
    pub(crate) fn new(store: Arc<ScanStateStore>, bridge: SchedulerBridge) -> Self {
        Self { store, bridge }
    }
}

impl FrameListener for ScanIngressListener {
    fn on_message(&self, body: &[u8]) {
        debug!(
            event = events::INGRESS_RECEIVE,
            component = COMPONENT,
            len = body.len(),
            "received broker message"
        );

        let event = match ScanEvent::from_slice(body) {
            Ok(event) => event,
            Err(err) => {
                warn!(
                    event = events::INGRESS_DROP_MALFORMED,
                    component = COMPONENT,
                    err = %err,
                    "dropping message with malformed body"
                );
                return;
            }
        };

        match self.store.apply(&event) {
            Transition::Advance(snapshot) => {
                let event_name = if snapshot.status.is_terminal() {
                    events::SCAN_STOPPED
                } else {
                    events::SCAN_STARTED
                };
                info!(
                    event = event_name,
                    component = COMPONENT,
                    uuid = snapshot.uuid.as_deref().unwrap_or_default(),
                    filepath = snapshot.filepath.as_deref().unwrap_or_default(),
                    status = %snapshot.status,
                    "scan state advanced"
                );
                self.bridge.schedule(snapshot);
            }
            Transition::Hold(HoldReason::IncompleteStart) => warn!(
                event = events::INGRESS_DROP_INCOMPLETE_START,
                component = COMPONENT,
                "start document missing uid, data_session_directory or scan_file"
            ),
            Transition::Hold(HoldReason::UnrelatedStop { run_start }) => debug!(
                event = events::INGRESS_DROP_UNRELATED_STOP,
                component = COMPONENT,
                run_start = run_start.as_deref().unwrap_or_default(),
                "stop does not match the running scan"
            ),
            Transition::Hold(HoldReason::IgnoredKind(_)) => debug!(
                event = events::INGRESS_IGNORE_KIND,
                component = COMPONENT,
                kind = event.kind(),
                "document kind carries no transition"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ScanIngressListener;
    use crate::broker::FrameListener;
    use crate::data_plane::bridge::SchedulerBridge;
    use crate::data_plane::dispatcher::DispatchCommand;
    use crate::state::{ScanStateStore, ScanStatus};
    use std::sync::Arc;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn listener() -> (
        ScanIngressListener,
        Arc<ScanStateStore>,
        UnboundedReceiver<DispatchCommand>,
    ) {
        let (tx, rx) = unbounded_channel();
        let store = Arc::new(ScanStateStore::new());
        (
            ScanIngressListener::new(store.clone(), SchedulerBridge::new(tx)),
            store,
            rx,
        )
    }

    #[test]
    fn advancing_event_updates_store_and_schedules_snapshot() {
        let (listener, store, mut rx) = listener();

        listener.on_message(
            br#"{"name":"start","doc":{"uid":"abc123","data_session_directory":"/data/test","scan_file":"scan001"}}"#,
        );

        let latest = store.read();
        assert_eq!(latest.status, ScanStatus::Running);
        assert!(matches!(
            rx.try_recv(),
            Ok(DispatchCommand::Broadcast(snapshot)) if snapshot == latest
        ));
    }

    #[test]
    fn malformed_and_held_events_schedule_nothing() {
        let (listener, store, mut rx) = listener();

        listener.on_message(b"{not json");
        listener.on_message(b"[1, 2]");
        listener.on_message(br#"{"name":"start","doc":{"uid":"abc123"}}"#);
        listener.on_message(br#"{"name":"stop","doc":{"run_start":"xyz","exit_status":"success"}}"#);
        listener.on_message(br#"{"name":"descriptor","doc":{}}"#);

        assert_eq!(store.read().status, ScanStatus::Idle);
        assert!(rx.try_recv().is_err());
    }
}
