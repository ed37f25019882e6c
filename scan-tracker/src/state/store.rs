//! Lock-guarded home of the single [`LatestScan`] record.

use crate::state::event::ScanEvent;
use crate::state::machine::{self, Transition};
use crate::state::model::LatestScan;
use parking_lot::Mutex;

/// Holds the tracked record. The lock is held only while the state machine
/// evaluates an event and the result is committed.
#[derive(Debug, Default)]
pub struct ScanStateStore {
    latest: Mutex<LatestScan>,
}

impl ScanStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current record.
    pub fn read(&self) -> LatestScan {
        self.latest.lock().clone()
    }

    /// Evaluates `event` against the current record and commits the result
    /// when it advances. The returned snapshot is a copy of what was committed.
    pub fn apply(&self, event: &ScanEvent) -> Transition {
        let mut latest = self.latest.lock();
        let transition = machine::transition(&latest, event);
        if let Transition::Advance(next) = &transition {
            *latest = next.clone();
        }
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::ScanStateStore;
    use crate::state::event::{ScanEvent, StartDoc, StopDoc};
    use crate::state::machine::Transition;
    use crate::state::model::ScanStatus;
    use std::sync::Arc;
    use std::thread;

    fn start_event(uid: &str) -> ScanEvent {
        ScanEvent::Start(StartDoc {
            uid: Some(uid.into()),
            data_session_directory: Some("/data/test".into()),
            scan_file: Some("scan001".into()),
        })
    }

    #[test]
    fn starts_idle() {
        let store = ScanStateStore::new();
        let latest = store.read();
        assert_eq!(latest.status, ScanStatus::Idle);
        assert_eq!(latest.uuid, None);
        assert_eq!(latest.filepath, None);
    }

    #[test]
    fn read_returns_an_independent_copy() {
        let store = ScanStateStore::new();
        store.apply(&start_event("abc123"));

        let mut copy = store.read();
        copy.uuid = Some("tampered".into());
        copy.status = ScanStatus::Failed;

        let latest = store.read();
        assert_eq!(latest.uuid.as_deref(), Some("abc123"));
        assert_eq!(latest.status, ScanStatus::Running);
    }

    #[test]
    fn apply_commits_advances_and_keeps_holds() {
        let store = ScanStateStore::new();

        let stray = store.apply(&ScanEvent::Stop(StopDoc {
            run_start: Some("xyz".into()),
            exit_status: "success".into(),
        }));
        assert!(matches!(stray, Transition::Hold(_)));
        assert_eq!(store.read().status, ScanStatus::Idle);

        let snapshot = store
            .apply(&start_event("abc123"))
            .into_snapshot()
            .expect("start advances");
        assert_eq!(snapshot, store.read());

        let finished = store
            .apply(&ScanEvent::Stop(StopDoc {
                run_start: Some("abc123".into()),
                exit_status: "success".into(),
            }))
            .into_snapshot()
            .expect("matching stop advances");
        assert_eq!(finished.status, ScanStatus::Finished);
        assert_eq!(store.read().status, ScanStatus::Finished);
    }

    #[test]
    fn concurrent_appliers_leave_a_consistent_record() {
        let store = Arc::new(ScanStateStore::new());

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        store.apply(&start_event(&format!("run-{n}-{i}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("applier thread");
        }

        let latest = store.read();
        assert_eq!(latest.status, ScanStatus::Running);
        assert!(latest.uuid.is_some());
        assert_eq!(latest.filepath.as_deref(), Some("/data/test/scan001.nxs"));
    }
}
