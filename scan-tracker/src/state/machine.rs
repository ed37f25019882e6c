//! Pure transition logic for the tracked scan record.

use crate::state::event::{ScanEvent, StartDoc, StopDoc};
use crate::state::model::{LatestScan, ScanStatus};

/// Suffix appended to the scan file stem to form the output path.
pub const SCAN_FILE_SUFFIX: &str = ".nxs";

/// Why an event left the record untouched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HoldReason {
    /// A `start` document lacked one of its required fields.
    IncompleteStart,
    /// A `stop` document named a run other than the one in progress.
    UnrelatedStop { run_start: Option<String> },
    /// The document kind carries no state transition.
    IgnoredKind(Option<String>),
}

/// Outcome of evaluating one event against the current record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Transition {
    /// The record moves to this new value, which must be broadcast.
    Advance(LatestScan),
    /// Nothing changes and nothing is broadcast.
    Hold(HoldReason),
}

impl Transition {
    pub fn into_snapshot(self) -> Option<LatestScan> {
        match self {
            Transition::Advance(next) => Some(next),
            Transition::Hold(_) => None,
        }
    }
}

pub fn scan_filepath(directory: &str, file_stem: &str) -> String {
    format!("{directory}/{file_stem}{SCAN_FILE_SUFFIX}")
}

/// Decides the next record for `event` given `current`.
///
/// A terminal status is only ever entered from `Running`, and only for the
/// run currently being tracked.
pub fn transition(current: &LatestScan, event: &ScanEvent) -> Transition {
    match event {
        ScanEvent::Start(doc) => start(doc),
        ScanEvent::Stop(doc) => stop(current, doc),
        ScanEvent::Other(name) => Transition::Hold(HoldReason::IgnoredKind(name.clone())),
    }
}

fn start(doc: &StartDoc) -> Transition {
    let (Some(uid), Some(directory), Some(file_stem)) = (
        doc.uid.as_deref(),
        doc.data_session_directory.as_deref(),
        doc.scan_file.as_deref(),
    ) else {
        return Transition::Hold(HoldReason::IncompleteStart);
    };

    Transition::Advance(LatestScan {
        uuid: Some(uid.to_owned()),
        filepath: Some(scan_filepath(directory, file_stem)),
        status: ScanStatus::Running,
    })
}

fn stop(current: &LatestScan, doc: &StopDoc) -> Transition {
    let tracked = doc
        .run_start
        .as_deref()
        .is_some_and(|run_start| current.is_tracking(run_start));

    if !tracked || current.status != ScanStatus::Running {
        return Transition::Hold(HoldReason::UnrelatedStop {
            run_start: doc.run_start.clone(),
        });
    }

    Transition::Advance(LatestScan {
        status: if doc.succeeded() {
            ScanStatus::Finished
        } else {
            ScanStatus::Failed
        },
        ..current.clone()
    })
}
