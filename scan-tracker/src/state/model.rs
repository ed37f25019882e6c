//! The single tracked record and its lifecycle phase.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Lifecycle phase of the tracked run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScanStatus {
    #[default]
    Idle,
    Running,
    Finished,
    Failed,
}

impl ScanStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanStatus::Finished | ScanStatus::Failed)
    }
}

/// Latest known state of the scan process.
///
/// Values handed out by the tracker are always copies; mutating one never
/// reaches the tracker's own record.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct LatestScan {
    pub uuid: Option<String>,
    pub filepath: Option<String>,
    pub status: ScanStatus,
}

impl LatestScan {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Returns `true` when `run_id` names the run this record is tracking.
    pub fn is_tracking(&self, run_id: &str) -> bool {
        self.uuid.as_deref() == Some(run_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{LatestScan, ScanStatus};
    use serde_json::json;

    #[test]
    fn idle_record_serializes_with_nulls() {
        let value = serde_json::to_value(LatestScan::idle()).expect("serialize idle scan");
        assert_eq!(
            value,
            json!({ "uuid": null, "filepath": null, "status": "idle" })
        );
    }

    #[test]
    fn running_record_serializes_lowercase_status() {
        let scan = LatestScan {
            uuid: Some("abc123".to_string()),
            filepath: Some("/data/test/scan001.nxs".to_string()),
            status: ScanStatus::Running,
        };

        let value = serde_json::to_value(&scan).expect("serialize running scan");
        assert_eq!(value["status"], "running");
        assert_eq!(value["uuid"], "abc123");
        assert_eq!(value["filepath"], "/data/test/scan001.nxs");
    }

    #[test]
    fn terminal_statuses() {
        assert!(!ScanStatus::Idle.is_terminal());
        assert!(!ScanStatus::Running.is_terminal());
        assert!(ScanStatus::Finished.is_terminal());
        assert!(ScanStatus::Failed.is_terminal());
        assert_eq!(ScanStatus::Failed.to_string(), "failed");
    }
}
