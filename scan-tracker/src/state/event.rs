//! Decoding of inbound broker bodies into scan events.

use serde::de::Error as _;
use serde_json::{Map, Value};

/// Fields of a `start` document. A field that is absent, not a string, or
/// empty is held as `None`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StartDoc {
    pub uid: Option<String>,
    pub data_session_directory: Option<String>,
    pub scan_file: Option<String>,
}

/// Fields of a `stop` document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StopDoc {
    pub run_start: Option<String>,
    pub exit_status: String,
}

impl StopDoc {
    pub const SUCCESS: &'static str = "success";
    const UNKNOWN: &'static str = "unknown";

    pub fn succeeded(&self) -> bool {
        self.exit_status == Self::SUCCESS
    }
}

/// One inbound broker event, reduced to what the state machine reads.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScanEvent {
    Start(StartDoc),
    Stop(StopDoc),
    /// Any other document kind; the name is kept for logging only.
    Other(Option<String>),
}

impl ScanEvent {
    /// Parses a raw message body of the form `{"name": ..., "doc": {...}}`.
    ///
    /// Fails only when the body is not a JSON object; unexpected field types
    /// inside an object degrade to missing fields instead.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let Value::Object(envelope) = serde_json::from_slice::<Value>(body)? else {
            return Err(serde_json::Error::custom("message body is not a JSON object"));
        };
        let empty = Map::new();
        let doc = envelope
            .get("doc")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        Ok(match envelope.get("name").and_then(Value::as_str) {
            Some("start") => ScanEvent::Start(StartDoc {
                uid: text_field(doc, "uid"),
                data_session_directory: text_field(doc, "data_session_directory"),
                scan_file: text_field(doc, "scan_file"),
            }),
            Some("stop") => ScanEvent::Stop(StopDoc {
                run_start: doc
                    .get("run_start")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
                exit_status: doc
                    .get("exit_status")
                    .and_then(Value::as_str)
                    .unwrap_or(StopDoc::UNKNOWN)
                    .to_owned(),
            }),
            other => ScanEvent::Other(other.map(str::to_owned)),
        })
    }

    pub fn kind(&self) -> &str {
        match self {
            ScanEvent::Start(_) => "start",
            ScanEvent::Stop(_) => "stop",
            ScanEvent::Other(Some(name)) => name,
            ScanEvent::Other(None) => "<unnamed>",
        }
    }
}

fn text_field(doc: &Map<String, Value>, key: &str) -> Option<String> {
    doc.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::{ScanEvent, StartDoc, StopDoc};

    #[test]
    fn parses_start_document() {
        let event = ScanEvent::from_slice(
            br#"{"name":"start","doc":{"uid":"abc123","data_session_directory":"/data/test","scan_file":"scan001","plan_name":"count"}}"#,
        )
        .expect("valid start body");

        assert_eq!(
            event,
            ScanEvent::Start(StartDoc {
                uid: Some("abc123".into()),
                data_session_directory: Some("/data/test".into()),
                scan_file: Some("scan001".into()),
            })
        );
    }

    #[test]
    fn start_with_empty_or_non_string_fields_reads_as_missing() {
        let event = ScanEvent::from_slice(
            br#"{"name":"start","doc":{"uid":"","data_session_directory":7,"scan_file":"scan001"}}"#,
        )
        .expect("valid json");

        let ScanEvent::Start(doc) = event else {
            panic!("expected start event");
        };
        assert_eq!(doc.uid, None);
        assert_eq!(doc.data_session_directory, None);
        assert_eq!(doc.scan_file.as_deref(), Some("scan001"));
    }

    #[test]
    fn stop_without_exit_status_defaults_to_unknown() {
        let event =
            ScanEvent::from_slice(br#"{"name":"stop","doc":{"run_start":"abc123"}}"#).expect("valid");

        assert_eq!(
            event,
            ScanEvent::Stop(StopDoc {
                run_start: Some("abc123".into()),
                exit_status: "unknown".into(),
            })
        );
    }

    #[test]
    fn stop_success_detection_is_exact() {
        let doc = |status: &str| StopDoc {
            run_start: None,
            exit_status: status.to_string(),
        };
        assert!(doc("success").succeeded());
        assert!(!doc("SUCCESS").succeeded());
        assert!(!doc("abort").succeeded());
    }

    #[test]
    fn other_kinds_and_missing_name_are_preserved_as_other() {
        let event = ScanEvent::from_slice(br#"{"name":"event","doc":{"seq_num":3}}"#).expect("valid");
        assert_eq!(event, ScanEvent::Other(Some("event".into())));
        assert_eq!(event.kind(), "event");

        let event = ScanEvent::from_slice(br#"{"doc":{}}"#).expect("valid");
        assert_eq!(event, ScanEvent::Other(None));
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        assert!(ScanEvent::from_slice(b"not json at all").is_err());
        assert!(ScanEvent::from_slice(b"[1, 2, 3]").is_err());
        assert!(ScanEvent::from_slice(b"").is_err());
    }
}
