//! Events a session emits while it runs.
//!
//! The gateway turns each event into exactly one wire frame.

use serde::{Deserialize, Serialize};
use uigen_vfs::Snapshot;
use uigen_wire::Frame;

/// One event on a session's output channel.
///
/// A successful session emits any number of `Text` events followed by one
/// `Snapshot`. A failed one ends with `Error` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    /// A text block from the model, forwarded as soon as the response arrives.
    Text(String),

    /// The file tree after the loop ended.
    Snapshot(Snapshot),

    /// The model or transport failed; nothing follows.
    Error(String),
}

impl AgentStreamEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Snapshot(_) => "snapshot",
            Self::Error(_) => "error",
        }
    }

    /// Whether no further events can follow this one.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Text(_))
    }

    pub fn into_frame(self) -> Frame {
        match self {
            Self::Text(text) => Frame::Text(text),
            Self::Snapshot(snapshot) => Frame::Snapshot(snapshot),
            Self::Error(message) => Frame::Error(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uigen_vfs::SerializedNode;

    #[test]
    fn event_serialization_text() {
        let json = serde_json::to_string(&AgentStreamEvent::Text("Hello".into())).unwrap();
        assert_eq!(json, r#"{"type":"text","data":"Hello"}"#);
    }

    #[test]
    fn event_types_and_terminality() {
        let text = AgentStreamEvent::Text("x".into());
        let snapshot = AgentStreamEvent::Snapshot(Snapshot::new());
        let error = AgentStreamEvent::Error("boom".into());

        assert_eq!(text.event_type(), "text");
        assert_eq!(snapshot.event_type(), "snapshot");
        assert_eq!(error.event_type(), "error");
        assert!(!text.is_terminal());
        assert!(snapshot.is_terminal());
        assert!(error.is_terminal());
    }

    #[test]
    fn events_map_onto_frames() {
        let mut files = Snapshot::new();
        files.insert("/App.jsx", SerializedNode::file("/App.jsx", "x"));

        assert_eq!(
            AgentStreamEvent::Text("hi\n".into()).into_frame().encode().unwrap(),
            "0:\"hi\\n\"\n"
        );
        assert_eq!(
            AgentStreamEvent::Snapshot(files.clone()).into_frame(),
            Frame::Snapshot(files)
        );
        assert_eq!(
            AgentStreamEvent::Error("down".into()).into_frame().encode().unwrap(),
            "3:\"down\"\n"
        );
    }
}
