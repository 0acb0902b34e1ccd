use serde_json::Value;
use tracing::debug;

use super::flat_parser::FlatRecord;
use super::nested_parser::NestedRecord;
use super::UniformEvent;

/// A decoded record, classified by shape.
#[derive(Debug)]
pub enum RawRecord {
    Nested(NestedRecord),
    Flat(FlatRecord),
}

impl RawRecord {
    /// Classify a decoded JSON value. Returns `None` for non-object records.
    ///
    /// A populated top-level `role` marks the flat-event format, unless
    /// `message.role` is also populated, in which case the nested shape wins.
    pub fn classify(value: Value) -> Option<Self> {
        if !value.is_object() {
            debug!("skipping non-object record");
            return None;
        }

        let top_role = value.get("role").and_then(Value::as_str).unwrap_or_default();
        let nested_role = value
            .pointer("/message/role")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let record = if !top_role.is_empty() && nested_role.is_empty() {
            RawRecord::Flat(serde_json::from_value(value).ok()?)
        } else {
            RawRecord::Nested(serde_json::from_value(value).ok()?)
        };
        Some(record)
    }
}

impl From<RawRecord> for UniformEvent {
    fn from(record: RawRecord) -> Self {
        match record {
            RawRecord::Nested(r) => r.into(),
            RawRecord::Flat(r) => r.into(),
        }
    }
}

/// Normalize one decoded record into the uniform event shape.
pub fn normalize(value: Value) -> Option<UniformEvent> {
    RawRecord::classify(value).map(UniformEvent::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_log::{Content, LogFormat};
    use serde_json::json;

    #[test]
    fn nested_message_is_classified_as_nested() {
        let record = RawRecord::classify(json!({"message": {"role": "assistant", "content": "x"}}));
        assert!(matches!(record, Some(RawRecord::Nested(_))));
    }

    #[test]
    fn top_level_role_without_message_is_flat() {
        let record = RawRecord::classify(json!({"role": "user", "content": "hi", "ts": "2026-02-13T10:30:00Z"}));
        assert!(matches!(record, Some(RawRecord::Flat(_))));
    }

    #[test]
    fn nested_role_wins_when_both_are_present() {
        let event = normalize(json!({
            "role": "system",
            "content": "flat",
            "message": {"role": "user", "content": "nested"}
        }))
        .expect("object should normalize");
        assert_eq!(event.format, LogFormat::Nested);
        assert_eq!(event.role, "user");
        assert_eq!(event.content, Content::Text("nested".into()));
    }

    #[test]
    fn empty_nested_role_falls_back_to_flat() {
        let event = normalize(json!({"role": "thinking", "content": "hmm", "message": {"role": ""}}))
            .expect("object should normalize");
        assert_eq!(event.format, LogFormat::Flat);
        assert_eq!(event.role, "thinking");
    }

    #[test]
    fn non_objects_are_rejected() {
        assert!(normalize(json!([1, 2, 3])).is_none());
        assert!(normalize(json!("text")).is_none());
        assert!(normalize(json!(null)).is_none());
    }

    #[test]
    fn unrecognized_object_normalizes_with_empty_role() {
        let event = normalize(json!({"type": "heartbeat"})).expect("object should normalize");
        assert!(event.role.is_empty());
    }
}
