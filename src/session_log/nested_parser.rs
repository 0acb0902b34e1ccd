use serde::Deserialize;

use super::{lenient, Content, LogFormat, TimestampValue, UniformEvent, Usage};

// ---------------------------------------------------------------------------
// Raw JSONL shapes (nested-message format)
// ---------------------------------------------------------------------------

/// A record whose role, content and usage live under `message`.
#[derive(Debug, Default, Deserialize)]
pub struct NestedRecord {
    #[serde(default, deserialize_with = "lenient")]
    message: RawMessage,
    #[serde(default, deserialize_with = "lenient")]
    ts: String,
    #[serde(default, deserialize_with = "lenient")]
    timestamp: Option<TimestampValue>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMessage {
    #[serde(default, deserialize_with = "lenient")]
    role: String,
    #[serde(default)]
    content: Content,
    #[serde(default, deserialize_with = "lenient")]
    usage: Option<Usage>,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

impl From<NestedRecord> for UniformEvent {
    fn from(record: NestedRecord) -> Self {
        // A non-empty `ts` string wins over `timestamp`.
        let timestamp = if record.ts.is_empty() {
            record.timestamp
        } else {
            Some(TimestampValue::Text(record.ts))
        };

        UniformEvent {
            format: LogFormat::Nested,
            role: record.message.role,
            content: record.message.content,
            usage: record.message.usage,
            timestamp,
            tool_name: String::new(),
            tool_input: None,
            is_error: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
