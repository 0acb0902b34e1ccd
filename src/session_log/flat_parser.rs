use serde::Deserialize;
use serde_json::Value;

use super::{lenient, Content, Cost, LogFormat, TimestampValue, UniformEvent, Usage};

// ---------------------------------------------------------------------------
// Raw JSONL shapes (flat-event format)
// ---------------------------------------------------------------------------

/// A record with role, content and token counts as top-level fields.
#[derive(Debug, Default, Deserialize)]
pub struct FlatRecord {
    #[serde(default, deserialize_with = "lenient")]
    role: String,
    #[serde(default)]
    content: Content,
    #[serde(default, deserialize_with = "lenient")]
    ts: String,
    #[serde(default, deserialize_with = "lenient")]
    in_tokens: u64,
    #[serde(default, deserialize_with = "lenient")]
    out_tokens: u64,
    #[serde(default, deserialize_with = "lenient")]
    cost_usd: f64,
    #[serde(default, deserialize_with = "lenient")]
    tool_name: String,
    #[serde(default)]
    tool_input: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    is_error: bool,
}

impl FlatRecord {
    /// Synthesize usage from the flat token counters. `total_tokens` mirrors
    /// the input count only; output is reported separately.
    fn usage(&self) -> Option<Usage> {
        if self.in_tokens == 0 && self.out_tokens == 0 {
            return None;
        }

        let cost = (self.cost_usd > 0.0).then(|| Cost {
            total: self.cost_usd,
            ..Cost::default()
        });

        Some(Usage {
            input: self.in_tokens,
            output: self.out_tokens,
            total_tokens: self.in_tokens,
            cost,
            ..Usage::default()
        })
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

impl From<FlatRecord> for UniformEvent {
    fn from(record: FlatRecord) -> Self {
        let usage = record.usage();
        let timestamp = (!record.ts.is_empty()).then(|| TimestampValue::Text(record.ts));

        UniformEvent {
            format: LogFormat::Flat,
            role: record.role,
            content: record.content,
            usage,
            timestamp,
            tool_name: record.tool_name,
            tool_input: record.tool_input,
            is_error: record.is_error,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
