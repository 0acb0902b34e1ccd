pub mod extract;
pub mod flat_parser;
pub mod format;
pub mod line_buffer;
pub mod nested_parser;
pub mod normalize;
pub mod processor;
pub mod sessions;
pub mod watcher;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub use normalize::{normalize, RawRecord};
pub use processor::process_line;

/// Per-stream rendering configuration, fixed for the lifetime of a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render `request` events (flat-event format only).
    pub verbose: bool,
    /// Emit ANSI styling.
    pub color: bool,
}

/// Which logging convention a record was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Role, content and usage nested under `message`.
    Nested,
    /// Role, content and token counts as top-level fields.
    Flat,
}

/// Monetary accounting in dollars. Only `total` is ever rendered.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cost {
    #[serde(default, deserialize_with = "lenient")]
    pub input: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub output: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub cache_read: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub cache_write: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub total: f64,
}

/// Token accounting attached to an assistant-authored event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default, deserialize_with = "lenient")]
    pub input: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub output: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub cache_read: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub cache_write: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub total_tokens: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub cost: Option<Cost>,
}

/// A timestamp as it appears on the wire: epoch seconds/milliseconds or an
/// RFC 3339 string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimestampValue {
    Epoch(f64),
    Text(String),
}

/// The polymorphic `content` value of a record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum Content {
    Text(String),
    Sequence(Vec<Item>),
    /// Anything else, including `null`.
    Other(Value),
}

impl Default for Content {
    fn default() -> Self {
        Content::Other(Value::Null)
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Content::Text(s),
            Value::Array(items) => Content::Sequence(items.into_iter().map(Item::from).collect()),
            other => Content::Other(other),
        }
    }
}

/// One element of a content sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Block(Block),
    Text(String),
    Other(Value),
}

impl From<Value> for Item {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Item::Text(s),
            Value::Object(_) => match serde_json::from_value(value.clone()) {
                Ok(block) => Item::Block(block),
                Err(_) => Item::Other(value),
            },
            other => Item::Other(other),
        }
    }
}

/// A typed content block. `kind` decides how the remaining fields are read;
/// unknown kinds are ignored by every extractor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Block {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<Value>,
    #[serde(default)]
    pub content: Option<Value>,
}

/// A record normalized from either format. Created per line, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformEvent {
    pub format: LogFormat,
    pub role: String,
    pub content: Content,
    pub usage: Option<Usage>,
    pub timestamp: Option<TimestampValue>,
    /// `tool_call` events carry the invocation as top-level fields.
    pub tool_name: String,
    pub tool_input: Option<Value>,
    /// `tool_result` events flag failures at the top level.
    pub is_error: bool,
}

/// Rendered output of a single line. Empty `output` means nothing to show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedLine {
    pub output: String,
    pub usage: Option<Usage>,
}

/// Events emitted by the session tailer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Lines { lines: Vec<String> },
    /// The file shrank; reading restarted from the beginning.
    Truncated,
    Error { error: String },
}

/// Deserialize a field, falling back to its default when the value has an
/// unexpected shape instead of rejecting the whole record.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
