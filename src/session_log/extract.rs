use serde_json::{Map, Value};

use super::format::{dim, tool, Theme};
use super::{Block, Content, Item};

/// Per-value limit inside an argument map.
const ARG_VALUE_LIMIT: usize = 80;
/// Limit for arguments that are not a map.
const RAW_ARGS_LIMIT: usize = 150;
/// Limit for tool result text.
pub const RESULT_LIMIT: usize = 300;

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Flatten a content value into display text. Never fails.
pub fn extract_text(content: &Content) -> String {
    match content {
        Content::Text(text) => text.clone(),
        Content::Sequence(items) => items
            .iter()
            .filter_map(|item| match item {
                Item::Block(block) if block.kind == "text" => block.text.as_deref(),
                Item::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Content::Other(value) => stringify(value),
    }
}

// ---------------------------------------------------------------------------
// Tool calls
// ---------------------------------------------------------------------------

/// One `⚡ name(args)` line per `toolCall` block.
pub fn extract_tool_calls(content: &Content, theme: &Theme) -> Vec<String> {
    blocks_of_kind(content, "toolCall")
        .map(|block| {
            let name = block.name.as_deref().unwrap_or("?");
            format_tool_call(name, block.arguments.as_ref(), theme)
        })
        .collect()
}

pub fn format_tool_call(name: &str, arguments: Option<&Value>, theme: &Theme) -> String {
    let args = arguments.map(summarize_arguments).unwrap_or_default();
    format!(
        "  {}({})",
        theme.paint(format!("⚡ {name}"), tool()),
        theme.paint(args, dim())
    )
}

/// `key=value` pairs for a map, or the hard-truncated value otherwise.
pub fn summarize_arguments(arguments: &Value) -> String {
    match arguments {
        Value::Object(map) => summarize_map(map),
        Value::Null => String::new(),
        other => truncate_hard(&stringify(other), RAW_ARGS_LIMIT),
    }
}

fn summarize_map(map: &Map<String, Value>) -> String {
    map.iter()
        .map(|(key, value)| format!("{key}={}", truncate(&stringify(value), ARG_VALUE_LIMIT)))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Tool results
// ---------------------------------------------------------------------------

/// One `→ text` line per `toolResult` block with non-blank text.
pub fn extract_tool_results(content: &Content, theme: &Theme) -> Vec<String> {
    blocks_of_kind(content, "toolResult")
        .map(result_text)
        .map(|text| truncate(&text, RESULT_LIMIT))
        .filter(|text| !text.trim().is_empty())
        .map(|text| format!("  {}", theme.paint(format!("→ {text}"), dim())))
        .collect()
}

fn result_text(block: &Block) -> String {
    if let Some(text) = &block.text {
        return text.clone();
    }
    match &block.content {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" "),
        Some(other) => stringify(other),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn blocks_of_kind<'a>(content: &'a Content, kind: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
    let items: &[Item] = match content {
        Content::Sequence(items) => items,
        _ => &[],
    };
    items.iter().filter_map(move |item| match item {
        Item::Block(block) if block.kind == kind => Some(block),
        _ => None,
    })
}

/// Human-readable rendering of an arbitrary JSON value.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Cut to `max` characters, marking the cut with `…`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push('…');
    out
}

/// Cut to `max` characters without a marker.
pub fn truncate_hard(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
