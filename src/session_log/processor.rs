use serde_json::Value;
use tracing::debug;

use super::extract::{
    extract_text, extract_tool_calls, extract_tool_results, format_tool_call, truncate,
    RESULT_LIMIT,
};
use super::format::{self, dim, format_timestamp, format_token_usage, Theme};
use super::{normalize, ProcessedLine, RenderOptions, UniformEvent};

/// User messages starting with this are agent heartbeats, not human input.
const HEARTBEAT_PREFIX: &str = "Read HEARTBEAT";
/// Long user/thinking text is cut down to a preview.
const LONG_TEXT_THRESHOLD: usize = 500;
const LONG_TEXT_PREVIEW: usize = 200;
const SYSTEM_LIMIT: usize = 200;
/// Flat tool results shorter than this (and on one line) are shown inline.
const INLINE_RESULT_BYTES: usize = 100;

/// Render one raw JSONL line.
///
/// Blank, malformed, non-object and unrecognized lines all produce an empty
/// [`ProcessedLine`]; this function never fails.
pub fn process_line(line: &str, options: &RenderOptions) -> ProcessedLine {
    let line = line.trim();
    if line.is_empty() {
        return ProcessedLine::default();
    }

    let value: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            debug!("skipping malformed JSONL line: {e}");
            return ProcessedLine::default();
        }
    };

    let Some(event) = normalize(value) else {
        return ProcessedLine::default();
    };
    if event.role.is_empty() {
        return ProcessedLine::default();
    }

    Renderer::new(options).render(&event)
}

struct Renderer {
    theme: Theme,
    verbose: bool,
}

impl Renderer {
    fn new(options: &RenderOptions) -> Self {
        Self {
            theme: Theme::new(options.color),
            verbose: options.verbose,
        }
    }

    fn render(&self, event: &UniformEvent) -> ProcessedLine {
        let ts = self.timestamp(event);
        let output = match event.role.as_str() {
            "user" => self.user(event, &ts),
            "assistant" => return self.assistant(event, &ts),
            "tool" => self.tool(event),
            "system" => self.system(event, &ts),
            "thinking" => self.thinking(event, &ts),
            "tool_call" => self.flat_tool_call(event),
            "tool_result" => self.flat_tool_result(event),
            "request" => self.request(&ts),
            other => {
                debug!(format = ?event.format, "ignoring unknown role {other:?}");
                None
            }
        };

        ProcessedLine {
            output: output.unwrap_or_default(),
            usage: None,
        }
    }

    /// Leading space plus the dimmed time, or nothing.
    fn timestamp(&self, event: &UniformEvent) -> String {
        let formatted = format_timestamp(event.timestamp.as_ref());
        if formatted.is_empty() {
            formatted
        } else {
            format!(" {}", self.theme.paint(formatted, dim()))
        }
    }

    fn header(&self, label: &str, ts: &str, annotation: &str, style: owo_colors::Style) -> String {
        let style = style.bold();
        format!(
            "\n{}{ts}{annotation}{}",
            self.theme.paint(label, style),
            self.theme.paint(" ━━━", style)
        )
    }

    fn user(&self, event: &UniformEvent, ts: &str) -> Option<String> {
        let text = extract_text(&event.content);
        if text.trim().is_empty() || text.starts_with(HEARTBEAT_PREFIX) {
            return None;
        }
        let text = self.preview(text);
        Some(format!(
            "{}\n{}",
            self.header("━━━ You", ts, "", format::user()),
            self.theme.paint(text, format::user())
        ))
    }

    fn assistant(&self, event: &UniformEvent, ts: &str) -> ProcessedLine {
        let text = extract_text(&event.content);
        let tool_calls = extract_tool_calls(&event.content, &self.theme);
        let has_text = !text.trim().is_empty();
        if !has_text && tool_calls.is_empty() {
            return ProcessedLine::default();
        }

        let tokens = format_token_usage(event.usage.as_ref(), &self.theme);
        let mut parts = vec![self.header("━━━ Agent", ts, &tokens, format::agent())];
        if has_text {
            parts[0] = format!("{}\n{}", parts[0], self.theme.paint(text, format::agent()));
        }
        parts.extend(tool_calls);

        ProcessedLine {
            output: parts.join("\n"),
            usage: event.usage.clone(),
        }
    }

    fn tool(&self, event: &UniformEvent) -> Option<String> {
        let results = extract_tool_results(&event.content, &self.theme);
        if !results.is_empty() {
            return Some(results.join("\n"));
        }

        let text = extract_text(&event.content);
        if text.trim().is_empty() {
            return None;
        }
        Some(self.arrow(&truncate(&text, RESULT_LIMIT)))
    }

    fn system(&self, event: &UniformEvent, ts: &str) -> Option<String> {
        let text = extract_text(&event.content);
        if text.trim().is_empty() {
            return None;
        }
        let text = truncate(&text, SYSTEM_LIMIT);
        Some(format!(
            "\n{}{ts} {}",
            self.theme.paint("[system]", format::tag()),
            self.theme.paint(text, format::tag())
        ))
    }

    fn thinking(&self, event: &UniformEvent, ts: &str) -> Option<String> {
        let text = extract_text(&event.content);
        if text.trim().is_empty() {
            return None;
        }
        let text = self.preview(text);
        Some(format!(
            "{}\n{}",
            self.header("💭 Thinking", ts, "", format::thinking()),
            self.theme.paint(text, dim())
        ))
    }

    fn flat_tool_call(&self, event: &UniformEvent) -> Option<String> {
        let name = if event.tool_name.is_empty() {
            "?"
        } else {
            event.tool_name.as_str()
        };
        Some(format_tool_call(name, event.tool_input.as_ref(), &self.theme))
    }

    fn flat_tool_result(&self, event: &UniformEvent) -> Option<String> {
        let text = extract_text(&event.content);
        if event.is_error {
            let text = truncate(&text, RESULT_LIMIT);
            return Some(format!("  {}", self.theme.paint(format!("✗ {text}"), format::error())));
        }
        if text.is_empty() {
            return None;
        }

        let line_count = text.matches('\n').count() + 1;
        let byte_count = text.len();
        if line_count == 1 && byte_count < INLINE_RESULT_BYTES {
            Some(self.arrow(&text))
        } else {
            Some(self.arrow(&format!("{line_count} lines, {byte_count} bytes")))
        }
    }

    fn request(&self, ts: &str) -> Option<String> {
        self.verbose
            .then(|| format!("\n{}{ts}", self.theme.paint("[request]", format::tag())))
    }

    fn arrow(&self, text: &str) -> String {
        format!("  {}", self.theme.paint(format!("→ {text}"), dim()))
    }

    /// Cut long text to a preview followed by a character count.
    fn preview(&self, text: String) -> String {
        let chars = text.chars().count();
        if chars <= LONG_TEXT_THRESHOLD {
            return text;
        }
        let head: String = text.chars().take(LONG_TEXT_PREVIEW).collect();
        format!("{head}\n  {}", self.theme.paint(format!("… ({chars} chars)"), dim()))
    }
}
