use std::fmt;

use chrono::{DateTime, Local};
use owo_colors::{OwoColorize, Style};

use super::{TimestampValue, Usage};

/// Epoch values above this are milliseconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e12;

// ---------------------------------------------------------------------------
// Styling
// ---------------------------------------------------------------------------

/// Applies ANSI styles, or nothing at all when colour is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    enabled: bool,
}

impl Theme {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn colored() -> Self {
        Self::new(true)
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn paint<T: fmt::Display>(&self, text: T, style: Style) -> String {
        if self.enabled {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }
}

pub fn dim() -> Style {
    Style::new().dimmed()
}

pub fn bold() -> Style {
    Style::new().bold()
}

pub fn user() -> Style {
    Style::new().cyan()
}

pub fn agent() -> Style {
    Style::new().green()
}

pub fn thinking() -> Style {
    Style::new().yellow()
}

pub fn tool() -> Style {
    Style::new().magenta()
}

pub fn error() -> Style {
    Style::new().red()
}

pub fn banner() -> Style {
    Style::new().yellow()
}

pub fn tag() -> Style {
    Style::new().blue().dimmed()
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// Compact token count: `999`, `1.0k`, `85.2k`.
pub fn format_number(n: u64) -> String {
    if n >= 1000 {
        format!("{:.1}k", n as f64 / 1000.0)
    } else {
        n.to_string()
    }
}

/// Dollar amount rounded half-up to the cent.
pub fn format_cost(cost: f64) -> String {
    let cents = (cost * 100.0).round();
    format!("${:.2}", cents / 100.0)
}

/// Inline ` ctx: … | out: …[ | $…]` annotation, or empty when there is
/// nothing to report.
pub fn format_token_usage(usage: Option<&Usage>, theme: &Theme) -> String {
    let Some(usage) = usage else {
        return String::new();
    };
    if usage.total_tokens == 0 && usage.output == 0 {
        return String::new();
    }

    let cost = match &usage.cost {
        Some(cost) if cost.total > 0.0 => format!(" | {}", format_cost(cost.total)),
        _ => String::new(),
    };
    let annotation = format!(
        "ctx: {} | out: {}{}",
        format_number(usage.total_tokens),
        usage.output,
        cost
    );
    format!(" {}", theme.paint(annotation, dim()))
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Render a timestamp as `HH:MM:SS`.
///
/// Numbers are epoch seconds (milliseconds above 1e12) shown in local time.
/// RFC 3339 strings keep their own offset. Anything unparseable is passed
/// through as-is.
pub fn format_timestamp(timestamp: Option<&TimestampValue>) -> String {
    match timestamp {
        None => String::new(),
        Some(TimestampValue::Epoch(value)) => {
            let secs = if *value > EPOCH_MILLIS_THRESHOLD {
                value / 1000.0
            } else {
                *value
            };
            match DateTime::from_timestamp(secs as i64, 0) {
                Some(dt) => dt.with_timezone(&Local).format("%H:%M:%S").to_string(),
                None => value.to_string(),
            }
        }
        Some(TimestampValue::Text(text)) => match DateTime::parse_from_rfc3339(text) {
            Ok(dt) => dt.format("%H:%M:%S").to_string(),
            Err(_) => text.clone(),
        },
    }
}
