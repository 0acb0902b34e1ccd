use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::session_log::format::{self, dim, format_cost, format_number, Theme};
use crate::session_log::watcher::{read_history, watch_session};
use crate::session_log::{process_line, RenderOptions, SessionEvent, Usage};

const RULE_WIDTH: usize = 60;

/// Running sums over every usage snapshot seen in a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageTotals {
    pub context: u64,
    pub output: u64,
    pub cost: f64,
}

impl UsageTotals {
    pub fn add(&mut self, usage: &Usage) {
        self.context = self.context.saturating_add(usage.total_tokens);
        self.output = self.output.saturating_add(usage.output);
        if let Some(cost) = &usage.cost {
            self.cost += cost.total;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.context == 0 && self.output == 0
    }

    /// `Total: ctx: … | out: …[ | $…]`
    pub fn summary(&self) -> String {
        let cost = if self.cost > 0.0 {
            format!(" | {}", format_cost(self.cost))
        } else {
            String::new()
        };
        format!(
            "Total: ctx: {} | out: {}{}",
            format_number(self.context),
            format_number(self.output),
            cost
        )
    }
}

/// Renders lines of one session to `out` and keeps the running totals.
pub struct SessionPrinter<W: Write> {
    out: W,
    options: RenderOptions,
    theme: Theme,
    totals: UsageTotals,
}

impl<W: Write> SessionPrinter<W> {
    pub fn new(out: W, options: RenderOptions) -> Self {
        Self {
            out,
            options,
            theme: Theme::new(options.color),
            totals: UsageTotals::default(),
        }
    }

    pub fn totals(&self) -> UsageTotals {
        self.totals
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// `Streaming: <file>[ (<agent>)]` followed by a rule.
    pub fn header(&mut self, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let agent = agent_from_path(path)
            .map(|a| format!(" ({a})"))
            .unwrap_or_default();

        writeln!(
            self.out,
            "{}",
            self.theme
                .paint(format!("Streaming: {file_name}{agent}"), format::banner())
        )?;
        writeln!(self.out, "{}\n", self.rule())?;
        Ok(())
    }

    pub fn handle_line(&mut self, line: &str) -> Result<()> {
        let processed = process_line(line, &self.options);
        if !processed.output.is_empty() {
            writeln!(self.out, "{}", processed.output)?;
        }
        if let Some(usage) = &processed.usage {
            self.totals.add(usage);
        }
        Ok(())
    }

    pub fn handle_lines<I, S>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.handle_line(line.as_ref())?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Rule plus totals line, skipped when nothing was counted.
    pub fn footer(&mut self) -> Result<()> {
        if self.totals.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "\n{}", self.rule())?;
        writeln!(self.out, "{}", self.theme.paint(self.totals.summary(), dim()))?;
        self.out.flush()?;
        Ok(())
    }

    fn rule(&self) -> String {
        self.theme.paint("─".repeat(RULE_WIDTH), dim())
    }
}

/// The path component following `agents`, e.g. `main` in
/// `~/.openclaw/agents/main/sessions/x.jsonl`.
pub fn agent_from_path(path: &Path) -> Option<String> {
    let mut components = path.components().map(|c| c.as_os_str().to_string_lossy());
    components.by_ref().find(|c| *c == "agents")?;
    components.next().map(|c| c.into_owned())
}

/// Stream a session file to stdout.
///
/// Without `follow` every line is rendered followed by the totals. With
/// `follow` only the last `tail` lines are rendered, then new lines as they
/// are appended until interrupted.
pub async fn stream_file(path: &Path, follow: bool, tail: usize, options: RenderOptions) -> Result<()> {
    let mut printer = SessionPrinter::new(std::io::stdout(), options);
    printer.header(path)?;

    let (lines, mut state) = read_history(path)?;

    if !follow {
        printer.handle_lines(&lines)?;
        if let Some(last) = state.finish() {
            printer.handle_line(&last)?;
        }
        return printer.footer();
    }

    let start = lines.len().saturating_sub(tail);
    printer.handle_lines(&lines[start..])?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let _watcher = watch_session(path, state, event_tx)?;
    info!("following {}", path.display());

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(SessionEvent::Lines { lines }) => printer.handle_lines(&lines)?,
                Some(SessionEvent::Truncated) => warn!("session file truncated, restarting from the top"),
                Some(SessionEvent::Error { error }) => error!("failed to read session file: {error}"),
                None => break,
            },
            _ = &mut shutdown => break,
        }
    }

    printer.footer()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, stopping"),
        _ = terminate => info!("received terminate signal, stopping"),
    }
}
