use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use super::line_buffer::LineBuffer;
use super::SessionEvent;

/// Re-check the file this often even without a filesystem notification.
pub const POLL_INTERVAL: Duration = Duration::from_millis(300);

/// Read position within a followed file.
#[derive(Debug, Default)]
pub struct TailState {
    pos: u64,
    buffer: LineBuffer,
}

impl TailState {
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Flush a trailing line that has no newline yet.
    pub fn finish(&mut self) -> Option<String> {
        self.buffer.finish()
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Read every complete line currently in the file.
///
/// The returned state remembers where reading stopped and any partial last
/// line, so following can pick up exactly from there.
pub fn read_history(path: &Path) -> Result<(Vec<String>, TailState)> {
    let mut state = TailState {
        pos: 0,
        buffer: LineBuffer::new(),
    };
    let lines = read_new_lines(path, &mut state)
        .with_context(|| format!("failed to read session file: {}", path.display()))?;
    Ok((lines, state))
}

// ---------------------------------------------------------------------------
// Follow
// ---------------------------------------------------------------------------

/// Watch a session file and emit newly appended lines.
///
/// Uses `notify` (inotify on Linux) with a polling fallback, since some
/// filesystems never deliver modify events.
///
/// The returned `notify::RecommendedWatcher` **must be kept alive** by the
/// caller -- dropping it stops file-system notifications.
pub fn watch_session(
    path: &Path,
    mut state: TailState,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
) -> Result<notify::RecommendedWatcher> {
    // `notify` callbacks are sync; bridge to async with an unbounded channel.
    let (notify_tx, mut notify_rx) = mpsc::unbounded_channel::<()>();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) if event.kind.is_modify() => {
                let _ = notify_tx.send(());
            }
            Ok(_) => {}
            Err(e) => {
                error!("notify error: {e}");
            }
        }
    })?;
    watcher
        .watch(path, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", path.display()))?;

    let file_path: PathBuf = path.to_path_buf();
    tokio::spawn(async move {
        loop {
            // Either a notification or the poll interval wakes us up.
            if let Ok(None) = tokio::time::timeout(POLL_INTERVAL, notify_rx.recv()).await {
                debug!("notify channel closed, stopping tail task");
                return;
            }
            while notify_rx.try_recv().is_ok() {}

            let shrunk = match std::fs::metadata(&file_path) {
                Ok(meta) => meta.len() < state.pos,
                Err(_) => false,
            };
            if shrunk {
                warn!("{} was truncated, reading from the start", file_path.display());
                state.pos = 0;
                state.buffer.clear();
                if event_tx.send(SessionEvent::Truncated).is_err() {
                    return;
                }
            }

            match read_new_lines(&file_path, &mut state) {
                Ok(lines) if lines.is_empty() => {}
                Ok(lines) => {
                    if event_tx.send(SessionEvent::Lines { lines }).is_err() {
                        debug!("event_tx closed, stopping tail task");
                        return;
                    }
                }
                Err(e) => {
                    warn!("failed to read new session lines: {e}");
                    if event_tx
                        .send(SessionEvent::Error {
                            error: e.to_string(),
                        })
                        .is_err()
                    {
                        return;
                    }
                }
            }
        }
    });

    Ok(watcher)
}

/// Open the file, seek to the saved position, read to EOF, advance the
/// position and return any lines completed by the new bytes.
fn read_new_lines(path: &Path, state: &mut TailState) -> Result<Vec<String>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(state.pos))?;

    let mut chunk = Vec::new();
    let read = file.read_to_end(&mut chunk)?;
    state.pos += read as u64;

    Ok(state.buffer.push(&chunk))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn history_returns_complete_lines_and_position() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a\nb\npartial").unwrap();

        let (lines, mut state) = read_history(file.path()).unwrap();
        assert_eq!(lines, vec!["a", "b"]);
        assert_eq!(state.position(), 11);
        assert_eq!(state.finish().as_deref(), Some("partial"));
    }

    #[test]
    fn history_of_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_history(&dir.path().join("missing.jsonl")).unwrap_err();
        assert!(err.to_string().contains("missing.jsonl"));
    }

    #[test]
    fn new_lines_continue_from_saved_position() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "one\ntw").unwrap();
        let (lines, mut state) = read_history(file.path()).unwrap();
        assert_eq!(lines, vec!["one"]);

        write!(file, "o\nthree\n").unwrap();
        let lines = read_new_lines(file.path(), &mut state).unwrap();
        assert_eq!(lines, vec!["two", "three"]);
    }

    #[tokio::test]
    async fn watcher_emits_appended_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "old").unwrap();
        let (_, state) = read_history(file.path()).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _watcher = watch_session(file.path(), state, tx).unwrap();

        writeln!(file, "new").unwrap();
        file.flush().unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("watcher should report the new line")
            .expect("channel should stay open");
        match event {
            SessionEvent::Lines { lines } => assert_eq!(lines, vec!["new"]),
            other => panic!("expected Lines, got {other:?}"),
        }
    }
}
