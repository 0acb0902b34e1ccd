use std::io::Write;
use std::path::Path;

use anyhow::{bail, Result};
use chrono::{DateTime, Local};

use crate::session_log::format::{self, bold, dim, Theme};
use crate::session_log::sessions::{agents_dir, list_agents, list_sessions, sessions_dir, SessionFile};

/// At most this many sessions are listed.
const SESSION_LIST_LIMIT: usize = 20;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Print every agent with its session count.
pub fn print_agents<W: Write>(out: &mut W, state_dir: &Path, theme: &Theme) -> Result<()> {
    let agents = list_agents(state_dir);
    if agents.is_empty() {
        bail!("no agents found in {}", agents_dir(state_dir).display());
    }

    writeln!(out, "{}\n", theme.paint("Agents:", bold()))?;
    for agent in agents {
        writeln!(
            out,
            "  {}  {}",
            theme.paint(&agent.name, format::user()),
            theme.paint(format!("({} sessions)", agent.session_count), dim())
        )?;
    }
    Ok(())
}

/// Print the most recent sessions of `agent`.
pub fn print_sessions<W: Write>(out: &mut W, state_dir: &Path, agent: &str, theme: &Theme) -> Result<()> {
    let sessions = list_sessions(state_dir, agent);
    if sessions.is_empty() {
        bail!(
            "no sessions for agent '{agent}' in {}",
            sessions_dir(state_dir, agent).display()
        );
    }

    writeln!(
        out,
        "{}{}{}\n",
        theme.paint("Sessions for ", bold()),
        theme.paint(agent, format::user()),
        theme.paint(":", bold())
    )?;
    for session in sessions.iter().take(SESSION_LIST_LIMIT) {
        writeln!(out, "{}", session_row(session, theme))?;
    }
    Ok(())
}

fn session_row(session: &SessionFile, theme: &Theme) -> String {
    let modified: DateTime<Local> = session.modified.into();
    let name = session
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "  {}  {:>6}  {}",
        theme.paint(modified.format("%Y-%m-%d %H:%M"), dim()),
        format_size(session.size),
        name
    )
}

/// `12K`, or `1.5M` from one mebibyte up.
pub fn format_size(bytes: u64) -> String {
    if bytes >= MIB {
        format!("{:.1}M", bytes as f64 / MIB as f64)
    } else {
        format!("{:.0}K", bytes as f64 / KIB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn state_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (agent, count) in [("main", 2), ("argraphments", 1)] {
            let sessions = sessions_dir(dir.path(), agent);
            fs::create_dir_all(&sessions).unwrap();
            for i in 0..count {
                fs::write(sessions.join(format!("{agent}-{i}.jsonl")), "x".repeat(2048)).unwrap();
            }
        }
        dir
    }

    fn render<F>(f: F) -> Result<String>
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut out = Vec::new();
        f(&mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn size_formatting() {
        assert_eq!(format_size(0), "0K");
        assert_eq!(format_size(2048), "2K");
        assert_eq!(format_size(1536), "2K");
        assert_eq!(format_size(MIB + MIB / 2), "1.5M");
    }

    #[test]
    fn agents_listing() {
        let dir = state_dir();
        let out = render(|out| print_agents(out, dir.path(), &Theme::plain())).unwrap();
        assert_eq!(
            out,
            "Agents:\n\n  argraphments  (1 sessions)\n  main  (2 sessions)\n"
        );
    }

    #[test]
    fn no_agents_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = render(|out| print_agents(out, dir.path(), &Theme::plain())).unwrap_err();
        assert!(err.to_string().starts_with("no agents found in"));
    }

    #[test]
    fn sessions_listing() {
        let dir = state_dir();
        let out = render(|out| print_sessions(out, dir.path(), "main", &Theme::plain())).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("Sessions for main:"));
        assert_eq!(lines.next(), Some(""));
        let rows: Vec<&str> = lines.collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.contains("    2K  main-")));
    }

    #[test]
    fn unknown_agent_has_no_sessions() {
        let dir = state_dir();
        let err = render(|out| print_sessions(out, dir.path(), "ghost", &Theme::plain())).unwrap_err();
        assert!(err.to_string().contains("'ghost'"));
    }
}
