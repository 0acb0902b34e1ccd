use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{bail, Result};
use tracing::debug;

/// An agent directory that holds a `sessions/` folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInfo {
    pub name: String,
    pub session_count: usize,
}

/// A session transcript on disk.
#[derive(Debug, Clone)]
pub struct SessionFile {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub size: u64,
}

pub fn agents_dir(state_dir: &Path) -> PathBuf {
    state_dir.join("agents")
}

pub fn sessions_dir(state_dir: &Path, agent: &str) -> PathBuf {
    agents_dir(state_dir).join(agent).join("sessions")
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// All agents with a sessions directory, sorted by name.
pub fn list_agents(state_dir: &Path) -> Vec<AgentInfo> {
    let dir = agents_dir(state_dir);
    let Ok(entries) = fs::read_dir(&dir) else {
        debug!("agents directory not readable: {}", dir.display());
        return Vec::new();
    };

    let mut agents: Vec<AgentInfo> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            let sessions = entry.path().join("sessions");
            if !sessions.is_dir() {
                return None;
            }
            Some(AgentInfo {
                session_count: jsonl_files(&sessions).len(),
                name,
            })
        })
        .collect();

    agents.sort_by(|a, b| a.name.cmp(&b.name));
    agents
}

/// Session files for `agent`, newest first.
pub fn list_sessions(state_dir: &Path, agent: &str) -> Vec<SessionFile> {
    let mut sessions: Vec<SessionFile> = jsonl_files(&sessions_dir(state_dir, agent))
        .into_iter()
        .filter_map(|path| {
            let meta = fs::metadata(&path).ok()?;
            let modified = meta.modified().ok()?;
            Some(SessionFile {
                path,
                modified,
                size: meta.len(),
            })
        })
        .collect();

    sessions.sort_by(|a, b| b.modified.cmp(&a.modified));
    sessions
}

/// The most recently modified session for `agent`.
pub fn latest_session(state_dir: &Path, agent: &str) -> Result<PathBuf> {
    if let Some(newest) = list_sessions(state_dir, agent).into_iter().next() {
        return Ok(newest.path);
    }

    let looked_in = sessions_dir(state_dir, agent).join("*.jsonl");
    let agents = list_agents(state_dir);
    if agents.is_empty() {
        bail!(
            "no session files found for agent '{agent}' (looked in {})",
            looked_in.display()
        );
    }
    let names: Vec<&str> = agents.iter().map(|a| a.name.as_str()).collect();
    bail!(
        "no session files found for agent '{agent}' (looked in {})\navailable agents: {}",
        looked_in.display(),
        names.join(", ")
    );
}

fn jsonl_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("jsonl"))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
